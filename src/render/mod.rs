mod frame;
mod null_renderer;
mod primitives;
mod scene;
mod svg_renderer;
mod transition;

pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Attr, AttrMap, AttrValue, Color, Curve, PathCommand, Primitive, ShapeKind, path_commands,
};
pub use scene::{BindOutcome, LayerKind, Scene, ShapeLayer, ShapePatch};
pub use svg_renderer::{SvgRenderer, path_data};
pub use transition::{Easing, TransitionController, TransitionSample};

use crate::error::ChartResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame` so drawing code stays
/// isolated from data binding and interaction logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoRenderStats, CairoRenderer};
