use std::time::Duration;

use tracing::{debug, trace};

use crate::core::{RecordKey, Viewport};
use crate::error::ChartResult;
use crate::render::{
    Attr, AttrValue, BindOutcome, Color, Primitive, RenderFrame, Scene, ShapeLayer,
    TransitionController,
};

/// Drawing target owned by exactly one mounted page.
///
/// A page takes the surface by value on `mount` and hands it back on
/// `unmount`, so two pages can never draw into the same surface.
#[derive(Debug)]
pub struct Surface {
    viewport: Viewport,
    frame: RenderFrame,
    presented: u64,
}

impl Surface {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frame: RenderFrame::new(viewport),
            presented: 0,
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Last frame presented by the mounted page.
    #[must_use]
    pub fn frame(&self) -> &RenderFrame {
        &self.frame
    }

    /// Number of frames presented so far.
    #[must_use]
    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub(crate) fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub(crate) fn present(&mut self, frame: RenderFrame) {
        self.frame = frame;
        self.presented += 1;
    }
}

/// Lifecycle shared by all chart pages.
pub trait ChartPage {
    /// Attaches the page to `surface`, replacing (and dropping) any previous one.
    fn mount(&mut self, surface: Surface);

    /// Detaches the surface, cancelling timers and transitions.
    fn unmount(&mut self) -> Option<Surface>;

    fn is_mounted(&self) -> bool;

    fn resize(&mut self, viewport: Viewport);

    /// Re-derives scales, axes and shapes for time `now` and presents the
    /// result. A no-op while unmounted.
    fn render(&mut self, now: Duration) -> ChartResult<()>;

    fn scene(&self) -> &Scene;

    /// Frame currently shown on the mounted surface.
    fn frame(&self) -> Option<&RenderFrame>;
}

/// Surface slot plus scene, embedded by each page.
#[derive(Debug)]
pub(crate) struct PageHost {
    surface: Option<Surface>,
    scene: Scene,
}

impl PageHost {
    pub(crate) fn new(viewport: Viewport) -> Self {
        Self {
            surface: None,
            scene: Scene::new(viewport),
        }
    }

    pub(crate) fn mount(&mut self, surface: Surface, page: &'static str) {
        debug!(page, width = surface.viewport().width, height = surface.viewport().height, "mounted");
        self.scene = Scene::new(surface.viewport());
        self.surface = Some(surface);
    }

    pub(crate) fn unmount(&mut self, page: &'static str) -> Option<Surface> {
        let surface = self.surface.take()?;
        debug!(page, "unmounted");
        self.scene.clear();
        Some(surface)
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    pub(crate) fn resize(&mut self, viewport: Viewport) {
        if let Some(surface) = &mut self.surface {
            surface.set_viewport(viewport);
        }
        self.scene.set_viewport(viewport);
    }

    /// Viewport to render into, or `None` when unmounted.
    pub(crate) fn viewport(&self) -> Option<Viewport> {
        self.surface.as_ref().map(Surface::viewport)
    }

    pub(crate) fn scene(&self) -> &Scene {
        &self.scene
    }

    pub(crate) fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub(crate) fn frame(&self) -> Option<&RenderFrame> {
        self.surface.as_ref().map(Surface::frame)
    }

    /// Empties the scene and presents the empty frame.
    pub(crate) fn present_cleared(&mut self) {
        self.scene.clear();
        self.present();
    }

    pub(crate) fn present(&mut self) {
        if let Some(surface) = &mut self.surface {
            let frame = self.scene.to_frame();
            trace!(primitives = frame.primitives.len(), "presented frame");
            surface.present(frame);
        }
    }
}

/// Plain label primitive used for titles and axis captions.
pub(crate) fn caption(text: &str, x: f64, y: f64, font_size: f64, color: Color) -> Primitive {
    Primitive::text(text, x, y)
        .with_number(Attr::FontSize, font_size)
        .with(Attr::Fill, AttrValue::Color(color))
}

/// Caption rotated a quarter turn counter-clockwise around its anchor.
pub(crate) fn vertical_caption(
    text: &str,
    x: f64,
    y: f64,
    font_size: f64,
    color: Color,
) -> Primitive {
    caption(text, x, y, font_size, color).with_number(Attr::Rotate, -90.0)
}

/// Starts transitions for changed updates, cancels exits and writes the
/// current sample of every running transition back into `layer`.
pub(crate) fn animate(
    transitions: &mut TransitionController<RecordKey>,
    layer: &mut ShapeLayer,
    outcome: BindOutcome,
    duration: Duration,
    now: Duration,
) {
    for key in &outcome.join.exit {
        transitions.cancel(key);
    }
    for patch in outcome.patches {
        let Some(previous) = patch.previous else {
            continue;
        };
        if previous == patch.target || transitions.target(&patch.key) == Some(&patch.target.attrs) {
            continue;
        }
        transitions.start(patch.key, &previous.attrs, patch.target.attrs, duration, now);
    }
    let samples = transitions.tick(now);
    trace!(samples = samples.len(), "applied transition samples");
    for sample in samples {
        layer.apply_attrs(&sample.key, &sample.attrs);
    }
}
