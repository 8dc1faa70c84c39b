use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Attr, Color, Curve, PathCommand, Primitive, RenderFrame, Renderer, ShapeKind, path_commands,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub shapes_drawn: usize,
    pub texts_drawn: usize,
}

/// Cairo + Pango offscreen renderer.
#[derive(Debug)]
pub struct CairoRenderer {
    surface: ImageSurface,
    clear_color: Color,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(width: i32, height: i32) -> ChartResult<Self> {
        if width <= 0 || height <= 0 {
            return Err(ChartError::InvalidData(
                "cairo surface size must be > 0".to_owned(),
            ));
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        Ok(Self {
            surface,
            clear_color: Color::WHITE,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    pub fn set_clear_color(&mut self, color: Color) -> ChartResult<()> {
        color.validate()?;
        self.clear_color = color;
        Ok(())
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    fn draw(&mut self, context: &Context, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;

        apply_color(context, self.clear_color);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();
        for primitive in &frame.primitives {
            let opacity = primitive.number(Attr::Opacity).unwrap_or(1.0);
            if primitive.kind == ShapeKind::Text {
                draw_text(context, primitive, opacity)?;
                stats.texts_drawn += 1;
                continue;
            }
            append_shape_path(context, primitive);
            fill_and_stroke(context, primitive, opacity)?;
            stats.shapes_drawn += 1;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        let context = Context::new(&self.surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        self.draw(&context, frame)
    }
}

fn append_shape_path(context: &Context, primitive: &Primitive) {
    let n = |attr| primitive.number(attr).unwrap_or(0.0);
    context.new_path();
    match primitive.kind {
        ShapeKind::Circle => {
            context.arc(n(Attr::Cx), n(Attr::Cy), n(Attr::R), 0.0, std::f64::consts::TAU);
        }
        ShapeKind::Rect => {
            context.rectangle(n(Attr::X), n(Attr::Y), n(Attr::Width), n(Attr::Height));
        }
        ShapeKind::Line => {
            context.move_to(n(Attr::X1), n(Attr::Y1));
            context.line_to(n(Attr::X2), n(Attr::Y2));
        }
        ShapeKind::Path => {
            let curve = primitive
                .text_value(Attr::Curve)
                .map_or(Curve::Linear, Curve::from_name);
            for command in path_commands(primitive.points().unwrap_or(&[]), curve) {
                match command {
                    PathCommand::MoveTo(x, y) => context.move_to(x, y),
                    PathCommand::LineTo(x, y) => context.line_to(x, y),
                    PathCommand::CubicTo(x1, y1, x2, y2, x, y) => {
                        context.curve_to(x1, y1, x2, y2, x, y);
                    }
                }
            }
        }
        ShapeKind::Text => {}
    }
}

fn fill_and_stroke(context: &Context, primitive: &Primitive, opacity: f64) -> ChartResult<()> {
    let filled_by_default = matches!(primitive.kind, ShapeKind::Circle | ShapeKind::Rect);
    let fill = primitive
        .color(Attr::Fill)
        .or_else(|| filled_by_default.then_some(Color::BLACK));
    if let Some(fill) = fill {
        apply_color(context, fill.with_alpha(fill.alpha * opacity));
        context
            .fill_preserve()
            .map_err(|err| map_backend_error("failed to fill shape", err))?;
    }
    if let Some(stroke) = primitive.color(Attr::Stroke) {
        apply_color(context, stroke.with_alpha(stroke.alpha * opacity));
        context.set_line_width(primitive.number(Attr::StrokeWidth).unwrap_or(1.0));
        context
            .stroke_preserve()
            .map_err(|err| map_backend_error("failed to stroke shape", err))?;
    }
    context.new_path();
    Ok(())
}

fn draw_text(context: &Context, primitive: &Primitive, opacity: f64) -> ChartResult<()> {
    let Some(text) = primitive.text_value(Attr::Text) else {
        return Ok(());
    };
    let layout = pangocairo::functions::create_layout(context);
    let size = primitive.number(Attr::FontSize).unwrap_or(10.0);
    let font_description = FontDescription::from_string(&format!("Sans {size}px"));
    layout.set_font_description(Some(&font_description));
    layout.set_text(text);

    let (text_width, text_height) = layout.pixel_size();
    let x = primitive.number(Attr::X).unwrap_or(0.0);
    let y = primitive.number(Attr::Y).unwrap_or(0.0);
    let offset = match primitive.text_value(Attr::Anchor) {
        Some("middle") => f64::from(text_width) / 2.0,
        Some("end") => f64::from(text_width),
        _ => 0.0,
    };

    context
        .save()
        .map_err(|err| map_backend_error("failed to save context", err))?;
    context.translate(x, y);
    if let Some(angle) = primitive.number(Attr::Rotate) {
        context.rotate(angle.to_radians());
    }
    let color = primitive.color(Attr::Fill).unwrap_or(Color::BLACK);
    apply_color(context, color.with_alpha(color.alpha * opacity));
    context.move_to(-offset, -f64::from(text_height));
    pangocairo::functions::show_layout(context, &layout);
    context
        .restore()
        .map_err(|err| map_backend_error("failed to restore context", err))
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> ChartError {
    ChartError::InvalidData(format!("{prefix}: {err}"))
}
