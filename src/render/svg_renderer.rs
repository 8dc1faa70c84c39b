use std::fmt::{self, Write};

use crate::error::{ChartError, ChartResult};
use crate::render::{
    Attr, Color, Curve, PathCommand, Primitive, RenderFrame, Renderer, ShapeKind, path_commands,
};

/// Renders frames into a standalone SVG document.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
    background: Option<Color>,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    /// Document produced by the last `render` call.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> ChartResult<()> {
        frame.validate()?;
        if let Some(background) = self.background {
            background.validate()?;
        }
        self.document = write_document(frame, self.background)
            .map_err(|err| ChartError::InvalidData(format!("failed to write svg: {err}")))?;
        Ok(())
    }
}

fn write_document(frame: &RenderFrame, background: Option<Color>) -> Result<String, fmt::Error> {
    let (width, height) = (frame.viewport.width, frame.viewport.height);
    let mut out = String::new();
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )?;
    if let Some(color) = background {
        write!(out, r#"  <rect width="{width}" height="{height}""#)?;
        write_paint(&mut out, "fill", color)?;
        writeln!(out, "/>")?;
    }
    for primitive in &frame.primitives {
        out.push_str("  ");
        write_primitive(&mut out, primitive)?;
        out.push('\n');
    }
    out.push_str("</svg>\n");
    Ok(out)
}

fn write_primitive(out: &mut String, primitive: &Primitive) -> fmt::Result {
    let number = |attr| primitive.number(attr).unwrap_or(0.0);
    match primitive.kind {
        ShapeKind::Circle => write!(
            out,
            r#"<circle cx="{}" cy="{}" r="{}""#,
            fmt_number(number(Attr::Cx)),
            fmt_number(number(Attr::Cy)),
            fmt_number(number(Attr::R))
        )?,
        ShapeKind::Rect => write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}""#,
            fmt_number(number(Attr::X)),
            fmt_number(number(Attr::Y)),
            fmt_number(number(Attr::Width)),
            fmt_number(number(Attr::Height))
        )?,
        ShapeKind::Line => write!(
            out,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}""#,
            fmt_number(number(Attr::X1)),
            fmt_number(number(Attr::Y1)),
            fmt_number(number(Attr::X2)),
            fmt_number(number(Attr::Y2))
        )?,
        ShapeKind::Path => {
            let curve = primitive
                .text_value(Attr::Curve)
                .map_or(Curve::Linear, Curve::from_name);
            let points = primitive.points().unwrap_or(&[]);
            write!(out, r#"<path d="{}""#, path_data(points, curve))?;
            if primitive.color(Attr::Fill).is_none() {
                out.push_str(r#" fill="none""#);
            }
        }
        ShapeKind::Text => {
            let (x, y) = (number(Attr::X), number(Attr::Y));
            write!(out, r#"<text x="{}" y="{}""#, fmt_number(x), fmt_number(y))?;
            if let Some(size) = primitive.number(Attr::FontSize) {
                write!(out, r#" font-size="{}""#, fmt_number(size))?;
            }
            if let Some(anchor) = primitive.text_value(Attr::Anchor) {
                write!(out, r#" text-anchor="{}""#, escape(anchor))?;
            }
            if let Some(angle) = primitive.number(Attr::Rotate) {
                write!(
                    out,
                    r#" transform="rotate({},{},{})""#,
                    fmt_number(angle),
                    fmt_number(x),
                    fmt_number(y)
                )?;
            }
        }
    }

    if let Some(fill) = primitive.color(Attr::Fill) {
        write_paint(out, "fill", fill)?;
    }
    if let Some(stroke) = primitive.color(Attr::Stroke) {
        write_paint(out, "stroke", stroke)?;
    }
    if let Some(width) = primitive.number(Attr::StrokeWidth) {
        write!(out, r#" stroke-width="{}""#, fmt_number(width))?;
    }
    if let Some(opacity) = primitive.number(Attr::Opacity) {
        write!(out, r#" opacity="{}""#, fmt_number(opacity))?;
    }

    match (primitive.kind, primitive.text_value(Attr::Text)) {
        (ShapeKind::Text, Some(text)) => write!(out, ">{}</text>", escape(text)),
        _ => out.write_str("/>"),
    }
}

fn write_paint(out: &mut String, name: &str, color: Color) -> fmt::Result {
    write!(out, r#" {name}="{}""#, color.to_hex())?;
    if color.alpha < 1.0 {
        write!(out, r#" {name}-opacity="{}""#, fmt_number(color.alpha))?;
    }
    Ok(())
}

/// SVG path data for a point list.
#[must_use]
pub fn path_data(points: &[(f64, f64)], curve: Curve) -> String {
    let mut data = String::new();
    for command in path_commands(points, curve) {
        let segment = match command {
            PathCommand::MoveTo(x, y) => format!("M{},{}", fmt_number(x), fmt_number(y)),
            PathCommand::LineTo(x, y) => format!("L{},{}", fmt_number(x), fmt_number(y)),
            PathCommand::CubicTo(x1, y1, x2, y2, x, y) => format!(
                "C{},{},{},{},{},{}",
                fmt_number(x1),
                fmt_number(y1),
                fmt_number(x2),
                fmt_number(y2),
                fmt_number(x),
                fmt_number(y)
            ),
        };
        data.push_str(&segment);
    }
    data
}

fn fmt_number(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    format!("{rounded}")
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
