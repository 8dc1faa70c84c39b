use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Parses `#rgb` or `#rrggbb`.
    pub fn from_hex(input: &str) -> ChartResult<Self> {
        let digits = input.strip_prefix('#').unwrap_or(input);
        let invalid = || ChartError::InvalidData(format!("`{input}` is not a hex color"));
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |text: &str| u8::from_str_radix(text, 16).map_err(|_| invalid());
        let (red, green, blue) = match digits.len() {
            3 => {
                let expand = |index: usize| -> ChartResult<u8> {
                    let nibble = channel(&digits[index..=index])?;
                    Ok(nibble * 17)
                };
                (expand(0)?, expand(1)?, expand(2)?)
            }
            6 => (
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            ),
            _ => return Err(invalid()),
        };
        Ok(Self::rgb(
            f64::from(red) / 255.0,
            f64::from(green) / 255.0,
            f64::from(blue) / 255.0,
        ))
    }

    #[must_use]
    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn to_hex(self) -> String {
        let byte = |value: f64| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            byte(self.red),
            byte(self.green),
            byte(self.blue)
        )
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self::rgba(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
            mix(self.alpha, other.alpha),
        )
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rect,
    Line,
    Path,
    Text,
}

/// Visual attribute names. Positional attributes move with `Primitive::translated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attr {
    X,
    Y,
    X1,
    Y1,
    X2,
    Y2,
    Cx,
    Cy,
    R,
    Width,
    Height,
    Points,
    Curve,
    Fill,
    Stroke,
    StrokeWidth,
    Opacity,
    FontSize,
    Rotate,
    Anchor,
    Text,
}

impl Attr {
    fn axis(self) -> Option<Axis2> {
        match self {
            Self::X | Self::X1 | Self::X2 | Self::Cx => Some(Axis2::Horizontal),
            Self::Y | Self::Y1 | Self::Y2 | Self::Cy => Some(Axis2::Vertical),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis2 {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Number(f64),
    Color(Color),
    Points(Vec<(f64, f64)>),
    Text(String),
}

impl AttrValue {
    /// Value at `t` between `self` and `target`. Numbers and colors blend,
    /// point lists blend pointwise when their lengths agree, and anything else
    /// keeps `self` until `t` reaches 1.
    #[must_use]
    pub fn interpolate(&self, target: &Self, t: f64) -> Self {
        match (self, target) {
            (Self::Number(a), Self::Number(b)) => Self::Number(a + (b - a) * t),
            (Self::Color(a), Self::Color(b)) => Self::Color(a.lerp(*b, t)),
            (Self::Points(a), Self::Points(b)) if a.len() == b.len() => Self::Points(
                a.iter()
                    .zip(b)
                    .map(|(&(ax, ay), &(bx, by))| (ax + (bx - ax) * t, ay + (by - ay) * t))
                    .collect(),
            ),
            (Self::Points(_), Self::Points(_)) => target.clone(),
            _ if t >= 1.0 => target.clone(),
            _ => self.clone(),
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Color(color) => f.write_str(&color.to_hex()),
            Self::Points(points) => {
                for (index, (x, y)) in points.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{x},{y}")?;
                }
                Ok(())
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}

pub type AttrMap = BTreeMap<Attr, AttrValue>;

/// One drawable shape described by its attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub kind: ShapeKind,
    pub attrs: AttrMap,
}

impl Primitive {
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new(ShapeKind::Circle)
            .with_number(Attr::Cx, cx)
            .with_number(Attr::Cy, cy)
            .with_number(Attr::R, r)
    }

    #[must_use]
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rect)
            .with_number(Attr::X, x)
            .with_number(Attr::Y, y)
            .with_number(Attr::Width, width)
            .with_number(Attr::Height, height)
    }

    #[must_use]
    pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(ShapeKind::Line)
            .with_number(Attr::X1, x1)
            .with_number(Attr::Y1, y1)
            .with_number(Attr::X2, x2)
            .with_number(Attr::Y2, y2)
    }

    #[must_use]
    pub fn path(points: Vec<(f64, f64)>, curve: Curve) -> Self {
        Self::new(ShapeKind::Path)
            .with(Attr::Points, AttrValue::Points(points))
            .with(Attr::Curve, AttrValue::Text(curve.name().to_owned()))
    }

    #[must_use]
    pub fn text(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self::new(ShapeKind::Text)
            .with_number(Attr::X, x)
            .with_number(Attr::Y, y)
            .with(Attr::Text, AttrValue::Text(text.into()))
    }

    #[must_use]
    pub fn with(mut self, attr: Attr, value: AttrValue) -> Self {
        self.attrs.insert(attr, value);
        self
    }

    #[must_use]
    pub fn with_number(self, attr: Attr, value: f64) -> Self {
        self.with(attr, AttrValue::Number(value))
    }

    #[must_use]
    pub fn with_color(self, attr: Attr, color: Color) -> Self {
        self.with(attr, AttrValue::Color(color))
    }

    pub fn set(&mut self, attr: Attr, value: AttrValue) {
        self.attrs.insert(attr, value);
    }

    #[must_use]
    pub fn get(&self, attr: Attr) -> Option<&AttrValue> {
        self.attrs.get(&attr)
    }

    #[must_use]
    pub fn number(&self, attr: Attr) -> Option<f64> {
        match self.attrs.get(&attr) {
            Some(AttrValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn color(&self, attr: Attr) -> Option<Color> {
        match self.attrs.get(&attr) {
            Some(AttrValue::Color(color)) => Some(*color),
            _ => None,
        }
    }

    #[must_use]
    pub fn text_value(&self, attr: Attr) -> Option<&str> {
        match self.attrs.get(&attr) {
            Some(AttrValue::Text(text)) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn points(&self) -> Option<&[(f64, f64)]> {
        match self.attrs.get(&Attr::Points) {
            Some(AttrValue::Points(points)) => Some(points),
            _ => None,
        }
    }

    /// Copy shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        if dx == 0.0 && dy == 0.0 {
            return self.clone();
        }
        let mut moved = self.clone();
        for (attr, value) in &mut moved.attrs {
            match (attr.axis(), value) {
                (Some(Axis2::Horizontal), AttrValue::Number(x)) => *x += dx,
                (Some(Axis2::Vertical), AttrValue::Number(y)) => *y += dy,
                (None, AttrValue::Points(points)) => {
                    for (x, y) in points.iter_mut() {
                        *x += dx;
                        *y += dy;
                    }
                }
                _ => {}
            }
        }
        moved
    }

    /// Whether `(x, y)` falls inside a circle or rectangle.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = |attr| self.number(attr).unwrap_or(0.0);
        match self.kind {
            ShapeKind::Circle => {
                let (dx, dy) = (x - n(Attr::Cx), y - n(Attr::Cy));
                dx * dx + dy * dy <= n(Attr::R) * n(Attr::R)
            }
            ShapeKind::Rect => {
                let (left, top) = (n(Attr::X), n(Attr::Y));
                x >= left && x <= left + n(Attr::Width) && y >= top && y <= top + n(Attr::Height)
            }
            _ => false,
        }
    }

    pub fn validate(&self) -> ChartResult<()> {
        for (attr, value) in &self.attrs {
            match value {
                AttrValue::Number(number) if !number.is_finite() => {
                    return Err(ChartError::InvalidData(format!(
                        "attribute `{attr:?}` must be finite"
                    )));
                }
                AttrValue::Color(color) => color.validate()?,
                AttrValue::Points(points)
                    if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) =>
                {
                    return Err(ChartError::InvalidData(format!(
                        "attribute `{attr:?}` contains non-finite points"
                    )));
                }
                _ => {}
            }
        }
        for size in [Attr::R, Attr::Width, Attr::Height, Attr::StrokeWidth] {
            if self.number(size).is_some_and(|value| value < 0.0) {
                return Err(ChartError::InvalidData(format!(
                    "attribute `{size:?}` must be >= 0"
                )));
            }
        }
        if self.kind == ShapeKind::Text && self.text_value(Attr::Text).is_none() {
            return Err(ChartError::InvalidData(
                "text primitive needs a `Text` attribute".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Interpolation between path points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Curve {
    #[default]
    Linear,
    /// Uniform cubic B-spline through the point list.
    Basis,
}

impl Curve {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Basis => "basis",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "basis" => Self::Basis,
            _ => Self::Linear,
        }
    }
}

/// A path command in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
}

/// Expands a point list into path commands for `curve`.
#[must_use]
pub fn path_commands(points: &[(f64, f64)], curve: Curve) -> Vec<PathCommand> {
    let Some(&(x0, y0)) = points.first() else {
        return Vec::new();
    };
    let mut commands = vec![PathCommand::MoveTo(x0, y0)];
    if curve == Curve::Linear || points.len() < 3 {
        commands.extend(points[1..].iter().map(|&(x, y)| PathCommand::LineTo(x, y)));
        return commands;
    }

    let bezier = |p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)| {
        PathCommand::CubicTo(
            (2.0 * p0.0 + p1.0) / 3.0,
            (2.0 * p0.1 + p1.1) / 3.0,
            (p0.0 + 2.0 * p1.0) / 3.0,
            (p0.1 + 2.0 * p1.1) / 3.0,
            (p0.0 + 4.0 * p1.0 + p2.0) / 6.0,
            (p0.1 + 4.0 * p1.1 + p2.1) / 6.0,
        )
    };

    let (p0, p1) = (points[0], points[1]);
    commands.push(PathCommand::LineTo(
        (5.0 * p0.0 + p1.0) / 6.0,
        (5.0 * p0.1 + p1.1) / 6.0,
    ));
    for window in points.windows(3) {
        commands.push(bezier(window[0], window[1], window[2]));
    }
    let (a, b) = (points[points.len() - 2], points[points.len() - 1]);
    commands.push(bezier(a, b, b));
    commands.push(PathCommand::LineTo(b.0, b.1));
    commands
}

#[cfg(test)]
mod tests {
    use super::{
        Attr, AttrValue, Color, Curve, PathCommand, Primitive, ShapeKind, path_commands,
    };

    #[test]
    fn hex_colors_parse_short_and_long_forms() {
        let long = Color::from_hex("#D0D0D0").expect("valid hex");
        assert!((long.red - 208.0 / 255.0).abs() <= 1e-12);
        assert_eq!(Color::from_hex("#fff").expect("valid hex"), Color::WHITE);
        assert_eq!(long.to_hex(), "#d0d0d0");
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_hex("#zzzzzz").is_err());
    }

    #[test]
    fn translation_moves_positional_attributes_only() {
        let moved = Primitive::circle(1.0, 2.0, 3.0).translated(10.0, 20.0);
        assert_eq!(moved.number(Attr::Cx), Some(11.0));
        assert_eq!(moved.number(Attr::Cy), Some(22.0));
        assert_eq!(moved.number(Attr::R), Some(3.0));

        let path = Primitive::path(vec![(0.0, 0.0), (1.0, 1.0)], Curve::Linear).translated(1.0, 2.0);
        assert_eq!(path.points(), Some(&[(1.0, 2.0), (2.0, 3.0)][..]));
    }

    #[test]
    fn text_interpolation_snaps_at_the_end() {
        let from = AttrValue::Text("a".to_owned());
        let to = AttrValue::Text("b".to_owned());
        assert_eq!(from.interpolate(&to, 0.5), from);
        assert_eq!(from.interpolate(&to, 1.0), to);
        assert_eq!(
            AttrValue::Number(0.0).interpolate(&AttrValue::Number(10.0), 0.25),
            AttrValue::Number(2.5)
        );
    }

    #[test]
    fn validation_rejects_negative_radius_and_missing_text() {
        assert!(Primitive::circle(0.0, 0.0, -1.0).validate().is_err());
        assert!(Primitive::new(ShapeKind::Text).validate().is_err());
        assert!(Primitive::rect(0.0, 0.0, 1.0, f64::NAN).validate().is_err());
        assert!(Primitive::rect(0.0, 0.0, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn basis_curve_starts_and_ends_on_the_data() {
        let commands = path_commands(&[(0.0, 0.0), (6.0, 6.0), (12.0, 0.0)], Curve::Basis);
        assert_eq!(commands.first(), Some(&PathCommand::MoveTo(0.0, 0.0)));
        assert_eq!(commands.last(), Some(&PathCommand::LineTo(12.0, 0.0)));
        assert_eq!(commands.len(), 5);
    }

    #[test]
    fn hit_testing_covers_circles_and_rects() {
        assert!(Primitive::circle(10.0, 10.0, 5.0).contains(13.0, 13.0));
        assert!(!Primitive::circle(10.0, 10.0, 5.0).contains(15.0, 15.0));
        assert!(Primitive::rect(0.0, 0.0, 4.0, 4.0).contains(4.0, 0.0));
    }
}
