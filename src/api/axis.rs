use serde::{Deserialize, Serialize};

use crate::core::scale::ContinuousScale;
use crate::core::{BandScale, LinearScale, LogScale, RecordKey, TimeScale};
use crate::render::{Attr, AttrValue, BindOutcome, Color, Primitive, ShapeLayer};

use super::label_format::TickFormat;

const DEFAULT_TICK_COUNT: usize = 10;
const TICK_SIZE: f64 = 6.0;
const TICK_PADDING: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrientation {
    Top,
    Bottom,
    Left,
    Right,
}

impl AxisOrientation {
    fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// `+1` when ticks extend down/right of the axis line.
    fn direction(self) -> f64 {
        match self {
            Self::Bottom | Self::Right => 1.0,
            Self::Top | Self::Left => -1.0,
        }
    }
}

/// Scale an axis reads ticks and positions from.
#[derive(Debug, Clone, PartialEq)]
pub enum AxisScale {
    Linear(LinearScale),
    Log(LogScale),
    Time(TimeScale),
    Band(BandScale),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub value_label: String,
    pub position: f64,
    key: String,
}

/// Tick generator and drawer for one chart edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    scale: AxisScale,
    orientation: AxisOrientation,
    tick_values: Option<Vec<f64>>,
    tick_count: usize,
    format: TickFormat,
    offset: (f64, f64),
    font_size: f64,
    color: Color,
}

impl Axis {
    #[must_use]
    pub fn new(scale: AxisScale, orientation: AxisOrientation) -> Self {
        Self {
            scale,
            orientation,
            tick_values: None,
            tick_count: DEFAULT_TICK_COUNT,
            format: TickFormat::Raw,
            offset: (0.0, 0.0),
            font_size: 10.0,
            color: Color::BLACK,
        }
    }

    #[must_use]
    pub fn bottom(scale: AxisScale) -> Self {
        Self::new(scale, AxisOrientation::Bottom)
    }

    #[must_use]
    pub fn left(scale: AxisScale) -> Self {
        Self::new(scale, AxisOrientation::Left)
    }

    /// Explicit tick values replacing the derived ones.
    #[must_use]
    pub fn with_tick_values(mut self, values: Vec<f64>) -> Self {
        self.tick_values = Some(values);
        self
    }

    #[must_use]
    pub fn with_tick_count(mut self, count: usize) -> Self {
        self.tick_count = count;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TickFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_offset(mut self, x: f64, y: f64) -> Self {
        self.offset = (x, y);
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    #[must_use]
    pub fn orientation(&self) -> AxisOrientation {
        self.orientation
    }

    fn range(&self) -> (f64, f64) {
        match &self.scale {
            AxisScale::Linear(scale) => scale.range(),
            AxisScale::Log(scale) => scale.range(),
            AxisScale::Time(scale) => scale.range(),
            AxisScale::Band(scale) => scale.range(),
        }
    }

    /// Tick labels and positions along the axis, in scale order.
    #[must_use]
    pub fn ticks(&self) -> Vec<AxisTick> {
        if let AxisScale::Band(scale) = &self.scale {
            return scale
                .domain()
                .filter_map(|category| {
                    Some(AxisTick {
                        value_label: category.to_owned(),
                        position: scale.center(category)?,
                        key: category.to_owned(),
                    })
                })
                .collect();
        }

        let (scale, format): (&dyn ContinuousScale, TickFormat) = match &self.scale {
            AxisScale::Linear(scale) => (scale as &dyn ContinuousScale, self.format.clone()),
            AxisScale::Log(scale) => (scale as &dyn ContinuousScale, self.format.clone()),
            AxisScale::Time(scale) => {
                let format = match &self.format {
                    TickFormat::Raw => TickFormat::Date(
                        scale.tick_interval(self.tick_count).label_pattern().to_owned(),
                    ),
                    other => other.clone(),
                };
                (scale as &dyn ContinuousScale, format)
            }
            AxisScale::Band(_) => return Vec::new(),
        };

        let values = self
            .tick_values
            .clone()
            .unwrap_or_else(|| scale.ticks(self.tick_count));
        values
            .into_iter()
            .filter(|value| value.is_finite())
            .map(|value| AxisTick {
                value_label: format.format(value),
                position: scale.map(value),
                key: value.to_string(),
            })
            .filter(|tick| tick.position.is_finite())
            .collect()
    }

    /// Replaces the contents of `layer` with the axis line, tick marks and
    /// labels. Ticks that no longer exist exit, so redraws never leave stale
    /// ticks behind. Ticks are keyed by value, so a tick surviving a domain
    /// change shows up as an update in the returned outcome.
    pub fn draw(&self, layer: &mut ShapeLayer) -> BindOutcome {
        layer.set_translate(self.offset.0, self.offset.1);
        let (start, end) = self.range();
        let direction = self.orientation.direction();
        let horizontal = self.orientation.is_horizontal();

        let domain_line = if horizontal {
            Primitive::line(start, 0.0, end, 0.0)
        } else {
            Primitive::line(0.0, start, 0.0, end)
        };
        let mut shapes = vec![(
            RecordKey::from("domain"),
            domain_line
                .with_color(Attr::Stroke, self.color)
                .with_number(Attr::StrokeWidth, 1.0),
        )];

        let label_distance = direction * (TICK_SIZE + TICK_PADDING);
        for tick in self.ticks() {
            let p = tick.position;
            let (mark, label) = if horizontal {
                let baseline = if direction > 0.0 {
                    label_distance + self.font_size * 0.71
                } else {
                    label_distance
                };
                (
                    Primitive::line(p, 0.0, p, direction * TICK_SIZE),
                    Primitive::text(tick.value_label.clone(), p, baseline)
                        .with(Attr::Anchor, AttrValue::Text("middle".to_owned())),
                )
            } else {
                let anchor = if direction > 0.0 { "start" } else { "end" };
                (
                    Primitive::line(0.0, p, direction * TICK_SIZE, p),
                    Primitive::text(tick.value_label.clone(), label_distance, p + self.font_size * 0.32)
                        .with(Attr::Anchor, AttrValue::Text(anchor.to_owned())),
                )
            };
            shapes.push((
                RecordKey::Field(format!("tick:{}", tick.key)),
                mark.with_color(Attr::Stroke, self.color)
                    .with_number(Attr::StrokeWidth, 1.0),
            ));
            shapes.push((
                RecordKey::Field(format!("label:{}", tick.key)),
                label
                    .with_number(Attr::FontSize, self.font_size)
                    .with_color(Attr::Fill, self.color),
            ));
        }
        layer.bind_keyed(shapes)
    }
}

#[cfg(test)]
mod tests {
    use super::{Axis, AxisScale};
    use crate::api::TickFormat;
    use crate::core::{LinearScale, LogScale};
    use crate::render::{LayerKind, ShapeLayer};

    #[test]
    fn explicit_tick_values_override_derived_ticks() {
        let scale = LogScale::new((142.0, 150_000.0), (0.0, 600.0)).expect("log scale");
        let axis = Axis::bottom(AxisScale::Log(scale))
            .with_tick_values(vec![400.0, 4_000.0, 40_000.0])
            .with_format(TickFormat::Currency);
        let labels: Vec<String> = axis.ticks().into_iter().map(|t| t.value_label).collect();
        assert_eq!(labels, vec!["$400", "$4000", "$40000"]);
    }

    #[test]
    fn redraw_replaces_stale_ticks() {
        let mut layer = ShapeLayer::new(LayerKind::Axis);
        let wide = LinearScale::new((0.0, 100.0), (300.0, 0.0)).expect("scale");
        Axis::left(AxisScale::Linear(wide)).draw(&mut layer);
        assert_eq!(layer.len(), 1 + 11 * 2);

        let narrow = LinearScale::new((0.0, 1.0), (300.0, 0.0)).expect("scale");
        Axis::left(AxisScale::Linear(narrow)).with_tick_count(2).draw(&mut layer);
        let expected = Axis::left(AxisScale::Linear(narrow)).with_tick_count(2).ticks().len();
        assert_eq!(layer.len(), 1 + expected * 2);
    }
}
