use serde::{Deserialize, Serialize};

use crate::core::RecordKey;
use crate::render::{Attr, Color, LayerKind, Primitive, ShapeLayer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub key: RecordKey,
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
}

/// Hover overlay; at most one tooltip is shown at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TooltipState {
    current: Option<Tooltip>,
}

impl TooltipState {
    /// Shows a tooltip for `key`, replacing any other one.
    pub fn pointer_enter(&mut self, key: RecordKey, x: f64, y: f64, lines: Vec<String>) {
        self.current = Some(Tooltip { key, x, y, lines });
    }

    /// Hides the tooltip if it belongs to `key`.
    pub fn pointer_leave(&mut self, key: &RecordKey) -> bool {
        if self.current.as_ref().is_some_and(|tooltip| &tooltip.key == key) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<&Tooltip> {
        self.current.as_ref()
    }

    /// Redraws the overlay layer: a background box plus one text per line.
    pub fn draw(&self, layer: &mut ShapeLayer, font_size: f64) {
        let Some(tooltip) = &self.current else {
            layer.clear();
            return;
        };
        let line_height = font_size * 1.4;
        let widest = tooltip
            .lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let padding = font_size * 0.5;
        let width = widest * font_size * 0.6 + padding * 2.0;
        let height = tooltip.lines.len() as f64 * line_height + padding * 2.0;
        let (left, top) = (tooltip.x + 10.0, tooltip.y - height - 10.0);

        let background = Primitive::rect(left, top, width, height)
            .with_color(Attr::Fill, Color::WHITE.with_alpha(0.9))
            .with_color(Attr::Stroke, Color::rgb(0.6, 0.6, 0.6))
            .with_number(Attr::StrokeWidth, 1.0);
        let texts = tooltip.lines.iter().enumerate().map(|(index, line)| {
            (
                RecordKey::Index(index + 1),
                Primitive::text(
                    line.clone(),
                    left + padding,
                    top + padding + (index as f64 + 1.0) * line_height - line_height * 0.3,
                )
                .with_number(Attr::FontSize, font_size),
            )
        });
        layer.bind_keyed(std::iter::once((RecordKey::Index(0), background)).chain(texts));
    }
}

/// Key of the topmost circle or rectangle under the pointer.
#[must_use]
pub fn hit_test(layer: &ShapeLayer, x: f64, y: f64) -> Option<&RecordKey> {
    layer.hit_test(x, y)
}

/// Fresh overlay layer for tooltips.
#[must_use]
pub fn tooltip_layer() -> ShapeLayer {
    ShapeLayer::new(LayerKind::Overlay)
}

#[cfg(test)]
mod tests {
    use super::{TooltipState, tooltip_layer};
    use crate::core::RecordKey;

    #[test]
    fn only_one_tooltip_is_visible() {
        let mut state = TooltipState::default();
        state.pointer_enter(RecordKey::from("a"), 1.0, 2.0, vec!["a".to_owned()]);
        state.pointer_enter(RecordKey::from("b"), 3.0, 4.0, vec!["b".to_owned()]);
        assert_eq!(state.current().map(|t| &t.key), Some(&RecordKey::from("b")));

        assert!(!state.pointer_leave(&RecordKey::from("a")));
        assert!(state.current().is_some());
        assert!(state.pointer_leave(&RecordKey::from("b")));
        assert!(state.current().is_none());
    }

    #[test]
    fn drawing_replaces_previous_overlay() {
        let mut state = TooltipState::default();
        let mut layer = tooltip_layer();
        state.pointer_enter(RecordKey::from("a"), 50.0, 50.0, vec!["x".into(), "y".into()]);
        state.draw(&mut layer, 12.0);
        assert_eq!(layer.len(), 3);

        state.clear();
        state.draw(&mut layer, 12.0);
        assert!(layer.is_empty());
    }
}
