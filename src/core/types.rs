use serde::{Deserialize, Serialize};

/// Size of a drawing surface in logical pixels.
///
/// A zero dimension is legal: charts told to lay out into it render nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[must_use]
    pub fn center(self) -> (f64, f64) {
        (f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

/// Margin convention: the plotting area is the viewport minus these paddings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margins {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Inner plotting size, clamped at zero for viewports smaller than the margins.
    #[must_use]
    pub fn inner(self, viewport: Viewport) -> PlotArea {
        let width = (f64::from(viewport.width) - self.left - self.right).max(0.0);
        let height = (f64::from(viewport.height) - self.top - self.bottom).max(0.0);
        PlotArea {
            left: self.left,
            top: self.top,
            width,
            height,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::new(50.0, 20.0, 50.0, 70.0)
    }
}

/// Inner plotting rectangle. Shapes are laid out in its local coordinates and
/// translated by `(left, top)` when the scene is flattened.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotArea {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{Margins, Viewport};

    #[test]
    fn inner_area_clamps_at_zero() {
        let margins = Margins::new(150.0, 10.0, 100.0, 150.0);
        let area = margins.inner(Viewport::new(100, 100));
        assert_eq!(area.width, 0.0);
        assert_eq!(area.height, 0.0);
        assert!(area.is_empty());
    }

    #[test]
    fn inner_area_subtracts_margins() {
        let area = Margins::new(50.0, 20.0, 50.0, 70.0).inner(Viewport::new(700, 500));
        assert_eq!(area.width, 610.0);
        assert_eq!(area.height, 400.0);
        assert_eq!(area.left, 70.0);
    }
}
