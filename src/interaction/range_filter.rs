use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::dataset::date_extent;
use crate::core::{Dataset, TimeScale};
use crate::error::ChartResult;

pub const RANGE_MIN: f64 = 0.0;
pub const RANGE_MAX: f64 = 100.0;

/// Slider handles on a 0..=100 scale, `low <= high`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeSelection {
    low: f64,
    high: f64,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self::full()
    }
}

impl RangeSelection {
    /// Clamps both handles into range and orders them. Non-finite handles
    /// fall back to the matching end of the full range.
    #[must_use]
    pub fn new(low: f64, high: f64) -> Self {
        let clamp = |value: f64, fallback: f64| {
            if value.is_finite() {
                value.clamp(RANGE_MIN, RANGE_MAX)
            } else {
                fallback
            }
        };
        let (low, high) = (clamp(low, RANGE_MIN), clamp(high, RANGE_MAX));
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }

    #[must_use]
    pub fn full() -> Self {
        Self {
            low: RANGE_MIN,
            high: RANGE_MAX,
        }
    }

    #[must_use]
    pub fn low(self) -> f64 {
        self.low
    }

    #[must_use]
    pub fn high(self) -> f64 {
        self.high
    }

    #[must_use]
    pub fn is_full(self) -> bool {
        self.low <= RANGE_MIN && self.high >= RANGE_MAX
    }

    #[must_use]
    pub fn is_degenerate(self) -> bool {
        self.low == self.high
    }
}

/// Range slider state. Rapid `set` calls coalesce: the host drains at most one
/// pending selection per frame and the latest write wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    current: RangeSelection,
    pending: Option<RangeSelection>,
}

impl RangeFilter {
    pub fn set(&mut self, low: f64, high: f64) -> RangeSelection {
        let selection = RangeSelection::new(low, high);
        if self.pending.is_some() {
            trace!(low = selection.low, high = selection.high, "range selection superseded");
        }
        self.pending = Some(selection);
        selection
    }

    /// Commits and returns the latest pending selection.
    pub fn take_pending(&mut self) -> Option<RangeSelection> {
        let selection = self.pending.take()?;
        self.current = selection;
        Some(selection)
    }

    #[must_use]
    pub fn current(&self) -> RangeSelection {
        self.current
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.current = RangeSelection::full();
        self.pending = None;
    }
}

/// Records whose `date_field` falls inside the selected share of the full
/// series' date extent, bounds inclusive.
///
/// A full selection returns the series unchanged and a degenerate one keeps at
/// most the first record on that instant.
pub fn filter_by_range(
    dataset: &Dataset,
    date_field: &str,
    selection: RangeSelection,
) -> ChartResult<Dataset> {
    if selection.is_full() {
        return Ok(dataset.clone());
    }
    let Some(extent) = date_extent(dataset, date_field) else {
        return Ok(dataset.filtered(|_| false));
    };

    let slider = TimeScale::new(extent, (RANGE_MIN, RANGE_MAX))?;
    let low = (selection.low > RANGE_MIN)
        .then(|| slider.invert_date(selection.low))
        .flatten();
    let high = (selection.high < RANGE_MAX)
        .then(|| slider.invert_date(selection.high))
        .flatten();

    let mut kept = 0usize;
    let degenerate = selection.is_degenerate();
    let filtered = dataset.filtered(|record| {
        let Some(date) = record.date(date_field) else {
            return false;
        };
        let inside = low.is_none_or(|low| date >= low) && high.is_none_or(|high| date <= high);
        if !inside || (degenerate && kept > 0) {
            return false;
        }
        kept += 1;
        true
    });
    trace!(
        low = selection.low,
        high = selection.high,
        kept = filtered.len(),
        "range filter applied"
    );
    Ok(filtered)
}

#[cfg(test)]
mod tests {
    use super::{RangeFilter, RangeSelection};

    #[test]
    fn selection_is_clamped_and_ordered() {
        let selection = RangeSelection::new(120.0, -5.0);
        assert_eq!((selection.low(), selection.high()), (0.0, 100.0));
        assert!(selection.is_full());
        let nan = RangeSelection::new(f64::NAN, 40.0);
        assert_eq!((nan.low(), nan.high()), (0.0, 40.0));
    }

    #[test]
    fn latest_pending_selection_wins() {
        let mut filter = RangeFilter::default();
        filter.set(10.0, 20.0);
        filter.set(30.0, 40.0);
        let taken = filter.take_pending().expect("pending selection");
        assert_eq!((taken.low(), taken.high()), (30.0, 40.0));
        assert!(filter.take_pending().is_none());
        assert_eq!(filter.current(), taken);
    }
}
