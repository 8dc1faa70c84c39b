use serde::{Deserialize, Serialize};

use crate::core::dataset::{Dataset, extent};
use crate::error::ChartResult;

use super::ticks::{nice_domain, tick_values};
use super::{ContinuousScale, validate_finite_pair, widen_degenerate};

/// Affine mapping from `[domain_start, domain_end]` to `[range_start, range_end]`.
///
/// Either interval may be descending; y axes typically map onto
/// `[inner_height, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    /// Builds a scale; a zero-width domain is widened by a minimal span.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        validate_finite_pair("linear scale domain", domain)?;
        validate_finite_pair("linear scale range", range)?;
        let (domain_start, domain_end) = widen_degenerate(domain.0, domain.1);
        Ok(Self {
            domain_start,
            domain_end,
            range_start: range.0,
            range_end: range.1,
        })
    }

    /// Fits the domain to `[min, max]` of `field`; missing values are skipped.
    pub fn from_dataset(dataset: &Dataset, field: &str, range: (f64, f64)) -> ChartResult<Self> {
        let domain = extent(dataset, field).unwrap_or((0.0, 0.0));
        Self::new(domain, range)
    }

    /// Returns a copy whose domain is extended to round tick multiples.
    #[must_use]
    pub fn nice(self, count: usize) -> Self {
        let (domain_start, domain_end) = nice_domain(self.domain_start, self.domain_end, count);
        Self {
            domain_start,
            domain_end,
            ..self
        }
    }

    #[must_use]
    pub fn with_range(self, range_start: f64, range_end: f64) -> Self {
        Self {
            range_start,
            range_end,
            ..self
        }
    }
}

impl ContinuousScale for LinearScale {
    fn map(&self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    fn invert(&self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / range_span;
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        tick_values(self.domain_start, self.domain_end, count)
    }
}

#[cfg(test)]
mod tests {
    use super::LinearScale;
    use crate::core::scale::ContinuousScale;

    #[test]
    fn maps_onto_descending_range() {
        let scale = LinearScale::new((0.0, 30.0), (400.0, 0.0)).unwrap();
        assert_eq!(scale.map(0.0), 400.0);
        assert_eq!(scale.map(30.0), 0.0);
        assert_eq!(scale.map(15.0), 200.0);
        assert_eq!(scale.invert(200.0), 15.0);
    }

    #[test]
    fn equal_bounds_do_not_divide_by_zero() {
        let scale = LinearScale::new((7.0, 7.0), (0.0, 100.0)).unwrap();
        let mid = scale.map(7.0);
        assert!(mid.is_finite());
        assert!((mid - 50.0).abs() < 1e-6);
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        assert!(LinearScale::new((0.0, f64::INFINITY), (0.0, 1.0)).is_err());
        assert!(LinearScale::new((0.0, 1.0), (f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn nice_keeps_range() {
        let scale = LinearScale::new((3.0, 97.0), (0.0, 500.0)).unwrap().nice(10);
        assert_eq!(scale.domain(), (0.0, 100.0));
        assert_eq!(scale.range(), (0.0, 500.0));
    }
}
