use serde::{Deserialize, Serialize};

use crate::core::dataset::{Dataset, extent};
use crate::error::{ChartError, ChartResult};

use super::{ContinuousScale, validate_finite_pair};

/// Logarithmic mapping over a strictly positive domain.
///
/// Values `<= 0` are outside the domain of a log scale; `map` pins them to
/// the start of the range instead of producing NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogScale {
    base: f64,
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LogScale {
    pub const DEFAULT_BASE: f64 = 10.0;

    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        Self::with_base(Self::DEFAULT_BASE, domain, range)
    }

    pub fn with_base(base: f64, domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !base.is_finite() || base <= 0.0 || base == 1.0 {
            return Err(ChartError::InvalidData(
                "log scale base must be finite, > 0 and != 1".to_owned(),
            ));
        }
        validate_finite_pair("log scale domain", domain)?;
        validate_finite_pair("log scale range", range)?;
        if domain.0 <= 0.0 || domain.1 <= 0.0 {
            return Err(ChartError::InvalidData(
                "log scale domain must be strictly positive".to_owned(),
            ));
        }

        let (domain_start, domain_end) = if domain.0 == domain.1 {
            (domain.0 / base, domain.1 * base)
        } else {
            domain
        };

        Ok(Self {
            base,
            domain_start,
            domain_end,
            range_start: range.0,
            range_end: range.1,
        })
    }

    /// Fits `[positive floor, max]` of `field`, skipping non-positive values.
    pub fn from_dataset(
        dataset: &Dataset,
        field: &str,
        positive_floor: Option<f64>,
        range: (f64, f64),
    ) -> ChartResult<Self> {
        let positive = dataset.filtered(|record| record.number(field).is_some_and(|v| v > 0.0));
        let (min, max) = extent(&positive, field).ok_or_else(|| {
            ChartError::DegenerateDomain(format!("no positive `{field}` values for log scale"))
        })?;
        let floor = positive_floor.unwrap_or(min);
        Self::new((floor, max.max(floor)), range)
    }

    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    fn log(&self, value: f64) -> f64 {
        value.ln() / self.base.ln()
    }
}

impl ContinuousScale for LogScale {
    fn map(&self, value: f64) -> f64 {
        if value <= 0.0 || !value.is_finite() {
            return self.range_start;
        }
        let lo = self.log(self.domain_start);
        let hi = self.log(self.domain_end);
        let normalized = (self.log(value) - lo) / (hi - lo);
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    fn invert(&self, pixel: f64) -> f64 {
        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return self.domain_start;
        }
        let normalized = (pixel - self.range_start) / range_span;
        let lo = self.log(self.domain_start);
        let hi = self.log(self.domain_end);
        self.base.powf(lo + normalized * (hi - lo))
    }

    fn domain(&self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    /// Powers of the base, plus integer multiples when the domain spans fewer
    /// decades than `count`.
    fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        let first = self.log(lo).floor() as i32;
        let last = self.log(hi).ceil() as i32;
        let decades = (last - first).max(0) as usize;
        let with_multiples = decades < count && self.base.fract() == 0.0;

        let mut ticks = Vec::new();
        for exponent in first..=last {
            let power = self.base.powi(exponent);
            if with_multiples {
                let mut multiple = 1.0;
                while multiple < self.base {
                    push_in_domain(&mut ticks, multiple * power, lo, hi);
                    multiple += 1.0;
                }
            } else {
                push_in_domain(&mut ticks, power, lo, hi);
            }
        }
        if self.domain_start > self.domain_end {
            ticks.reverse();
        }
        ticks
    }
}

fn push_in_domain(ticks: &mut Vec<f64>, value: f64, lo: f64, hi: f64) {
    let tolerance = hi * 1e-12;
    if value >= lo - tolerance && value <= hi + tolerance {
        ticks.push(value);
    }
}
