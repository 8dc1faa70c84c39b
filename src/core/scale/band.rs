use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::core::dataset::Dataset;
use crate::error::{ChartError, ChartResult};

/// Splits a pixel range into equal bands, one per distinct category.
///
/// The domain keeps first-seen order. Band scales are not invertible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    domain: IndexSet<String>,
    range_start: f64,
    range_end: f64,
    padding_inner: f64,
    padding_outer: f64,
    step: f64,
    bandwidth: f64,
    offsets: Vec<f64>,
}

impl BandScale {
    pub fn new<I, S>(domain: I, range: (f64, f64)) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_padding(domain, range, 0.0, 0.0)
    }

    /// Builds a band scale; paddings are fractions of the step in `[0, 1]`.
    pub fn with_padding<I, S>(
        domain: I,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band scale range must be finite".to_owned(),
            ));
        }
        if !(0.0..=1.0).contains(&padding_inner) || !padding_outer.is_finite() || padding_outer < 0.0
        {
            return Err(ChartError::InvalidData(
                "band padding must be inner in [0, 1] and outer >= 0".to_owned(),
            ));
        }

        let domain: IndexSet<String> = domain.into_iter().map(Into::into).collect();
        let mut scale = Self {
            domain,
            range_start: range.0,
            range_end: range.1,
            padding_inner,
            padding_outer,
            step: 0.0,
            bandwidth: 0.0,
            offsets: Vec::new(),
        };
        scale.layout();
        Ok(scale)
    }

    /// Distinct values of a text field in first-seen order.
    pub fn from_dataset(
        dataset: &Dataset,
        field: &str,
        range: (f64, f64),
        padding_inner: f64,
    ) -> ChartResult<Self> {
        let domain = dataset
            .iter()
            .filter_map(|record| record.get(field).map(ToString::to_string));
        Self::with_padding(domain, range, padding_inner, 0.0)
    }

    fn layout(&mut self) {
        let count = self.domain.len() as f64;
        let reverse = self.range_end < self.range_start;
        let (start, stop) = if reverse {
            (self.range_end, self.range_start)
        } else {
            (self.range_start, self.range_end)
        };

        let denominator = (count - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        let step = (stop - start) / denominator;
        let first = start + (stop - start - step * (count - self.padding_inner)) * 0.5;

        self.step = step;
        self.bandwidth = step * (1.0 - self.padding_inner);
        self.offsets = (0..self.domain.len())
            .map(|index| first + step * index as f64)
            .collect();
        if reverse {
            self.offsets.reverse();
        }
    }

    /// Start of the band for `key`, or `None` when the key is not in the domain.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<f64> {
        self.domain
            .get_index_of(key)
            .and_then(|index| self.offsets.get(index).copied())
    }

    #[must_use]
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|start| start + self.bandwidth / 2.0)
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn domain(&self) -> impl Iterator<Item = &str> {
        self.domain.iter().map(String::as_str)
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.domain.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.domain.is_empty()
    }
}
