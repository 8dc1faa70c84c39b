//! Scale builders: pure mappings from data domain to pixel range.
//!
//! Scales are immutable once built. Changing data or size means building a new
//! scale from the current snapshot.

mod band;
mod linear;
mod log;
mod ordinal;
mod ticks;
mod time;

pub use band::BandScale;
pub use linear::LinearScale;
pub use log::LogScale;
pub use ordinal::{OrdinalScale, SCHEME_SET2, SCHEME_SPECTRAL_4};
pub use ticks::{nice_domain, tick_increment, tick_values};
pub use time::{TimeInterval, TimeScale};

/// Smallest absolute span substituted for degenerate domains.
pub const MIN_DOMAIN_SPAN: f64 = 1e-9;
const RELATIVE_DOMAIN_SPAN: f64 = 1e-9;

/// Invertible numeric scale (linear, logarithmic, time).
pub trait ContinuousScale {
    fn map(&self, value: f64) -> f64;
    fn invert(&self, pixel: f64) -> f64;
    fn domain(&self) -> (f64, f64);
    fn range(&self) -> (f64, f64);
    fn ticks(&self, count: usize) -> Vec<f64>;
}

/// Widens an empty or zero-width domain so that mapping never divides by zero.
pub(crate) fn widen_degenerate(start: f64, end: f64) -> (f64, f64) {
    if start != end {
        return (start, end);
    }
    let span = MIN_DOMAIN_SPAN.max(start.abs() * RELATIVE_DOMAIN_SPAN);
    (start - span / 2.0, end + span / 2.0)
}

pub(crate) fn validate_finite_pair(
    label: &str,
    (start, end): (f64, f64),
) -> crate::error::ChartResult<()> {
    if !start.is_finite() || !end.is_finite() {
        return Err(crate::error::ChartError::InvalidData(format!(
            "{label} must be finite"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::widen_degenerate;

    #[test]
    fn degenerate_domains_get_a_non_zero_span() {
        let (start, end) = widen_degenerate(5.0, 5.0);
        assert!(end > start);
        assert!(start < 5.0 && end > 5.0);

        let (start, end) = widen_degenerate(1e12, 1e12);
        assert!(end - start > 0.0);
    }
}
