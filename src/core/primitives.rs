use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

/// Parses a numeric fixture string (`"1234.5"`, `"1.2e9"`) exactly before
/// narrowing to `f64`.
pub fn parse_numeric_str(input: &str, field_name: &str) -> ChartResult<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ChartError::MissingField {
            field: field_name.to_owned(),
        });
    }
    let decimal = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|err| {
            ChartError::InvalidData(format!("{field_name} `{trimmed}` is not numeric: {err}"))
        })?;
    decimal_to_f64(decimal, field_name)
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

#[must_use]
pub fn unix_seconds_to_datetime(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let millis = (seconds * 1000.0).round();
    if millis > i64::MAX as f64 || millis < i64::MIN as f64 {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}

#[cfg(test)]
mod tests {
    use super::{datetime_to_unix_seconds, parse_numeric_str, unix_seconds_to_datetime};

    #[test]
    fn numeric_strings_accept_plain_and_scientific() {
        assert_eq!(parse_numeric_str("1234.5", "price").unwrap(), 1234.5);
        assert_eq!(parse_numeric_str("1.5e3", "price").unwrap(), 1500.0);
        assert!(parse_numeric_str("abc", "price").is_err());
        assert!(parse_numeric_str("  ", "price").is_err());
    }

    #[test]
    fn unix_seconds_round_trip() {
        let time = unix_seconds_to_datetime(1_500_000_000.25).unwrap();
        assert_eq!(datetime_to_unix_seconds(time), 1_500_000_000.25);
        assert!(unix_seconds_to_datetime(f64::NAN).is_none());
    }
}
