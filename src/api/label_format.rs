use serde::{Deserialize, Serialize};

use crate::core::date::format_date;
use crate::core::primitives::unix_seconds_to_datetime;

/// Tick label formatting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum TickFormat {
    /// Shortest decimal representation.
    #[default]
    Raw,
    /// `$` prefix before the shortest decimal representation.
    Currency,
    /// One significant digit with an SI prefix, using `B` for billions.
    SiBillion,
    /// `strftime` pattern applied to unix seconds.
    Date(String),
    /// Fixed number of decimals.
    Fixed(usize),
}

impl TickFormat {
    #[must_use]
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Raw => format_trimmed(value),
            Self::Currency => format_currency(value),
            Self::SiBillion => format_si(value, 1).replace('G', "B"),
            Self::Date(pattern) => unix_seconds_to_datetime(value)
                .map_or_else(|| format_trimmed(value), |date| format_date(date, pattern)),
            Self::Fixed(precision) => {
                let precision = *precision;
                if value.is_finite() {
                    format!("{value:.precision$}")
                } else {
                    "nan".to_owned()
                }
            }
        }
    }
}

pub(crate) fn format_trimmed(value: f64) -> String {
    if !value.is_finite() {
        return "nan".to_owned();
    }
    let rounded = (value * 1e9).round() / 1e9;
    if rounded == 0.0 {
        return "0".to_owned();
    }
    format!("{rounded}")
}

pub(crate) fn format_currency(value: f64) -> String {
    let body = format_trimmed(value.abs());
    if value < 0.0 && body != "0" {
        format!("-${body}")
    } else {
        format!("${body}")
    }
}

const SI_PREFIXES: [&str; 17] = [
    "y", "z", "a", "f", "p", "n", "µ", "m", "", "k", "M", "G", "T", "P", "E", "Z", "Y",
];

/// `significant` digits plus an SI prefix, e.g. `1_500_000_000.0` → `2G`.
pub(crate) fn format_si(value: f64, significant: usize) -> String {
    if !value.is_finite() {
        return "nan".to_owned();
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    let significant = significant.max(1) as i32;
    let magnitude = value.abs();
    let mut exponent = magnitude.log10().floor() as i32;
    let scale = 10f64.powi(significant - 1 - exponent);
    let mut digits = (magnitude * scale).round();
    if digits >= 10f64.powi(significant) {
        digits /= 10.0;
        exponent += 1;
    }

    let prefix_exponent = (exponent.div_euclid(3)).clamp(-8, 8) * 3;
    let coefficient = digits * 10f64.powi(exponent - (significant - 1) - prefix_exponent);
    let prefix = SI_PREFIXES[(prefix_exponent / 3 + 8) as usize];
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{}{prefix}", format_trimmed(coefficient))
}

#[cfg(test)]
mod tests {
    use super::TickFormat;

    #[test]
    fn currency_and_raw_trim_trailing_zeros() {
        assert_eq!(TickFormat::Currency.format(40_000.0), "$40000");
        assert_eq!(TickFormat::Currency.format(2.5), "$2.5");
        assert_eq!(TickFormat::Currency.format(-3.0), "-$3");
        assert_eq!(TickFormat::Raw.format(0.1 + 0.2), "0.3");
    }

    #[test]
    fn si_billion_swaps_g_for_b() {
        assert_eq!(TickFormat::SiBillion.format(1_500_000_000.0), "2B");
        assert_eq!(TickFormat::SiBillion.format(300_000.0), "300k");
        assert_eq!(TickFormat::SiBillion.format(250_000_000.0), "300M");
        assert_eq!(TickFormat::SiBillion.format(0.0), "0");
        assert_eq!(TickFormat::SiBillion.format(9_600_000_000.0), "10B");
    }

    #[test]
    fn dates_and_fixed_precision() {
        assert_eq!(TickFormat::Date("%Y %m %d".to_owned()).format(86_400.0), "1970 01 02");
        assert_eq!(TickFormat::Fixed(2).format(3.14159), "3.14");
    }
}
