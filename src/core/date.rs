//! Fixture date handling.
//!
//! Coin fixtures store dates as `day/month/year`. The components are swapped
//! into calendar order and validated; anything that does not describe a real
//! calendar day is rejected instead of producing a bogus timestamp.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::{ChartError, ChartResult};

/// Parses a `day/month/year` fixture date into midnight UTC.
pub fn parse_swapped_date(input: &str) -> ChartResult<DateTime<Utc>> {
    let invalid = || ChartError::InvalidDateFormat {
        input: input.to_owned(),
    };

    let mut parts = input.trim().split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let day = parse_component(day).ok_or_else(invalid)?;
    let month = parse_component(month).ok_or_else(invalid)?;
    let year = parse_component(year).ok_or_else(invalid)?;
    let year = i32::try_from(year).map_err(|_| invalid())?;

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
    Ok(midnight.and_utc())
}

fn parse_component(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Formats a date with a strftime pattern, e.g. `"%Y %m %d"`.
#[must_use]
pub fn format_date(date: DateTime<Utc>, pattern: &str) -> String {
    date.format(pattern).to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_swapped_date};
    use crate::error::ChartError;

    #[test]
    fn swaps_day_and_month() {
        let date = parse_swapped_date("28/04/2013").expect("valid date");
        assert_eq!(format_date(date, "%Y-%m-%d"), "2013-04-28");
    }

    #[test]
    fn accepts_unpadded_components() {
        let date = parse_swapped_date("1/2/2017").expect("valid date");
        assert_eq!(format_date(date, "%Y %m %d"), "2017 02 01");
    }

    #[test]
    fn rejects_malformed_input() {
        for input in ["", "2013-04-28", "04/28/2013", "1/2", "1/2/3/4", "a/b/c", "31/02/2017"] {
            let err = parse_swapped_date(input).expect_err(input);
            assert!(matches!(err, ChartError::InvalidDateFormat { .. }), "{input}");
        }
    }
}
