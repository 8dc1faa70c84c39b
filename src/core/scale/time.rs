use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::core::dataset::{Dataset, date_extent};
use crate::core::primitives::{datetime_to_unix_seconds, unix_seconds_to_datetime};
use crate::error::{ChartError, ChartResult};

use super::ticks::tick_increment;
use super::{ContinuousScale, LinearScale};

/// Span substituted when every date in the domain is identical.
const MIN_TIME_SPAN_SECONDS: f64 = 1.0;

const SECOND: i64 = 1;
const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

/// Calendar-aware tick interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInterval {
    Second(u32),
    Minute(u32),
    Hour(u32),
    Day(u32),
    Week(u32),
    Month(u32),
    Year(u32),
}

const CANDIDATE_INTERVALS: [TimeInterval; 18] = [
    TimeInterval::Second(1),
    TimeInterval::Second(5),
    TimeInterval::Second(15),
    TimeInterval::Second(30),
    TimeInterval::Minute(1),
    TimeInterval::Minute(5),
    TimeInterval::Minute(15),
    TimeInterval::Minute(30),
    TimeInterval::Hour(1),
    TimeInterval::Hour(3),
    TimeInterval::Hour(6),
    TimeInterval::Hour(12),
    TimeInterval::Day(1),
    TimeInterval::Day(2),
    TimeInterval::Week(1),
    TimeInterval::Month(1),
    TimeInterval::Month(3),
    TimeInterval::Year(1),
];

impl TimeInterval {
    /// Nominal length in seconds (months and years are approximate).
    #[must_use]
    pub fn approx_seconds(self) -> i64 {
        match self {
            Self::Second(n) => SECOND * i64::from(n),
            Self::Minute(n) => MINUTE * i64::from(n),
            Self::Hour(n) => HOUR * i64::from(n),
            Self::Day(n) => DAY * i64::from(n),
            Self::Week(n) => WEEK * i64::from(n),
            Self::Month(n) => MONTH * i64::from(n),
            Self::Year(n) => YEAR * i64::from(n),
        }
    }

    /// Default strftime pattern for labels at this granularity.
    #[must_use]
    pub fn label_pattern(self) -> &'static str {
        match self {
            Self::Second(_) => "%H:%M:%S",
            Self::Minute(_) | Self::Hour(_) => "%H:%M",
            Self::Day(_) | Self::Week(_) => "%b %d",
            Self::Month(_) => "%b %Y",
            Self::Year(_) => "%Y",
        }
    }

    /// Picks the interval whose length best matches `span / count`.
    #[must_use]
    pub fn for_span(span_seconds: f64, count: usize) -> Self {
        let count = count.max(1);
        let target = span_seconds.abs() / count as f64;
        let position = CANDIDATE_INTERVALS
            .iter()
            .position(|interval| interval.approx_seconds() as f64 >= target);

        match position {
            None => {
                let years = span_seconds.abs() / YEAR as f64;
                let step = tick_increment(0.0, years, count).max(1.0);
                Self::Year(step as u32)
            }
            Some(0) => Self::Second(1),
            Some(index) => {
                let below = CANDIDATE_INTERVALS[index - 1];
                let above = CANDIDATE_INTERVALS[index];
                let below_seconds = below.approx_seconds() as f64;
                let above_seconds = above.approx_seconds() as f64;
                if target / below_seconds < above_seconds / target {
                    below
                } else {
                    above
                }
            }
        }
    }

    fn floor(self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let seconds = time.timestamp();
        match self {
            Self::Second(_) | Self::Minute(_) | Self::Hour(_) => {
                let step = self.approx_seconds();
                Utc.timestamp_opt(seconds.div_euclid(step) * step, 0).single()
            }
            Self::Day(_) => midnight(time.date_naive()),
            Self::Week(_) => {
                let date = time.date_naive();
                let offset = i64::from(date.weekday().num_days_from_sunday());
                midnight(date - Duration::days(offset))
            }
            Self::Month(n) => {
                let month0 = time.month0() - time.month0() % n.max(1);
                midnight(NaiveDate::from_ymd_opt(time.year(), month0 + 1, 1)?)
            }
            Self::Year(n) => {
                let n = i32::try_from(n.max(1)).ok()?;
                let year = time.year() - time.year().rem_euclid(n);
                midnight(NaiveDate::from_ymd_opt(year, 1, 1)?)
            }
        }
    }

    fn offset(self, time: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Second(_) | Self::Minute(_) | Self::Hour(_) | Self::Day(_) | Self::Week(_) => {
                time.checked_add_signed(Duration::seconds(self.approx_seconds()))
            }
            Self::Month(n) => time.checked_add_months(chrono::Months::new(n.max(1))),
            Self::Year(n) => time.checked_add_months(chrono::Months::new(n.max(1) * 12)),
        }
    }
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

/// Linear mapping over time, stored as unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(domain: (DateTime<Utc>, DateTime<Utc>), range: (f64, f64)) -> ChartResult<Self> {
        let start = datetime_to_unix_seconds(domain.0);
        let end = datetime_to_unix_seconds(domain.1);
        let (start, end) = if start == end {
            let half = MIN_TIME_SPAN_SECONDS / 2.0;
            (start - half, end + half)
        } else {
            (start, end)
        };
        Ok(Self {
            linear: LinearScale::new((start, end), range)?,
        })
    }

    /// Fits `[earliest, latest]` of a date field.
    pub fn from_dataset(dataset: &Dataset, field: &str, range: (f64, f64)) -> ChartResult<Self> {
        let epoch = DateTime::<Utc>::default();
        let domain = date_extent(dataset, field).unwrap_or((epoch, epoch));
        Self::new(domain, range)
    }

    #[must_use]
    pub fn map_date(&self, date: DateTime<Utc>) -> f64 {
        self.linear.map(datetime_to_unix_seconds(date))
    }

    /// Pixel back to a date; `None` only when the result leaves chrono's range.
    #[must_use]
    pub fn invert_date(&self, pixel: f64) -> Option<DateTime<Utc>> {
        unix_seconds_to_datetime(self.linear.invert(pixel))
    }

    pub fn domain_dates(&self) -> ChartResult<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = self.linear.domain();
        let convert = |seconds: f64| {
            unix_seconds_to_datetime(seconds).ok_or_else(|| {
                ChartError::InvalidData("time scale domain is out of range".to_owned())
            })
        };
        Ok((convert(start)?, convert(end)?))
    }

    #[must_use]
    pub fn tick_interval(&self, count: usize) -> TimeInterval {
        let (start, end) = self.linear.domain();
        TimeInterval::for_span(end - start, count)
    }

    /// Interval boundaries inside the domain.
    #[must_use]
    pub fn tick_dates(&self, count: usize) -> Vec<DateTime<Utc>> {
        let Ok((start, end)) = self.domain_dates() else {
            return Vec::new();
        };
        let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
        let interval = self.tick_interval(count);

        let mut ticks = Vec::new();
        let mut cursor = interval.floor(lo);
        while let Some(time) = cursor {
            if time > hi {
                break;
            }
            if time >= lo {
                ticks.push(time);
            }
            cursor = interval.offset(time);
        }
        ticks
    }
}

impl ContinuousScale for TimeScale {
    fn map(&self, value: f64) -> f64 {
        self.linear.map(value)
    }

    fn invert(&self, pixel: f64) -> f64 {
        self.linear.invert(pixel)
    }

    fn domain(&self) -> (f64, f64) {
        self.linear.domain()
    }

    fn range(&self) -> (f64, f64) {
        self.linear.range()
    }

    fn ticks(&self, count: usize) -> Vec<f64> {
        self.tick_dates(count)
            .into_iter()
            .map(datetime_to_unix_seconds)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{TimeInterval, TimeScale};

    #[test]
    fn invert_recovers_dates() {
        let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2017, 12, 31, 0, 0, 0).unwrap();
        let scale = TimeScale::new((start, end), (0.0, 100.0)).unwrap();
        assert_eq!(scale.map_date(start), 0.0);
        assert_eq!(scale.map_date(end), 100.0);
        assert_eq!(scale.invert_date(0.0), Some(start));
        assert_eq!(scale.invert_date(100.0), Some(end));
    }

    #[test]
    fn yearly_span_uses_monthly_ticks() {
        let start = Utc.with_ymd_and_hms(2017, 1, 15, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2017, 12, 20, 0, 0, 0).unwrap();
        let scale = TimeScale::new((start, end), (0.0, 600.0)).unwrap();
        assert_eq!(scale.tick_interval(10), TimeInterval::Month(1));
        let ticks = scale.tick_dates(10);
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0], Utc.with_ymd_and_hms(2017, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn multi_year_span_uses_year_steps() {
        let start = Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let scale = TimeScale::new((start, end), (0.0, 600.0)).unwrap();
        assert_eq!(scale.tick_interval(10), TimeInterval::Year(2));
        assert_eq!(scale.tick_interval(5), TimeInterval::Year(5));
        let ticks = scale.tick_dates(5);
        assert_eq!(ticks.first(), Some(&start));
        assert_eq!(ticks.len(), 7);
    }

    #[test]
    fn interval_choice_picks_the_closer_ratio() {
        assert_eq!(TimeInterval::for_span(10.0 * 86_400.0, 10), TimeInterval::Day(1));
        assert_eq!(TimeInterval::for_span(16.0 * 3_600.0, 10), TimeInterval::Hour(1));
        assert_eq!(TimeInterval::for_span(0.5, 10), TimeInterval::Second(1));
    }

    #[test]
    fn identical_dates_widen_to_one_second() {
        let day = Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap();
        let scale = TimeScale::new((day, day), (0.0, 10.0)).unwrap();
        assert!((scale.map_date(day) - 5.0).abs() < 1e-9);
    }
}
