use std::time::Duration;

use chrono::{Duration as Days, TimeZone, Utc};
use vizbind::core::{Dataset, Record, RecordKey, Value};
use vizbind::interaction::{
    FrameClock, Playback, RangeFilter, RangeSelection, TooltipState, filter_by_range,
};

fn daily_series(days: i64) -> Dataset {
    let start = Utc.with_ymd_and_hms(2017, 5, 1, 0, 0, 0).single().expect("date");
    (0..days)
        .map(|day| {
            Record::new()
                .with("date", Value::Date(start + Days::days(day)))
                .with("price_usd", Value::Number(100.0 + day as f64))
        })
        .collect()
}

#[test]
fn starting_playback_twice_keeps_a_single_timer() {
    let interval = Duration::from_millis(100);
    let mut playback = Playback::new(3, interval);
    assert!(playback.start(Duration::ZERO));
    assert!(!playback.start(Duration::from_millis(50)));

    assert!(playback.poll(Duration::from_millis(100)));
    assert_eq!(playback.index(), 1);
    assert!(!playback.poll(Duration::from_millis(199)));
    assert_eq!(playback.index(), 1);
}

#[test]
fn playback_wraps_after_the_last_frame() {
    let mut clock = FrameClock::new();
    let mut playback = Playback::new(3, Duration::from_millis(100));
    playback.start(clock.now());
    for _ in 0..3 {
        let now = clock.advance(Duration::from_millis(100));
        playback.poll(now);
    }
    assert_eq!(playback.index(), 0);

    assert!(playback.stop());
    assert!(!playback.stop());
    let now = clock.advance(Duration::from_secs(1));
    assert!(!playback.poll(now));
    assert_eq!(playback.scrub(10), 2);
    playback.reset();
    assert_eq!(playback.index(), 0);
}

#[test]
fn full_range_returns_the_whole_series() {
    let series = daily_series(5);
    let filtered =
        filter_by_range(&series, "date", RangeSelection::new(0.0, 100.0)).expect("filter");
    assert_eq!(filtered, series);
}

#[test]
fn collapsed_range_keeps_at_most_one_record() {
    let series = daily_series(5);
    let filtered =
        filter_by_range(&series, "date", RangeSelection::new(50.0, 50.0)).expect("filter");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered.records()[0].number("price_usd"), Some(102.0));

    let between =
        filter_by_range(&series, "date", RangeSelection::new(60.0, 70.0)).expect("filter");
    assert!(between.is_empty());
}

#[test]
fn range_bounds_are_inclusive() {
    let series = daily_series(5);
    let filtered =
        filter_by_range(&series, "date", RangeSelection::new(25.0, 75.0)).expect("filter");
    let prices: Vec<f64> = filtered.numbers("price_usd").collect();
    assert_eq!(prices, vec![101.0, 102.0, 103.0]);
}

#[test]
fn rapid_range_changes_coalesce_to_the_latest() {
    let mut filter = RangeFilter::default();
    filter.set(10.0, 20.0);
    filter.set(90.0, 30.0);
    assert!(filter.has_pending());

    let applied = filter.take_pending().expect("pending selection");
    assert_eq!(applied, RangeSelection::new(30.0, 90.0));
    assert_eq!(filter.take_pending(), None);
    assert_eq!(filter.current(), applied);
}

#[test]
fn only_one_tooltip_is_visible() {
    let mut tooltip = TooltipState::default();
    tooltip.pointer_enter(RecordKey::from("China"), 10.0, 10.0, vec!["China".to_owned()]);
    tooltip.pointer_enter(RecordKey::from("India"), 20.0, 10.0, vec!["India".to_owned()]);
    assert!(!tooltip.pointer_leave(&RecordKey::from("China")));
    assert_eq!(
        tooltip.current().map(|current| &current.key),
        Some(&RecordKey::from("India"))
    );
    assert!(tooltip.pointer_leave(&RecordKey::from("India")));
    assert!(tooltip.current().is_none());
}
