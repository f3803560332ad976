//! End-to-end grammar coverage for the time parser.
//!
//! Every case pins "now" with `parse_range_at`/`parse_instant_at` so results
//! are deterministic regardless of when the suite runs.

use almanac_parse::{parse_instant_at, parse_range_at};
use chrono::{Datelike, TimeZone, Timelike};
use chrono_tz::America::New_York;
use chrono_tz::Australia::Melbourne;

/// Wednesday 2025-06-11 10:00 in Melbourne.
fn now_melbourne() -> chrono::DateTime<chrono_tz::Tz> {
    Melbourne.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap()
}

#[test]
fn tomorrow_with_clock_time() {
    let range = parse_range_at("tomorrow 3pm", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    assert_eq!((start.day(), start.hour(), start.minute()), (12, 15, 0));
    assert_eq!(range.duration_minutes(), 60);
}

#[test]
fn next_weekday_with_shorthand_range() {
    // "next monday" from Wednesday June 11 is June 16; the bare 2 borrows
    // the pm from the range's right side.
    let range = parse_range_at("next monday 2-4pm", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    assert_eq!(start.weekday(), chrono::Weekday::Mon);
    assert_eq!((start.day(), start.hour()), (16, 14));
    assert_eq!(range.duration_minutes(), 120);
}

#[test]
fn bare_weekday_prefers_the_future() {
    // A bare "wednesday" on a Wednesday morning means later today only if a
    // time is given and still ahead; the default 9am has passed, so roll a week.
    let range = parse_range_at("wednesday", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    assert_eq!(start.weekday(), chrono::Weekday::Wed);
    assert!(start > now_melbourne());
}

#[test]
fn month_day_without_year_rolls_forward() {
    let range = parse_range_at("January 5th 10am", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    assert_eq!((start.year(), start.month(), start.day()), (2026, 1, 5));
}

#[test]
fn relative_offset_in_hours() {
    let instant = parse_instant_at("in 2 hours", now_melbourne()).unwrap();
    assert_eq!(instant, now_melbourne() + chrono::Duration::hours(2));
}

#[test]
fn range_end_inherits_the_start_day() {
    let range = parse_range_at("tomorrow 2pm to 3:30pm", now_melbourne()).unwrap();
    assert_eq!(range.duration_minutes(), 90);
    let start = range.start.with_timezone(&Melbourne);
    let end = range.end.with_timezone(&Melbourne);
    assert_eq!(start.day(), end.day());
}

#[test]
fn overnight_range_rolls_the_end_to_the_next_day() {
    let range = parse_range_at("tomorrow 11pm-1am", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    let end = range.end.with_timezone(&Melbourne);
    assert_eq!(start.hour(), 23);
    assert_eq!(end.hour(), 1);
    assert_eq!(end.day(), start.day() + 1);
    assert_eq!(range.duration_minutes(), 120);
}

#[test]
fn twenty_four_hour_clock() {
    let range = parse_range_at("today 15:00", now_melbourne()).unwrap();
    let start = range.start.with_timezone(&Melbourne);
    assert_eq!((start.hour(), start.minute()), (15, 0));
}

#[test]
fn results_respect_the_caller_timezone() {
    let ny_now = New_York.with_ymd_and_hms(2025, 6, 11, 10, 0, 0).unwrap();
    let range = parse_range_at("tomorrow 3pm", ny_now).unwrap();
    let start = range.start.with_timezone(&New_York);
    assert_eq!(start.hour(), 15);
}

#[test]
fn unrecognised_input_is_an_error() {
    let err = parse_range_at("the heat death of the universe", now_melbourne());
    assert!(err.is_err());
}
