//! Range parsing: `X to Y`, `X-Y`, or a single instant widened to an hour.

use crate::clock::parse_time_only;
use crate::instant::{localize, normalize, Grammar};
use almanac_core::TimeRange;
use almanac_error::TimeParseError;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;

/// Parse a natural-language expression into a start/end range relative to
/// the current time.
///
/// # Examples
///
/// ```
/// use chrono_tz::Tz;
///
/// let tz: Tz = "Australia/Melbourne".parse().unwrap();
/// let range = almanac_parse::parse_range("tomorrow 3pm to 5pm", tz).unwrap();
/// assert_eq!(range.duration_minutes(), 120);
/// ```
pub fn parse_range(text: &str, tz: Tz) -> Result<TimeRange, TimeParseError> {
    parse_range_at(text, Utc::now().with_timezone(&tz))
}

/// Parse a range expression relative to an explicit `now`.
///
/// A lone instant becomes a one-hour range. The right side of a range may be
/// time-only, inheriting the left side's day; a bare left hour (`2-4pm`)
/// borrows the right side's meridiem; an end at or before the start
/// (`11pm-1am`) rolls to the next day.
pub fn parse_range_at(text: &str, now: DateTime<Tz>) -> Result<TimeRange, TimeParseError> {
    let grammar = Grammar::new();
    let normalized = normalize(text);

    if let Some((left, right)) = split_range(&normalized) {
        if let Some(range) = resolve_pair(&grammar, left, right, now) {
            return Ok(range);
        }
    }
    // Not a range (or the split was spurious, as in "june 3-5pm" variants
    // that fail to resolve): treat the whole text as one instant.
    let start = grammar
        .resolve(&normalized, now, None)
        .ok_or_else(|| TimeParseError::new(text))?;
    Ok(TimeRange::one_hour(start.with_timezone(&Utc)))
}

fn split_range(text: &str) -> Option<(&str, &str)> {
    if let Some((left, right)) = text.split_once(" to ") {
        return Some((left.trim(), right.trim()));
    }
    text.split_once('-')
        .map(|(left, right)| (left.trim(), right.trim()))
}

fn resolve_pair(
    grammar: &Grammar,
    left: &str,
    right: &str,
    now: DateTime<Tz>,
) -> Option<TimeRange> {
    // `2-4pm` leaves the left hour bare; it takes the right side's meridiem.
    let left = match meridiem_of(right) {
        Some(meridiem) if left.ends_with(|c: char| c.is_ascii_digit()) => {
            format!("{left}{meridiem}")
        }
        _ => left.to_string(),
    };
    let start = grammar.resolve(&left, now, None)?;
    let mut end = match parse_time_only(&grammar.clock, right) {
        Some(time) => localize(now.timezone(), start.date_naive(), time)?,
        None => grammar.resolve(right, now, Some(start.date_naive()))?,
    };
    if end <= start {
        end = end.checked_add_signed(Duration::days(1))?;
    }
    (end > start).then(|| TimeRange::new(start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

fn meridiem_of(text: &str) -> Option<&'static str> {
    if text.ends_with("am") {
        Some("am")
    } else if text.ends_with("pm") {
        Some("pm")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tz() -> Tz {
        "Australia/Melbourne".parse().unwrap()
    }

    /// Monday 2025-06-02 10:00 in Melbourne.
    fn now() -> DateTime<Tz> {
        tz().with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    fn parse(text: &str) -> TimeRange {
        parse_range_at(text, now()).unwrap()
    }

    fn local(d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        tz().with_ymd_and_hms(2025, 6, d, h, mi, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn explicit_to_range() {
        let range = parse("tomorrow 3pm to 5pm");
        assert_eq!(range.start, local(3, 15, 0));
        assert_eq!(range.end, local(3, 17, 0));
    }

    #[test]
    fn dash_range() {
        let range = parse("next monday 2pm-4pm");
        assert_eq!(range.start, local(9, 14, 0));
        assert_eq!(range.end, local(9, 16, 0));
    }

    #[test]
    fn bare_left_hour_borrows_meridiem() {
        let range = parse("next monday 2-4pm");
        assert_eq!(range.start, local(9, 14, 0));
        assert_eq!(range.end, local(9, 16, 0));

        // Without an anchor: now is 10:00, so 2pm is later today.
        let range = parse("2-4pm");
        assert_eq!(range.start, local(2, 14, 0));
        assert_eq!(range.end, local(2, 16, 0));
    }

    #[test]
    fn single_instant_gets_one_hour() {
        let range = parse("tomorrow 3pm");
        assert_eq!(range.start, local(3, 15, 0));
        assert_eq!(range.duration_minutes(), 60);
    }

    #[test]
    fn time_only_end_inherits_start_day() {
        let range = parse("friday 9am to 10:30am");
        assert_eq!(range.start, local(6, 9, 0));
        assert_eq!(range.end, local(6, 10, 30));
    }

    #[test]
    fn overnight_range_rolls_end_forward() {
        let range = parse("tomorrow 11pm to 1am");
        assert_eq!(range.start, local(3, 23, 0));
        assert_eq!(range.end, local(4, 1, 0));
    }

    #[test]
    fn full_expression_on_both_sides() {
        let range = parse("tomorrow 9am to tomorrow 5pm");
        assert_eq!(range.start, local(3, 9, 0));
        assert_eq!(range.end, local(3, 17, 0));
    }

    #[test]
    fn unparseable_input_is_an_error() {
        assert!(parse_range_at("the heat death of the universe", now()).is_err());
    }
}
