//! Single-instant parsing: day anchor + clock time + relative offsets.

use crate::clock::{clock_regex, extract_clock};
use crate::day::{month_day_regex, parse_anchor};
use almanac_error::TimeParseError;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;

/// Events with no explicit clock time land at 9am local.
pub(crate) const DEFAULT_HOUR: u32 = 9;

/// Parse a natural-language instant relative to the current time.
///
/// # Examples
///
/// ```
/// use chrono_tz::Tz;
///
/// let tz: Tz = "Australia/Melbourne".parse().unwrap();
/// let when = almanac_parse::parse_instant("tomorrow 3pm", tz).unwrap();
/// assert_eq!(when.time().to_string(), "15:00:00");
/// ```
pub fn parse_instant(text: &str, tz: Tz) -> Result<DateTime<Tz>, TimeParseError> {
    parse_instant_at(text, Utc::now().with_timezone(&tz))
}

/// Parse a natural-language instant relative to an explicit `now`.
pub fn parse_instant_at(text: &str, now: DateTime<Tz>) -> Result<DateTime<Tz>, TimeParseError> {
    let grammar = Grammar::new();
    grammar
        .resolve(&normalize(text), now, None)
        .ok_or_else(|| TimeParseError::new(text))
}

pub(crate) fn normalize(text: &str) -> String {
    text.to_ascii_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Compiled patterns shared across both sides of a range expression.
pub(crate) struct Grammar {
    pub clock: Regex,
    month_day: Regex,
    relative: Regex,
}

impl Grammar {
    pub(crate) fn new() -> Self {
        Self {
            clock: clock_regex(),
            month_day: month_day_regex(),
            relative: Regex::new(r"^in (\d+) (minute|min|hour|hr|day|week)s?$")
                .expect("valid relative regex"),
        }
    }

    /// Resolve a normalized expression to an instant.
    ///
    /// `inherit_date` is set when parsing the right side of a range whose
    /// clock time should land on the left side's day; it suppresses the
    /// roll-to-tomorrow rule for bare times.
    pub(crate) fn resolve(
        &self,
        text: &str,
        now: DateTime<Tz>,
        inherit_date: Option<NaiveDate>,
    ) -> Option<DateTime<Tz>> {
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = self.relative.captures(text) {
            let amount: i64 = caps[1].parse().ok()?;
            let offset = match &caps[2] {
                "minute" | "min" => Duration::minutes(amount),
                "hour" | "hr" => Duration::hours(amount),
                "day" => Duration::days(amount),
                "week" => Duration::weeks(amount),
                _ => return None,
            };
            return now.checked_add_signed(offset);
        }

        let (time, anchor_text) = match extract_clock(&self.clock, text) {
            Some(matched) => (Some(matched.time), matched.remainder),
            None => (None, text.to_string()),
        };

        let date = if anchor_text.is_empty() {
            match inherit_date {
                Some(date) => date,
                None => {
                    // A bare clock time that already passed today means
                    // tomorrow.
                    let time = time?;
                    if time <= now.time() {
                        now.date_naive().succ_opt()?
                    } else {
                        now.date_naive()
                    }
                }
            }
        } else {
            let anchor = parse_anchor(&self.month_day, &anchor_text)?;
            let effective =
                time.unwrap_or(NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0)?);
            anchor.resolve(now.date_naive(), effective <= now.time())?
        };

        let time = match time {
            Some(time) => time,
            None => NaiveTime::from_hms_opt(DEFAULT_HOUR, 0, 0)?,
        };
        localize(now.timezone(), date, time)
    }
}

/// Attach a timezone, stepping over DST gaps and taking the earlier of
/// ambiguous fold times.
pub(crate) fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&date.and_time(time)) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(earliest, _) => Some(earliest),
        chrono::LocalResult::None => tz
            .from_local_datetime(&date.and_time(time + Duration::hours(1)))
            .earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tz() -> Tz {
        "Australia/Melbourne".parse().unwrap()
    }

    /// Monday 2025-06-02 10:00 in Melbourne.
    fn now() -> DateTime<Tz> {
        tz().with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
    }

    fn parse(text: &str) -> DateTime<Tz> {
        parse_instant_at(text, now()).unwrap()
    }

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        tz().with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn tomorrow_with_time() {
        assert_eq!(parse("tomorrow 3pm"), local(2025, 6, 3, 15, 0));
        assert_eq!(parse("Tomorrow 3:30 PM"), local(2025, 6, 3, 15, 30));
    }

    #[test]
    fn day_without_time_defaults_to_nine() {
        assert_eq!(parse("tomorrow"), local(2025, 6, 3, 9, 0));
    }

    #[test]
    fn bare_future_time_is_today() {
        assert_eq!(parse("3pm"), local(2025, 6, 2, 15, 0));
    }

    #[test]
    fn bare_past_time_rolls_to_tomorrow() {
        assert_eq!(parse("8am"), local(2025, 6, 3, 8, 0));
    }

    #[test]
    fn weekday_resolution() {
        // now() is a Monday; friday is this week, monday rolls a week out
        // because 9am has already passed.
        assert_eq!(parse("friday 2pm"), local(2025, 6, 6, 14, 0));
        assert_eq!(parse("monday"), local(2025, 6, 9, 9, 0));
        assert_eq!(parse("next monday 2pm"), local(2025, 6, 9, 14, 0));
    }

    #[test]
    fn month_day_forms() {
        assert_eq!(parse("december 25th 10am"), local(2025, 12, 25, 10, 0));
        assert_eq!(parse("june 3"), local(2025, 6, 3, 9, 0));
        // January has passed this year.
        assert_eq!(parse("january 15"), local(2026, 1, 15, 9, 0));
        assert_eq!(parse("january 15 2025"), local(2025, 1, 15, 9, 0));
    }

    #[test]
    fn relative_offsets() {
        assert_eq!(parse("in 2 hours"), local(2025, 6, 2, 12, 0));
        assert_eq!(parse("in 30 minutes"), local(2025, 6, 2, 10, 30));
        assert_eq!(parse("in 3 days"), local(2025, 6, 5, 10, 0));
        assert_eq!(parse("in 1 week"), local(2025, 6, 9, 10, 0));
    }

    #[test]
    fn twenty_four_hour_clock() {
        assert_eq!(parse("tomorrow 15:00"), local(2025, 6, 3, 15, 0));
    }

    #[test]
    fn garbage_is_an_error() {
        let err = parse_instant_at("next blursday 3pm", now()).unwrap_err();
        assert!(err.input.contains("blursday"));
        assert!(parse_instant_at("", now()).is_err());
    }
}
