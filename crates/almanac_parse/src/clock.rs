//! Clock-time extraction: `3pm`, `3:30 pm`, `15:00`.

use chrono::NaiveTime;
use regex::Regex;

/// A clock time pulled out of an expression, plus the remaining text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ClockMatch {
    pub time: NaiveTime,
    /// Input with the time span removed and re-trimmed.
    pub remainder: String,
}

/// Matches `H[:MM] am/pm` or 24-hour `HH:MM`. A bare number with no colon and
/// no meridiem is never a time, so `june 3` keeps its day-of-month.
pub(crate) fn clock_regex() -> Regex {
    Regex::new(r"(?i)\b(\d{1,2})(?::([0-5]\d))?\s*(am|pm)\b|\b(\d{1,2}):([0-5]\d)\b")
        .expect("valid clock regex")
}

/// Find the first clock time in `text`, if any.
pub(crate) fn extract_clock(re: &Regex, text: &str) -> Option<ClockMatch> {
    let caps = re.captures(text)?;
    let whole = caps.get(0)?;

    let time = if let Some(hour) = caps.get(1) {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        let meridiem = caps.get(3)?.as_str().to_ascii_lowercase();
        let hour = match (hour, meridiem.as_str()) {
            (12, "am") => 0,
            (12, "pm") => 12,
            (1..=11, "am") => hour,
            (1..=11, "pm") => hour + 12,
            _ => return None,
        };
        NaiveTime::from_hms_opt(hour, minute, 0)?
    } else {
        let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
        NaiveTime::from_hms_opt(hour, minute, 0)?
    };

    let mut remainder = String::with_capacity(text.len());
    remainder.push_str(&text[..whole.start()]);
    remainder.push(' ');
    remainder.push_str(&text[whole.end()..]);
    Some(ClockMatch {
        time,
        remainder: remainder.split_whitespace().collect::<Vec<_>>().join(" "),
    })
}

/// Whether `text` is nothing but a clock time (used for range right-hand
/// sides, which inherit the left side's day).
pub(crate) fn parse_time_only(re: &Regex, text: &str) -> Option<NaiveTime> {
    let matched = extract_clock(re, text)?;
    matched.remainder.is_empty().then_some(matched.time)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_of(text: &str) -> Option<(NaiveTime, String)> {
        let re = clock_regex();
        extract_clock(&re, text).map(|m| (m.time, m.remainder))
    }

    #[test]
    fn meridiem_times() {
        assert_eq!(
            time_of("3pm"),
            Some((NaiveTime::from_hms_opt(15, 0, 0).unwrap(), String::new()))
        );
        assert_eq!(
            time_of("3:30 pm"),
            Some((NaiveTime::from_hms_opt(15, 30, 0).unwrap(), String::new()))
        );
        assert_eq!(
            time_of("12am"),
            Some((NaiveTime::from_hms_opt(0, 0, 0).unwrap(), String::new()))
        );
        assert_eq!(
            time_of("12pm"),
            Some((NaiveTime::from_hms_opt(12, 0, 0).unwrap(), String::new()))
        );
    }

    #[test]
    fn twenty_four_hour_times() {
        assert_eq!(
            time_of("15:00"),
            Some((NaiveTime::from_hms_opt(15, 0, 0).unwrap(), String::new()))
        );
        assert_eq!(
            time_of("09:05"),
            Some((NaiveTime::from_hms_opt(9, 5, 0).unwrap(), String::new()))
        );
    }

    #[test]
    fn remainder_keeps_day_anchor() {
        assert_eq!(
            time_of("tomorrow 3pm"),
            Some((
                NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                "tomorrow".to_string()
            ))
        );
    }

    #[test]
    fn bare_number_is_not_a_time() {
        assert_eq!(time_of("june 3"), None);
    }

    #[test]
    fn hour_13_pm_is_rejected() {
        assert_eq!(time_of("13pm"), None);
    }

    #[test]
    fn time_only_rejects_extra_words() {
        let re = clock_regex();
        assert!(parse_time_only(&re, "5pm").is_some());
        assert!(parse_time_only(&re, "tomorrow 5pm").is_none());
    }
}
