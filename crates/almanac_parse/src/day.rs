//! Day-anchor parsing: `today`, `tomorrow`, weekdays, month-day dates.

use chrono::{Datelike, NaiveDate, Weekday};
use regex::Regex;

/// The day part of an expression, before future-preference resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayAnchor {
    Today,
    Tomorrow,
    /// A weekday name; `next` forces at least one day forward.
    Weekday { day: Weekday, next: bool },
    /// A month/day, optionally pinned to a year.
    MonthDay {
        month: u32,
        day: u32,
        year: Option<i32>,
    },
}

impl DayAnchor {
    /// Resolve to a concrete date relative to `today`.
    ///
    /// `time_passed` reports whether the expression's clock time has already
    /// gone by on the candidate day; ambiguous anchors (a bare weekday
    /// matching today, a year-less month-day) roll forward when it has.
    pub(crate) fn resolve(self, today: NaiveDate, time_passed: bool) -> Option<NaiveDate> {
        match self {
            DayAnchor::Today => Some(today),
            DayAnchor::Tomorrow => today.succ_opt(),
            DayAnchor::Weekday { day, next } => {
                let offset = days_until(today.weekday(), day);
                let offset = if next && offset == 0 {
                    7
                } else if offset == 0 && time_passed {
                    7
                } else {
                    offset
                };
                today.checked_add_days(chrono::Days::new(offset))
            }
            DayAnchor::MonthDay { month, day, year } => match year {
                Some(year) => NaiveDate::from_ymd_opt(year, month, day),
                None => {
                    let candidate = NaiveDate::from_ymd_opt(today.year(), month, day)?;
                    if candidate < today || (candidate == today && time_passed) {
                        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
                    } else {
                        Some(candidate)
                    }
                }
            },
        }
    }
}

fn days_until(from: Weekday, to: Weekday) -> u64 {
    (to.num_days_from_monday() as i64 - from.num_days_from_monday() as i64).rem_euclid(7) as u64
}

fn weekday_from(name: &str) -> Option<Weekday> {
    match name {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" | "tues" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" | "thur" | "thurs" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

fn month_from(name: &str) -> Option<u32> {
    let month = match name {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sept" | "sep" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Matches `MonthName D[st|nd|rd|th][, YYYY]`, e.g. `december 25th` or
/// `june 3 2026`.
pub(crate) fn month_day_regex() -> Regex {
    Regex::new(r"(?i)^([a-z]+)\s+(\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(\d{4}))?$")
        .expect("valid month-day regex")
}

/// Parse a lowercase, whitespace-normalized day anchor. `None` for anything
/// outside the grammar.
pub(crate) fn parse_anchor(month_day: &Regex, text: &str) -> Option<DayAnchor> {
    let text = text.strip_prefix("on ").unwrap_or(text);
    match text {
        "today" | "tonight" => return Some(DayAnchor::Today),
        "tomorrow" => return Some(DayAnchor::Tomorrow),
        _ => {}
    }
    if let Some(rest) = text.strip_prefix("next ") {
        let day = weekday_from(rest.trim())?;
        return Some(DayAnchor::Weekday { day, next: true });
    }
    if let Some(rest) = text.strip_prefix("this ") {
        let day = weekday_from(rest.trim())?;
        return Some(DayAnchor::Weekday { day, next: false });
    }
    if let Some(day) = weekday_from(text) {
        return Some(DayAnchor::Weekday { day, next: false });
    }
    let caps = month_day.captures(text)?;
    let month = month_from(&caps[1].to_ascii_lowercase())?;
    let day: u32 = caps[2].parse().ok()?;
    let year: Option<i32> = caps.get(3).and_then(|y| y.as_str().parse().ok());
    (1..=31).contains(&day).then_some(DayAnchor::MonthDay { month, day, year })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(text: &str) -> Option<DayAnchor> {
        parse_anchor(&month_day_regex(), text)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn simple_anchors() {
        assert_eq!(anchor("today"), Some(DayAnchor::Today));
        assert_eq!(anchor("tomorrow"), Some(DayAnchor::Tomorrow));
        assert_eq!(anchor("blursday"), None);
    }

    #[test]
    fn weekday_with_next_prefix() {
        assert_eq!(
            anchor("next monday"),
            Some(DayAnchor::Weekday {
                day: Weekday::Mon,
                next: true
            })
        );
        assert_eq!(
            anchor("fri"),
            Some(DayAnchor::Weekday {
                day: Weekday::Fri,
                next: false
            })
        );
    }

    #[test]
    fn month_day_with_ordinal_and_year() {
        assert_eq!(
            anchor("december 25th"),
            Some(DayAnchor::MonthDay {
                month: 12,
                day: 25,
                year: None
            })
        );
        assert_eq!(
            anchor("june 3 2026"),
            Some(DayAnchor::MonthDay {
                month: 6,
                day: 3,
                year: Some(2026)
            })
        );
    }

    #[test]
    fn bare_weekday_rolls_past_today() {
        // 2025-06-02 is a Monday.
        let today = date(2025, 6, 2);
        let monday = DayAnchor::Weekday {
            day: Weekday::Mon,
            next: false,
        };
        assert_eq!(monday.resolve(today, false), Some(today));
        assert_eq!(monday.resolve(today, true), Some(date(2025, 6, 9)));
    }

    #[test]
    fn next_weekday_skips_today() {
        let today = date(2025, 6, 2);
        let next_monday = DayAnchor::Weekday {
            day: Weekday::Mon,
            next: true,
        };
        assert_eq!(next_monday.resolve(today, false), Some(date(2025, 6, 9)));
    }

    #[test]
    fn yearless_month_day_prefers_future() {
        let today = date(2025, 6, 2);
        let past = DayAnchor::MonthDay {
            month: 1,
            day: 15,
            year: None,
        };
        assert_eq!(past.resolve(today, false), Some(date(2026, 1, 15)));
        let future = DayAnchor::MonthDay {
            month: 12,
            day: 25,
            year: None,
        };
        assert_eq!(future.resolve(today, false), Some(date(2025, 12, 25)));
    }

    #[test]
    fn explicit_year_never_rolls() {
        let today = date(2025, 6, 2);
        let pinned = DayAnchor::MonthDay {
            month: 1,
            day: 15,
            year: Some(2024),
        };
        assert_eq!(pinned.resolve(today, false), Some(date(2024, 1, 15)));
    }
}
