//! RRULE construction for recurring events.

use chrono::NaiveDate;
use std::fmt;

/// RRULE frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum Frequency {
    /// Every day
    #[display("DAILY")]
    Daily,
    /// Every week
    #[display("WEEKLY")]
    Weekly,
    /// Every month
    #[display("MONTHLY")]
    Monthly,
    /// Every year
    #[display("YEARLY")]
    Yearly,
}

impl Frequency {
    /// Parse a user-supplied frequency word.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Some(Frequency::Daily),
            "weekly" | "week" => Some(Frequency::Weekly),
            "monthly" | "month" => Some(Frequency::Monthly),
            "yearly" | "year" | "annually" => Some(Frequency::Yearly),
            _ => None,
        }
    }
}

/// Builder for RRULE strings, e.g. `FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,WE`.
///
/// `COUNT` and `UNTIL` are mutually exclusive; setting one clears the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    frequency: Frequency,
    interval: u32,
    count: Option<u32>,
    until: Option<NaiveDate>,
    by_day: Vec<&'static str>,
}

impl Recurrence {
    /// Start a rule with the given frequency and an interval of 1.
    pub fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
            by_day: Vec::new(),
        }
    }

    /// Repeat every `interval` periods. Zero is treated as 1.
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Stop after `count` occurrences.
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None;
        self
    }

    /// Stop on `date` (inclusive).
    pub fn until(mut self, date: NaiveDate) -> Self {
        self.until = Some(date);
        self.count = None;
        self
    }

    /// Restrict to specific weekdays using two-letter RRULE codes.
    pub fn on_days(mut self, days: impl IntoIterator<Item = chrono::Weekday>) -> Self {
        self.by_day = days.into_iter().map(byday_code).collect();
        self
    }
}

fn byday_code(day: chrono::Weekday) -> &'static str {
    match day {
        chrono::Weekday::Mon => "MO",
        chrono::Weekday::Tue => "TU",
        chrono::Weekday::Wed => "WE",
        chrono::Weekday::Thu => "TH",
        chrono::Weekday::Fri => "FR",
        chrono::Weekday::Sat => "SA",
        chrono::Weekday::Sun => "SU",
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={};INTERVAL={}", self.frequency, self.interval)?;
        if let Some(count) = self.count {
            write!(f, ";COUNT={count}")?;
        } else if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y%m%d"))?;
        }
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY={}", self.by_day.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn weekly_default() {
        assert_eq!(
            Recurrence::new(Frequency::Weekly).to_string(),
            "FREQ=WEEKLY;INTERVAL=1"
        );
    }

    #[test]
    fn count_and_byday() {
        let rule = Recurrence::new(Frequency::Weekly)
            .interval(2)
            .count(10)
            .on_days([Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(
            rule.to_string(),
            "FREQ=WEEKLY;INTERVAL=2;COUNT=10;BYDAY=MO,WE,FR"
        );
    }

    #[test]
    fn until_replaces_count() {
        let rule = Recurrence::new(Frequency::Daily)
            .count(5)
            .until(NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(rule.to_string(), "FREQ=DAILY;INTERVAL=1;UNTIL=20251231");
    }

    #[test]
    fn frequency_parsing() {
        assert_eq!(Frequency::parse("Weekly"), Some(Frequency::Weekly));
        assert_eq!(Frequency::parse("annually"), Some(Frequency::Yearly));
        assert_eq!(Frequency::parse("fortnightly"), None);
    }

    #[test]
    fn zero_interval_is_clamped() {
        let rule = Recurrence::new(Frequency::Monthly).interval(0);
        assert_eq!(rule.to_string(), "FREQ=MONTHLY;INTERVAL=1");
    }
}
