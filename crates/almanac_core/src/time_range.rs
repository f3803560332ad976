//! Concrete start/end pairs produced by the time parser.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A half-open time interval `[start, end)` in UTC.
///
/// Ranges always come out of the parser in the user's timezone and are
/// normalized to UTC here; rendering back into local time happens at the
/// Discord embed layer.
///
/// # Examples
///
/// ```
/// use almanac_core::TimeRange;
/// use chrono::{TimeZone, Utc};
///
/// let range = TimeRange::new(
///     Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2025, 6, 1, 16, 0, 0).unwrap(),
/// );
/// assert_eq!(range.duration_minutes(), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start instant
    pub start: DateTime<Utc>,
    /// Exclusive end instant
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new range. Callers guarantee `start <= end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Range covering one hour from `start`.
    pub fn one_hour(start: DateTime<Utc>) -> Self {
        Self {
            start,
            end: start + Duration::hours(1),
        }
    }

    /// Length of the range in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether this range overlaps `other`, with `buffer` applied to both
    /// sides of this range. Used for conflict detection against busy periods.
    pub fn overlaps_with_buffer(&self, other: &TimeRange, buffer: Duration) -> bool {
        self.start - buffer < other.end && self.end + buffer > other.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, m, 0).unwrap()
    }

    #[test]
    fn one_hour_default_duration() {
        let range = TimeRange::one_hour(utc(15, 0));
        assert_eq!(range.duration_minutes(), 60);
    }

    #[test]
    fn disjoint_ranges_do_not_overlap() {
        let a = TimeRange::new(utc(9, 0), utc(10, 0));
        let b = TimeRange::new(utc(11, 0), utc(12, 0));
        assert!(!a.overlaps_with_buffer(&b, Duration::zero()));
    }

    #[test]
    fn buffer_extends_conflict_window() {
        let a = TimeRange::new(utc(9, 0), utc(10, 0));
        let b = TimeRange::new(utc(10, 10), utc(11, 0));
        assert!(!a.overlaps_with_buffer(&b, Duration::zero()));
        assert!(a.overlaps_with_buffer(&b, Duration::minutes(15)));
    }

    #[test]
    fn adjacent_ranges_do_not_overlap() {
        let a = TimeRange::new(utc(9, 0), utc(10, 0));
        let b = TimeRange::new(utc(10, 0), utc(11, 0));
        assert!(!a.overlaps_with_buffer(&b, Duration::zero()));
    }
}
