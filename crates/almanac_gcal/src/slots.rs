//! Open-slot search over free/busy data.

use almanac_core::TimeRange;
use chrono::{Duration, Timelike};

/// Knobs for [`find_open_slots`].
#[derive(Debug, Clone, Copy)]
pub struct SlotOptions {
    /// Meeting length in minutes
    pub duration_minutes: i64,
    /// Earliest acceptable start hour, UTC-naive local hour
    pub start_hour: u32,
    /// Latest acceptable start hour (exclusive)
    pub end_hour: u32,
    /// Breathing room required around busy periods, minutes
    pub buffer_minutes: i64,
    /// Stop after this many suggestions
    pub max_slots: usize,
}

impl Default for SlotOptions {
    /// One-hour meetings inside 9-to-5, 15-minute buffer, ten suggestions.
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            start_hour: 9,
            end_hour: 17,
            buffer_minutes: 15,
            max_slots: 10,
        }
    }
}

/// Walk `window` in half-hour steps and return candidate slots that fall
/// inside preferred hours and clear every busy period by the buffer.
///
/// `busy` is interpreted in the same timezone as `window`; callers convert
/// instants into the user's local frame before searching so preferred hours
/// mean local office hours.
pub fn find_open_slots(
    busy: &[TimeRange],
    window: TimeRange,
    options: SlotOptions,
) -> Vec<TimeRange> {
    let duration = Duration::minutes(options.duration_minutes);
    let buffer = Duration::minutes(options.buffer_minutes);
    let step = Duration::minutes(30);

    let mut slots = Vec::new();
    let mut cursor = window.start;
    while cursor + duration <= window.end && slots.len() < options.max_slots {
        let hour = cursor.hour();
        if hour >= options.start_hour && hour < options.end_hour {
            let candidate = TimeRange::new(cursor, cursor + duration);
            let conflicted = busy
                .iter()
                .any(|period| candidate.overlaps_with_buffer(period, buffer));
            if !conflicted {
                slots.push(candidate);
            }
        }
        cursor += step;
    }
    slots
}
