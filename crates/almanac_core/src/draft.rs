//! Event creation and modification requests.

use crate::TimeRange;
use serde::{Deserialize, Serialize};

/// A fully-resolved request to create a calendar event.
///
/// Produced by the `/addevent` command handler after the `when` option has
/// been parsed into a concrete [`TimeRange`]; consumed by the Calendar
/// adapter, which renders it into a Google API event body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event title (Google "summary")
    pub title: String,
    /// Start/end instants
    pub range: TimeRange,
    /// IANA timezone the event was authored in (e.g. "Australia/Melbourne")
    pub timezone: String,
    /// Optional long description
    pub description: Option<String>,
    /// Optional location string
    pub location: Option<String>,
    /// Attendee email addresses
    pub attendees: Vec<String>,
    /// Popup reminder lead time, minutes before start
    pub reminder_minutes: Option<u32>,
    /// RRULE string for recurring events (e.g. "FREQ=WEEKLY;INTERVAL=1")
    pub recurrence: Option<String>,
}

impl EventDraft {
    /// Create a minimal draft with just a title, time, and timezone.
    pub fn new(title: impl Into<String>, range: TimeRange, timezone: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            range,
            timezone: timezone.into(),
            description: None,
            location: None,
            attendees: Vec::new(),
            reminder_minutes: None,
            recurrence: None,
        }
    }
}

/// A partial update to an existing event. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    /// New title, if changing
    pub title: Option<String>,
    /// New start/end, if rescheduling
    pub range: Option<TimeRange>,
    /// Timezone for the new range (required when `range` is set)
    pub timezone: Option<String>,
    /// New description, if changing
    pub description: Option<String>,
    /// New location, if changing
    pub location: Option<String>,
}

impl EventPatch {
    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.range.is_none()
            && self.description.is_none()
            && self.location.is_none()
    }
}
