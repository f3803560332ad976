//! Event types as reported back by the Calendar API.

use crate::Attendee;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// When an event occurs: a concrete instant, or an all-day date.
///
/// Google reports timed events as RFC 3339 `dateTime` values and all-day
/// events as bare `date` values; both appear in `/myevents` listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventWhen {
    /// Timed event boundary
    Instant(DateTime<FixedOffset>),
    /// All-day event boundary
    AllDay(NaiveDate),
}

impl EventWhen {
    /// The instant, if this is a timed boundary.
    pub fn instant(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            EventWhen::Instant(dt) => Some(*dt),
            EventWhen::AllDay(_) => None,
        }
    }
}

/// A compact event view used for listings and search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Google event id
    pub id: String,
    /// Event title ("(no title)" when Google omits the summary)
    pub title: String,
    /// Start boundary
    pub start: EventWhen,
    /// End boundary
    pub end: EventWhen,
    /// Location, if set
    pub location: Option<String>,
    /// Description, if set
    pub description: Option<String>,
    /// Link to the event in the Google Calendar UI
    pub html_link: Option<String>,
}

/// The full event view used by `/eventdetails`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    /// Compact fields shared with listings
    pub summary: EventSummary,
    /// Creator email
    pub creator: Option<String>,
    /// Organizer email
    pub organizer: Option<String>,
    /// Attendees with RSVP state
    pub attendees: Vec<Attendee>,
    /// Creation timestamp (RFC 3339, as reported)
    pub created: Option<String>,
    /// Last update timestamp (RFC 3339, as reported)
    pub updated: Option<String>,
}
