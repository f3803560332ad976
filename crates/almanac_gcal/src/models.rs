//! Wire types for the Calendar v3 API and conversions into core views.

use almanac_core::{
    Attendee, EventDetails, EventDraft, EventPatch, EventSummary, EventWhen, ResponseStatus,
    TimeRange,
};
use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Google's start/end representation: `dateTime` for timed events, `date`
/// for all-day events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    /// RFC 3339 instant, set for timed events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<FixedOffset>>,
    /// Calendar date, set for all-day events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// IANA timezone the instant is rendered in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

impl EventDateTime {
    fn timed(instant: DateTime<Utc>, tz: &str) -> Self {
        let tz_parsed: Option<Tz> = tz.parse().ok();
        let date_time = match tz_parsed {
            Some(zone) => instant.with_timezone(&zone).fixed_offset(),
            None => instant.fixed_offset(),
        };
        Self {
            date_time: Some(date_time),
            date: None,
            time_zone: Some(tz.to_string()),
        }
    }

    fn when(&self) -> Option<EventWhen> {
        if let Some(instant) = self.date_time {
            return Some(EventWhen::Instant(instant));
        }
        self.date.map(EventWhen::AllDay)
    }
}

/// An attendee as Google reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcalAttendee {
    /// Attendee email
    pub email: String,
    /// RSVP state, absent on insert
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_status: Option<ResponseStatus>,
}

/// Creator/organizer stub on an event resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Reminder settings on an event resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminders {
    /// Whether calendar-level defaults apply
    pub use_default: bool,
    /// Explicit overrides when defaults are off
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<ReminderOverride>,
}

/// One reminder override entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderOverride {
    /// Delivery method, `popup` or `email`
    pub method: String,
    /// Lead time in minutes before the event start
    pub minutes: u32,
}

/// An event resource, used both as request body and response.
///
/// Everything is optional: insert bodies omit the id, patch bodies carry only
/// the changed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcalEvent {
    /// Event id, server-assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Long description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Location string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Start boundary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    /// End boundary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    /// Attendee list
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<GcalAttendee>,
    /// RRULE lines for recurring events
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
    /// Reminder settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminders: Option<Reminders>,
    /// Link into the Calendar UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
    /// Event creator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<Actor>,
    /// Event organizer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizer: Option<Actor>,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
}

impl GcalEvent {
    /// Render an [`EventDraft`] into an insert body.
    pub fn from_draft(draft: &EventDraft) -> Self {
        let reminders = draft.reminder_minutes.map(|minutes| Reminders {
            use_default: false,
            overrides: vec![ReminderOverride {
                method: "popup".to_string(),
                minutes,
            }],
        });
        Self {
            summary: Some(draft.title.clone()),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start: Some(EventDateTime::timed(draft.range.start, &draft.timezone)),
            end: Some(EventDateTime::timed(draft.range.end, &draft.timezone)),
            attendees: draft
                .attendees
                .iter()
                .map(|email| GcalAttendee {
                    email: email.clone(),
                    response_status: None,
                })
                .collect(),
            recurrence: draft
                .recurrence
                .iter()
                .map(|rule| format!("RRULE:{rule}"))
                .collect(),
            reminders,
            ..Self::default()
        }
    }

    /// Render an [`EventPatch`] into a patch body carrying only the changed
    /// fields.
    pub fn from_patch(patch: &EventPatch, fallback_tz: &str) -> Self {
        let tz = patch.timezone.as_deref().unwrap_or(fallback_tz);
        let (start, end) = match patch.range {
            Some(range) => (
                Some(EventDateTime::timed(range.start, tz)),
                Some(EventDateTime::timed(range.end, tz)),
            ),
            None => (None, None),
        };
        Self {
            summary: patch.title.clone(),
            description: patch.description.clone(),
            location: patch.location.clone(),
            start,
            end,
            ..Self::default()
        }
    }

    /// Compact view for listings. Events with no usable start/end (cancelled
    /// stubs) yield `None`.
    pub fn to_summary(&self) -> Option<EventSummary> {
        Some(EventSummary {
            id: self.id.clone()?,
            title: self
                .summary
                .clone()
                .unwrap_or_else(|| "(no title)".to_string()),
            start: self.start.as_ref().and_then(EventDateTime::when)?,
            end: self.end.as_ref().and_then(EventDateTime::when)?,
            location: self.location.clone(),
            description: self.description.clone(),
            html_link: self.html_link.clone(),
        })
    }

    /// Full detail view.
    pub fn to_details(&self) -> Option<EventDetails> {
        Some(EventDetails {
            summary: self.to_summary()?,
            creator: self.creator.as_ref().and_then(|a| a.email.clone()),
            organizer: self.organizer.as_ref().and_then(|a| a.email.clone()),
            attendees: self
                .attendees
                .iter()
                .map(|a| Attendee {
                    email: a.email.clone(),
                    response_status: a.response_status.unwrap_or_default(),
                })
                .collect(),
            created: self.created.clone(),
            updated: self.updated.clone(),
        })
    }
}

/// An `events.list` / `events.search` response page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GcalEventList {
    /// Events on this page
    #[serde(default)]
    pub items: Vec<GcalEvent>,
}

/// A `freebusy.query` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyRequest {
    /// Window start, RFC 3339
    pub time_min: String,
    /// Window end, RFC 3339
    pub time_max: String,
    /// Calendars to query
    pub items: Vec<FreeBusyItem>,
}

impl FreeBusyRequest {
    /// Query the primary calendar over `window`.
    pub fn primary(window: TimeRange) -> Self {
        Self {
            time_min: window.start.to_rfc3339_opts(SecondsFormat::Secs, true),
            time_max: window.end.to_rfc3339_opts(SecondsFormat::Secs, true),
            items: vec![FreeBusyItem {
                id: "primary".to_string(),
            }],
        }
    }
}

/// One calendar reference in a free/busy query.
#[derive(Debug, Clone, Serialize)]
pub struct FreeBusyItem {
    /// Calendar id
    pub id: String,
}

/// A busy interval reported by free/busy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BusyPeriod {
    /// Interval start
    pub start: DateTime<Utc>,
    /// Interval end
    pub end: DateTime<Utc>,
}

impl From<BusyPeriod> for TimeRange {
    fn from(period: BusyPeriod) -> Self {
        TimeRange::new(period.start, period.end)
    }
}

/// Busy list for one calendar.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarBusy {
    /// Busy intervals
    #[serde(default)]
    pub busy: Vec<BusyPeriod>,
}

/// A `freebusy.query` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyResponse {
    /// Busy data per queried calendar
    #[serde(default)]
    pub calendars: HashMap<String, CalendarBusy>,
}

impl FreeBusyResponse {
    /// All busy intervals across calendars, sorted by start.
    pub fn busy_periods(&self) -> Vec<TimeRange> {
        let mut periods: Vec<TimeRange> = self
            .calendars
            .values()
            .flat_map(|c| c.busy.iter().copied().map(TimeRange::from))
            .collect();
        periods.sort_by_key(|p| p.start);
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn draft() -> EventDraft {
        let start = Utc.with_ymd_and_hms(2025, 6, 3, 5, 0, 0).unwrap();
        let mut draft = EventDraft::new(
            "Team sync",
            TimeRange::one_hour(start),
            "Australia/Melbourne",
        );
        draft.attendees = vec!["a@x.com".to_string()];
        draft.reminder_minutes = Some(30);
        draft
    }

    #[test]
    fn draft_body_uses_local_time_and_zone() {
        let body = GcalEvent::from_draft(&draft());
        let json = serde_json::to_value(&body).unwrap();
        // 05:00 UTC is 15:00 in Melbourne during June.
        assert_eq!(json["start"]["dateTime"], "2025-06-03T15:00:00+10:00");
        assert_eq!(json["start"]["timeZone"], "Australia/Melbourne");
        assert_eq!(json["attendees"][0]["email"], "a@x.com");
        assert_eq!(json["reminders"]["useDefault"], false);
        assert_eq!(json["reminders"]["overrides"][0]["minutes"], 30);
        assert!(json.get("id").is_none());
    }

    #[test]
    fn patch_body_only_carries_changes() {
        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            ..EventPatch::default()
        };
        let json = serde_json::to_value(GcalEvent::from_patch(&patch, "UTC")).unwrap();
        assert_eq!(json["summary"], "Renamed");
        assert!(json.get("start").is_none());
        assert!(json.get("location").is_none());
    }

    #[test]
    fn response_decodes_into_summary() {
        let raw = serde_json::json!({
            "id": "abc123",
            "summary": "Standup",
            "htmlLink": "https://calendar.google.com/event?eid=abc",
            "start": {"dateTime": "2025-06-03T15:00:00+10:00"},
            "end": {"dateTime": "2025-06-03T15:30:00+10:00"},
            "attendees": [{"email": "a@x.com", "responseStatus": "accepted"}]
        });
        let event: GcalEvent = serde_json::from_value(raw).unwrap();
        let summary = event.to_summary().unwrap();
        assert_eq!(summary.id, "abc123");
        assert_eq!(summary.title, "Standup");
        let details = event.to_details().unwrap();
        assert_eq!(details.attendees[0].response_status, ResponseStatus::Accepted);
    }

    #[test]
    fn all_day_event_decodes_as_date() {
        let raw = serde_json::json!({
            "id": "allday",
            "start": {"date": "2025-06-03"},
            "end": {"date": "2025-06-04"}
        });
        let event: GcalEvent = serde_json::from_value(raw).unwrap();
        let summary = event.to_summary().unwrap();
        assert_eq!(summary.title, "(no title)");
        assert!(matches!(summary.start, EventWhen::AllDay(_)));
    }

    #[test]
    fn busy_periods_merge_and_sort_across_calendars() {
        let raw = serde_json::json!({
            "calendars": {
                "primary": {"busy": [
                    {"start": "2025-06-03T05:00:00Z", "end": "2025-06-03T06:00:00Z"}
                ]},
                "other": {"busy": [
                    {"start": "2025-06-03T01:00:00Z", "end": "2025-06-03T02:00:00Z"}
                ]}
            }
        });
        let response: FreeBusyResponse = serde_json::from_value(raw).unwrap();
        let periods = response.busy_periods();
        assert_eq!(periods.len(), 2);
        assert!(periods[0].start < periods[1].start);
    }
}
