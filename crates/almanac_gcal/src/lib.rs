//! Typed client for the Google Calendar v3 REST API.
//!
//! The bot holds per-user Bearer tokens brokered through Supabase, so this
//! client takes an access token per call rather than owning a credential.
//! Transient failures (429, 5xx, transport errors) retry with exponential
//! backoff and jitter; a 401 surfaces as
//! [`CalendarErrorKind::Unauthorized`](almanac_error::CalendarErrorKind) so
//! command handlers can steer the user back to `/connect`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod models;
mod recurrence;
mod slots;

pub use client::CalendarClient;
pub use models::{
    BusyPeriod, EventDateTime, FreeBusyRequest, FreeBusyResponse, GcalEvent, GcalEventList,
};
pub use recurrence::{Frequency, Recurrence};
pub use slots::{find_open_slots, SlotOptions};

/// Result type for Calendar API operations.
pub type CalendarResult<T> = Result<T, almanac_error::CalendarError>;
