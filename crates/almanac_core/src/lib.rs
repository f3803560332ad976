//! Core data types for the Almanac calendar bot.
//!
//! These types flow between the Discord layer, the Calendar adapter, and the
//! database: drafts describe events the user wants created, summaries and
//! details describe events as Google reports them, and [`GoogleToken`] is the
//! provider credential Supabase hands back after the OAuth dance.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod attendee;
mod draft;
mod event;
mod time_range;
mod token;

pub use attendee::{split_attendees, Attendee, ResponseStatus};
pub use draft::{EventDraft, EventPatch};
pub use event::{EventDetails, EventSummary, EventWhen};
pub use time_range::TimeRange;
pub use token::GoogleToken;
