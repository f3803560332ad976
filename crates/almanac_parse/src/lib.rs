//! Natural-language time expression parsing.
//!
//! Turns expressions like `tomorrow 3pm`, `next monday 2-4pm`, or
//! `in 2 hours` into concrete instants in the user's timezone. The parser is
//! deterministic: a small grammar of day anchors, clock times, and relative
//! offsets, with a future-preference rule for anything ambiguous. No network,
//! no locale data beyond English.
//!
//! All parsing is relative to "now" in a caller-supplied IANA timezone;
//! results come back as [`DateTime<Tz>`] (or a UTC [`TimeRange`] for range
//! expressions).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod day;
mod instant;
mod range;

pub use instant::{parse_instant, parse_instant_at};
pub use range::{parse_range, parse_range_at};
