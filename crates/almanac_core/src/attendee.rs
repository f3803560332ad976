//! Attendee types and input parsing.

use serde::{Deserialize, Serialize};

/// An attendee's RSVP state as reported by Google.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display, Default,
)]
#[serde(rename_all = "camelCase")]
pub enum ResponseStatus {
    /// Invitation sent, no response yet
    #[default]
    NeedsAction,
    /// Declined the invitation
    Declined,
    /// Tentatively accepted
    Tentative,
    /// Accepted the invitation
    Accepted,
}

/// A calendar event attendee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Attendee email address
    pub email: String,
    /// RSVP state
    #[serde(default)]
    pub response_status: ResponseStatus,
}

impl Attendee {
    /// Create an attendee with no response yet.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            response_status: ResponseStatus::NeedsAction,
        }
    }
}

/// Split a comma-separated attendee option into trimmed, non-empty addresses.
///
/// Discord slash commands deliver attendees as one free-text option, e.g.
/// `"a@x.com, b@y.com"`.
///
/// # Examples
///
/// ```
/// use almanac_core::split_attendees;
///
/// let out = split_attendees("a@x.com, b@y.com,,  c@z.com ");
/// assert_eq!(out, vec!["a@x.com", "b@y.com", "c@z.com"]);
/// ```
pub fn split_attendees(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_attendees() {
        assert!(split_attendees("").is_empty());
        assert!(split_attendees("  , ,").is_empty());
    }

    #[test]
    fn whitespace_is_trimmed() {
        assert_eq!(split_attendees("  a@x.com  "), vec!["a@x.com"]);
    }
}
