//! Discord-specific error types.

use almanac_error::{CalendarError, CalendarErrorKind, CryptoError, DatabaseError};
use derive_getters::Getters;

/// Discord error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum DiscordErrorKind {
    /// Serenity API error (HTTP error, gateway error, rate limit).
    #[display("Serenity API error: {_0}")]
    SerenityError(String),

    /// Database operation failed.
    #[display("Database error: {_0}")]
    DatabaseError(String),

    /// Google Calendar call failed after retries.
    #[display("Calendar error: {_0}")]
    CalendarError(String),

    /// Token sealing or unsealing failed.
    #[display("Crypto error: {_0}")]
    CryptoError(String),

    /// User has not linked a Google account.
    #[display("User has not connected Google Calendar")]
    NotConnected,

    /// Stored Google credential was rejected; the user must reconnect.
    #[display("Google credential rejected")]
    TokenRejected,

    /// Requested calendar event does not exist.
    #[display("Event not found: {_0}")]
    EventNotFound(String),

    /// A command option was missing or had the wrong type.
    #[display("Invalid option: {_0}")]
    InvalidOption(String),

    /// Received a command this bot does not define.
    #[display("Unknown command: {_0}")]
    UnknownCommand(String),

    /// Connection to the Discord gateway failed.
    #[display("Connection failed: {_0}")]
    ConnectionFailed(String),

    /// Interaction response or followup failed.
    #[display("Interaction failed: {_0}")]
    InteractionFailed(String),
}

/// Discord error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Discord Error: {} at line {} in {}", kind, line, file)]
pub struct DiscordError {
    kind: DiscordErrorKind,
    line: u32,
    file: &'static str,
}

impl DiscordError {
    /// Create a new DiscordError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DiscordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<DatabaseError> for DiscordError {
    #[track_caller]
    fn from(e: DatabaseError) -> Self {
        DiscordError::new(DiscordErrorKind::DatabaseError(e.to_string()))
    }
}

impl From<CryptoError> for DiscordError {
    #[track_caller]
    fn from(e: CryptoError) -> Self {
        DiscordError::new(DiscordErrorKind::CryptoError(e.to_string()))
    }
}

impl From<CalendarError> for DiscordError {
    #[track_caller]
    fn from(e: CalendarError) -> Self {
        let kind = match e.kind {
            CalendarErrorKind::Unauthorized => DiscordErrorKind::TokenRejected,
            CalendarErrorKind::NotConnected => DiscordErrorKind::NotConnected,
            CalendarErrorKind::EventNotFound(id) => DiscordErrorKind::EventNotFound(id),
            kind => DiscordErrorKind::CalendarError(kind.to_string()),
        };
        DiscordError::new(kind)
    }
}

impl From<serenity::Error> for DiscordError {
    #[track_caller]
    fn from(e: serenity::Error) -> Self {
        DiscordError::new(DiscordErrorKind::SerenityError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_token_rejected() {
        let e = CalendarError::new(CalendarErrorKind::Unauthorized);
        let discord: DiscordError = e.into();
        assert_eq!(discord.kind(), &DiscordErrorKind::TokenRejected);
    }

    #[test]
    fn not_found_carries_event_id() {
        let e = CalendarError::new(CalendarErrorKind::EventNotFound("abc123".into()));
        let discord: DiscordError = e.into();
        assert_eq!(
            discord.kind(),
            &DiscordErrorKind::EventNotFound("abc123".into())
        );
    }

    #[test]
    fn error_display_includes_location() {
        let e = DiscordError::new(DiscordErrorKind::NotConnected);
        let rendered = format!("{e}");
        assert!(rendered.contains("error.rs"));
        assert!(rendered.contains("not connected"));
    }
}
