//! Google Calendar API error types.

/// Calendar API error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CalendarErrorKind {
    /// The stored token was rejected by Google (expired or revoked)
    #[display("Calendar credentials rejected; user must reconnect")]
    Unauthorized,
    /// Rate limited by the Calendar API
    #[display("Calendar API rate limited")]
    RateLimited,
    /// Requested event does not exist
    #[display("Event '{}' not found", _0)]
    EventNotFound(String),
    /// Transient failure: 5xx response or transport error
    #[display("Calendar API error: {}", _0)]
    Api(String),
    /// Permanent rejection: a 4xx response other than auth or rate limiting
    #[display("Calendar API rejected request (status {}): {}", _0, _1)]
    Rejected(u16, String),
    /// Response body could not be decoded
    #[display("Failed to decode Calendar response: {}", _0)]
    Decode(String),
    /// User has not linked a Google account
    #[display("No Google account linked")]
    NotConnected,
}

impl CalendarErrorKind {
    /// Whether a request failing with this kind is worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CalendarErrorKind::RateLimited | CalendarErrorKind::Api(_))
    }
}

/// Calendar error with source location tracking.
///
/// # Examples
///
/// ```
/// use almanac_error::{CalendarError, CalendarErrorKind};
///
/// let err = CalendarError::new(CalendarErrorKind::NotConnected);
/// assert!(format!("{}", err).contains("No Google account"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Calendar Error: {} at line {} in {}", kind, line, file)]
pub struct CalendarError {
    /// The kind of error that occurred
    pub kind: CalendarErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CalendarError {
    /// Create a new CalendarError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CalendarErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
