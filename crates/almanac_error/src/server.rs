//! HTTP server error types.

/// Error kinds for server operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Server failed to bind or start
    #[display("Server start failed: {}", _0)]
    StartFailed(String),
    /// OAuth state token was missing, expired, or reused
    #[display("Invalid OAuth state")]
    InvalidState,
    /// OAuth callback was missing a required parameter
    #[display("Missing OAuth parameter: {}", _0)]
    MissingParameter(String),
    /// Scheduler task failed
    #[display("Scheduler error: {}", _0)]
    Scheduler(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The error kind
    pub kind: ServerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
