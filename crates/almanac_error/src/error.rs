//! Top-level error wrapper types.

use crate::{
    CalendarError, ConfigError, CryptoError, HttpError, JsonError, ServerError, TimeParseError,
};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// This is the foundation error enum for the Almanac workspace. Crate-local
/// errors (e.g. the Discord error in `almanac_social`) convert into one of
/// these variants at the boundary.
///
/// # Examples
///
/// ```
/// use almanac_error::{AlmanacError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: AlmanacError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum AlmanacErrorKind {
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Google Calendar API error
    #[from(CalendarError)]
    Calendar(CalendarError),
    /// Token encryption error
    #[from(CryptoError)]
    Crypto(CryptoError),
    /// Natural-language time parse error
    #[from(TimeParseError)]
    TimeParse(TimeParseError),
    /// Database error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// HTTP server error
    #[from(ServerError)]
    Server(ServerError),
}

/// Almanac error with kind discrimination.
///
/// # Examples
///
/// ```
/// use almanac_error::{AlmanacResult, ConfigError};
///
/// fn might_fail() -> AlmanacResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Almanac Error: {}", _0)]
pub struct AlmanacError(Box<AlmanacErrorKind>);

impl AlmanacError {
    /// Create a new error from a kind.
    pub fn new(kind: AlmanacErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &AlmanacErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to AlmanacErrorKind
impl<T> From<T> for AlmanacError
where
    T: Into<AlmanacErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Almanac operations.
///
/// # Examples
///
/// ```
/// use almanac_error::{AlmanacResult, HttpError};
///
/// fn fetch_data() -> AlmanacResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type AlmanacResult<T> = std::result::Result<T, AlmanacError>;
