//! Natural-language time parsing error types.

/// Error produced when a natural-language time expression cannot be parsed.
///
/// Carries the original input so command handlers can echo it back to the
/// user alongside example formats.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("could not parse time expression '{}' at line {} in {}", input, line, file)]
pub struct TimeParseError {
    /// The text that failed to parse
    pub input: String,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl TimeParseError {
    /// Create a new TimeParseError for the given input at the current location.
    ///
    /// # Examples
    ///
    /// ```
    /// use almanac_error::TimeParseError;
    ///
    /// let err = TimeParseError::new("next blursday 3pm");
    /// assert_eq!(err.input, "next blursday 3pm");
    /// ```
    #[track_caller]
    pub fn new(input: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            input: input.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
