//! Token encryption error types.

/// Crypto error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum CryptoErrorKind {
    /// Key material is missing or malformed
    #[display("Invalid encryption key: {}", _0)]
    InvalidKey(String),
    /// Encryption failed
    #[display("Encryption failed: {}", _0)]
    Encrypt(String),
    /// Decryption failed (wrong key or corrupted ciphertext)
    #[display("Decryption failed: {}", _0)]
    Decrypt(String),
    /// Ciphertext envelope could not be decoded
    #[display("Malformed ciphertext envelope: {}", _0)]
    Envelope(String),
}

/// Crypto error with source location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Crypto Error: {} at line {} in {}", kind, line, file)]
pub struct CryptoError {
    /// The kind of error that occurred
    pub kind: CryptoErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl CryptoError {
    /// Create a new CryptoError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: CryptoErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
