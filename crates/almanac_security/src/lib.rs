//! Token encryption and command rate limiting.
//!
//! [`TokenCipher`] seals Google OAuth tokens with AES-256-GCM before they
//! touch the database; [`RateLimiter`] keeps individual Discord users from
//! hammering the command surface.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cipher;
mod rate_limit;

pub use cipher::{SealedToken, TokenCipher};
pub use rate_limit::{RateLimit, RateLimiter};
