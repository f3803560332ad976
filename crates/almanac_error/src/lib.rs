//! Error types for the Almanac calendar bot.
//!
//! This crate provides the foundation error types used throughout the Almanac
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use almanac_error::{AlmanacResult, HttpError};
//!
//! fn fetch_data() -> AlmanacResult<String> {
//!     Err(HttpError::new("Connection refused"))?
//! }
//!
//! match fetch_data() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod calendar;
mod config;
mod crypto;
#[cfg(feature = "database")]
mod database;
mod error;
mod http;
mod json;
mod server;
mod time_parse;

pub use calendar::{CalendarError, CalendarErrorKind};
pub use config::ConfigError;
pub use crypto::{CryptoError, CryptoErrorKind};
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{AlmanacError, AlmanacErrorKind, AlmanacResult};
pub use http::HttpError;
pub use json::JsonError;
pub use server::{ServerError, ServerErrorKind};
pub use time_parse::TimeParseError;
