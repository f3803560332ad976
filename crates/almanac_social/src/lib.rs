//! Discord integration for the Almanac calendar bot.
//!
//! Slash commands are the whole surface: users link a Google account with
//! `/connect`, then create, list, search, and modify calendar events in
//! natural language. All replies are ephemeral; commands that call Google
//! defer first and follow up.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
pub mod commands;
mod context;
mod embeds;
mod error;
mod handler;
mod handlers;

pub use client::AlmanacBot;
pub use context::BotContext;
pub use error::{DiscordError, DiscordErrorKind};
pub use handler::AlmanacHandler;
pub use handlers::Reply;
