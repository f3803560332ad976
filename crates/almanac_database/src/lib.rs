//! PostgreSQL persistence for the Almanac calendar bot.
//!
//! Diesel models and repositories for the four tables the bot owns: `users`
//! (Discord identity, timezone, encrypted Google token), `guild_settings`
//! (per-server defaults), `events` (a local mirror of created calendar
//! events), and `reminders` (pending reminder deliveries).
//!
//! Repositories wrap a shared [`PgConnection`] behind `Arc<Mutex>` so async
//! callers can hold them cheaply; each operation locks for the duration of
//! one query.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod connection;
mod events;
mod guilds;
mod models;
mod reminders;
mod users;

pub mod schema;

pub use connection::{establish_connection, ping, run_migrations};
pub use events::EventRepository;
pub use guilds::GuildSettingsRepository;
pub use models::{
    EventRow, GuildSettingsRow, NewEvent, NewReminder, NewUser, ReminderRow, UserRow,
};
pub use reminders::{ReminderRepository, MAX_RETRIES};
pub use users::UserRepository;

/// Result type for repository operations.
pub type DatabaseResult<T> = Result<T, almanac_error::DatabaseError>;
