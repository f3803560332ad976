//! Row and insert types for the Almanac tables.

use crate::schema::{events, guild_settings, reminders, users};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A registered user: Discord identity plus calendar credentials.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    /// Surrogate primary key
    pub id: i32,
    /// Discord user snowflake
    pub discord_id: i64,
    /// IANA timezone name chosen via `/set-tz`
    pub tz: Option<String>,
    /// Google account email, captured at connect time
    pub email: Option<String>,
    /// Sealed Google token envelope; `None` until the user connects
    pub token_ciphertext: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Whether this user has a stored Google credential.
    pub fn is_connected(&self) -> bool {
        self.token_ciphertext.is_some()
    }
}

/// Insertable user record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    /// Discord user snowflake
    pub discord_id: i64,
    /// IANA timezone name
    pub tz: Option<String>,
    /// Google account email
    pub email: Option<String>,
    /// Sealed Google token envelope
    pub token_ciphertext: Option<String>,
}

impl NewUser {
    /// A bare user known only by Discord id.
    pub fn bare(discord_id: i64) -> Self {
        Self {
            discord_id,
            tz: None,
            email: None,
            token_ciphertext: None,
        }
    }
}

/// Per-guild defaults.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = guild_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct GuildSettingsRow {
    /// Surrogate primary key
    pub id: i32,
    /// Guild snowflake
    pub guild_id: i64,
    /// Channel for reminder fallbacks when DMs are closed
    pub default_channel_id: Option<i64>,
    /// Timezone applied to members who have not set their own
    pub default_tz: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// A local mirror of a calendar event the bot created.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EventRow {
    /// Surrogate primary key
    pub id: i32,
    /// Owning user row
    pub user_id: i32,
    /// Discord user snowflake, denormalized for listing queries
    pub discord_user_id: i64,
    /// Google event id
    pub google_event_id: String,
    /// Event title
    pub title: String,
    /// Event description
    pub description: Option<String>,
    /// Event location
    pub location: Option<String>,
    /// Start instant
    pub start_at: DateTime<Utc>,
    /// End instant
    pub end_at: DateTime<Utc>,
    /// Attendee emails as a JSON array
    pub attendees: Option<serde_json::Value>,
    /// Link to the event in the Google Calendar UI
    pub html_link: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

/// Insertable event mirror record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    /// Owning user row
    pub user_id: i32,
    /// Discord user snowflake
    pub discord_user_id: i64,
    /// Google event id
    pub google_event_id: String,
    /// Event title
    pub title: String,
    /// Event description
    pub description: Option<String>,
    /// Event location
    pub location: Option<String>,
    /// Start instant
    pub start_at: DateTime<Utc>,
    /// End instant
    pub end_at: DateTime<Utc>,
    /// Attendee emails as a JSON array
    pub attendees: Option<serde_json::Value>,
    /// Link to the event in the Google Calendar UI
    pub html_link: Option<String>,
}

/// A pending reminder delivery.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = reminders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ReminderRow {
    /// Surrogate primary key
    pub id: i32,
    /// Owning user row
    pub user_id: i32,
    /// Google event id the reminder points at
    pub google_event_id: String,
    /// Fallback channel when the user's DMs are closed
    pub channel_id: Option<i64>,
    /// Delivery time
    pub remind_at: DateTime<Utc>,
    /// Whether delivery succeeded
    pub sent: bool,
    /// Failed delivery attempts so far
    pub retries: i32,
    /// Row creation time
    pub created_at: DateTime<Utc>,
}

/// Insertable reminder record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = reminders)]
pub struct NewReminder {
    /// Owning user row
    pub user_id: i32,
    /// Google event id
    pub google_event_id: String,
    /// Fallback channel
    pub channel_id: Option<i64>,
    /// Delivery time
    pub remind_at: DateTime<Utc>,
}
