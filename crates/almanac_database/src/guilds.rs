//! Repository for per-guild defaults.

use crate::models::GuildSettingsRow;
use crate::schema::guild_settings;
use crate::DatabaseResult;
use almanac_error::DatabaseError;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// CRUD for guild-level settings: the default timezone applied to members
/// who have not run `/set-tz`, and the fallback reminder channel.
#[derive(Clone)]
pub struct GuildSettingsRepository {
    conn: Arc<Mutex<PgConnection>>,
}

impl GuildSettingsRepository {
    /// Create a repository owning a fresh connection.
    pub fn new(conn: PgConnection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Create a repository sharing an existing connection.
    pub fn from_arc(conn: Arc<Mutex<PgConnection>>) -> Self {
        Self { conn }
    }

    /// Look up settings for a guild.
    #[instrument(skip(self))]
    pub async fn get(&self, guild_id: i64) -> DatabaseResult<Option<GuildSettingsRow>> {
        let mut conn = self.conn.lock().await;

        guild_settings::table
            .filter(guild_settings::guild_id.eq(guild_id))
            .first(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Set the guild's default timezone, creating the row if needed.
    #[instrument(skip(self))]
    pub async fn set_default_tz(&self, guild_id: i64, tz: &str) -> DatabaseResult<GuildSettingsRow> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(guild_settings::table)
            .values((
                guild_settings::guild_id.eq(guild_id),
                guild_settings::default_tz.eq(tz),
            ))
            .on_conflict(guild_settings::guild_id)
            .do_update()
            .set((
                guild_settings::default_tz.eq(tz),
                guild_settings::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Set the guild's fallback reminder channel, creating the row if needed.
    #[instrument(skip(self))]
    pub async fn set_default_channel(
        &self,
        guild_id: i64,
        channel_id: i64,
    ) -> DatabaseResult<GuildSettingsRow> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(guild_settings::table)
            .values((
                guild_settings::guild_id.eq(guild_id),
                guild_settings::default_channel_id.eq(channel_id),
            ))
            .on_conflict(guild_settings::guild_id)
            .do_update()
            .set((
                guild_settings::default_channel_id.eq(channel_id),
                guild_settings::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }
}
