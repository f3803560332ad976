//! Repository for the `users` table.

use crate::models::{NewUser, UserRow};
use crate::schema::users;
use crate::DatabaseResult;
use almanac_error::DatabaseError;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// CRUD for user rows, keyed by Discord snowflake.
///
/// The connection is wrapped in `Arc<Mutex>` so repositories can be cloned
/// into command handlers and the scheduler.
#[derive(Clone)]
pub struct UserRepository {
    conn: Arc<Mutex<PgConnection>>,
}

impl UserRepository {
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

    /// Look up a user by Discord id.
    #[instrument(skip(self))]
    pub async fn get_by_discord_id(&self, discord_id: i64) -> DatabaseResult<Option<UserRow>> {
        let mut conn = self.conn.lock().await;

        users::table
            .filter(users::discord_id.eq(discord_id))
            .first(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Fetch the user row for a Discord id, creating a bare row if absent.
    #[instrument(skip(self))]
    pub async fn ensure_user(&self, discord_id: i64) -> DatabaseResult<UserRow> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(users::table)
            .values(NewUser::bare(discord_id))
            .on_conflict(users::discord_id)
            .do_update()
            .set(users::updated_at.eq(diesel::dsl::now))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Set a user's timezone, creating the row if needed.
    #[instrument(skip(self))]
    pub async fn set_timezone(&self, discord_id: i64, tz: &str) -> DatabaseResult<UserRow> {
        let mut conn = self.conn.lock().await;

        let new_user = NewUser {
            tz: Some(tz.to_string()),
            ..NewUser::bare(discord_id)
        };
        diesel::insert_into(users::table)
            .values(new_user)
            .on_conflict(users::discord_id)
            .do_update()
            .set((
                users::tz.eq(tz),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Store a sealed Google token (and optionally the account email) after
    /// a successful OAuth callback.
    #[instrument(skip(self, ciphertext))]
    pub async fn store_token(
        &self,
        discord_id: i64,
        email: Option<&str>,
        ciphertext: &str,
    ) -> DatabaseResult<UserRow> {
        let mut conn = self.conn.lock().await;

        let new_user = NewUser {
            email: email.map(str::to_string),
            token_ciphertext: Some(ciphertext.to_string()),
            ..NewUser::bare(discord_id)
        };
        diesel::insert_into(users::table)
            .values(new_user)
            .on_conflict(users::discord_id)
            .do_update()
            .set((
                users::email.eq(email),
                users::token_ciphertext.eq(ciphertext),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Drop a user's stored token, forcing a reconnect. Used when Google
    /// rejects the credential outright.
    #[instrument(skip(self))]
    pub async fn clear_token(&self, discord_id: i64) -> DatabaseResult<()> {
        let mut conn = self.conn.lock().await;

        diesel::update(users::table.filter(users::discord_id.eq(discord_id)))
            .set((
                users::token_ciphertext.eq(None::<String>),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(DatabaseError::from)
    }
}
