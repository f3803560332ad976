//! Repository for the `events` mirror table.

use crate::models::{EventRow, NewEvent};
use crate::schema::events;
use crate::DatabaseResult;
use almanac_error::DatabaseError;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// CRUD for the local mirror of bot-created calendar events.
#[derive(Clone)]
pub struct EventRepository {
    conn: Arc<Mutex<PgConnection>>,
}

impl EventRepository {
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

    /// Record (or refresh) a mirrored event, keyed by Google event id.
    #[instrument(skip(self, event), fields(google_event_id = %event.google_event_id))]
    pub async fn record(&self, event: &NewEvent) -> DatabaseResult<EventRow> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(events::table)
            .values(event)
            .on_conflict(events::google_event_id)
            .do_update()
            .set((
                events::title.eq(&event.title),
                events::description.eq(&event.description),
                events::location.eq(&event.location),
                events::start_at.eq(event.start_at),
                events::end_at.eq(event.end_at),
                events::attendees.eq(&event.attendees),
                events::html_link.eq(&event.html_link),
                events::updated_at.eq(diesel::dsl::now),
            ))
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// List a user's mirrored events starting after `after`, soonest first.
    #[instrument(skip(self))]
    pub async fn list_upcoming(
        &self,
        discord_user_id: i64,
        after: DateTime<Utc>,
        limit: i64,
    ) -> DatabaseResult<Vec<EventRow>> {
        let mut conn = self.conn.lock().await;

        events::table
            .filter(events::discord_user_id.eq(discord_user_id))
            .filter(events::start_at.ge(after))
            .order(events::start_at.asc())
            .limit(limit)
            .load(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Look up a mirrored event by Google event id.
    #[instrument(skip(self))]
    pub async fn get_by_google_id(
        &self,
        google_event_id: &str,
    ) -> DatabaseResult<Option<EventRow>> {
        let mut conn = self.conn.lock().await;

        events::table
            .filter(events::google_event_id.eq(google_event_id))
            .first(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Remove a mirrored event. Returns whether a row existed.
    #[instrument(skip(self))]
    pub async fn delete_by_google_id(&self, google_event_id: &str) -> DatabaseResult<bool> {
        let mut conn = self.conn.lock().await;

        diesel::delete(events::table.filter(events::google_event_id.eq(google_event_id)))
            .execute(&mut *conn)
            .map(|rows| rows > 0)
            .map_err(DatabaseError::from)
    }
}
