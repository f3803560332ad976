//! Repository for the `reminders` table.

use crate::models::{NewReminder, ReminderRow};
use crate::schema::reminders;
use crate::DatabaseResult;
use almanac_error::DatabaseError;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::instrument;

/// Reminders are abandoned after this many failed delivery attempts.
pub const MAX_RETRIES: i32 = 3;

/// CRUD for pending reminder deliveries.
#[derive(Clone)]
pub struct ReminderRepository {
    conn: Arc<Mutex<PgConnection>>,
}

impl ReminderRepository {
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

    /// Schedule a reminder. Re-scheduling the same event at the same time is
    /// a no-op, so repeated `/addevent` retries cannot double-deliver.
    #[instrument(skip(self, reminder), fields(google_event_id = %reminder.google_event_id))]
    pub async fn schedule(&self, reminder: &NewReminder) -> DatabaseResult<Option<ReminderRow>> {
        let mut conn = self.conn.lock().await;

        diesel::insert_into(reminders::table)
            .values(reminder)
            .on_conflict((reminders::google_event_id, reminders::remind_at))
            .do_nothing()
            .get_result(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)
    }

    /// Load unsent reminders due at or before `now` that still have retry
    /// budget, oldest first.
    #[instrument(skip(self))]
    pub async fn due(&self, now: DateTime<Utc>) -> DatabaseResult<Vec<ReminderRow>> {
        let mut conn = self.conn.lock().await;

        reminders::table
            .filter(reminders::sent.eq(false))
            .filter(reminders::remind_at.le(now))
            .filter(reminders::retries.lt(MAX_RETRIES))
            .order(reminders::remind_at.asc())
            .load(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Mark a reminder delivered.
    #[instrument(skip(self))]
    pub async fn mark_sent(&self, reminder_id: i32) -> DatabaseResult<()> {
        let mut conn = self.conn.lock().await;

        diesel::update(reminders::table.find(reminder_id))
            .set(reminders::sent.eq(true))
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(DatabaseError::from)
    }

    /// Count a failed delivery attempt.
    #[instrument(skip(self))]
    pub async fn bump_retries(&self, reminder_id: i32) -> DatabaseResult<()> {
        let mut conn = self.conn.lock().await;

        diesel::update(reminders::table.find(reminder_id))
            .set(reminders::retries.eq(reminders::retries + 1))
            .execute(&mut *conn)
            .map(|_| ())
            .map_err(DatabaseError::from)
    }
}
