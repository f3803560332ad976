//! Postgres-backed repository tests.
//!
//! These run against the database named by `DATABASE_URL` (loaded via
//! dotenvy). Without one each test returns early, so the suite passes in
//! environments with no Postgres.

use almanac_database::{
    establish_connection, ping, run_migrations, EventRepository, GuildSettingsRepository,
    NewEvent, NewReminder, ReminderRepository, UserRepository, MAX_RETRIES,
};
use chrono::{Duration, Utc};
use diesel::pg::PgConnection;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

static MIGRATE: std::sync::Mutex<()> = std::sync::Mutex::new(());
static SEQ: AtomicI64 = AtomicI64::new(0);

fn test_conn() -> Option<Arc<Mutex<PgConnection>>> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL").ok()?;
    let mut conn = establish_connection(&url).ok()?;
    {
        // Tests run in parallel; only one may apply pending migrations.
        let _guard = MIGRATE.lock().expect("migration guard");
        run_migrations(&mut conn).ok()?;
    }
    Some(Arc::new(Mutex::new(conn)))
}

/// Snowflake-sized ids unique across tests sharing one database.
fn unique_id() -> i64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock after epoch")
        .as_nanos() as i64
        & i64::MAX;
    nanos.wrapping_add(SEQ.fetch_add(1, Ordering::Relaxed)) & i64::MAX
}

#[tokio::test]
async fn ping_answers_on_live_connection() {
    let Some(conn) = test_conn() else { return };
    assert!(ping(&mut *conn.lock().await));
}

#[tokio::test]
async fn user_upsert_and_token_lifecycle() {
    let Some(conn) = test_conn() else { return };
    let users = UserRepository::from_arc(conn);
    let discord_id = unique_id();

    let created = users.ensure_user(discord_id).await.unwrap();
    let again = users.ensure_user(discord_id).await.unwrap();
    assert_eq!(created.id, again.id);
    assert!(!created.is_connected());

    let stored = users
        .store_token(discord_id, Some("a@x.com"), "sealed-envelope")
        .await
        .unwrap();
    assert_eq!(stored.id, created.id);
    assert!(stored.is_connected());
    assert_eq!(stored.email.as_deref(), Some("a@x.com"));

    // Changing the timezone leaves the credential alone.
    let tz_set = users
        .set_timezone(discord_id, "Australia/Melbourne")
        .await
        .unwrap();
    assert_eq!(tz_set.tz.as_deref(), Some("Australia/Melbourne"));
    assert!(tz_set.is_connected());

    users.clear_token(discord_id).await.unwrap();
    let cleared = users.get_by_discord_id(discord_id).await.unwrap().unwrap();
    assert!(!cleared.is_connected());
    assert_eq!(cleared.tz.as_deref(), Some("Australia/Melbourne"));
}

#[tokio::test]
async fn event_record_upserts_by_google_id() {
    let Some(conn) = test_conn() else { return };
    let users = UserRepository::from_arc(conn.clone());
    let events = EventRepository::from_arc(conn);

    let discord_id = unique_id();
    let user = users.ensure_user(discord_id).await.unwrap();
    let google_event_id = format!("evt-{discord_id}");
    let start = Utc::now() + Duration::hours(2);

    let new_event = NewEvent {
        user_id: user.id,
        discord_user_id: discord_id,
        google_event_id: google_event_id.clone(),
        title: "Standup".into(),
        description: None,
        location: None,
        start_at: start,
        end_at: start + Duration::hours(1),
        attendees: None,
        html_link: None,
    };
    let first = events.record(&new_event).await.unwrap();

    let renamed = NewEvent {
        title: "Retro".into(),
        ..new_event.clone()
    };
    let second = events.record(&renamed).await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.title, "Retro");

    let fetched = events.get_by_google_id(&google_event_id).await.unwrap();
    assert_eq!(fetched.unwrap().title, "Retro");
}

#[tokio::test]
async fn event_listing_orders_and_filters_by_start() {
    let Some(conn) = test_conn() else { return };
    let users = UserRepository::from_arc(conn.clone());
    let events = EventRepository::from_arc(conn);

    let discord_id = unique_id();
    let user = users.ensure_user(discord_id).await.unwrap();
    let base = Utc::now();

    for (suffix, offset_hours) in [("late", 4), ("soon", 1)] {
        events
            .record(&NewEvent {
                user_id: user.id,
                discord_user_id: discord_id,
                google_event_id: format!("evt-{discord_id}-{suffix}"),
                title: suffix.to_string(),
                description: None,
                location: None,
                start_at: base + Duration::hours(offset_hours),
                end_at: base + Duration::hours(offset_hours + 1),
                attendees: None,
                html_link: None,
            })
            .await
            .unwrap();
    }

    let upcoming = events.list_upcoming(discord_id, base, 10).await.unwrap();
    assert_eq!(upcoming.len(), 2);
    assert_eq!(upcoming[0].title, "soon");
    assert_eq!(upcoming[1].title, "late");

    // A cutoff after both starts leaves nothing.
    let later = events
        .list_upcoming(discord_id, base + Duration::hours(5), 10)
        .await
        .unwrap();
    assert!(later.is_empty());

    assert!(events
        .delete_by_google_id(&format!("evt-{discord_id}-soon"))
        .await
        .unwrap());
    assert!(!events
        .delete_by_google_id(&format!("evt-{discord_id}-soon"))
        .await
        .unwrap());
}

#[tokio::test]
async fn reminder_dedupe_and_retry_budget() {
    let Some(conn) = test_conn() else { return };
    let users = UserRepository::from_arc(conn.clone());
    let reminders = ReminderRepository::from_arc(conn);

    let discord_id = unique_id();
    let user = users.ensure_user(discord_id).await.unwrap();
    let google_event_id = format!("rem-{discord_id}");
    let remind_at = Utc::now() - Duration::minutes(1);

    let new_reminder = NewReminder {
        user_id: user.id,
        google_event_id: google_event_id.clone(),
        channel_id: None,
        remind_at,
    };
    let row = reminders
        .schedule(&new_reminder)
        .await
        .unwrap()
        .expect("first schedule inserts");
    // Same event at the same time is a no-op.
    assert!(reminders.schedule(&new_reminder).await.unwrap().is_none());

    let due = reminders.due(Utc::now()).await.unwrap();
    assert!(due.iter().any(|r| r.id == row.id));

    for _ in 0..MAX_RETRIES {
        reminders.bump_retries(row.id).await.unwrap();
    }
    let due = reminders.due(Utc::now()).await.unwrap();
    assert!(!due.iter().any(|r| r.id == row.id));

    let second = NewReminder {
        remind_at: remind_at - Duration::minutes(5),
        ..new_reminder.clone()
    };
    let row2 = reminders
        .schedule(&second)
        .await
        .unwrap()
        .expect("distinct time inserts");
    reminders.mark_sent(row2.id).await.unwrap();
    let due = reminders.due(Utc::now()).await.unwrap();
    assert!(!due.iter().any(|r| r.id == row2.id));
}

#[tokio::test]
async fn guild_settings_upsert_preserves_other_fields() {
    let Some(conn) = test_conn() else { return };
    let guilds = GuildSettingsRepository::from_arc(conn);
    let guild_id = unique_id();

    let with_tz = guilds
        .set_default_tz(guild_id, "Europe/London")
        .await
        .unwrap();
    assert_eq!(with_tz.default_tz.as_deref(), Some("Europe/London"));
    assert!(with_tz.default_channel_id.is_none());

    let with_channel = guilds.set_default_channel(guild_id, 777).await.unwrap();
    assert_eq!(with_channel.id, with_tz.id);
    assert_eq!(with_channel.default_channel_id, Some(777));
    assert_eq!(with_channel.default_tz.as_deref(), Some("Europe/London"));

    let fetched = guilds.get(guild_id).await.unwrap().unwrap();
    assert_eq!(fetched.default_channel_id, Some(777));
}
