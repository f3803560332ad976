//! Reminder delivery loop.
//!
//! Every tick loads due unsent reminders, DMs the owner an embed for the
//! event, and marks the reminder sent. Failed deliveries bump a retry
//! counter; the due query stops returning a reminder once the counter
//! reaches the retry cap.

use crate::schedule::{Schedule, ScheduleCheck, ScheduleType};
use crate::ServiceMetrics;
use almanac_database::{EventRepository, EventRow, ReminderRepository, ReminderRow, UserRepository};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::http::Http;
use serenity::model::id::{ChannelId, UserId};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Background worker that delivers event reminders over Discord DM.
pub struct ReminderScheduler {
    http: Arc<Http>,
    reminders: ReminderRepository,
    events: EventRepository,
    users: UserRepository,
    metrics: ServiceMetrics,
    schedule: ScheduleType,
    default_tz: Tz,
}

impl ReminderScheduler {
    /// Create a scheduler ticking at the default 60-second interval.
    pub fn new(
        http: Arc<Http>,
        reminders: ReminderRepository,
        events: EventRepository,
        users: UserRepository,
        metrics: ServiceMetrics,
        default_tz: Tz,
    ) -> Self {
        Self {
            http,
            reminders,
            events,
            users,
            metrics,
            schedule: ScheduleType::Interval { seconds: 60 },
            default_tz,
        }
    }

    /// Override the tick schedule.
    pub fn with_schedule(mut self, schedule: ScheduleType) -> Self {
        self.schedule = schedule;
        self
    }

    /// Run the delivery loop until the schedule is exhausted.
    ///
    /// An `Interval` schedule never exhausts; `Once` and `Immediate`
    /// schedules return after their single tick.
    pub async fn run(self) {
        info!(schedule = ?self.schedule, "reminder scheduler started");
        let mut last_run: Option<DateTime<Utc>> = None;

        loop {
            let ScheduleCheck {
                should_run,
                next_run,
            } = self.schedule.check(last_run);

            if should_run {
                self.process_due().await;
                last_run = Some(Utc::now());
            }

            let Some(next_run) = next_run.or_else(|| {
                // A just-executed tick reports its own follow-up time.
                should_run
                    .then(|| self.schedule.next_execution(Utc::now()))
                    .flatten()
            }) else {
                info!("reminder schedule exhausted");
                return;
            };

            let wait = (next_run - Utc::now())
                .to_std()
                .unwrap_or(std::time::Duration::ZERO);
            tokio::time::sleep(wait).await;
        }
    }

    /// Deliver every due reminder once.
    #[instrument(skip(self))]
    pub async fn process_due(&self) {
        let due = match self.reminders.due(Utc::now()).await {
            Ok(due) => due,
            Err(e) => {
                error!(error = %e, "failed to load due reminders");
                return;
            }
        };
        if due.is_empty() {
            return;
        }
        debug!(count = due.len(), "processing due reminders");

        for reminder in due {
            match self.deliver(&reminder).await {
                Ok(()) => {
                    self.metrics.record_reminder_sent();
                    if let Err(e) = self.reminders.mark_sent(reminder.id).await {
                        error!(error = %e, reminder_id = reminder.id, "failed to mark reminder sent");
                    }
                }
                Err(e) => {
                    warn!(error = %e, reminder_id = reminder.id, "reminder delivery failed");
                    self.metrics.record_reminder_failure();
                    if let Err(e) = self.reminders.bump_retries(reminder.id).await {
                        error!(error = %e, reminder_id = reminder.id, "failed to bump reminder retries");
                    }
                }
            }
        }
    }

    /// DM the reminder's owner an embed for the upcoming event.
    async fn deliver(&self, reminder: &ReminderRow) -> Result<(), String> {
        let event = self
            .events
            .get_by_google_id(&reminder.google_event_id)
            .await
            .map_err(|e| e.to_string())?
            .ok_or_else(|| format!("no mirrored event {}", reminder.google_event_id))?;

        let tz = self.user_timezone(event.discord_user_id).await;
        let embed = reminder_embed(&event, tz);

        if let Err(dm_error) = self.send_dm(event.discord_user_id, embed.clone()).await {
            // Closed DMs fall back to the channel the event was created in.
            let Some(channel_id) = reminder.channel_id else {
                return Err(dm_error);
            };
            warn!(
                error = %dm_error,
                channel_id,
                "DM failed, falling back to origin channel"
            );
            ChannelId::new(channel_id as u64)
                .send_message(&self.http, CreateMessage::new().embed(embed))
                .await
                .map_err(|e| e.to_string())?;
        }

        info!(
            discord_id = event.discord_user_id,
            google_event_id = %reminder.google_event_id,
            "delivered reminder"
        );
        Ok(())
    }

    async fn send_dm(&self, discord_id: i64, embed: CreateEmbed) -> Result<(), String> {
        let channel = UserId::new(discord_id as u64)
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| e.to_string())?;
        channel
            .id
            .send_message(&self.http, CreateMessage::new().embed(embed))
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }

    async fn user_timezone(&self, discord_id: i64) -> Tz {
        match self.users.get_by_discord_id(discord_id).await {
            Ok(Some(user)) => user
                .tz
                .as_deref()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(self.default_tz),
            _ => self.default_tz,
        }
    }
}

/// Build the reminder DM embed, times rendered in the user's timezone.
fn reminder_embed(event: &EventRow, tz: Tz) -> CreateEmbed {
    let start = event.start_at.with_timezone(&tz);
    let mut embed = CreateEmbed::new()
        .title(format!("Reminder: {}", event.title))
        .field(
            "When",
            start.format("%A, %B %d at %I:%M %p %Z").to_string(),
            false,
        )
        .color(0xFFA500);
    if let Some(location) = &event.location {
        embed = embed.field("Where", location.clone(), false);
    }
    if let Some(link) = &event.html_link {
        embed = embed.field("Link", link.clone(), false);
    }
    embed
}
