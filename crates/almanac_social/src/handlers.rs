//! Command handler logic.
//!
//! Each handler resolves options, talks to Google and the database through
//! [`BotContext`], and returns a [`Reply`] for the gateway layer to send as
//! an ephemeral followup. User mistakes (bad times, unknown timezones) are
//! friendly text replies, not errors.

use crate::commands::{int_option, str_option};
use crate::{embeds, BotContext, DiscordError, DiscordErrorKind};
use almanac_core::{split_attendees, EventDraft, EventPatch, EventSummary, EventWhen, TimeRange};
use almanac_database::{EventRow, NewEvent, NewReminder};
use almanac_gcal::{find_open_slots, Frequency, FreeBusyRequest, GcalEvent, Recurrence, SlotOptions};
use almanac_parse::parse_range;
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde_json::json;
use serenity::builder::CreateEmbed;
use serenity::model::application::ResolvedOption;
use tracing::{info, instrument, warn};

/// Help text shown when a `when` option cannot be parsed.
const TIME_HELP: &str = "I couldn't understand that time. Try formats like:\n\
    • `tomorrow 3pm`\n\
    • `next Monday 2-4pm`\n\
    • `December 25th 10am`\n\
    • `in 2 hours`";

/// What a handler wants sent back to the user.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Plain text message
    Text(String),
    /// Single embed
    Embed(Box<CreateEmbed>),
}

impl Reply {
    fn text(content: impl Into<String>) -> Self {
        Reply::Text(content.into())
    }

    fn embed(embed: CreateEmbed) -> Self {
        Reply::Embed(Box::new(embed))
    }
}

/// Route a deferred command to its handler.
#[instrument(skip(ctx, options))]
pub async fn dispatch(
    ctx: &BotContext,
    name: &str,
    discord_id: i64,
    guild_id: Option<i64>,
    channel_id: i64,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    match name {
        "connect" => connect(ctx, discord_id).await,
        "addevent" => addevent(ctx, discord_id, guild_id, channel_id, options).await,
        "myevents" => myevents(ctx, discord_id, guild_id, options).await,
        "set-tz" => set_tz(ctx, discord_id, guild_id, options).await,
        "findevent" => findevent(ctx, discord_id, guild_id, options).await,
        "eventdetails" => eventdetails(ctx, discord_id, guild_id, options).await,
        "deleteevent" => deleteevent(ctx, discord_id, options).await,
        "modifyevent" => modifyevent(ctx, discord_id, guild_id, options).await,
        "suggest" => suggest(ctx, discord_id, guild_id, options).await,
        other => Err(DiscordError::new(DiscordErrorKind::UnknownCommand(
            other.to_string(),
        ))),
    }
}

fn required<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Result<&'a str, DiscordError> {
    str_option(options, name)
        .ok_or_else(|| DiscordError::new(DiscordErrorKind::InvalidOption(name.to_string())))
}

/// `/connect` — hand out the OAuth entry link.
async fn connect(ctx: &BotContext, discord_id: i64) -> Result<Reply, DiscordError> {
    let user = ctx.ensure_user(discord_id).await?;
    let url = format!("{}/connect/{}", ctx.base_url, discord_id);
    Ok(Reply::embed(embeds::connect(&url, user.is_connected())))
}

/// `/addevent` — parse, conflict-check, insert, mirror, and maybe remind.
async fn addevent(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    channel_id: i64,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let title = required(options, "title")?;
    let when = required(options, "when")?;
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let Ok(range) = parse_range(when, tz) else {
        return Ok(Reply::text(TIME_HELP));
    };

    let mut draft = EventDraft::new(title, range, tz.name());
    draft.attendees = str_option(options, "attendees")
        .map(split_attendees)
        .unwrap_or_default();
    draft.location = str_option(options, "location").map(str::to_string);
    draft.description = str_option(options, "description").map(str::to_string);
    draft.reminder_minutes = int_option(options, "reminder_minutes").map(|m| m as u32);
    draft.recurrence = str_option(options, "repeat")
        .and_then(Frequency::parse)
        .map(|f| Recurrence::new(f).to_string());

    let busy = ctx
        .calendar
        .free_busy(&token, &FreeBusyRequest::primary(range))
        .await?
        .busy_periods();
    let conflict = busy
        .iter()
        .any(|period| range.overlaps_with_buffer(period, Duration::zero()));

    let created = ctx
        .calendar
        .insert_event(&token, &GcalEvent::from_draft(&draft))
        .await?;
    let summary = created.to_summary().ok_or_else(|| {
        DiscordError::new(DiscordErrorKind::CalendarError(
            "insert response missing event times".to_string(),
        ))
    })?;

    // Mirror the times Google reports, not the parsed range; they can
    // differ once Google applies its own normalization.
    let start_at = summary
        .start
        .instant()
        .map_or(range.start, |dt| dt.with_timezone(&Utc));
    let end_at = summary
        .end
        .instant()
        .map_or(range.end, |dt| dt.with_timezone(&Utc));

    let user = ctx.ensure_user(discord_id).await?;
    ctx.events
        .record(&NewEvent {
            user_id: user.id,
            discord_user_id: discord_id,
            google_event_id: summary.id.clone(),
            title: summary.title.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            start_at,
            end_at,
            attendees: (!draft.attendees.is_empty()).then(|| json!(draft.attendees)),
            html_link: summary.html_link.clone(),
        })
        .await?;

    if let Some(minutes) = draft.reminder_minutes {
        let remind_at = start_at - Duration::minutes(minutes as i64);
        if remind_at > Utc::now() {
            // The invoking channel doubles as the delivery fallback when
            // the user's DMs are closed.
            ctx.reminders
                .schedule(&NewReminder {
                    user_id: user.id,
                    google_event_id: summary.id.clone(),
                    channel_id: guild_id.is_some().then_some(channel_id),
                    remind_at,
                })
                .await?;
        }
    }

    // Remember the first channel the bot is used in per guild, for
    // reminders that cannot fall back to their own channel.
    if let Some(guild_id) = guild_id {
        let settings = ctx.guilds.get(guild_id).await?;
        if settings.and_then(|s| s.default_channel_id).is_none() {
            ctx.guilds.set_default_channel(guild_id, channel_id).await?;
        }
    }

    ctx.metrics.record_event_created();
    info!(discord_id, google_event_id = %summary.id, "created event");
    Ok(Reply::embed(embeds::event_created(&summary, tz, conflict)))
}

/// `/myevents` — list upcoming events from Google.
async fn myevents(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let limit = int_option(options, "limit").unwrap_or(5).clamp(1, 25) as u8;
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let summaries: Vec<_> = match ctx.calendar.list_events(&token, Utc::now(), limit).await {
        Ok(events) => events.iter().filter_map(GcalEvent::to_summary).collect(),
        // When Google is briefly down, the local mirror of bot-created
        // events still answers.
        Err(e) if e.kind.is_retryable() => {
            warn!(error = %e, "calendar listing failed, serving the local mirror");
            let rows = ctx
                .events
                .list_upcoming(discord_id, Utc::now(), limit as i64)
                .await?;
            if rows.is_empty() {
                return Err(e.into());
            }
            rows.iter().map(mirror_summary).collect()
        }
        Err(e) => return Err(e.into()),
    };
    if summaries.is_empty() {
        return Ok(Reply::text("No upcoming events found."));
    }
    Ok(Reply::embed(embeds::event_list(
        "Your upcoming events",
        &summaries,
        tz,
    )))
}

/// Listing entry built from a mirrored event row.
fn mirror_summary(row: &EventRow) -> EventSummary {
    EventSummary {
        id: row.google_event_id.clone(),
        title: row.title.clone(),
        start: EventWhen::Instant(row.start_at.fixed_offset()),
        end: EventWhen::Instant(row.end_at.fixed_offset()),
        location: row.location.clone(),
        description: row.description.clone(),
        html_link: row.html_link.clone(),
    }
}

/// `/set-tz` — persist a timezone for the user or the whole guild.
async fn set_tz(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let input = required(options, "timezone")?;
    let Ok(tz) = input.parse::<Tz>() else {
        return Ok(Reply::text(format!(
            "Unknown timezone `{input}`. Use an IANA name like `Australia/Melbourne`, \
             `America/New_York`, `Europe/London`, `Asia/Tokyo`, or `UTC`."
        )));
    };

    match str_option(options, "scope") {
        Some("server") => {
            let Some(guild_id) = guild_id else {
                return Ok(Reply::text(
                    "Server scope only works inside a server. Run this in a channel there.",
                ));
            };
            ctx.guilds.set_default_tz(guild_id, tz.name()).await?;
            Ok(Reply::text(format!(
                "Server default timezone set to **{}**.",
                tz.name()
            )))
        }
        _ => {
            ctx.users.set_timezone(discord_id, tz.name()).await?;
            Ok(Reply::text(format!(
                "Your timezone is now **{}**.",
                tz.name()
            )))
        }
    }
}

/// `/findevent` — free-text search.
async fn findevent(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let query = required(options, "query")?;
    let limit = int_option(options, "limit").unwrap_or(5).clamp(1, 25) as u8;
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let events = ctx.calendar.search_events(&token, query, limit).await?;
    let summaries: Vec<_> = events.iter().filter_map(GcalEvent::to_summary).collect();
    if summaries.is_empty() {
        return Ok(Reply::text(format!("No events found matching \"{query}\".")));
    }
    Ok(Reply::embed(embeds::event_list(
        &format!("Events matching \"{query}\""),
        &summaries,
        tz,
    )))
}

/// `/eventdetails` — full detail view for one event.
async fn eventdetails(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let event_id = required(options, "event_id")?;
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let event = ctx.calendar.get_event(&token, event_id).await?;
    let details = event.to_details().ok_or_else(|| {
        DiscordError::new(DiscordErrorKind::CalendarError(
            "event response missing times".to_string(),
        ))
    })?;
    Ok(Reply::embed(embeds::event_details(&details, tz)))
}

/// `/deleteevent` — remove an event from the calendar and the mirror.
async fn deleteevent(
    ctx: &BotContext,
    discord_id: i64,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let event_id = required(options, "event_id")?;
    let token = ctx.access_token(discord_id).await?;

    ctx.calendar.delete_event(&token, event_id).await?;
    ctx.events.delete_by_google_id(event_id).await?;
    info!(discord_id, google_event_id = %event_id, "deleted event");
    Ok(Reply::text("Event deleted and removed from your calendar."))
}

/// `/modifyevent` — patch only the supplied fields.
async fn modifyevent(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let event_id = required(options, "event_id")?;
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let mut patch = EventPatch {
        title: str_option(options, "title").map(str::to_string),
        location: str_option(options, "location").map(str::to_string),
        description: str_option(options, "description").map(str::to_string),
        ..EventPatch::default()
    };
    if let Some(when) = str_option(options, "when") {
        let Ok(range) = parse_range(when, tz) else {
            return Ok(Reply::text(TIME_HELP));
        };
        patch.range = Some(range);
        patch.timezone = Some(tz.name().to_string());
    }
    if patch.is_empty() {
        return Ok(Reply::text(
            "Nothing to change. Pass at least one of `title`, `when`, `location`, or `description`.",
        ));
    }

    let updated = ctx
        .calendar
        .patch_event(&token, event_id, &GcalEvent::from_patch(&patch, tz.name()))
        .await?;
    let summary = updated.to_summary().ok_or_else(|| {
        DiscordError::new(DiscordErrorKind::CalendarError(
            "patch response missing event times".to_string(),
        ))
    })?;
    info!(discord_id, google_event_id = %summary.id, "updated event");
    Ok(Reply::embed(embeds::event_updated(&summary, tz)))
}

/// `/suggest` — find open meeting slots inside working hours.
async fn suggest(
    ctx: &BotContext,
    discord_id: i64,
    guild_id: Option<i64>,
    options: &[ResolvedOption<'_>],
) -> Result<Reply, DiscordError> {
    let duration = int_option(options, "duration_minutes").unwrap_or(60).clamp(15, 480);
    let days = int_option(options, "days_ahead").unwrap_or(7).clamp(1, 30);
    let tz = ctx.resolve_timezone(discord_id, guild_id).await;
    let token = ctx.access_token(discord_id).await?;

    let now = Utc::now();
    let window = TimeRange::new(now, now + Duration::days(days));
    let busy = ctx
        .calendar
        .free_busy(&token, &FreeBusyRequest::primary(window))
        .await?
        .busy_periods();

    // Slot search compares wall-clock hours, so both window and busy
    // periods move into the user's local frame first.
    let local_busy: Vec<TimeRange> = busy.iter().map(|r| local_frame(r, tz)).collect();
    let slot_options = SlotOptions {
        duration_minutes: duration,
        max_slots: 5,
        ..SlotOptions::default()
    };
    let slots = find_open_slots(&local_busy, local_frame(&window, tz), slot_options);
    if slots.is_empty() {
        return Ok(Reply::text(format!(
            "No free {duration}-minute slots found in the next {days} days."
        )));
    }
    Ok(Reply::embed(embeds::suggestions(&slots, tz)))
}

/// Re-express a UTC range as local wall-clock time in the Utc carrier type.
fn local_frame(range: &TimeRange, tz: Tz) -> TimeRange {
    TimeRange::new(local_instant(range.start, tz), local_instant(range.end, tz))
}

fn local_instant(instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(instant.with_timezone(&tz).naive_local(), Utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Australia::Melbourne;

    #[test]
    fn local_frame_shifts_by_offset() {
        // 05:00 UTC is 15:00 in Melbourne during June (AEST, +10).
        let start = Utc.with_ymd_and_hms(2025, 6, 3, 5, 0, 0).unwrap();
        let range = TimeRange::new(start, start + Duration::hours(1));
        let local = local_frame(&range, Melbourne);
        assert_eq!(local.start, Utc.with_ymd_and_hms(2025, 6, 3, 15, 0, 0).unwrap());
        assert_eq!(local.duration_minutes(), 60);
    }

    #[test]
    fn mirror_summary_carries_row_fields() {
        let start = Utc.with_ymd_and_hms(2025, 6, 3, 5, 0, 0).unwrap();
        let row = EventRow {
            id: 1,
            user_id: 1,
            discord_user_id: 42,
            google_event_id: "abc123".into(),
            title: "Standup".into(),
            description: None,
            location: Some("Room 4".into()),
            start_at: start,
            end_at: start + Duration::minutes(30),
            attendees: None,
            html_link: Some("https://calendar.google.com/event?eid=abc".into()),
            created_at: start,
            updated_at: start,
        };
        let summary = mirror_summary(&row);
        assert_eq!(summary.id, "abc123");
        assert_eq!(summary.location.as_deref(), Some("Room 4"));
        assert_eq!(
            summary.start.instant().map(|dt| dt.with_timezone(&Utc)),
            Some(start)
        );
    }

    #[test]
    fn time_help_lists_examples() {
        assert!(TIME_HELP.contains("tomorrow 3pm"));
        assert!(TIME_HELP.contains("next Monday 2-4pm"));
    }
}
