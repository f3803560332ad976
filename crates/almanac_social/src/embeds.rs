//! Embed rendering for command replies.

use almanac_core::{EventDetails, EventSummary, EventWhen, ResponseStatus, TimeRange};
use chrono_tz::Tz;
use serenity::builder::CreateEmbed;

const GREEN: u32 = 0x2ECC71;
const BLUE: u32 = 0x3498DB;
const ORANGE: u32 = 0xE67E22;

/// Render an event boundary in the user's timezone.
pub(crate) fn format_when(when: &EventWhen, tz: Tz) -> String {
    match when {
        EventWhen::Instant(dt) => dt
            .with_timezone(&tz)
            .format("%A, %B %d at %I:%M %p")
            .to_string(),
        EventWhen::AllDay(date) => format!("{} (all day)", date.format("%A, %B %d")),
    }
}

/// One listing line: time, title, optional link.
fn summary_line(summary: &EventSummary, tz: Tz) -> String {
    let when = format_when(&summary.start, tz);
    match &summary.html_link {
        Some(link) => format!("**{}** — [{}]({})", when, summary.title, link),
        None => format!("**{}** — {}", when, summary.title),
    }
}

/// `/connect` reply pointing the user at the OAuth entry route.
pub fn connect(url: &str, reconnect: bool) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("Connect Google Calendar")
        .description(format!(
            "[Click here to link your Google Calendar]({url})\n\nThe link is valid for 5 minutes. \
             Once you approve access you can close the tab and come back to Discord."
        ))
        .color(BLUE);
    if reconnect {
        embed = embed.field(
            "Already connected",
            "Linking again replaces your saved Google credential.",
            false,
        );
    }
    embed
}

/// `/addevent` success reply.
pub fn event_created(summary: &EventSummary, tz: Tz, conflict: bool) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("Event created")
        .description(summary.title.clone())
        .field("Starts", format_when(&summary.start, tz), true)
        .field("Ends", format_when(&summary.end, tz), true)
        .field("Timezone", tz.name(), true)
        .color(GREEN);
    if let Some(location) = &summary.location {
        embed = embed.field("Where", location.clone(), false);
    }
    if conflict {
        embed = embed
            .field(
                "Heads up",
                "This overlaps another event on your calendar.",
                false,
            )
            .color(ORANGE);
    }
    if let Some(link) = &summary.html_link {
        embed = embed.field("Link", format!("[Open in Google Calendar]({link})"), false);
    }
    embed
}

/// Listing reply for `/myevents` and `/findevent`.
pub fn event_list(title: &str, summaries: &[EventSummary], tz: Tz) -> CreateEmbed {
    let body = summaries
        .iter()
        .map(|s| summary_line(s, tz))
        .collect::<Vec<_>>()
        .join("\n");
    CreateEmbed::new().title(title.to_string()).description(body).color(BLUE)
}

/// `/eventdetails` reply.
pub fn event_details(details: &EventDetails, tz: Tz) -> CreateEmbed {
    let summary = &details.summary;
    let mut embed = CreateEmbed::new()
        .title(summary.title.clone())
        .field("Starts", format_when(&summary.start, tz), true)
        .field("Ends", format_when(&summary.end, tz), true)
        .color(BLUE);
    if let Some(location) = &summary.location {
        embed = embed.field("Where", location.clone(), false);
    }
    if let Some(description) = &summary.description {
        embed = embed.field("Description", description.clone(), false);
    }
    if let Some(creator) = &details.creator {
        embed = embed.field("Creator", creator.clone(), true);
    }
    if let Some(organizer) = &details.organizer {
        embed = embed.field("Organizer", organizer.clone(), true);
    }
    if !details.attendees.is_empty() {
        let mut lines: Vec<String> = details
            .attendees
            .iter()
            .take(5)
            .map(|a| format!("• {} ({})", a.email, rsvp_label(a.response_status)))
            .collect();
        if details.attendees.len() > 5 {
            lines.push(format!("…and {} more", details.attendees.len() - 5));
        }
        embed = embed.field("Attendees", lines.join("\n"), false);
    }
    if let Some(link) = &summary.html_link {
        embed = embed.field("Link", format!("[Open in Google Calendar]({link})"), false);
    }
    embed = embed.field("Event ID", format!("`{}`", summary.id), false);
    embed
}

fn rsvp_label(status: ResponseStatus) -> &'static str {
    match status {
        ResponseStatus::NeedsAction => "needs action",
        ResponseStatus::Declined => "declined",
        ResponseStatus::Tentative => "tentative",
        ResponseStatus::Accepted => "accepted",
    }
}

/// `/modifyevent` success reply.
pub fn event_updated(summary: &EventSummary, tz: Tz) -> CreateEmbed {
    CreateEmbed::new()
        .title("Event updated")
        .description(summary.title.clone())
        .field("Starts", format_when(&summary.start, tz), true)
        .field("Ends", format_when(&summary.end, tz), true)
        .color(GREEN)
}

/// `/suggest` reply. Slots carry local wall-clock times in the Utc carrier
/// type, so they render without further conversion.
pub fn suggestions(slots: &[TimeRange], tz: Tz) -> CreateEmbed {
    let body = slots
        .iter()
        .map(|slot| {
            format!(
                "• {} – {}",
                slot.start.format("%A, %B %d at %I:%M %p"),
                slot.end.format("%I:%M %p")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    CreateEmbed::new()
        .title("Suggested meeting times")
        .description(body)
        .field("Timezone", tz.name(), false)
        .color(BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate};
    use chrono_tz::Australia::Melbourne;

    fn instant(s: &str) -> EventWhen {
        EventWhen::Instant(DateTime::<FixedOffset>::parse_from_rfc3339(s).unwrap())
    }

    #[test]
    fn timed_boundary_renders_in_local_time() {
        let when = instant("2025-06-03T05:00:00Z");
        assert_eq!(
            format_when(&when, Melbourne),
            "Tuesday, June 03 at 03:00 PM"
        );
    }

    #[test]
    fn all_day_boundary_renders_date_only() {
        let when = EventWhen::AllDay(NaiveDate::from_ymd_opt(2025, 6, 3).unwrap());
        assert_eq!(format_when(&when, Melbourne), "Tuesday, June 03 (all day)");
    }

    #[test]
    fn connect_embed_warns_on_reconnect() {
        let fresh = serde_json::to_value(connect("https://bot.example/connect/1", false)).unwrap();
        let field_count = fresh
            .get("fields")
            .and_then(|f| f.as_array())
            .map_or(0, |a| a.len());
        assert_eq!(field_count, 0);

        let again = serde_json::to_value(connect("https://bot.example/connect/1", true)).unwrap();
        assert_eq!(again["fields"][0]["name"], "Already connected");
    }

    #[test]
    fn summary_line_links_title_when_possible() {
        let summary = EventSummary {
            id: "e1".into(),
            title: "Standup".into(),
            start: instant("2025-06-03T05:00:00Z"),
            end: instant("2025-06-03T06:00:00Z"),
            location: None,
            description: None,
            html_link: Some("https://calendar.google.com/event?eid=e1".into()),
        };
        let line = summary_line(&summary, Melbourne);
        assert!(line.contains("[Standup](https://calendar.google.com/event?eid=e1)"));
        assert!(line.starts_with("**Tuesday, June 03 at 03:00 PM**"));
    }
}
