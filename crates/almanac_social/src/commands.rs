//! Slash command definitions and option extraction.

use serenity::builder::{CreateCommand, CreateCommandOption};
use serenity::model::application::{CommandOptionType, ResolvedOption, ResolvedValue};

/// All global slash commands this bot registers on startup.
pub fn registry() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("ping").description("Check that the bot is alive"),
        CreateCommand::new("connect").description("Link your Google Calendar"),
        CreateCommand::new("addevent")
            .description("Create a calendar event")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "title", "Event title")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "when",
                    "When, e.g. 'tomorrow 3pm' or 'next Monday 2-4pm'",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "attendees",
                "Comma-separated attendee emails",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "location",
                "Where the event happens",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "description",
                "Longer description",
            ))
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "reminder_minutes",
                    "DM reminder this many minutes before the event",
                )
                .min_int_value(1)
                .max_int_value(10080),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "repeat",
                    "Repeat the event",
                )
                .add_string_choice("daily", "daily")
                .add_string_choice("weekly", "weekly")
                .add_string_choice("monthly", "monthly")
                .add_string_choice("yearly", "yearly"),
            ),
        CreateCommand::new("myevents")
            .description("List your upcoming events")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "How many events to show (default 5)",
                )
                .min_int_value(1)
                .max_int_value(25),
            ),
        CreateCommand::new("set-tz")
            .description("Set your timezone")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "timezone",
                    "IANA timezone name, e.g. Australia/Melbourne",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "scope",
                    "Apply to yourself or as the server default",
                )
                .add_string_choice("user", "user")
                .add_string_choice("server", "server"),
            ),
        CreateCommand::new("findevent")
            .description("Search your calendar events")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "query", "Search text")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "limit",
                    "How many matches to show (default 5)",
                )
                .min_int_value(1)
                .max_int_value(25),
            ),
        CreateCommand::new("eventdetails")
            .description("Show full details for an event")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "event_id",
                    "Event ID from /myevents or /findevent",
                )
                .required(true),
            ),
        CreateCommand::new("deleteevent")
            .description("Delete a calendar event")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "event_id",
                    "Event ID from /myevents or /findevent",
                )
                .required(true),
            ),
        CreateCommand::new("modifyevent")
            .description("Change fields on an existing event")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "event_id",
                    "Event ID from /myevents or /findevent",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "title",
                "New title",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "when",
                "New time, e.g. 'friday 10am-11am'",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "location",
                "New location",
            ))
            .add_option(CreateCommandOption::new(
                CommandOptionType::String,
                "description",
                "New description",
            )),
        CreateCommand::new("suggest")
            .description("Suggest free meeting times")
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "duration_minutes",
                    "Meeting length (default 60)",
                )
                .min_int_value(15)
                .max_int_value(480),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::Integer,
                    "days_ahead",
                    "How many days to search (default 7)",
                )
                .min_int_value(1)
                .max_int_value(30),
            ),
    ]
}

/// Extract a string option by name.
pub fn str_option<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find(|o| o.name == name).and_then(|o| match o.value {
        ResolvedValue::String(s) => Some(s),
        _ => None,
    })
}

/// Extract an integer option by name.
pub fn int_option(options: &[ResolvedOption<'_>], name: &str) -> Option<i64> {
    options.iter().find(|o| o.name == name).and_then(|o| match o.value {
        ResolvedValue::Integer(i) => Some(i),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_covers_all_commands() {
        let names: Vec<String> = registry()
            .iter()
            .map(|c| {
                serde_json::to_value(c).unwrap()["name"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        for expected in [
            "ping",
            "connect",
            "addevent",
            "myevents",
            "set-tz",
            "findevent",
            "eventdetails",
            "deleteevent",
            "modifyevent",
            "suggest",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn addevent_requires_title_and_when() {
        let addevent = registry()
            .into_iter()
            .map(|c| serde_json::to_value(&c).unwrap())
            .find(|v| v["name"] == "addevent")
            .unwrap();
        let required: Vec<&str> = addevent["options"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|o| o["required"].as_bool().unwrap_or(false))
            .map(|o| o["name"].as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["title", "when"]);
    }
}
