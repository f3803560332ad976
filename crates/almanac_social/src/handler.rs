//! Serenity event handler: command registration and interaction dispatch.

use crate::handlers::{self, Reply};
use crate::{commands, BotContext, DiscordError, DiscordErrorKind};
use serenity::async_trait;
use serenity::builder::{
    CreateInteractionResponse, CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
};
use serenity::client::{Context, EventHandler};
use serenity::model::application::{Command, CommandInteraction, Interaction};
use serenity::model::gateway::{GatewayIntents, Ready};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Gateway event handler for the Almanac bot.
pub struct AlmanacHandler {
    context: Arc<BotContext>,
}

impl AlmanacHandler {
    /// Create a handler over the shared bot context.
    pub fn new(context: Arc<BotContext>) -> Self {
        Self { context }
    }

    /// Required gateway intents. Slash commands arrive over the interactions
    /// gateway, so only the baseline guild intent is needed.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::DIRECT_MESSAGES
    }

    /// Translate a handler error into the reply the user sees.
    async fn user_message(&self, error: &DiscordError, discord_id: i64) -> String {
        match error.kind() {
            DiscordErrorKind::NotConnected => {
                "Please connect your Google Calendar first using `/connect`.".to_string()
            }
            DiscordErrorKind::TokenRejected => {
                self.context.discard_token(discord_id).await;
                "Your Google connection has expired. Please `/connect` again.".to_string()
            }
            DiscordErrorKind::EventNotFound(_) => {
                "Event not found. Check the event ID and try again.".to_string()
            }
            DiscordErrorKind::CalendarError(_) => {
                self.context.metrics.record_calendar_error();
                "Google Calendar is having trouble right now. Please try again shortly."
                    .to_string()
            }
            DiscordErrorKind::InvalidOption(name) => {
                format!("Missing or invalid option `{name}`.")
            }
            _ => "Something went wrong handling that command.".to_string(),
        }
    }

    async fn handle_command(&self, ctx: &Context, command: &CommandInteraction) {
        self.context.metrics.record_command();
        let user_id = command.user.id.get();

        let limited = self.context.limiter.lock().check(user_id);
        if let Err(wait) = limited {
            warn!(user_id, wait_secs = wait.as_secs(), "rate limited command");
            let message = CreateInteractionResponseMessage::new()
                .content(format!(
                    "You're sending commands too quickly. Try again in {} seconds.",
                    wait.as_secs().max(1)
                ))
                .ephemeral(true);
            if let Err(e) = command
                .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                .await
            {
                error!(error = %e, "failed to send rate limit reply");
            }
            return;
        }

        // Liveness check answers inline; everything else defers before
        // calling outward.
        if command.data.name == "ping" {
            let message = CreateInteractionResponseMessage::new()
                .content("Pong!")
                .ephemeral(true);
            if let Err(e) = command
                .create_response(&ctx.http, CreateInteractionResponse::Message(message))
                .await
            {
                error!(error = %e, "failed to send pong");
            }
            return;
        }

        if let Err(e) = command.defer_ephemeral(&ctx.http).await {
            error!(error = %e, command = %command.data.name, "failed to defer interaction");
            return;
        }

        let discord_id = user_id as i64;
        let guild_id = command.guild_id.map(|g| g.get() as i64);
        let channel_id = command.channel_id.get() as i64;
        let options = command.data.options();
        let result = handlers::dispatch(
            &self.context,
            &command.data.name,
            discord_id,
            guild_id,
            channel_id,
            &options,
        )
        .await;

        let followup = match result {
            Ok(Reply::Text(content)) => CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true),
            Ok(Reply::Embed(embed)) => CreateInteractionResponseFollowup::new()
                .embed(*embed)
                .ephemeral(true),
            Err(e) => {
                warn!(error = %e, command = %command.data.name, "command failed");
                self.context.metrics.record_command_failure();
                CreateInteractionResponseFollowup::new()
                    .content(self.user_message(&e, discord_id).await)
                    .ephemeral(true)
            }
        };
        if let Err(e) = command.create_followup(&ctx.http, followup).await {
            error!(error = %e, command = %command.data.name, "failed to send followup");
        }
    }
}

#[async_trait]
impl EventHandler for AlmanacHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "discord gateway ready");
        match Command::set_global_commands(&ctx.http, commands::registry()).await {
            Ok(registered) => info!(count = registered.len(), "registered global commands"),
            Err(e) => error!(error = %e, "failed to register global commands"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Command(command) = interaction {
            self.handle_command(&ctx, &command).await;
        }
    }
}
