//! Discord bot client setup and lifecycle management.

use crate::handler::AlmanacHandler;
use crate::{BotContext, DiscordError, DiscordErrorKind};
use serenity::http::Http;
use serenity::Client;
use std::sync::Arc;
use tracing::{info, instrument};

/// Discord client for the Almanac bot.
///
/// Owns the Serenity client and shares the [`BotContext`] with the gateway
/// handler and the reminder scheduler.
pub struct AlmanacBot {
    client: Client,
    context: Arc<BotContext>,
}

impl AlmanacBot {
    /// Build the Serenity client with the Almanac event handler attached.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailed` when the client cannot be constructed.
    #[instrument(skip(token, context), fields(token_len = token.len()))]
    pub async fn new(token: String, context: Arc<BotContext>) -> Result<Self, DiscordError> {
        let handler = AlmanacHandler::new(context.clone());
        let intents = AlmanacHandler::intents();
        info!(?intents, "building serenity client");

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "failed to build client: {e}"
                )))
            })?;

        Ok(Self { client, context })
    }

    /// HTTP handle for REST calls outside the gateway (reminder DMs).
    pub fn http(&self) -> Arc<Http> {
        self.client.http.clone()
    }

    /// Shared handler state.
    pub fn context(&self) -> &Arc<BotContext> {
        &self.context
    }

    /// Connect to the gateway and run until shutdown.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailed` on a fatal gateway error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        info!("starting discord bot");
        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "client error: {e}"
            )))
        })
    }
}
