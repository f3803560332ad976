//! Shared state for command handlers.

use crate::{DiscordError, DiscordErrorKind};
use almanac_database::{
    EventRepository, GuildSettingsRepository, ReminderRepository, UserRepository, UserRow,
};
use almanac_gcal::CalendarClient;
use almanac_security::{RateLimiter, TokenCipher};
use almanac_server::ServiceMetrics;
use chrono::Utc;
use chrono_tz::Tz;
use diesel::pg::PgConnection;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Everything a command handler needs: repositories, the Calendar client,
/// the token cipher, the rate limiter, and service configuration.
///
/// All repositories share one database connection behind an async mutex.
pub struct BotContext {
    /// User rows and stored credentials
    pub users: UserRepository,
    /// Per-guild defaults
    pub guilds: GuildSettingsRepository,
    /// Local mirror of bot-created events
    pub events: EventRepository,
    /// Pending reminder deliveries
    pub reminders: ReminderRepository,
    /// Google Calendar API client
    pub calendar: CalendarClient,
    /// Token encryption
    pub cipher: Arc<TokenCipher>,
    /// Per-user command rate limiting
    pub limiter: Mutex<RateLimiter>,
    /// Shared counters
    pub metrics: ServiceMetrics,
    /// Public base URL for OAuth connect links, no trailing slash
    pub base_url: String,
    /// Timezone applied when neither the user nor the guild has chosen one
    pub default_tz: Tz,
}

impl BotContext {
    /// Build a context over a single shared database connection.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        conn: Arc<tokio::sync::Mutex<PgConnection>>,
        calendar: CalendarClient,
        cipher: Arc<TokenCipher>,
        limiter: RateLimiter,
        metrics: ServiceMetrics,
        base_url: impl Into<String>,
        default_tz: Tz,
    ) -> Self {
        Self {
            users: UserRepository::from_arc(conn.clone()),
            guilds: GuildSettingsRepository::from_arc(conn.clone()),
            events: EventRepository::from_arc(conn.clone()),
            reminders: ReminderRepository::from_arc(conn),
            calendar,
            cipher,
            limiter: Mutex::new(limiter),
            metrics,
            base_url: base_url.into(),
            default_tz,
        }
    }

    /// Resolve the timezone for a command: the user's choice, then the
    /// guild default, then the service default.
    #[instrument(skip(self))]
    pub async fn resolve_timezone(&self, discord_id: i64, guild_id: Option<i64>) -> Tz {
        if let Ok(Some(user)) = self.users.get_by_discord_id(discord_id).await {
            if let Some(tz) = user.tz.as_deref().and_then(|tz| tz.parse().ok()) {
                return tz;
            }
        }
        if let Some(guild_id) = guild_id {
            if let Ok(Some(settings)) = self.guilds.get(guild_id).await {
                if let Some(tz) = settings.default_tz.as_deref().and_then(|tz| tz.parse().ok()) {
                    return tz;
                }
            }
        }
        self.default_tz
    }

    /// Unseal the user's stored Google access token.
    ///
    /// # Errors
    ///
    /// `NotConnected` when the user has no stored credential; `TokenRejected`
    /// when the token's recorded expiry has passed; `CryptoError` when the
    /// envelope cannot be opened (key rotation).
    pub async fn access_token(&self, discord_id: i64) -> Result<String, DiscordError> {
        let user = self.users.get_by_discord_id(discord_id).await?;
        let ciphertext = user
            .as_ref()
            .and_then(|u| u.token_ciphertext.as_deref())
            .ok_or_else(|| DiscordError::new(DiscordErrorKind::NotConnected))?;
        let token = self.cipher.open_token(ciphertext)?;
        // Known-expired tokens skip the doomed API call and go straight to
        // the reconnect prompt.
        if token.is_expired_at(Utc::now().timestamp()) {
            return Err(DiscordError::new(DiscordErrorKind::TokenRejected));
        }
        Ok(token.access_token)
    }

    /// Drop a credential Google has rejected so the user can reconnect.
    pub async fn discard_token(&self, discord_id: i64) {
        if let Err(e) = self.users.clear_token(discord_id).await {
            warn!(error = %e, discord_id, "failed to clear rejected token");
        }
    }

    /// Fetch or create the user row backing a Discord snowflake.
    pub async fn ensure_user(&self, discord_id: i64) -> Result<UserRow, DiscordError> {
        Ok(self.users.ensure_user(discord_id).await?)
    }
}
