//! Environment-driven configuration.

use almanac_error::ConfigError;
use chrono_tz::Tz;
use std::env;

/// Runtime configuration, read from the environment (a `.env` file is
/// loaded first when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Discord bot token; when absent only the HTTP surface runs
    pub discord_token: Option<String>,
    /// Postgres connection URL
    pub database_url: String,
    /// Public base URL of this service, no trailing slash
    pub base_url: String,
    /// HTTP bind host
    pub http_host: String,
    /// HTTP bind port
    pub http_port: u16,
    /// Fallback timezone for users who have not set one
    pub default_tz: Tz,
    /// Base64-encoded 32-byte AES key for token sealing
    pub token_key: String,
    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase anon key, forwarded on the authorize URL when set
    pub supabase_anon_key: Option<String>,
}

fn require(name: &str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::new(format!("{name} not set")))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first missing or malformed
    /// variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = require("DATABASE_URL")?;
        let base_url = require("BASE_URL")?.trim_end_matches('/').to_string();
        let token_key = require("TOKEN_KEY")?;
        let supabase_url = require("SUPABASE_URL")?;

        let http_port = match optional("HTTP_PORT") {
            Some(port) => port
                .parse()
                .map_err(|_| ConfigError::new(format!("HTTP_PORT is not a port: {port}")))?,
            None => 8080,
        };
        let default_tz = optional("DEFAULT_TZ")
            .unwrap_or_else(|| "Australia/Melbourne".to_string())
            .parse::<Tz>()
            .map_err(|e| ConfigError::new(format!("DEFAULT_TZ: {e}")))?;

        Ok(Self {
            discord_token: optional("DISCORD_TOKEN"),
            database_url,
            base_url,
            http_host: optional("HTTP_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            http_port,
            default_tz,
            token_key,
            supabase_url,
            supabase_anon_key: optional("SUPABASE_ANON_KEY"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment access is process-global, so all cases live in one test.
    #[test]
    fn from_env_round_trip() {
        env::set_var("DATABASE_URL", "postgres://localhost/almanac_test");
        env::set_var("BASE_URL", "https://bot.example/");
        env::set_var("TOKEN_KEY", "a".repeat(43));
        env::set_var("SUPABASE_URL", "https://proj.supabase.co");
        env::set_var("HTTP_PORT", "9090");
        env::remove_var("DISCORD_TOKEN");
        env::remove_var("DEFAULT_TZ");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://bot.example");
        assert_eq!(config.http_port, 9090);
        assert_eq!(config.default_tz.name(), "Australia/Melbourne");
        assert!(config.discord_token.is_none());

        env::set_var("HTTP_PORT", "not-a-port");
        assert!(AppConfig::from_env().is_err());
        env::remove_var("HTTP_PORT");

        env::remove_var("DATABASE_URL");
        let err = AppConfig::from_env().unwrap_err();
        assert!(err.message.contains("DATABASE_URL"));
    }
}
