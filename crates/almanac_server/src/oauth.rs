//! OAuth state brokering for the Supabase-hosted Google consent flow.
//!
//! Supabase performs the token exchange; this module only mints single-use
//! state tokens, builds the authorize URL, and stores the provider tokens
//! that come back on the callback.

use almanac_core::GoogleToken;
use almanac_error::{ServerError, ServerErrorKind};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use parking_lot::Mutex;
use rand::RngCore;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// How long a minted state token stays valid.
const STATE_TTL: Duration = Duration::from_secs(300);

/// Calendar scopes requested from Google through Supabase.
const SCOPES: &str = "openid email https://www.googleapis.com/auth/calendar";

/// In-memory cache of pending OAuth states.
///
/// States are `{discord_id}:{nonce}` strings, single use, expiring after
/// five minutes. Expired entries are purged opportunistically on each mint
/// and consume.
#[derive(Debug, Default)]
pub struct OAuthBroker {
    states: Mutex<HashMap<String, Instant>>,
}

impl OAuthBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a state token for a Discord user.
    #[instrument(skip(self))]
    pub fn mint_state(&self, discord_id: u64) -> String {
        let mut nonce = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut nonce);
        let state = format!("{discord_id}:{}", URL_SAFE_NO_PAD.encode(nonce));

        let now = Instant::now();
        let mut states = self.states.lock();
        states.retain(|_, expires_at| *expires_at > now);
        states.insert(state.clone(), now + STATE_TTL);
        state
    }

    /// Validate and consume a state token, returning the Discord user id.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the state is unknown, expired, already
    /// used, or malformed.
    #[instrument(skip(self, state))]
    pub fn consume_state(&self, state: &str) -> Result<u64, ServerError> {
        let now = Instant::now();
        let expires_at = {
            let mut states = self.states.lock();
            states.retain(|_, expires_at| *expires_at > now);
            states.remove(state)
        };

        match expires_at {
            Some(expires_at) if expires_at > now => state
                .split_once(':')
                .and_then(|(discord_id, _)| discord_id.parse().ok())
                .ok_or_else(|| ServerError::new(ServerErrorKind::InvalidState)),
            _ => {
                warn!("rejected unknown or expired OAuth state");
                Err(ServerError::new(ServerErrorKind::InvalidState))
            }
        }
    }
}

/// Build the Supabase authorize URL that starts the Google consent flow.
///
/// `redirect_to` is where Supabase sends the browser after the exchange;
/// it must be this service's `/oauth/callback` route.
pub fn authorize_url(
    supabase_url: &str,
    anon_key: Option<&str>,
    redirect_to: &str,
    state: &str,
) -> String {
    let mut url = format!(
        "{}/auth/v1/authorize?provider=google&scopes={}&access_type=offline&prompt=consent&redirect_to={}&state={}",
        supabase_url.trim_end_matches('/'),
        urlencode(SCOPES),
        urlencode(redirect_to),
        urlencode(state),
    );
    if let Some(key) = anon_key {
        url.push_str("&apikey=");
        url.push_str(&urlencode(key));
    }
    url
}

/// Assemble the token to seal from the callback query parameters.
///
/// # Errors
///
/// Returns `MissingParameter` when the provider access token is absent.
pub fn token_from_callback(
    provider_token: Option<String>,
    provider_refresh_token: Option<String>,
    expires_at: Option<i64>,
) -> Result<GoogleToken, ServerError> {
    let access_token = provider_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::new(ServerErrorKind::MissingParameter("provider_token".into())))?;
    info!("received provider tokens from callback");
    let mut token = GoogleToken::bearer(access_token);
    token.refresh_token = provider_refresh_token.filter(|t| !t.is_empty());
    token.expires_at = expires_at;
    Ok(token)
}

/// Success page shown after the tokens are stored.
pub fn success_page(discord_id: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <title>Almanac - Connected</title>
  <style>
    body {{ font-family: sans-serif; text-align: center; padding: 50px; background: #f0f2f5; }}
    .card {{ max-width: 480px; margin: 0 auto; background: white; padding: 40px; border-radius: 10px; }}
    .ok {{ color: #28a745; font-size: 24px; margin-bottom: 16px; }}
  </style>
</head>
<body>
  <div class="card">
    <div class="ok">Calendar connected</div>
    <p>Your Google Calendar is now linked to Discord user <code>{discord_id}</code>.</p>
    <p>Close this tab and head back to Discord. Try <code>/addevent tomorrow 3pm Standup</code> or <code>/myevents</code>.</p>
  </div>
</body>
</html>"#
    )
}

/// Minimal percent-encoding for query parameter values.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_state_carries_discord_id() {
        let broker = OAuthBroker::new();
        let state = broker.mint_state(123456789);
        assert!(state.starts_with("123456789:"));
        assert_eq!(broker.consume_state(&state).unwrap(), 123456789);
    }

    #[test]
    fn state_is_single_use() {
        let broker = OAuthBroker::new();
        let state = broker.mint_state(42);
        broker.consume_state(&state).unwrap();
        assert!(broker.consume_state(&state).is_err());
    }

    #[test]
    fn unknown_state_rejected() {
        let broker = OAuthBroker::new();
        assert!(broker.consume_state("42:bogus").is_err());
    }

    #[test]
    fn nonces_differ_between_mints() {
        let broker = OAuthBroker::new();
        assert_ne!(broker.mint_state(1), broker.mint_state(1));
    }

    #[test]
    fn authorize_url_carries_provider_and_state() {
        let url = authorize_url(
            "https://proj.supabase.co/",
            Some("anon-key"),
            "https://bot.example/oauth/callback",
            "42:abc",
        );
        assert!(url.starts_with("https://proj.supabase.co/auth/v1/authorize?provider=google"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=42%3Aabc"));
        assert!(url.contains("redirect_to=https%3A%2F%2Fbot.example%2Foauth%2Fcallback"));
        assert!(url.ends_with("&apikey=anon-key"));
    }

    #[test]
    fn callback_requires_provider_token() {
        assert!(token_from_callback(None, None, None).is_err());
        assert!(token_from_callback(Some(String::new()), None, None).is_err());

        let token =
            token_from_callback(Some("ya29.a0".into()), Some("1//refresh".into()), Some(1750000000))
                .unwrap();
        assert_eq!(token.access_token, "ya29.a0");
        assert_eq!(token.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(token.expires_at, Some(1750000000));
    }
}
