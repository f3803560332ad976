//! Provider credential returned by the Supabase OAuth callback.

use serde::{Deserialize, Serialize};

/// A Google OAuth token set, as handed back by Supabase.
///
/// Stored encrypted at rest; the plaintext JSON form of this struct is what
/// the token cipher seals and opens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleToken {
    /// Bearer token for Calendar API calls
    pub access_token: String,
    /// Refresh token, when Google granted one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Unix timestamp of access token expiry, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

impl GoogleToken {
    /// Wrap a bare access token with no refresh credential.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Whether the access token has expired as of `now` (Unix seconds).
    ///
    /// Tokens with no recorded expiry are assumed live; the Calendar API
    /// answers 401 if they are not, which surfaces as a reconnect prompt.
    pub fn is_expired_at(&self, now: i64) -> bool {
        match self.expires_at {
            Some(expiry) => now >= expiry,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_expiry_means_live() {
        assert!(!GoogleToken::bearer("ya29.x").is_expired_at(i64::MAX));
    }

    #[test]
    fn expiry_boundary_is_expired() {
        let token = GoogleToken {
            access_token: "ya29.x".into(),
            refresh_token: None,
            expires_at: Some(1_700_000_000),
        };
        assert!(!token.is_expired_at(1_699_999_999));
        assert!(token.is_expired_at(1_700_000_000));
    }

    #[test]
    fn refresh_token_omitted_from_json_when_absent() {
        let json = serde_json::to_string(&GoogleToken::bearer("t")).unwrap();
        assert!(!json.contains("refresh_token"));
    }
}
