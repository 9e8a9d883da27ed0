//! Access tokens for the password-grant auth variant.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Deserialize;
use tokio::sync::{Mutex, MutexGuard};

/// Tokens are refreshed this long before the server says they expire.
const EXPIRY_MARGIN_SECS: i64 = 30;

/// Body of a successful token exchange.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// A bearer token and the moment it stops being usable.
#[derive(Clone, Debug)]
pub struct AccessToken {
    pub value: String,
    pub token_type: String,
    /// `None` when the server did not say; such tokens are kept until a 401.
    pub expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// A lifetime at or below the margin yields an already expired token; one
    /// too large to represent is treated as no expiry.
    pub(crate) fn from_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            value: resp.access_token,
            token_type: resp.token_type.unwrap_or_else(|| "bearer".to_string()),
            expires_at: resp.expires_in.and_then(|secs| {
                let ttl = secs.saturating_sub(EXPIRY_MARGIN_SECS);
                if ttl <= 0 {
                    return Some(now);
                }
                ChronoDuration::try_seconds(ttl).and_then(|ttl| now.checked_add_signed(ttl))
            }),
        }
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// Per-client token slot. The lock is held across an exchange so concurrent
/// calls wait for one exchange instead of starting their own.
#[derive(Debug, Default)]
pub(crate) struct TokenCache {
    slot: Mutex<Option<AccessToken>>,
}

impl TokenCache {
    pub async fn lock(&self) -> MutexGuard<'_, Option<AccessToken>> {
        self.slot.lock().await
    }

    pub async fn clear(&self) {
        *self.slot.lock().await = None;
    }

    /// Clears the slot only while it still holds `value`; a token swapped in
    /// by another call in the meantime is kept.
    pub async fn clear_if(&self, value: &str) {
        let mut slot = self.slot.lock().await;
        if slot.as_ref().is_some_and(|token| token.value == value) {
            *slot = None;
        }
    }
}
