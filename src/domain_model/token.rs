use crate::domain_model::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Bearer credential minted by a [`crate::domain_port::TokenIssuer`].
#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
pub struct AccessToken(pub String);

/// Single-use opaque secret exchanged for a fresh [`TokenPair`].
#[derive(Clone, Eq, PartialEq, Hash, Serialize)]
pub struct RefreshToken(pub String);

// Token values are secrets; keep them out of `{:?}` output.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(***)")
    }
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// An access token together with the instant its own signature stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedAccessToken {
    pub token: AccessToken,
    pub expires_at: DateTime<Utc>,
}

/// Stored form of a refresh token. The token itself is never kept, only its digest.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub token_digest: String,
    pub user_id: UserId,
    pub is_admin: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone)]
pub struct BlacklistEntry {
    pub access_token: AccessToken,
    pub user_id: Option<UserId>,
    pub expires_at: DateTime<Utc>,
}

/// Identity and privilege recovered from a redeemed refresh token.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RefreshGrant {
    pub user_id: UserId,
    pub is_admin: bool,
}
