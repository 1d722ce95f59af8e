use crate::domain_model::{RefreshGrant, RefreshToken, UserId};
use chrono::{DateTime, Utc};

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum RefreshTokenStoreError {
    #[error("refresh token not found or expired")]
    NotFoundOrExpired,
}

pub trait RefreshTokenStore: Send + Sync {
    /// Generate a new unguessable token and remember who it belongs to.
    fn issue(&self, user_id: UserId, is_admin: bool) -> RefreshToken;

    /// Consume the token. Succeeds at most once per token, even under concurrent calls.
    fn redeem(&self, token: &RefreshToken) -> Result<RefreshGrant, RefreshTokenStoreError>;

    /// Returns the number of records removed.
    fn revoke_all_for_user(&self, user_id: UserId) -> usize;

    /// Returns the number of records removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}
