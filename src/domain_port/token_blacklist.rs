use crate::domain_model::{AccessToken, UserId};
use chrono::{DateTime, Utc};

/// Set of access tokens rejected regardless of their signature.
///
/// Nothing here fails: unknown or purged tokens are simply not blacklisted,
/// and the token's own expiry check upstream covers the rest.
pub trait TokenBlacklist: Send + Sync {
    fn add(&self, token: AccessToken, user_id: Option<UserId>, expires_at: DateTime<Utc>);

    fn is_blacklisted(&self, token: &str) -> bool;

    /// Returns the number of entries removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}
