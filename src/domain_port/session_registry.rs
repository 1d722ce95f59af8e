use crate::domain_model::{ClientInfo, IssuedAccessToken, SessionId, SessionRecord, UserId};
use chrono::{DateTime, Utc};

pub trait SessionRegistry: Send + Sync {
    fn max_concurrent_sessions(&self) -> usize;

    /// Record a new login. When the user is already at the concurrency cap, the
    /// session with the oldest `created_at` is closed first and its access token
    /// blacklisted. The check, eviction and insert happen under one per-user lock.
    fn open(
        &self,
        user_id: UserId,
        client: ClientInfo,
        access_token: Option<IssuedAccessToken>,
    ) -> SessionId;

    /// Sessions with `expires_at > now`, oldest first.
    fn list_active(&self, user_id: UserId, now: DateTime<Utc>) -> Vec<SessionRecord>;

    /// Close one session. Returns false when the id is unknown.
    fn invalidate(&self, session_id: &SessionId) -> bool;

    /// Close the session bound to this access token, if any.
    fn invalidate_by_access_token(&self, token: &str) -> Option<SessionRecord>;

    /// Returns the number of sessions closed.
    fn invalidate_all_for_user(&self, user_id: UserId) -> usize;

    /// Returns the number of records removed.
    fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}
