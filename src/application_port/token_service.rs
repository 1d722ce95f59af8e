use crate::domain_model::{ClientInfo, SessionId, SessionInfo, SessionSummary, TokenPair, UserId};
use crate::domain_port::{IssuerError, RefreshTokenStoreError};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("refresh token invalid or expired")]
    InvalidRefreshToken,
    #[error("issuer error: {0}")]
    Issuer(String),
}

impl From<RefreshTokenStoreError> for TokenError {
    fn from(err: RefreshTokenStoreError) -> Self {
        match err {
            RefreshTokenStoreError::NotFoundOrExpired => TokenError::InvalidRefreshToken,
        }
    }
}

impl From<IssuerError> for TokenError {
    fn from(err: IssuerError) -> Self {
        TokenError::Issuer(err.to_string())
    }
}

/// What one cleanup pass removed.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize)]
pub struct CleanupReport {
    pub refresh_tokens: usize,
    pub blacklist_entries: usize,
    pub sessions: usize,
}

/// Token and session lifecycle.
///
/// Only `refresh_access_token` rejects input. Everything else is total:
/// unknown ids and blank tokens are no-ops, so callers can retry freely.
pub trait TokenService: Send + Sync {
    /// Non-interactive issuance. No session is recorded.
    fn generate_token_pair(&self, user_id: UserId, is_admin: bool)
    -> Result<TokenPair, TokenError>;

    /// Interactive login. Opens a session, evicting the user's oldest one at the cap.
    fn generate_token_pair_with_session(
        &self,
        user_id: UserId,
        is_admin: bool,
        client: ClientInfo,
    ) -> Result<TokenPair, TokenError>;

    /// Rotate: consume the refresh token and hand back a fresh pair.
    /// Sessions are left untouched.
    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, TokenError>;

    /// Logout of one access token.
    fn invalidate_token(&self, access_token: &str);

    fn invalidate_all_user_tokens(&self, user_id: UserId);

    fn is_token_blacklisted(&self, access_token: &str) -> bool;

    fn get_active_sessions(&self, user_id: UserId) -> Vec<SessionInfo>;

    fn get_session_summary(&self, user_id: UserId) -> SessionSummary;

    fn invalidate_session(&self, session_id: &SessionId);

    fn cleanup_expired_tokens(&self) -> CleanupReport;
}
