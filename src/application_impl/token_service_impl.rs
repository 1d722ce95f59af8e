use crate::application_port::{CleanupReport, TokenError, TokenService};
use crate::domain_model::{
    AccessToken, ClientInfo, IssuedAccessToken, RefreshToken, SessionId, SessionInfo,
    SessionSummary, TokenPair, UserId,
};
use crate::domain_port::{
    Clock, RefreshTokenStore, SessionRegistry, TokenBlacklist, TokenIssuer, expires_after,
};
use chrono::Duration;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct RealTokenService {
    issuer: Arc<dyn TokenIssuer>,
    refresh_store: Arc<dyn RefreshTokenStore>,
    blacklist: Arc<dyn TokenBlacklist>,
    sessions: Arc<dyn SessionRegistry>,
    clock: Arc<dyn Clock>,
    access_ttl: Duration,
}

impl RealTokenService {
    /// `access_ttl` bounds how long a blacklist entry for an untracked token is kept.
    pub fn new(
        issuer: Arc<dyn TokenIssuer>,
        refresh_store: Arc<dyn RefreshTokenStore>,
        blacklist: Arc<dyn TokenBlacklist>,
        sessions: Arc<dyn SessionRegistry>,
        clock: Arc<dyn Clock>,
        access_ttl: Duration,
    ) -> Self {
        Self {
            issuer,
            refresh_store,
            blacklist,
            sessions,
            clock,
            access_ttl,
        }
    }

    fn issue_pair(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<(IssuedAccessToken, RefreshToken), TokenError> {
        let access = self.issuer.mint(user_id, is_admin)?;
        let refresh = self.refresh_store.issue(user_id, is_admin);
        Ok((access, refresh))
    }
}

impl TokenService for RealTokenService {
    fn generate_token_pair(
        &self,
        user_id: UserId,
        is_admin: bool,
    ) -> Result<TokenPair, TokenError> {
        debug!(%user_id, "generating token pair");
        let (access, refresh_token) = self.issue_pair(user_id, is_admin)?;
        info!(%user_id, "token pair issued without session");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
        })
    }

    fn generate_token_pair_with_session(
        &self,
        user_id: UserId,
        is_admin: bool,
        client: ClientInfo,
    ) -> Result<TokenPair, TokenError> {
        debug!(%user_id, "generating token pair with session");
        let (access, refresh_token) = self.issue_pair(user_id, is_admin)?;
        let access_token = access.token.clone();
        let session_id = self.sessions.open(user_id, client, Some(access));
        info!(%user_id, %session_id, "token pair issued with session");
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        debug!("refreshing access token");
        let grant = self
            .refresh_store
            .redeem(&RefreshToken(refresh_token.to_owned()))
            .inspect_err(|_| warn!("refresh token rejected"))?;

        let (access, refresh_token) = self
            .issue_pair(grant.user_id, grant.is_admin)
            .inspect_err(|e| warn!(user_id = %grant.user_id, "refresh token consumed but reissue failed: {}", e))?;

        info!(user_id = %grant.user_id, "refresh token rotated");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token,
        })
    }

    fn invalidate_token(&self, access_token: &str) {
        if access_token.trim().is_empty() {
            return;
        }
        debug!("invalidating access token");

        // closing a bound session blacklists its token with the recorded expiry
        match self.sessions.invalidate_by_access_token(access_token) {
            Some(rec) => info!(user_id = %rec.user_id, session_id = %rec.session_id, "session closed by logout"),
            None => {
                let expires_at = expires_after(self.clock.now(), self.access_ttl);
                self.blacklist
                    .add(AccessToken(access_token.to_owned()), None, expires_at);
                info!("untracked access token blacklisted");
            }
        }
    }

    fn invalidate_all_user_tokens(&self, user_id: UserId) {
        debug!(%user_id, "invalidating all tokens of user");
        let refresh_tokens = self.refresh_store.revoke_all_for_user(user_id);
        let sessions = self.sessions.invalidate_all_for_user(user_id);
        info!(%user_id, refresh_tokens, sessions, "all user tokens invalidated");
    }

    fn is_token_blacklisted(&self, access_token: &str) -> bool {
        self.blacklist.is_blacklisted(access_token)
    }

    fn get_active_sessions(&self, user_id: UserId) -> Vec<SessionInfo> {
        self.sessions
            .list_active(user_id, self.clock.now())
            .iter()
            .map(SessionInfo::from)
            .collect()
    }

    fn get_session_summary(&self, user_id: UserId) -> SessionSummary {
        let active = self.sessions.list_active(user_id, self.clock.now());
        SessionSummary {
            active_sessions: active.len(),
            max_concurrent_sessions: self.sessions.max_concurrent_sessions(),
            latest_login_at: active.iter().map(|s| s.created_at).max(),
        }
    }

    fn invalidate_session(&self, session_id: &SessionId) {
        debug!(%session_id, "invalidating session");
        if self.sessions.invalidate(session_id) {
            info!(%session_id, "session invalidated");
        }
    }

    fn cleanup_expired_tokens(&self) -> CleanupReport {
        let now = self.clock.now();
        let report = CleanupReport {
            refresh_tokens: self.refresh_store.purge_expired(now),
            blacklist_entries: self.blacklist.purge_expired(now),
            sessions: self.sessions.purge_expired(now),
        };
        info!(
            refresh_tokens = report.refresh_tokens,
            blacklist_entries = report.blacklist_entries,
            sessions = report.sessions,
            "expired tokens cleaned up"
        );
        report
    }
}
