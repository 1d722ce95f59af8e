use crate::domain_model::{ClientInfo, IssuedAccessToken, SessionId, SessionRecord, UserId};
use crate::domain_port::{Clock, SessionRegistry, TokenBlacklist, expires_after, ttl_from_secs};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct SessionLimits {
    pub ttl: Duration,
    pub max_concurrent_sessions: usize,
}

impl SessionLimits {
    /// The absolute cap always wins over the inactivity timeout. A TTL of zero
    /// or less yields sessions that are expired the moment they are opened.
    pub fn new(timeout_secs: i64, max_duration_secs: i64, max_concurrent_sessions: usize) -> Self {
        SessionLimits {
            ttl: ttl_from_secs(timeout_secs.min(max_duration_secs)),
            max_concurrent_sessions: max_concurrent_sessions.max(1),
        }
    }
}

/// Sessions grouped per user. The per-user entry of `sessions` is the lock
/// that serializes open/evict/close for that user. `owners` maps a session id
/// back to its user and `by_token` maps a bound access token to its session;
/// both are only ever written while that lock is held.
pub struct MemorySessionRegistry {
    sessions: DashMap<UserId, Vec<SessionRecord>>,
    owners: DashMap<SessionId, UserId>,
    by_token: DashMap<String, SessionId>,
    blacklist: Arc<dyn TokenBlacklist>,
    clock: Arc<dyn Clock>,
    limits: SessionLimits,
}

impl MemorySessionRegistry {
    pub fn new(
        blacklist: Arc<dyn TokenBlacklist>,
        clock: Arc<dyn Clock>,
        limits: SessionLimits,
    ) -> Self {
        MemorySessionRegistry {
            sessions: DashMap::new(),
            owners: DashMap::new(),
            by_token: DashMap::new(),
            blacklist,
            clock,
            limits,
        }
    }

    /// Number of sessions reachable by id, expired-but-unpurged ones included.
    pub fn tracked_sessions(&self) -> usize {
        self.owners.len()
    }

    /// Number of access tokens that currently resolve to a session.
    pub fn indexed_tokens(&self) -> usize {
        self.by_token.len()
    }

    fn untrack(&self, rec: &SessionRecord) {
        self.owners.remove(&rec.session_id);
        if let Some(issued) = &rec.access_token {
            // a newer session may have claimed the same token string
            self.by_token
                .remove_if(issued.token.as_str(), |_, sid| sid == &rec.session_id);
        }
    }

    fn close(&self, rec: &SessionRecord) {
        self.untrack(rec);
        if let Some(issued) = &rec.access_token {
            self.blacklist
                .add(issued.token.clone(), Some(rec.user_id), issued.expires_at);
        }
    }

    fn drop_expired(&self, sessions: &mut Vec<SessionRecord>, now: DateTime<Utc>) -> usize {
        let before = sessions.len();
        sessions.retain(|s| {
            if s.is_live(now) {
                true
            } else {
                self.untrack(s);
                false
            }
        });
        before - sessions.len()
    }

    fn remove_session(&self, user_id: UserId, session_id: &SessionId) -> Option<SessionRecord> {
        let removed = {
            let mut entry = self.sessions.get_mut(&user_id)?;
            let sessions = entry.value_mut();
            let pos = sessions.iter().position(|s| &s.session_id == session_id)?;
            let rec = sessions.remove(pos);
            self.close(&rec);
            rec
        };
        self.sessions.remove_if(&user_id, |_, v| v.is_empty());
        Some(removed)
    }
}

impl SessionRegistry for MemorySessionRegistry {
    fn max_concurrent_sessions(&self) -> usize {
        self.limits.max_concurrent_sessions
    }

    fn open(
        &self,
        user_id: UserId,
        client: ClientInfo,
        access_token: Option<IssuedAccessToken>,
    ) -> SessionId {
        let now = self.clock.now();
        let expires_at = expires_after(now, self.limits.ttl);
        let session_id = SessionId::new_random();

        let mut entry = self.sessions.entry(user_id).or_default();
        let sessions = entry.value_mut();
        self.drop_expired(sessions, now);

        while sessions.len() >= self.limits.max_concurrent_sessions {
            let Some(oldest) = sessions
                .iter()
                .enumerate()
                .min_by_key(|(_, s)| s.created_at)
                .map(|(i, _)| i)
            else {
                break;
            };
            let evicted = sessions.remove(oldest);
            self.close(&evicted);
            info!(
                %user_id,
                session_id = %evicted.session_id,
                limit = self.limits.max_concurrent_sessions,
                "evicted oldest session, concurrent session limit reached"
            );
        }

        if let Some(issued) = &access_token {
            self.by_token
                .insert(issued.token.as_str().to_owned(), session_id.clone());
        }
        sessions.push(SessionRecord {
            session_id: session_id.clone(),
            user_id,
            user_agent: client.user_agent,
            ip_address: client.ip_address,
            created_at: now,
            expires_at,
            access_token,
        });
        self.owners.insert(session_id.clone(), user_id);
        debug!(%user_id, %session_id, "session opened");

        session_id
    }

    fn list_active(&self, user_id: UserId, now: DateTime<Utc>) -> Vec<SessionRecord> {
        let mut active = match self.sessions.get_mut(&user_id) {
            Some(mut entry) => {
                let sessions = entry.value_mut();
                self.drop_expired(sessions, now);
                sessions.clone()
            }
            None => return Vec::new(),
        };
        self.sessions.remove_if(&user_id, |_, v| v.is_empty());

        active.sort_by_key(|s| s.created_at);
        active
    }

    fn invalidate(&self, session_id: &SessionId) -> bool {
        let Some(user_id) = self.owners.get(session_id).map(|r| *r.value()) else {
            return false;
        };
        self.remove_session(user_id, session_id).is_some()
    }

    fn invalidate_by_access_token(&self, token: &str) -> Option<SessionRecord> {
        let session_id = self.by_token.get(token).map(|r| r.value().clone())?;
        let user_id = self.owners.get(&session_id).map(|r| *r.value())?;
        self.remove_session(user_id, &session_id)
    }

    fn invalidate_all_for_user(&self, user_id: UserId) -> usize {
        let Some((_, sessions)) = self.sessions.remove(&user_id) else {
            return 0;
        };
        for rec in &sessions {
            self.close(rec);
        }
        sessions.len()
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.sessions.retain(|_, sessions| {
            removed += self.drop_expired(sessions, now);
            !sessions.is_empty()
        });
        removed
    }
}
