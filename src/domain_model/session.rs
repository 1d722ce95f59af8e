use crate::domain_model::{IssuedAccessToken, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new_random() -> Self {
        SessionId(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.to_owned())
    }
}

/// Client details captured at login.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_token: Option<IssuedAccessToken>,
}

impl SessionRecord {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Public view of a session for a "manage devices" listing. Carries no token material.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<&SessionRecord> for SessionInfo {
    fn from(rec: &SessionRecord) -> Self {
        SessionInfo {
            session_id: rec.session_id.clone(),
            user_id: rec.user_id,
            user_agent: rec.user_agent.clone(),
            ip_address: rec.ip_address.clone(),
            created_at: rec.created_at,
            expires_at: rec.expires_at,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct SessionSummary {
    pub active_sessions: usize,
    pub max_concurrent_sessions: usize,
    pub latest_login_at: Option<DateTime<Utc>>,
}
