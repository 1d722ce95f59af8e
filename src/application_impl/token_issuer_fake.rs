use crate::domain_model::{AccessToken, IssuedAccessToken, UserId};
use crate::domain_port::{Clock, IssuerError, TokenIssuer, expires_after};
use chrono::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Issuer producing readable tokens like `fake-access-token:<user>:<admin>:<n>`.
pub struct FakeTokenIssuer {
    clock: Arc<dyn Clock>,
    ttl: Duration,
    counter: AtomicU64,
    failing: AtomicBool,
}

impl FakeTokenIssuer {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            clock,
            ttl,
            counter: AtomicU64::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// Make subsequent `mint` calls fail, to exercise the issuer error path.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn minted(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

impl TokenIssuer for FakeTokenIssuer {
    fn mint(&self, user_id: UserId, is_admin: bool) -> Result<IssuedAccessToken, IssuerError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(IssuerError::Signing("fake issuer is failing".to_string()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(IssuedAccessToken {
            token: AccessToken(format!("fake-access-token:{}:{}:{}", user_id, is_admin, n)),
            expires_at: expires_after(self.clock.now(), self.ttl),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::ManualClock;
    use chrono::{DateTime, TimeZone, Utc};

    #[test]
    fn tokens_are_numbered_and_expire_after_the_ttl() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let issuer = FakeTokenIssuer::new(clock, Duration::minutes(5));
        let user = UserId::new_random();

        let first = issuer.mint(user, true).unwrap();
        assert_eq!(first.token.as_str(), format!("fake-access-token:{user}:true:0"));
        assert_eq!(first.expires_at, start + Duration::minutes(5));
        assert_eq!(issuer.minted(), 1);
    }

    #[test]
    fn unbounded_lifetime_clamps_the_expiry() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let issuer = FakeTokenIssuer::new(Arc::new(ManualClock::new(start)), Duration::MAX);
        let issued = issuer.mint(UserId::new_random(), false).unwrap();
        assert_eq!(issued.expires_at, DateTime::<Utc>::MAX_UTC);
    }
}
