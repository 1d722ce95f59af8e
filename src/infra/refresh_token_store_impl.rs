use crate::domain_model::{RefreshGrant, RefreshToken, RefreshTokenRecord, UserId};
use crate::domain_port::{Clock, RefreshTokenStore, RefreshTokenStoreError, expires_after};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use nanoid::nanoid;
use sha2::{Digest, Sha256};
use std::sync::Arc;

const TOKEN_LEN: usize = 48;

/// Refresh tokens keyed by the SHA-256 digest of the token value.
pub struct MemoryRefreshTokenStore {
    records: DashMap<String, RefreshTokenRecord>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl MemoryRefreshTokenStore {
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        MemoryRefreshTokenStore {
            records: DashMap::new(),
            clock,
            ttl,
        }
    }

    fn digest(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RefreshTokenStore for MemoryRefreshTokenStore {
    fn issue(&self, user_id: UserId, is_admin: bool) -> RefreshToken {
        let issued_at = self.clock.now();
        let expires_at = expires_after(issued_at, self.ttl);
        loop {
            let token = nanoid!(TOKEN_LEN);
            let token_digest = Self::digest(&token);
            // vacant check and insert under the same shard lock
            if let Entry::Vacant(slot) = self.records.entry(token_digest.clone()) {
                slot.insert(RefreshTokenRecord {
                    token_digest,
                    user_id,
                    is_admin,
                    issued_at,
                    expires_at,
                });
                return RefreshToken(token);
            }
        }
    }

    fn redeem(&self, token: &RefreshToken) -> Result<RefreshGrant, RefreshTokenStoreError> {
        if token.as_str().trim().is_empty() {
            return Err(RefreshTokenStoreError::NotFoundOrExpired);
        }

        // remove first: whoever takes the record out of the map wins
        let (_, rec) = self
            .records
            .remove(&Self::digest(token.as_str()))
            .ok_or(RefreshTokenStoreError::NotFoundOrExpired)?;

        if !rec.is_live(self.clock.now()) {
            return Err(RefreshTokenStoreError::NotFoundOrExpired);
        }

        Ok(RefreshGrant {
            user_id: rec.user_id,
            is_admin: rec.is_admin,
        })
    }

    fn revoke_all_for_user(&self, user_id: UserId) -> usize {
        let mut removed = 0;
        self.records.retain(|_, rec| {
            let keep = rec.user_id != user_id;
            removed += usize::from(!keep);
            keep
        });
        removed
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.records.retain(|_, rec| {
            let keep = rec.is_live(now);
            removed += usize::from(!keep);
            keep
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_port::ttl_from_secs;
    use crate::infra::ManualClock;
    use chrono::TimeZone;

    fn setup(ttl_secs: i64) -> (Arc<ManualClock>, MemoryRefreshTokenStore) {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let store = MemoryRefreshTokenStore::new(clock.clone(), ttl_from_secs(ttl_secs));
        (clock, store)
    }

    #[test]
    fn redeem_returns_owner_and_privilege_once() {
        let (_, store) = setup(60);
        let user = UserId::new_random();
        let token = store.issue(user, true);

        let grant = store.redeem(&token).unwrap();
        assert_eq!(grant.user_id, user);
        assert!(grant.is_admin);

        assert_eq!(
            store.redeem(&token),
            Err(RefreshTokenStoreError::NotFoundOrExpired)
        );
    }

    #[test]
    fn issued_tokens_are_distinct() {
        let (_, store) = setup(60);
        let user = UserId::new_random();
        let a = store.issue(user, false);
        let b = store.issue(user, false);
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn raw_token_is_not_kept() {
        let (_, store) = setup(60);
        let token = store.issue(UserId::new_random(), false);
        assert!(!store.records.contains_key(token.as_str()));
        assert!(store.records.iter().all(|r| r.token_digest != token.0));
    }

    #[test]
    fn expired_token_is_rejected_and_dropped() {
        let (clock, store) = setup(60);
        let token = store.issue(UserId::new_random(), false);

        clock.advance(Duration::seconds(60));
        assert_eq!(
            store.redeem(&token),
            Err(RefreshTokenStoreError::NotFoundOrExpired)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn zero_ttl_is_expired_at_issuance() {
        let (_, store) = setup(0);
        let token = store.issue(UserId::new_random(), false);
        assert!(store.redeem(&token).is_err());
    }

    #[test]
    fn huge_ttl_saturates_at_the_latest_instant() {
        let (clock, store) = setup(10_000_000_000_000);
        let token = store.issue(UserId::new_random(), false);
        assert!(store.records.iter().all(|r| r.expires_at == DateTime::<Utc>::MAX_UTC));

        clock.advance(Duration::days(365 * 1000));
        assert!(store.redeem(&token).is_ok());
    }

    #[test]
    fn unknown_and_blank_tokens_are_rejected() {
        let (_, store) = setup(60);
        assert!(store.redeem(&RefreshToken("nope".into())).is_err());
        assert!(store.redeem(&RefreshToken("   ".into())).is_err());
    }

    #[test]
    fn revoke_all_only_touches_the_owner() {
        let (_, store) = setup(60);
        let alice = UserId::new_random();
        let bob = UserId::new_random();
        let a1 = store.issue(alice, false);
        let a2 = store.issue(alice, false);
        let b1 = store.issue(bob, false);

        assert_eq!(store.revoke_all_for_user(alice), 2);
        assert!(store.redeem(&a1).is_err());
        assert!(store.redeem(&a2).is_err());
        assert_eq!(store.redeem(&b1).unwrap().user_id, bob);
    }

    #[test]
    fn purge_drops_only_expired_records() {
        let (clock, store) = setup(60);
        let user = UserId::new_random();
        store.issue(user, false);
        clock.advance(Duration::seconds(30));
        let young = store.issue(user, false);

        clock.advance(Duration::seconds(30));
        assert_eq!(store.purge_expired(clock.now()), 1);
        assert_eq!(store.len(), 1);
        assert!(store.redeem(&young).is_ok());
    }

    #[test]
    fn concurrent_redeem_has_a_single_winner() {
        let (_, store) = setup(60);
        let token = store.issue(UserId::new_random(), false);

        let wins: usize = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| store.redeem(&token).is_ok() as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });
        assert_eq!(wins, 1);
    }

    #[test]
    fn removal_counts_hold_while_other_users_issue() {
        let (clock, store) = setup(60);
        let alice = UserId::new_random();
        for _ in 0..100 {
            store.issue(alice, false);
        }

        let revoked = std::thread::scope(|s| {
            let revoker = s.spawn(|| store.revoke_all_for_user(alice));
            for _ in 0..4 {
                s.spawn(|| {
                    let bob = UserId::new_random();
                    for _ in 0..50 {
                        store.issue(bob, false);
                    }
                });
            }
            revoker.join().unwrap()
        });
        assert_eq!(revoked, 100);
        assert_eq!(store.len(), 200);

        clock.advance(Duration::seconds(60));
        let purged = std::thread::scope(|s| {
            let purger = s.spawn(|| store.purge_expired(clock.now()));
            s.spawn(|| {
                for _ in 0..50 {
                    store.issue(alice, false);
                }
            });
            purger.join().unwrap()
        });
        assert_eq!(purged, 200);
        assert_eq!(store.len(), 50);
    }
}
