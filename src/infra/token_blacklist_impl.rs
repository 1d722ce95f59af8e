use crate::domain_model::{AccessToken, BlacklistEntry, UserId};
use crate::domain_port::TokenBlacklist;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryTokenBlacklist {
    entries: DashMap<String, BlacklistEntry>,
}

impl MemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TokenBlacklist for MemoryTokenBlacklist {
    fn add(&self, token: AccessToken, user_id: Option<UserId>, expires_at: DateTime<Utc>) {
        self.entries
            .entry(token.0.clone())
            .and_modify(|entry| {
                // a second revocation never shortens the first
                if expires_at > entry.expires_at {
                    entry.expires_at = expires_at;
                }
                if entry.user_id.is_none() {
                    entry.user_id = user_id;
                }
            })
            .or_insert(BlacklistEntry {
                access_token: token,
                user_id,
                expires_at,
            });
    }

    fn is_blacklisted(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.expires_at > now;
            removed += usize::from(!keep);
            keep
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn unknown_token_is_not_blacklisted() {
        let blacklist = MemoryTokenBlacklist::new();
        assert!(!blacklist.is_blacklisted("never-seen"));
        assert!(!blacklist.is_blacklisted(""));
    }

    #[test]
    fn added_token_stays_blacklisted_until_purged() {
        let blacklist = MemoryTokenBlacklist::new();
        let token = AccessToken("tok-1".into());
        blacklist.add(token.clone(), None, t0() + Duration::seconds(10));
        assert!(blacklist.is_blacklisted("tok-1"));

        assert_eq!(blacklist.purge_expired(t0() + Duration::seconds(9)), 0);
        assert!(blacklist.is_blacklisted("tok-1"));

        assert_eq!(blacklist.purge_expired(t0() + Duration::seconds(10)), 1);
        assert!(!blacklist.is_blacklisted("tok-1"));
    }

    #[test]
    fn re_adding_keeps_the_later_expiry() {
        let blacklist = MemoryTokenBlacklist::new();
        let user = UserId::new_random();
        let token = AccessToken("tok-2".into());
        blacklist.add(token.clone(), Some(user), t0() + Duration::seconds(100));
        blacklist.add(token.clone(), None, t0() + Duration::seconds(5));

        assert_eq!(blacklist.len(), 1);
        assert_eq!(blacklist.purge_expired(t0() + Duration::seconds(50)), 0);
        let entry = blacklist.entries.get("tok-2").unwrap();
        assert_eq!(entry.user_id, Some(user));
        assert_eq!(entry.expires_at, t0() + Duration::seconds(100));
    }

    #[test]
    fn purge_counts_only_its_own_removals_under_concurrent_adds() {
        let blacklist = MemoryTokenBlacklist::new();
        for i in 0..200 {
            blacklist.add(AccessToken(format!("old-{i}")), None, t0());
        }

        let purged: usize = std::thread::scope(|s| {
            let purgers: Vec<_> = (0..2)
                .map(|_| s.spawn(|| blacklist.purge_expired(t0())))
                .collect();
            for t in 0..4 {
                let blacklist = &blacklist;
                s.spawn(move || {
                    for i in 0..100 {
                        let token = AccessToken(format!("live-{t}-{i}"));
                        blacklist.add(token, None, t0() + Duration::hours(1));
                    }
                });
            }
            purgers.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(purged, 200);
        assert_eq!(blacklist.len(), 400);
    }
}
