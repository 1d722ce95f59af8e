use chrono::{DateTime, Duration, Utc};

/// Source of "now" shared by every store, so expiry is decided against one timeline.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// `start + ttl`, clamped to the representable range instead of panicking.
pub fn expires_after(start: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    start.checked_add_signed(ttl).unwrap_or(if ttl < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

/// Seconds as a `Duration`, clamped to `Duration::MIN..=Duration::MAX`.
pub fn ttl_from_secs(secs: i64) -> Duration {
    Duration::try_seconds(secs).unwrap_or(if secs < 0 {
        Duration::MIN
    } else {
        Duration::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn huge_ttls_saturate_instead_of_overflowing() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(expires_after(now, ttl_from_secs(i64::MAX)), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expires_after(now, ttl_from_secs(10_000_000_000_000)), DateTime::<Utc>::MAX_UTC);
        assert_eq!(expires_after(now, ttl_from_secs(i64::MIN)), DateTime::<Utc>::MIN_UTC);
        assert_eq!(expires_after(now, ttl_from_secs(60)), now + Duration::seconds(60));
        assert_eq!(expires_after(now, ttl_from_secs(0)), now);
    }
}
