//! Walk through the token and session lifecycle against in-memory stores.
//!
//! $ cargo run --bin session_demo
use chrono::Duration;
use std::sync::Arc;
use turnstile::application_impl::{FakeTokenIssuer, RealTokenService};
use turnstile::application_port::TokenService;
use turnstile::domain_model::{ClientInfo, UserId};
use turnstile::domain_port::{Clock, TokenBlacklist};
use turnstile::infra::{
    ManualClock, MemoryRefreshTokenStore, MemorySessionRegistry, MemoryTokenBlacklist,
    SessionLimits,
};
use turnstile::logger::*;

fn main() -> anyhow::Result<()> {
    let _logger = Logger::new_bootstrap();

    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(MemoryTokenBlacklist::new());
    let service = RealTokenService::new(
        Arc::new(FakeTokenIssuer::new(clock.clone(), Duration::hours(10))),
        Arc::new(MemoryRefreshTokenStore::new(clock.clone(), Duration::days(7))),
        blacklist.clone(),
        Arc::new(MemorySessionRegistry::new(
            blacklist,
            clock.clone(),
            SessionLimits::new(7200, 28800, 2),
        )),
        clock.clone(),
        Duration::hours(10),
    );

    let user = UserId::new_random();
    let mut pairs = Vec::new();
    for device in ["laptop", "phone", "tablet"] {
        let client = ClientInfo {
            user_agent: Some(format!("demo-{device}")),
            ip_address: Some("127.0.0.1".to_string()),
        };
        pairs.push(service.generate_token_pair_with_session(user, false, client)?);
        clock.advance(Duration::seconds(1));
    }

    let sessions = service.get_active_sessions(user);
    println!("active sessions: {}", serde_json::to_string_pretty(&sessions)?);
    println!(
        "laptop token blacklisted after eviction: {}",
        service.is_token_blacklisted(pairs[0].access_token.as_str())
    );

    let rotated = service.refresh_access_token(pairs[1].refresh_token.as_str())?;
    let replay = service.refresh_access_token(pairs[1].refresh_token.as_str());
    println!("replayed refresh token rejected: {}", replay.is_err());

    service.invalidate_all_user_tokens(user);
    println!(
        "summary after logout-all: {}",
        serde_json::to_string(&service.get_session_summary(user))?
    );
    println!(
        "rotated refresh token still usable: {}",
        service.refresh_access_token(rotated.refresh_token.as_str()).is_ok()
    );

    clock.advance(Duration::days(8));
    println!("cleanup at {}: {:?}", clock.now(), service.cleanup_expired_tokens());

    Ok(())
}
