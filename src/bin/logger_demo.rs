//! Show how the log filter shapes what the session lifecycle reports.
//!
//! $ cargo run --bin logger_demo
use chrono::Duration;
use std::sync::Arc;
use turnstile::application_impl::{FakeTokenIssuer, RealTokenService};
use turnstile::application_port::TokenService;
use turnstile::domain_model::{ClientInfo, UserId};
use turnstile::domain_port::TokenBlacklist;
use turnstile::infra::{
    ManualClock, MemoryRefreshTokenStore, MemorySessionRegistry, MemoryTokenBlacklist,
    SessionLimits,
};
use turnstile::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    info!(filter = %logger.current_filter()?, "bootstrap logger installed");

    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
    let blacklist: Arc<dyn TokenBlacklist> = Arc::new(MemoryTokenBlacklist::new());
    let service = RealTokenService::new(
        Arc::new(FakeTokenIssuer::new(clock.clone(), Duration::minutes(15))),
        Arc::new(MemoryRefreshTokenStore::new(clock.clone(), Duration::hours(1))),
        blacklist.clone(),
        Arc::new(MemorySessionRegistry::new(
            blacklist,
            clock.clone(),
            SessionLimits::new(600, 3600, 1),
        )),
        clock.clone(),
        Duration::minutes(15),
    );
    let user = UserId::new_random();

    // at info only the eviction is reported, "session opened" stays hidden
    service.generate_token_pair_with_session(user, false, ClientInfo::default())?;
    service.generate_token_pair_with_session(user, false, ClientInfo::default())?;

    logger.reload_from_config(&LogConfig {
        filter: "warn,turnstile=debug".to_string(),
    })?;
    info!(filter = %logger.current_filter()?, "filter reloaded");
    let pair = service.generate_token_pair_with_session(user, true, ClientInfo::default())?;
    service.refresh_access_token(pair.refresh_token.as_str())?;
    let _ = service.refresh_access_token(pair.refresh_token.as_str());

    clock.advance(Duration::hours(2));
    service.cleanup_expired_tokens();

    // a filter that does not parse leaves the previous one in place
    if let Err(e) = logger.reload_from_config(&LogConfig {
        filter: "turnstile=chatty".to_string(),
    }) {
        warn!("{}", e);
    }

    logger.reload_from_config(&LogConfig {
        filter: "turnstile::application_impl=warn".to_string(),
    })?;
    service.generate_token_pair_with_session(user, false, ClientInfo::default())?;
    warn!(target: "turnstile::application_impl", "only warnings from the service remain");

    Ok(())
}
