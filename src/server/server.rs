use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra::*;
use crate::logger::*;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub token_service: Arc<dyn TokenService>,
    cleanup_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let access_ttl = ttl_from_secs(settings.token.access_expiration_seconds);
        let issuer: Arc<dyn TokenIssuer> = Arc::new(JwtHs256Issuer::new(
            JwtConfig {
                issuer: settings.token.issuer.clone(),
                audience: settings.token.audience.clone(),
                access_ttl,
                signing_key: settings.token.signing_key.clone().into_bytes(),
            },
            clock.clone(),
        ));

        let refresh_store: Arc<dyn RefreshTokenStore> = Arc::new(MemoryRefreshTokenStore::new(
            clock.clone(),
            ttl_from_secs(settings.token.refresh_expiration_seconds),
        ));
        let blacklist: Arc<dyn TokenBlacklist> = Arc::new(MemoryTokenBlacklist::new());
        let limits = SessionLimits::new(
            settings.session.timeout_seconds,
            settings.session.max_duration_seconds,
            settings.session.max_concurrent_sessions,
        );
        let sessions: Arc<dyn SessionRegistry> = Arc::new(MemorySessionRegistry::new(
            blacklist.clone(),
            clock.clone(),
            limits,
        ));
        info!(
            session_ttl_secs = limits.ttl.num_seconds(),
            max_concurrent_sessions = limits.max_concurrent_sessions,
            "session limits"
        );

        let token_service: Arc<dyn TokenService> = Arc::new(RealTokenService::new(
            issuer,
            refresh_store,
            blacklist,
            sessions,
            clock,
            access_ttl,
        ));

        let every = std::time::Duration::from_secs(settings.cleanup.interval_seconds);
        Ok(Self::with_service(token_service, every))
    }

    /// Starts the periodic cleanup task for an already assembled service.
    pub fn with_service(token_service: Arc<dyn TokenService>, every: std::time::Duration) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(cleanup_loop(
            token_service.clone(),
            every,
            cancel.clone(),
        ));

        Self {
            token_service,
            cleanup_handle: Mutex::new(Some(handle)),
            cancel,
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        self.cancel.cancel();

        let handle = match self.cleanup_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("cleanup task failed: {}", e);
            }
        }

        info!("cleanup task stopped");
    }
}

async fn cleanup_loop(
    token_service: Arc<dyn TokenService>,
    every: std::time::Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // the first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let report = token_service.cleanup_expired_tokens();
                debug!(?report, "periodic cleanup done");
            }
        }
    }
}
