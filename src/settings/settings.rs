use anyhow::{Result, anyhow};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::fmt;

pub const SIGNING_KEY_ENV: &str = "TURNSTILE_SIGNING_KEY";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub log: Log,
    pub token: Token,
    #[serde(default)]
    pub session: Session,
    #[serde(default)]
    pub cleanup: Cleanup,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[derive(Deserialize)]
pub struct Token {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_access_expiration")]
    pub access_expiration_seconds: i64,
    #[serde(default = "default_refresh_expiration")]
    pub refresh_expiration_seconds: i64,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("signing_key", &"***")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_expiration_seconds", &self.access_expiration_seconds)
            .field("refresh_expiration_seconds", &self.refresh_expiration_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub timeout_seconds: i64,     // inactivity window
    pub max_duration_seconds: i64, // absolute cap
    pub max_concurrent_sessions: usize,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            timeout_seconds: 7200,
            max_duration_seconds: 28800,
            max_concurrent_sessions: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Cleanup {
    pub interval_seconds: u64,
}

impl Default for Cleanup {
    fn default() -> Self {
        Cleanup {
            interval_seconds: 300,
        }
    }
}

fn default_access_expiration() -> i64 {
    36000 // 10 hours
}

fn default_refresh_expiration() -> i64 {
    604800 // 7 days
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    build(Config::builder().add_source(File::with_name(path)))
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

/// Upper bound for any lifetime or interval, in seconds (100 years).
pub const MAX_TTL_SECONDS: i64 = 3_153_600_000;

fn check_ttl(name: &str, secs: i64) -> Result<()> {
    if !(-MAX_TTL_SECONDS..=MAX_TTL_SECONDS).contains(&secs) {
        return Err(anyhow!("{name} must be within {MAX_TTL_SECONDS} seconds, got {secs}"));
    }
    Ok(())
}

fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Settings> {
    let mut settings: Settings = builder
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    if let Ok(key) = std::env::var(SIGNING_KEY_ENV) {
        settings.token.signing_key = key;
    }
    if settings.token.signing_key.is_empty() {
        return Err(anyhow!("token.signing_key must not be empty"));
    }
    if settings.cleanup.interval_seconds == 0 {
        return Err(anyhow!("cleanup.interval_seconds must be positive"));
    }
    if settings.cleanup.interval_seconds > MAX_TTL_SECONDS as u64 {
        return Err(anyhow!(
            "cleanup.interval_seconds must be at most {MAX_TTL_SECONDS}"
        ));
    }
    check_ttl("token.access_expiration_seconds", settings.token.access_expiration_seconds)?;
    check_ttl("token.refresh_expiration_seconds", settings.token.refresh_expiration_seconds)?;
    check_ttl("session.timeout_seconds", settings.session.timeout_seconds)?;
    check_ttl("session.max_duration_seconds", settings.session.max_duration_seconds)?;

    Ok(settings)
}
