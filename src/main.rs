use std::sync::Arc;
use tokio::signal;
use turnstile::logger::*;
use turnstile::server::*;
use turnstile::settings::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    info!(?project_settings);
    logger.reload_from_config(&LogConfig::from(&project_settings.log))?;

    let server = Arc::new(Server::try_new(&project_settings).await?);
    info!(
        interval_secs = project_settings.cleanup.interval_seconds,
        "token lifecycle host running, press Ctrl-C to stop"
    );

    signal::ctrl_c().await?;

    let shutdown_timeout = std::time::Duration::from_secs(10);
    match tokio::time::timeout(shutdown_timeout, server.shutdown()).await {
        Ok(_) => tracing::info!("server shutdown successfully"),
        Err(_) => tracing::error!("server shutdown timed out"),
    }

    Ok(())
}
