pub mod commands;
pub mod modules;
pub mod shared;

use anyhow::Context;
use commands::{build_router, AppState};
use modules::jobs::spawn_reaper;
use shared::utils::init_logger;
use shared::AppConfig;

/// Boot the service and serve until the listener fails
pub async fn run() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();
    init_logger();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let listen_addr = config.listen_addr;
    log::info!(
        "Media root {}, scratch {}, separator {} ({}), transcoder {}",
        config.media_dir.display(),
        config.scratch_dir.display(),
        config.separator_bin,
        config.separator_model,
        config.transcoder_bin
    );

    let state = AppState::from_config(config);
    state
        .storage
        .ensure_dirs()
        .await
        .context("failed to prepare media directories")?;

    // Finished jobs are kept forever unless a retention is configured
    if let Some(retention) = state.config.job_retention {
        spawn_reaper(state.jobs.clone(), retention);
        log::info!("Job reaper enabled (retention {:?})", retention);
    }

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", listen_addr))?;
    tracing::info!(addr = %listen_addr, "isolator HTTP server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
