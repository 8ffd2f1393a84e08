// Draftroom autopick ticker.
//
// Startup sequence:
// 1. Initialize tracing (log to file)
// 2. Load config
// 3. Open database
// 4. Build the coordinator on the system clock
// 5. Tick until Ctrl+C

use std::time::Duration;

use anyhow::Context;
use tracing::{error, info};

use draftroom_app::ticker;
use draftroom_core::config;
use draftroom_core::{Database, DraftCoordinator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Draftroom ticker starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: db={}, tick every {}s",
        config.database.path, config.ticker.interval_secs
    );

    let db = Database::open(&config.database.path).context("failed to open database")?;
    info!("Database opened at {}", config.database.path);

    let coord = DraftCoordinator::with_system_clock(db).with_overview_limits(config.overview.limits());
    let live = coord
        .live_draft_ids()
        .context("failed to list live drafts")?;
    info!("{} live draft(s) at startup: {:?}", live.len(), live);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
        }
    };
    ticker::run(
        &coord,
        Duration::from_secs(config.ticker.interval_secs),
        shutdown,
    )
    .await;

    info!("Draftroom ticker shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to `logs/draftroom.log`.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftroom.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("draftroom=info,draftroom_app=info,draftroom_core=info,warn")
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
