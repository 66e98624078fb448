//! Offline catalog seeding binary.
//!
//! Resets the catalog (and any existing cards) and inserts the bundled
//! dataset. Run once before serving traffic:
//!
//! ```text
//! cargo run --bin seed
//! ```

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carolcard::config::Config;
use carolcard::db;
use carolcard::services::seed;

fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("carolcard=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("failed to load configuration")?;

    if let Some(parent) = config.database.path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).context("failed to create database directory")?;
        }
    }

    let mut conn =
        db::init_db(&config.database.path).context("failed to initialize database")?;
    tracing::info!("Database initialized at {:?}", config.database.path);

    let summary = seed::run(&mut conn).context("seeding failed")?;
    tracing::info!(
        artist_groups = summary.artist_groups,
        songs = summary.songs,
        "Seed complete"
    );

    Ok(())
}
