mod aggregate;
mod config;
mod db;
mod error;
mod export;
mod format;
mod models;
mod run;
mod session;
mod sync;
mod validate;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = config::Config::load()?;
    init_logging(&config.log);

    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!(
            "Failed to create data directory: {}",
            config.data_dir.display()
        )
    })?;
    let db = db::Database::open(&config.db_path())?;
    tracing::debug!(app_id = %config.app_id, db = %config.db_path().display(), "starting");

    run::as_cli(&args, &db, &config)
}

fn init_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|err| {
        eprintln!("Ignoring invalid log filter '{directive}': {err}");
        EnvFilter::new("warn")
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
