mod analytics;
mod app;
mod config;
mod debounce;
mod discovery;
mod error;
mod genre_cache;
mod tmdb;
mod ui;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::App;
use crate::config::Config;
use crate::discovery::Discovery;
use crate::error::Result;

fn setup_logging() -> Result<()> {
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = tracing_appender::rolling::daily(&data_dir, "reelscout.log");

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelscout=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file; the TUI owns the terminal
    if let Err(e) = setup_logging() {
        eprintln!("Warning: Could not set up logging: {}", e);
    }

    info!("Starting reelscout");

    let config = Config::load()?;
    info!(analytics = config.appwrite.is_configured(), "Loaded config");

    let discovery = match Discovery::from_config(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            error!(error = %e, "Could not start");
            eprintln!(
                "{}. Set TMDB_API_KEY or add it to {}",
                e,
                config::config_path()?.display()
            );
            return Err(e);
        }
    };

    let mut terminal = app::init_terminal()?;

    let mut app = App::new(&config, discovery);
    let result = app.run(&mut terminal).await;

    app::restore_terminal()?;

    result
}
