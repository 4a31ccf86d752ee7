//! Crypticker - A terminal ticker for cryptocurrency market summaries.
//!
//! Frames are drawn on stdout, so logs go to a daily rotated file in the data directory.

use anyhow::Context;
use clap::Parser;
use crypticker::{App, Cli, Config};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("crypticker=info"));

    // `rolling::daily` panics if the initial file cannot be created.
    let log_dir = crypticker::config::log_dir()
        .ok()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "crypticker.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging();

    // Load configuration
    let mut config =
        Config::load_or_bootstrap(cli.config.clone()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    // Run the application
    let mut app = App::new(config).context("Failed to start ticker")?;
    app.run().await?;

    Ok(())
}
