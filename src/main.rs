// src/main.rs

//! The main entry point for the urtwarden daemon.

use anyhow::Result;
use std::env;
use tracing::error;
use urtwarden::config::Config;
use urtwarden::daemon;

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    // Collect command-line arguments to decide the execution mode.
    let args: Vec<String> = env::args().collect();

    // Handle the --version flag.
    if args.contains(&"--version".to_string()) {
        println!("urtwarden version {VERSION}");
        return Ok(());
    }

    // Determine the configuration path.
    // It can be provided via a --config flag; otherwise, it defaults to "conf/settings.conf".
    let config_path = args
        .iter()
        .position(|arg| arg == "--config")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("conf/settings.conf");

    // Load the daemon configuration from the determined path. If loading fails,
    // print the error and exit, as the daemon cannot run without a valid configuration.
    let config = match Config::from_file(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from \"{config_path}\": {e}");
            std::process::exit(1);
        }
    };

    // Initialize logging. The level can be overridden with RUST_LOG.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| config.bot.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .compact()
        .with_ansi(true)
        .init();

    if let Err(e) = daemon::run(config).await {
        error!("Daemon runtime error: {}", e);
        return Err(e);
    }

    Ok(())
}
