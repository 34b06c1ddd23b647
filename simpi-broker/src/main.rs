mod api;
mod cli;
mod config;
mod http;
mod pins;
mod state;

use std::net::TcpListener;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_STATIC_DIR};
use crate::config::{default_prefs_path, FileConfig};
use crate::state::AppState;

fn setup_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "simpi_broker=info",
        1 => "simpi_broker=debug",
        _ => "simpi_broker=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> std::process::ExitCode {
    let args = cli::Args::parse();
    setup_tracing(args.verbose);

    let file_config = match FileConfig::load(&args.config) {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "failed to load config file");
            FileConfig::default()
        }
    };

    // CLI flag, if given, wins; otherwise the config file's value;
    // otherwise the hardcoded default.
    let host = args
        .host
        .or(file_config.host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args.port.or(file_config.port).unwrap_or(DEFAULT_PORT);
    let static_dir = args
        .static_dir
        .or(file_config.static_dir)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));
    let prefs_path = args
        .prefs_path
        .or(file_config.prefs_path)
        .unwrap_or_else(default_prefs_path);

    tracing::info!(%host, port, static_dir = %static_dir.display(), prefs_path = %prefs_path.display(), "simpi Broker starting");

    if !static_dir.is_dir() {
        tracing::error!(static_dir = %static_dir.display(), "static root does not exist");
        return std::process::ExitCode::FAILURE;
    }

    if let Some(prefs_dir) = prefs_path.parent() {
        if let Err(error) = std::fs::create_dir_all(prefs_dir) {
            tracing::error!(%error, prefs_dir = %prefs_dir.display(), "failed to create preferences directory");
            return std::process::ExitCode::FAILURE;
        }
    }

    let listener = match TcpListener::bind((host.as_str(), port)) {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %host, port, "failed to bind listener");
            return std::process::ExitCode::FAILURE;
        }
    };

    println!("simpi Broker listening on {host}:{port}");

    let state = Arc::new(AppState::new(static_dir, prefs_path));
    match http::serve(listener, state) {
        Ok(()) => {
            tracing::info!("simpi Broker shut down cleanly");
            std::process::ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "accept loop failed");
            std::process::ExitCode::FAILURE
        }
    }
}
