use std::sync::Arc;

use alert_archive_server::config::ServiceConfig;
use alert_archive_server::http::server::run_http_server;
use alert_archive_server::http::state::AppState;
use alert_archive_server::logging::init_logging;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.log_level, config.log_format) {
        eprintln!("Invalid log level {:?}: {}", config.log_level, e);
        std::process::exit(1);
    }

    info!(
        bucket = %config.bucket,
        prefix = ?config.prefix,
        "Starting alert archive service"
    );
    debug!("Configuration: {:?}", config);

    let archive_config = match config.archive_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid archive configuration: {}", e);
            std::process::exit(1);
        }
    };

    // The alert source's blocking client must be built off the async workers.
    let bucket_dir = config.bucket_dir();
    let opened =
        tokio::task::spawn_blocking(move || AppState::open(archive_config, &bucket_dir)).await;
    let state = match opened {
        Ok(Ok(state)) => Arc::new(state),
        Ok(Err(e)) => {
            error!("Failed to open archive: {}", e);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Archive setup task failed: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) =
        run_http_server(state, &config.bind_address, config.port, shutdown_signal()).await
    {
        error!("HTTP server failed: {}", e);
        std::process::exit(1);
    }
    info!("Alert archive service stopped");
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Unable to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
