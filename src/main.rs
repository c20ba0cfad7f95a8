//! GDG AOU real-time notification service.
//!
//! Composition root: loads configuration, starts logging, builds the one
//! connection registry every handler shares, starts the sweep for vanished peers and serves HTTP.

use log::*;
use service::{
    config::Config, logging::Logger, session::JwtSessionResolver, AppState,
};
use sse::manager::spawn_sweep;
use sse::Manager;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = Logger::init_logger(&config) {
        eprintln!("Failed to start logger: {e}");
        return ExitCode::FAILURE;
    }

    info!("Starting up GDG AOU notification service...");

    let session_resolver = match JwtSessionResolver::from_config(&config) {
        Ok(resolver) => Arc::new(resolver),
        Err(e) => {
            error!("Cannot authenticate streams: {e}");
            return ExitCode::FAILURE;
        }
    };

    if config.publisher_api_key().is_none() {
        warn!("PUBLISHER_API_KEY is not set, publishing endpoints will answer 503");
    }

    let sse_manager = Arc::new(Manager::new());
    let _sweep = spawn_sweep(Arc::clone(&sse_manager), config.sse_sweep_interval());

    let app_state = AppState::new(config, &sse_manager, session_resolver);

    match web::init_server(app_state).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Server failed: {e}");
            ExitCode::FAILURE
        }
    }
}
