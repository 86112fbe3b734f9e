use domain::ai::AiGateway;
use domain::audio::{AudioExtractor, ExtractionSettings};
use log::*;
use service::{config::Config, logging::Logger};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let config = Config::new();

    Logger::init_logger(&config as &Config);
    info!(
        "Starting up the Media Gateway API in {} mode...",
        config.runtime_env()
    );
    debug!("{config:?}");

    let db = match service::init_database(&config).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };

    let ai_gateway = match AiGateway::new(&config) {
        Ok(gateway) => Arc::new(gateway),
        Err(e) => {
            error!("Failed to initialize AI gateway: {e}");
            std::process::exit(1);
        }
    };

    let audio_extractor = match AudioExtractor::new(ExtractionSettings::from(&config)) {
        Ok(extractor) => Arc::new(extractor),
        Err(e) => {
            error!("Failed to initialize audio extractor: {e}");
            std::process::exit(1);
        }
    };

    let service_state = service::AppState::new(config, &db);
    let app_state = web::AppState::new(service_state, ai_gateway, Arc::clone(&audio_extractor));

    if let Err(e) = web::init_server(app_state).await {
        error!("Server error: {e}");
    }

    if let Err(e) = audio_extractor.cleanup().await {
        warn!("Failed to clean up audio scratch directory: {e}");
    }
    info!("Media Gateway API stopped");
}
