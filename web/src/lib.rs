use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use domain::ai::AiGateway;
use domain::audio::AudioExtractor;
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::io;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};

mod controller;
mod error;
mod params;
mod response;
pub mod router;

/// Application state shared by every handler: the service-level infrastructure plus
/// the long lived AI gateway and audio extractor.
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub ai_gateway: Arc<AiGateway>,
    pub audio_extractor: Arc<AudioExtractor>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        ai_gateway: Arc<AiGateway>,
        audio_extractor: Arc<AudioExtractor>,
    ) -> Self {
        Self {
            service_state,
            ai_gateway,
            audio_extractor,
        }
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }
}

pub async fn init_server(app_state: AppState) -> io::Result<()> {
    let config = app_state.config();
    let interface = config
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let listener = bind_listener(&interface, config.port).await?;
    info!(
        "Server starting... listening for connections on http://{}",
        listener.local_addr()?
    );

    let cors_layer = cors_layer(&config.allowed_origins);

    axum::serve(listener, router::define_routes(app_state).layer(cors_layer))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Binds `interface:port`, falling back to an OS assigned port when `port` is taken.
pub(crate) async fn bind_listener(interface: &str, port: u16) -> io::Result<TcpListener> {
    match TcpListener::bind((interface, port)).await {
        Ok(listener) => Ok(listener),
        Err(err) if err.kind() == io::ErrorKind::AddrInUse => {
            warn!("Port {port} is already in use, binding to a random available port");
            TcpListener::bind((interface, 0)).await
        }
        Err(err) => Err(err),
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(err) => {
                warn!("Ignoring invalid CORS origin {origin}: {err}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_origin(origins)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received, stopping server");
}
