//! # UniCare Relay
//!
//! HTTP relay for emergency-chat push payloads.
//!
//! Handles:
//! - accepting payloads from the push worker (`POST /notifications`, `x-api-key`)
//! - keeping the medical centre's inbox (unread counts, latest message) up to date
//! - fanning payloads out to open sessions over server-sent events
//! - OpenAPI documentation of the above
//!
//! The inbox and the broadcast bus come from `unicare-messaging`; this crate only adds the
//! HTTP surface.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod routes;

pub use config::RelayConfig;

use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use unicare_messaging::{BroadcastRelay, Inbox};

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub type RelayResult<T> = std::result::Result<T, RelayError>;

/// Shared state behind every handler.
#[derive(Clone)]
pub struct AppState {
    inbox: Arc<RwLock<Inbox>>,
    relay: BroadcastRelay,
    api_key: Arc<str>,
}

impl AppState {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            inbox: Arc::new(RwLock::new(Inbox::new())),
            relay: BroadcastRelay::new(config.channel(), config.capacity()),
            api_key: Arc::from(config.api_key()),
        }
    }

    pub fn inbox(&self) -> &Arc<RwLock<Inbox>> {
        &self.inbox
    }

    pub fn relay(&self) -> &BroadcastRelay {
        &self.relay
    }

    fn accepts_key(&self, provided: Option<&str>) -> bool {
        provided == Some(self.api_key.as_ref())
    }
}

/// Builds the relay's router over `state`.
pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `config.addr()` and serves until the process is stopped.
pub async fn serve(config: RelayConfig) -> RelayResult<()> {
    let state = AppState::new(&config);
    let app = router(state);

    tracing::info!(addr = %config.addr(), channel = config.channel(), "-- Starting UniCare relay");
    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
