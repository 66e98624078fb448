//! Carolcard Backend Library
//!
//! Core functionality for the carolcard greeting-card backend.
//! This library exposes modules for use in integration tests.

use axum::response::Json;
use rusqlite::Connection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod services;

use config::Config;
use services::SpotifyClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<Mutex<Connection>>,
    pub spotify_client: Option<Arc<SpotifyClient>>,
}

impl AppState {
    /// Get a reference to the Spotify client, if configured.
    pub fn spotify_client(&self) -> Option<&SpotifyClient> {
        self.spotify_client.as_deref()
    }
}

#[derive(Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub version: String,
}

pub async fn health_check() -> Json<ApiResponse> {
    Json(ApiResponse {
        message: "Carolcard Backend is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
