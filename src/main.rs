use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use carolcard::config::Config;
use carolcard::services::SpotifyClient;
use carolcard::{api, db, health_check, AppState};

fn init_tracing() {
    // Initialize tracing with env-filter
    // RUST_LOG environment variable controls log levels
    // Default: debug for our crate, info for axum, warn for dependencies
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("carolcard=debug,tower_http=debug,axum=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() {
    // Initialize tracing first so we can log configuration loading
    init_tracing();

    tracing::info!("Starting Carolcard Backend v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match Config::load() {
        Ok(cfg) => {
            tracing::info!("Configuration loaded successfully");
            tracing::debug!("Server: {}:{}", cfg.server.host, cfg.server.port);
            tracing::debug!("Database: {:?}", cfg.database.path);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Ensure database directory exists
    if let Some(parent) = config.database.path.parent() {
        if !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize database
    let conn = match db::init_db(&config.database.path) {
        Ok(conn) => {
            tracing::info!("Database initialized at {:?}", config.database.path);
            conn
        }
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    // Create Spotify client if credentials are configured
    let spotify_client = match config.spotify_credentials() {
        Some((client_id, client_secret)) => {
            match SpotifyClient::new_shared(client_id, client_secret) {
                Ok(client) => {
                    tracing::info!("Spotify client initialized");
                    Some(client)
                }
                Err(e) => {
                    tracing::error!("Failed to create Spotify client: {}", e);
                    None
                }
            }
        }
        None => {
            tracing::warn!(
                "Spotify credentials not configured - recommendations will use the local catalog"
            );
            None
        }
    };

    // Create application state
    let state = AppState {
        config: Arc::new(config.clone()),
        db: Arc::new(Mutex::new(conn)),
        spotify_client,
    };

    // Build main router with state
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/cards", post(api::cards::create_card))
        .route("/cards/:id", get(api::cards::get_card))
        .route("/artists", get(api::artists::list_artists))
        .route("/artists/:slug/songs", get(api::artists::artist_songs))
        .route(
            "/recommendations",
            get(api::recommendations::get_recommendations),
        )
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.server_addr();
    tracing::info!("Carolcard Backend listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
