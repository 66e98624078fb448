//! Test infrastructure for carolcard backend integration tests.
//!
//! Provides a `TestApp` wrapper around `axum_test::TestServer` with helper
//! methods for seeding catalog data and making requests.

#![allow(dead_code)]

use axum::{
    routing::{get, post},
    Router,
};
use axum_test::TestServer;
use rusqlite::{params, Connection};
use std::sync::Arc;
use tokio::sync::Mutex;

use carolcard::config::{Config, DatabaseConfig, ServerConfig, SpotifyConfig};
use carolcard::services::SpotifyClient;
use carolcard::{api, db, health_check, AppState};

/// Test application wrapper around axum_test::TestServer.
///
/// Runs the production router over an in-memory SQLite database. By default
/// the Spotify client is left unconfigured so the recommendations endpoint
/// exercises the local fallback path.
pub struct TestApp {
    server: TestServer,
    db: Arc<Mutex<Connection>>,
}

impl TestApp {
    /// Create a new test application with in-memory database.
    pub async fn new() -> Self {
        Self::with_spotify(None).await
    }

    /// Create a test application whose Spotify client points at a stub
    /// server, so the recommendations primary path can be exercised.
    pub async fn with_spotify_client(client: Arc<SpotifyClient>) -> Self {
        Self::with_spotify(Some(client)).await
    }

    async fn with_spotify(spotify_client: Option<Arc<SpotifyClient>>) -> Self {
        let conn = db::init_db_memory().expect("Failed to initialize test database");
        let db = Arc::new(Mutex::new(conn));

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            database: DatabaseConfig {
                path: ":memory:".into(),
            },
            spotify: SpotifyConfig::default(),
        };

        let state = AppState {
            config: Arc::new(config),
            db: Arc::clone(&db),
            spotify_client,
        };

        let app = Self::build_router(state);
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, db }
    }

    /// Build the complete application router.
    ///
    /// This mirrors the router construction in main.rs to ensure integration
    /// tests run against the actual production routes.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_check))
            .route("/cards", post(api::cards::create_card))
            .route("/cards/:id", get(api::cards::get_card))
            .route("/artists", get(api::artists::list_artists))
            .route("/artists/:slug/songs", get(api::artists::artist_songs))
            .route(
                "/recommendations",
                get(api::recommendations::get_recommendations),
            )
            .with_state(state)
    }

    /// Get a reference to the test server.
    pub fn server(&self) -> &TestServer {
        &self.server
    }

    /// Insert an artist group and return its id.
    pub async fn seed_artist_group(&self, slug: &str, name: &str) -> i64 {
        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO artist_groups (slug, name) VALUES (?1, ?2)",
            params![slug, name],
        )
        .expect("Failed to seed artist group");
        conn.last_insert_rowid()
    }

    /// Insert a catalog song and return its id.
    pub async fn seed_song(
        &self,
        genre: &str,
        title: &str,
        artist: &str,
        group_id: Option<i64>,
    ) -> i64 {
        let conn = self.db.lock().await;
        conn.execute(
            "INSERT INTO songs (genre, title, artist, listen_url, artist_group_id) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                genre,
                title,
                artist,
                format!("https://example.com/listen/{}", title.replace(' ', "-")),
                group_id
            ],
        )
        .expect("Failed to seed song");
        conn.last_insert_rowid()
    }

    /// Drop the songs table so catalog queries fail at the store level.
    pub async fn break_catalog(&self) {
        let conn = self.db.lock().await;
        conn.execute_batch("DROP TABLE songs")
            .expect("Failed to drop songs table");
    }

    /// Number of rows in the cards table.
    pub async fn card_count(&self) -> i64 {
        let conn = self.db.lock().await;
        conn.query_row("SELECT COUNT(*) FROM cards", [], |row| row.get(0))
            .expect("Failed to count cards")
    }
}
