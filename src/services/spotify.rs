//! Spotify service client.
//!
//! Fetches track recommendations by seed genre using the client-credentials
//! flow. The access token is cached inside the client with its expiry and
//! refreshed early by a fixed safety margin, so a token never expires
//! mid-request. The cache is per-process state; recomputing it redundantly
//! across workers is harmless.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::{AppError, Result};

const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Refresh the token this long before its actual expiry.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(10);

/// A cached access token with its expiry instant.
struct CachedToken {
    token: String,
    expires_at: Instant,
}

impl CachedToken {
    /// Usable only while more than the safety margin remains.
    fn is_fresh(&self) -> bool {
        Instant::now() + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Spotify API client with a cached client-credentials token.
pub struct SpotifyClient {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_base: String,
    token_cache: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Create a new Spotify client with the given credentials.
    ///
    /// Returns an error if either credential is empty or if the HTTP client
    /// cannot be built.
    pub fn new(client_id: String, client_secret: String) -> Result<Self> {
        Self::with_urls(
            client_id,
            client_secret,
            SPOTIFY_TOKEN_URL.to_string(),
            SPOTIFY_API_BASE.to_string(),
        )
    }

    /// Create a new Spotify client with custom endpoint URLs (for tests).
    pub fn with_urls(
        client_id: String,
        client_secret: String,
        token_url: String,
        api_base: String,
    ) -> Result<Self> {
        if client_id.trim().is_empty() || client_secret.trim().is_empty() {
            return Err(AppError::Internal(
                "Spotify credentials cannot be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id,
            client_secret,
            token_url,
            api_base,
            token_cache: Mutex::new(None),
        })
    }

    /// Create a new Spotify client wrapped in Arc for shared access.
    pub fn new_shared(client_id: String, client_secret: String) -> Result<Arc<Self>> {
        Ok(Arc::new(Self::new(client_id, client_secret)?))
    }

    /// Get a valid access token, reusing the cached one while it is fresh.
    ///
    /// The cache lock is held across the refresh so concurrent callers on the
    /// same process refresh at most once per expiry window.
    async fn access_token(&self) -> Result<String> {
        let mut cache = self.token_cache.lock().await;

        if let Some(cached) = cache.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        tracing::debug!("Refreshing Spotify access token");

        let basic = BASE64.encode(format!("{}:{}", self.client_id, self.client_secret));

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", basic))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Spotify token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Spotify token error: {} {}",
                status, text
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to parse Spotify token: {}", e)))?;

        let token = token_response.access_token;
        *cache = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + Duration::from_secs(token_response.expires_in),
        });

        Ok(token)
    }

    /// Fetch up to `limit` track recommendations for a seed genre.
    ///
    /// Tracks missing an id, title, or Spotify URL are dropped.
    pub async fn recommendations_by_genre(
        &self,
        seed_genre: &str,
        limit: u32,
    ) -> Result<Vec<SpotifyRecommendation>> {
        let token = self.access_token().await?;

        tracing::debug!(seed_genre = %seed_genre, limit = %limit, "Fetching Spotify recommendations");

        let url = format!("{}/recommendations", self.api_base);
        let limit_param = limit.to_string();
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .query(&[("seed_genres", seed_genre), ("limit", limit_param.as_str())])
            .send()
            .await
            .map_err(|e| {
                AppError::Upstream(format!("Spotify recommendations request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream(format!(
                "Spotify recommendations error: {} {}",
                status, text
            )));
        }

        let body: RecommendationsResponse = response.json().await.map_err(|e| {
            AppError::Upstream(format!("Failed to parse Spotify recommendations: {}", e))
        })?;

        let recommendations = body
            .tracks
            .unwrap_or_default()
            .into_iter()
            .map(map_track)
            .filter(|r| !r.id.is_empty() && !r.title.is_empty() && !r.spotify_url.is_empty())
            .collect();

        Ok(recommendations)
    }
}

/// Flatten a raw Spotify track into the recommendation shape.
fn map_track(track: Track) -> SpotifyRecommendation {
    let artist = track
        .artists
        .first()
        .and_then(|a| a.name.clone())
        .unwrap_or_else(|| "Unknown".to_string());

    // Prefer an album image at least 300px wide, falling back to the first
    let images = track.album.map(|a| a.images).unwrap_or_default();
    let album_image_url = images
        .iter()
        .find(|img| img.width.unwrap_or(0) >= 300)
        .or_else(|| images.first())
        .map(|img| img.url.clone());

    SpotifyRecommendation {
        id: track.id.unwrap_or_default(),
        title: track.name.unwrap_or_default(),
        artist,
        spotify_url: track
            .external_urls
            .and_then(|u| u.spotify)
            .unwrap_or_default(),
        album_image_url,
        preview_url: track.preview_url,
    }
}

/// An externally sourced recommendation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpotifyRecommendation {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub spotify_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_image_url: Option<String>,
    pub preview_url: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct RecommendationsResponse {
    tracks: Option<Vec<Track>>,
}

#[derive(Debug, Deserialize)]
struct Track {
    id: Option<String>,
    name: Option<String>,
    #[serde(default)]
    artists: Vec<TrackArtist>,
    album: Option<Album>,
    external_urls: Option<ExternalUrls>,
    preview_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackArtist {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Album {
    #[serde(default)]
    images: Vec<AlbumImage>,
}

#[derive(Debug, Deserialize)]
struct AlbumImage {
    url: String,
    width: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(SpotifyClient::new(String::new(), "secret".to_string()).is_err());
        assert!(SpotifyClient::new("id".to_string(), "  ".to_string()).is_err());
    }

    #[test]
    fn test_token_freshness_margin() {
        let fresh = CachedToken {
            token: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        };
        assert!(fresh.is_fresh());

        // Inside the 10s refresh margin counts as stale
        let nearly_expired = CachedToken {
            token: "t".to_string(),
            expires_at: Instant::now() + Duration::from_secs(5),
        };
        assert!(!nearly_expired.is_fresh());
    }

    #[test]
    fn test_map_track_prefers_large_album_image() {
        let track = Track {
            id: Some("abc".to_string()),
            name: Some("Song".to_string()),
            artists: vec![TrackArtist {
                name: Some("Artist".to_string()),
            }],
            album: Some(Album {
                images: vec![
                    AlbumImage {
                        url: "small.jpg".to_string(),
                        width: Some(64),
                    },
                    AlbumImage {
                        url: "large.jpg".to_string(),
                        width: Some(640),
                    },
                ],
            }),
            external_urls: Some(ExternalUrls {
                spotify: Some("https://open.spotify.com/track/abc".to_string()),
            }),
            preview_url: None,
        };

        let rec = map_track(track);
        assert_eq!(rec.album_image_url.as_deref(), Some("large.jpg"));
        assert_eq!(rec.artist, "Artist");
    }

    #[test]
    fn test_map_track_defaults() {
        let track = Track {
            id: None,
            name: None,
            artists: vec![],
            album: None,
            external_urls: None,
            preview_url: None,
        };

        let rec = map_track(track);
        assert_eq!(rec.artist, "Unknown");
        assert!(rec.id.is_empty());
        assert!(rec.spotify_url.is_empty());
        assert!(rec.album_image_url.is_none());
    }
}
