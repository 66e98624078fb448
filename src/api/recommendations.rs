//! Recommendations API endpoint.
//!
//! Proxies Spotify recommendations for a genre; when the primary path fails
//! for any reason the handler degrades to random rows from the local catalog.
//! This is the only place in the service where an error is converted into a
//! successful (if degraded) response.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::models::Genre;
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::services::spotify::SpotifyRecommendation;
use crate::AppState;

const DEFAULT_LIMIT: u32 = 5;
const MIN_LIMIT: i64 = 1;
const MAX_LIMIT: i64 = 10;

/// Query parameters for GET /recommendations.
///
/// `limit` is kept as a raw string so non-numeric values fall back to the
/// default instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct RecommendationsQuery {
    pub genre: Option<String>,
    pub limit: Option<String>,
}

/// Successful response, from either the external or the local source.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsResponse<T> {
    genre: Genre,
    source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
    items: Vec<T>,
}

/// A locally sourced item. `spotify_url` stays present-but-empty and
/// `listen_url` carries the catalog link; the two are independent fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LocalRecommendation {
    id: String,
    title: String,
    artist: String,
    spotify_url: String,
    listen_url: String,
}

/// Body returned when both the primary and the fallback path failed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RecommendationsFailure {
    error: &'static str,
    detail: String,
    fallback_error: String,
}

/// Clamp the requested limit to `[1, 10]`, defaulting when absent or
/// non-numeric.
fn clamp_limit(raw: Option<&str>) -> u32 {
    match raw.and_then(|s| s.trim().parse::<i64>().ok()) {
        Some(n) => n.clamp(MIN_LIMIT, MAX_LIMIT) as u32,
        None => DEFAULT_LIMIT,
    }
}

/// GET /recommendations?genre=&limit=
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(query): Query<RecommendationsQuery>,
) -> Result<Response> {
    // Validate before any store or network access
    let genre: Genre = query
        .genre
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::InvalidGenre(query.genre.clone().unwrap_or_default()))?;

    let limit = clamp_limit(query.limit.as_deref());

    let primary: Result<Vec<SpotifyRecommendation>> = match state.spotify_client() {
        Some(client) => {
            client
                .recommendations_by_genre(genre.spotify_seed(), limit)
                .await
        }
        None => Err(AppError::Upstream(
            "Spotify client is not configured".to_string(),
        )),
    };

    match primary {
        Ok(items) => Ok(Json(RecommendationsResponse {
            genre,
            source: "external",
            warning: None,
            detail: None,
            items,
        })
        .into_response()),
        Err(primary_err) => {
            let detail = primary_err.to_string();
            tracing::warn!(genre = %genre, error = %detail, "Spotify unavailable, serving local fallback");

            let fallback = {
                let db = state.db.lock().await;
                queries::random_songs_by_genre(&db, genre, limit)
            };

            match fallback {
                Ok(songs) => {
                    let items = songs
                        .into_iter()
                        .map(|song| LocalRecommendation {
                            id: format!("db-{}", song.id),
                            title: song.title,
                            artist: song.artist,
                            spotify_url: String::new(),
                            listen_url: song.listen_url,
                        })
                        .collect();

                    Ok(Json(RecommendationsResponse {
                        genre,
                        source: "local",
                        warning: Some(
                            "Spotify unavailable. Falling back to local catalog.".to_string(),
                        ),
                        detail: Some(detail),
                        items,
                    })
                    .into_response())
                }
                Err(fallback_err) => {
                    // Neither failure may be swallowed
                    tracing::error!(
                        genre = %genre,
                        primary = %detail,
                        fallback = %fallback_err,
                        "Recommendations failed on both paths"
                    );
                    Ok((
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(RecommendationsFailure {
                            error: "recommendations_failed",
                            detail,
                            fallback_error: fallback_err.to_string(),
                        }),
                    )
                        .into_response())
                }
            }
        }
    }
}
