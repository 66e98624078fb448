//! Card API endpoints: creation and retrieval.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::models::{Card, Genre};
use crate::db::queries;
use crate::error::{AppError, Result};
use crate::services::selector;
use crate::AppState;

/// Maximum message length in characters, after trimming.
const MAX_MESSAGE_CHARS: usize = 200;

/// Public card id length. 12 alphanumeric chars carry ~71 bits of entropy,
/// enough to make tokens unguessable and collisions negligible.
const CARD_ID_LEN: usize = 12;

/// Create card request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub message: Option<String>,
    pub genre: Option<String>,
    pub artist_group_slug: Option<String>,
    pub song_id: Option<i64>,
}

/// Create card response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardResponse {
    pub card_id: String,
}

/// Card read view, joined with its song.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardResponse {
    pub id: String,
    pub message: String,
    pub genre: Genre,
    pub created_at: String,
    pub view_count: i64,
    pub song: CardSongResponse,
}

/// Song fields exposed on a card read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSongResponse {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub listen_url: String,
    pub genre: Genre,
}

/// Generate a new public card id.
fn generate_card_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CARD_ID_LEN)
        .map(char::from)
        .collect()
}

/// POST /cards
///
/// Validates the message and genre, picks a song, and persists the card.
pub async fn create_card(
    State(state): State<AppState>,
    Json(body): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<CreateCardResponse>)> {
    let message = body
        .message
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| AppError::InvalidMessage("Message is required".to_string()))?;

    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::InvalidMessage(format!(
            "Message is too long (max {})",
            MAX_MESSAGE_CHARS
        )));
    }

    let genre: Genre = body
        .genre
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| AppError::InvalidGenre(body.genre.clone().unwrap_or_default()))?;

    let db = state.db.lock().await;

    let song_id =
        selector::select_song(&db, genre, body.artist_group_slug.as_deref(), body.song_id)?;

    let card = Card {
        id: generate_card_id(),
        message: message.to_string(),
        genre,
        song_id,
        created_at: Utc::now().to_rfc3339(),
        view_count: 0,
    };
    queries::insert_card(&db, &card)?;

    tracing::info!(card_id = %card.id, genre = %genre, song_id = song_id, "Card created");

    Ok((
        StatusCode::CREATED,
        Json(CreateCardResponse { card_id: card.id }),
    ))
}

/// GET /cards/:id
///
/// Returns the card joined with its song. The view counter is bumped by a
/// detached task after the read; its failure is logged and never surfaced.
pub async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CardResponse>> {
    let looked_up = {
        let db = state.db.lock().await;
        queries::card_with_song(&db, &id)?
    };

    let (card, song) = looked_up.ok_or_else(|| AppError::NotFound("Card not found".to_string()))?;

    // Best-effort view count update; the read must not wait on or depend on it
    let db = Arc::clone(&state.db);
    let card_id = card.id.clone();
    tokio::spawn(async move {
        let conn = db.lock().await;
        if let Err(e) = queries::increment_view_count(&conn, &card_id) {
            tracing::warn!(card_id = %card_id, error = %e, "Failed to increment view count");
        }
    });

    Ok(Json(CardResponse {
        id: card.id,
        message: card.message,
        genre: card.genre,
        created_at: card.created_at,
        view_count: card.view_count,
        song: CardSongResponse {
            id: song.id,
            title: song.title,
            artist: song.artist,
            listen_url: song.listen_url,
            genre: song.genre,
        },
    }))
}
