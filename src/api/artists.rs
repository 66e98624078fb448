//! Artist group API endpoints (KPOP catalog browsing).

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::AppState;

/// Artist list response body.
#[derive(Debug, Serialize)]
pub struct ArtistsResponse {
    pub items: Vec<ArtistItem>,
}

/// One artist group in the list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistItem {
    pub slug: String,
    pub name: String,
    pub image_url: String,
    pub song_count: i64,
}

/// Artist songs response body.
#[derive(Debug, Serialize)]
pub struct ArtistSongsResponse {
    pub artist: ArtistRef,
    pub items: Vec<ArtistSongItem>,
}

#[derive(Debug, Serialize)]
pub struct ArtistRef {
    pub slug: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistSongItem {
    pub id: i64,
    pub title: String,
    pub artist: String,
    pub listen_url: String,
}

/// GET /artists
///
/// Lists all artist groups ordered by name, with song counts.
pub async fn list_artists(State(state): State<AppState>) -> Result<Json<ArtistsResponse>> {
    let db = state.db.lock().await;

    let items = queries::artist_groups_with_counts(&db)?
        .into_iter()
        .map(|(group, song_count)| ArtistItem {
            image_url: format!("/kpop-artists/{}.svg", group.slug),
            slug: group.slug,
            name: group.name,
            song_count,
        })
        .collect();

    Ok(Json(ArtistsResponse { items }))
}

/// GET /artists/:slug/songs
///
/// Lists the KPOP songs of one artist group, ordered by title then id.
pub async fn artist_songs(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ArtistSongsResponse>> {
    let db = state.db.lock().await;

    let group = queries::artist_group_by_slug(&db, &slug)?
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))?;

    let items = queries::songs_for_group(&db, group.id)?
        .into_iter()
        .map(|song| ArtistSongItem {
            id: song.id,
            title: song.title,
            artist: song.artist,
            listen_url: song.listen_url,
        })
        .collect();

    Ok(Json(ArtistSongsResponse {
        artist: ArtistRef {
            slug: group.slug,
            name: group.name,
        },
        items,
    }))
}
