//! Song selection for card creation.
//!
//! Given a genre (plus a required artist group and optional explicit song id
//! for KPOP), narrows the catalog to a candidate set and returns exactly one
//! song id, drawn uniformly at random unless an explicit id was given.

use rand::Rng;
use rusqlite::Connection;

use crate::db::models::Genre;
use crate::db::queries;
use crate::error::{AppError, Result};

/// Pick one song id matching the criteria.
///
/// KPOP requires an artist group slug; an explicit song id (KPOP only) is
/// verified against the group instead of drawing randomly. The random path
/// counts candidates and fetches by offset under a stable `id ASC` order, so
/// count and fetch agree. The pair is not transactionally guarded: the
/// catalog is only written by the offline seed.
pub fn select_song(
    conn: &Connection,
    genre: Genre,
    artist_group_slug: Option<&str>,
    explicit_song_id: Option<i64>,
) -> Result<i64> {
    if genre == Genre::Kpop {
        let slug = artist_group_slug
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(AppError::ArtistGroupRequired)?;

        if let Some(song_id) = explicit_song_id {
            if !queries::song_matches_selection(conn, song_id, Genre::Kpop, slug)? {
                return Err(AppError::InvalidSelection(format!(
                    "song {} does not belong to artist group '{}'",
                    song_id, slug
                )));
            }
            return Ok(song_id);
        }

        return pick_random(conn, genre, Some(slug));
    }

    // POP/JAZZ: explicit ids and artist groups are not applicable
    pick_random(conn, genre, None)
}

fn pick_random(conn: &Connection, genre: Genre, group_slug: Option<&str>) -> Result<i64> {
    let count = queries::count_songs(conn, genre, group_slug)?;
    if count <= 0 {
        return Err(AppError::NoCandidates(match group_slug {
            Some(slug) => format!("no songs for artist group '{}'", slug),
            None => format!("no songs for genre {}", genre),
        }));
    }

    let offset = rand::thread_rng().gen_range(0..count);
    queries::song_id_at_offset(conn, genre, group_slug, offset)?.ok_or_else(|| {
        // Only reachable if the catalog shrank between count and fetch
        AppError::Internal(format!(
            "song offset {} out of range for genre {}",
            offset, genre
        ))
    })
}
