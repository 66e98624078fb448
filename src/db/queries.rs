//! Typed query helpers over a rusqlite connection.
//!
//! Handlers hold the connection mutex and call into these; all SQL for the
//! catalog and card tables lives here.

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::{ArtistGroup, Card, Genre, Song};

/// Convert a stored genre string into the enum, surfacing bad rows as a
/// conversion error instead of panicking.
fn genre_from_sql(idx: usize, value: String) -> rusqlite::Result<Genre> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Text,
            format!("unrecognized genre: {}", value).into(),
        )
    })
}

/// Count catalog songs matching a genre, optionally narrowed to an artist
/// group slug.
pub fn count_songs(
    conn: &Connection,
    genre: Genre,
    group_slug: Option<&str>,
) -> rusqlite::Result<i64> {
    match group_slug {
        Some(slug) => conn.query_row(
            "SELECT COUNT(*) FROM songs s \
             JOIN artist_groups g ON g.id = s.artist_group_id \
             WHERE s.genre = ?1 AND g.slug = ?2",
            params![genre.to_string(), slug],
            |row| row.get(0),
        ),
        None => conn.query_row(
            "SELECT COUNT(*) FROM songs WHERE genre = ?1",
            params![genre.to_string()],
            |row| row.get(0),
        ),
    }
}

/// Fetch the song id at the given ordinal position (by ascending id) within
/// the filtered set. The ordering must stay consistent with `count_songs` so
/// a random offset in `[0, count)` always lands on a row.
pub fn song_id_at_offset(
    conn: &Connection,
    genre: Genre,
    group_slug: Option<&str>,
    offset: i64,
) -> rusqlite::Result<Option<i64>> {
    match group_slug {
        Some(slug) => conn
            .query_row(
                "SELECT s.id FROM songs s \
                 JOIN artist_groups g ON g.id = s.artist_group_id \
                 WHERE s.genre = ?1 AND g.slug = ?2 \
                 ORDER BY s.id ASC LIMIT 1 OFFSET ?3",
                params![genre.to_string(), slug, offset],
                |row| row.get(0),
            )
            .optional(),
        None => conn
            .query_row(
                "SELECT id FROM songs WHERE genre = ?1 \
                 ORDER BY id ASC LIMIT 1 OFFSET ?2",
                params![genre.to_string(), offset],
                |row| row.get(0),
            )
            .optional(),
    }
}

/// Check that an explicitly chosen song exists with the given genre inside
/// the named artist group.
pub fn song_matches_selection(
    conn: &Connection,
    song_id: i64,
    genre: Genre,
    group_slug: &str,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(\
             SELECT 1 FROM songs s \
             JOIN artist_groups g ON g.id = s.artist_group_id \
             WHERE s.id = ?1 AND s.genre = ?2 AND g.slug = ?3)",
        params![song_id, genre.to_string(), group_slug],
        |row| row.get(0),
    )
}

/// Insert a new card row.
pub fn insert_card(conn: &Connection, card: &Card) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO cards (id, message, genre, song_id, created_at, view_count) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            card.id,
            card.message,
            card.genre.to_string(),
            card.song_id,
            card.created_at,
            card.view_count
        ],
    )?;
    Ok(())
}

/// Look up a card by its public id, joined with its song.
pub fn card_with_song(conn: &Connection, id: &str) -> rusqlite::Result<Option<(Card, Song)>> {
    conn.query_row(
        "SELECT c.id, c.message, c.genre, c.song_id, c.created_at, c.view_count, \
                s.id, s.genre, s.title, s.artist, s.listen_url, s.artist_group_id \
         FROM cards c JOIN songs s ON s.id = c.song_id \
         WHERE c.id = ?1",
        params![id],
        |row| {
            let card_genre: String = row.get(2)?;
            let song_genre: String = row.get(7)?;
            Ok((
                Card {
                    id: row.get(0)?,
                    message: row.get(1)?,
                    genre: genre_from_sql(2, card_genre)?,
                    song_id: row.get(3)?,
                    created_at: row.get(4)?,
                    view_count: row.get(5)?,
                },
                Song {
                    id: row.get(6)?,
                    genre: genre_from_sql(7, song_genre)?,
                    title: row.get(8)?,
                    artist: row.get(9)?,
                    listen_url: row.get(10)?,
                    artist_group_id: row.get(11)?,
                },
            ))
        },
    )
    .optional()
}

/// Bump a card's view counter. Best-effort; callers decide whether the
/// result matters.
pub fn increment_view_count(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE cards SET view_count = view_count + 1 WHERE id = ?1",
        params![id],
    )
}

/// List all artist groups ordered by display name, with their song counts.
pub fn artist_groups_with_counts(conn: &Connection) -> rusqlite::Result<Vec<(ArtistGroup, i64)>> {
    let mut stmt = conn.prepare(
        "SELECT g.id, g.slug, g.name, \
                (SELECT COUNT(*) FROM songs s WHERE s.artist_group_id = g.id) \
         FROM artist_groups g ORDER BY g.name ASC",
    )?;

    let groups = stmt
        .query_map([], |row| {
            Ok((
                ArtistGroup {
                    id: row.get(0)?,
                    slug: row.get(1)?,
                    name: row.get(2)?,
                },
                row.get(3)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(groups)
}

/// Look up a single artist group by its slug.
pub fn artist_group_by_slug(conn: &Connection, slug: &str) -> rusqlite::Result<Option<ArtistGroup>> {
    conn.query_row(
        "SELECT id, slug, name FROM artist_groups WHERE slug = ?1",
        params![slug],
        |row| {
            Ok(ArtistGroup {
                id: row.get(0)?,
                slug: row.get(1)?,
                name: row.get(2)?,
            })
        },
    )
    .optional()
}

/// KPOP songs belonging to an artist group, ordered by title then id.
pub fn songs_for_group(conn: &Connection, group_id: i64) -> rusqlite::Result<Vec<Song>> {
    let mut stmt = conn.prepare(
        "SELECT id, genre, title, artist, listen_url, artist_group_id \
         FROM songs WHERE artist_group_id = ?1 AND genre = 'KPOP' \
         ORDER BY title ASC, id ASC",
    )?;

    let songs = stmt
        .query_map(params![group_id], |row| {
            let genre: String = row.get(1)?;
            Ok(Song {
                id: row.get(0)?,
                genre: genre_from_sql(1, genre)?,
                title: row.get(2)?,
                artist: row.get(3)?,
                listen_url: row.get(4)?,
                artist_group_id: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(songs)
}

/// Draw up to `limit` random songs of a genre. Used by the recommendations
/// fallback path.
pub fn random_songs_by_genre(
    conn: &Connection,
    genre: Genre,
    limit: u32,
) -> rusqlite::Result<Vec<Song>> {
    let mut stmt = conn.prepare(
        "SELECT id, genre, title, artist, listen_url, artist_group_id \
         FROM songs WHERE genre = ?1 ORDER BY RANDOM() LIMIT ?2",
    )?;

    let songs = stmt
        .query_map(params![genre.to_string(), limit], |row| {
            let g: String = row.get(1)?;
            Ok(Song {
                id: row.get(0)?,
                genre: genre_from_sql(1, g)?,
                title: row.get(2)?,
                artist: row.get(3)?,
                listen_url: row.get(4)?,
                artist_group_id: row.get(5)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(songs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db_memory;

    fn seed_group(conn: &Connection, slug: &str, name: &str) -> i64 {
        conn.execute(
            "INSERT INTO artist_groups (slug, name) VALUES (?1, ?2)",
            params![slug, name],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn seed_song(conn: &Connection, genre: &str, title: &str, group_id: Option<i64>) -> i64 {
        conn.execute(
            "INSERT INTO songs (genre, title, artist, listen_url, artist_group_id) \
             VALUES (?1, ?2, 'Test Artist', 'https://example.com/listen', ?3)",
            params![genre, title, group_id],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_count_and_offset_agree() {
        let conn = init_db_memory().unwrap();
        let ids: Vec<i64> = (0..5)
            .map(|i| seed_song(&conn, "JAZZ", &format!("Song {}", i), None))
            .collect();

        let count = count_songs(&conn, Genre::Jazz, None).unwrap();
        assert_eq!(count, 5);

        for (offset, expected) in ids.iter().enumerate() {
            let got = song_id_at_offset(&conn, Genre::Jazz, None, offset as i64).unwrap();
            assert_eq!(got, Some(*expected));
        }

        // One past the end yields no row rather than wrapping
        assert_eq!(song_id_at_offset(&conn, Genre::Jazz, None, 5).unwrap(), None);
    }

    #[test]
    fn test_count_songs_filters_by_group() {
        let conn = init_db_memory().unwrap();
        let twice = seed_group(&conn, "twice", "TWICE");
        let exo = seed_group(&conn, "exo", "EXO");
        seed_song(&conn, "KPOP", "Merry & Happy", Some(twice));
        seed_song(&conn, "KPOP", "Heart Shaker", Some(twice));
        seed_song(&conn, "KPOP", "The First Snow", Some(exo));

        assert_eq!(count_songs(&conn, Genre::Kpop, Some("twice")).unwrap(), 2);
        assert_eq!(count_songs(&conn, Genre::Kpop, Some("exo")).unwrap(), 1);
        assert_eq!(count_songs(&conn, Genre::Kpop, Some("unknown")).unwrap(), 0);
    }

    #[test]
    fn test_song_matches_selection() {
        let conn = init_db_memory().unwrap();
        let twice = seed_group(&conn, "twice", "TWICE");
        let exo = seed_group(&conn, "exo", "EXO");
        let twice_song = seed_song(&conn, "KPOP", "Merry & Happy", Some(twice));
        let exo_song = seed_song(&conn, "KPOP", "The First Snow", Some(exo));

        assert!(song_matches_selection(&conn, twice_song, Genre::Kpop, "twice").unwrap());
        assert!(!song_matches_selection(&conn, exo_song, Genre::Kpop, "twice").unwrap());
        assert!(!song_matches_selection(&conn, twice_song, Genre::Pop, "twice").unwrap());
    }

    #[test]
    fn test_card_roundtrip_and_view_count() {
        let conn = init_db_memory().unwrap();
        let song_id = seed_song(&conn, "POP", "Last Christmas", None);

        let card = Card {
            id: "aB3dE5fG7hJ9".to_string(),
            message: "Happy holidays!".to_string(),
            genre: Genre::Pop,
            song_id,
            created_at: "2025-12-01T00:00:00+00:00".to_string(),
            view_count: 0,
        };
        insert_card(&conn, &card).unwrap();

        let (stored, song) = card_with_song(&conn, "aB3dE5fG7hJ9").unwrap().unwrap();
        assert_eq!(stored.message, "Happy holidays!");
        assert_eq!(song.id, song_id);
        assert_eq!(stored.view_count, 0);

        increment_view_count(&conn, "aB3dE5fG7hJ9").unwrap();
        let (stored, _) = card_with_song(&conn, "aB3dE5fG7hJ9").unwrap().unwrap();
        assert_eq!(stored.view_count, 1);

        // Lookups are case-sensitive exact matches
        assert!(card_with_song(&conn, "AB3DE5FG7HJ9").unwrap().is_none());
    }

    #[test]
    fn test_random_songs_by_genre_limit_and_filter() {
        let conn = init_db_memory().unwrap();
        for i in 0..8 {
            seed_song(&conn, "JAZZ", &format!("Jazz {}", i), None);
        }
        seed_song(&conn, "POP", "Pop song", None);

        let songs = random_songs_by_genre(&conn, Genre::Jazz, 5).unwrap();
        assert_eq!(songs.len(), 5);
        assert!(songs.iter().all(|s| s.genre == Genre::Jazz));

        // Limit larger than the candidate set returns everything once
        let songs = random_songs_by_genre(&conn, Genre::Pop, 10).unwrap();
        assert_eq!(songs.len(), 1);
    }
}
