//! Catalog seed data and the offline seeding step.
//!
//! Seeding is a full reset: cards, songs, and artist groups are wiped and the
//! bundled catalog is inserted in one transaction. It never runs on the
//! request path.

use rusqlite::{params, Connection};
use std::collections::HashMap;

use crate::db::models::Genre;
use crate::error::{AppError, Result};

struct SeedSong {
    genre: Genre,
    title: &'static str,
    artist: &'static str,
    /// Explicit listen link; absent entries get a flo search URL.
    listen_url: Option<&'static str>,
    group_slug: Option<&'static str>,
}

const ARTIST_GROUPS: &[(&str, &str)] = &[
    ("exo", "EXO"),
    ("taeyeon", "Taeyeon"),
    ("twice", "TWICE"),
    ("stray-kids", "Stray Kids"),
    ("nct-dream", "NCT DREAM"),
    ("iu", "IU"),
    ("bts", "BTS"),
    ("newjeans", "NewJeans"),
    ("v", "V"),
    ("btob", "BTOB"),
];

/// Search link on music-flo for songs without a direct listen URL.
fn flo_search_url(artist: &str, title: &str) -> String {
    let query = urlencoding::encode(&format!("{} {} 캐롤", artist, title)).into_owned();
    format!("https://www.music-flo.com/search/search?query={}", query)
}

fn pop(title: &'static str, artist: &'static str) -> SeedSong {
    SeedSong {
        genre: Genre::Pop,
        title,
        artist,
        listen_url: None,
        group_slug: None,
    }
}

fn jazz(title: &'static str, artist: &'static str) -> SeedSong {
    SeedSong {
        genre: Genre::Jazz,
        title,
        artist,
        listen_url: None,
        group_slug: None,
    }
}

fn kpop(title: &'static str, artist: &'static str, group_slug: &'static str) -> SeedSong {
    SeedSong {
        genre: Genre::Kpop,
        title,
        artist,
        listen_url: None,
        group_slug: Some(group_slug),
    }
}

fn songs() -> Vec<SeedSong> {
    vec![
        // POP
        pop("All I Want for Christmas Is You", "Mariah Carey"),
        SeedSong {
            listen_url: Some("https://flomuz.io/s/b.CGn4M"),
            ..pop("Last Christmas", "Wham!")
        },
        pop("Santa Tell Me", "Ariana Grande"),
        pop("Mistletoe", "Justin Bieber"),
        pop("Underneath the Tree", "Kelly Clarkson"),
        pop("Santa Baby", "Eartha Kitt"),
        pop("It's Beginning to Look a Lot Like Christmas", "Michael Bublé"),
        pop("Jingle Bell Rock", "Bobby Helms"),
        pop("Rockin' Around the Christmas Tree", "Brenda Lee"),
        pop("Feliz Navidad", "José Feliciano"),
        SeedSong {
            listen_url: Some("https://flomuz.io/s/b.wYlg"),
            ..pop("Happy Xmas (War Is Over) (Ultimate Mix)", "John Lennon & Yoko Ono")
        },
        SeedSong {
            listen_url: Some("https://flomuz.io/s/b.rwT"),
            ..pop("또다시 크리스마스", "들국화")
        },
        pop("Wonderful Christmastime", "Paul McCartney"),
        pop("Driving Home for Christmas", "Chris Rea"),
        pop("Step Into Christmas", "Elton John"),
        pop("Merry Christmas Everyone", "Shakin' Stevens"),
        pop("One More Sleep", "Leona Lewis"),
        pop("Christmas (Baby Please Come Home)", "Darlene Love"),
        pop("Holly Jolly Christmas", "Burl Ives"),
        pop("Fairytale of New York", "The Pogues"),
        pop("Run Rudolph Run", "Chuck Berry"),
        pop("Please Come Home for Christmas", "Eagles"),
        // JAZZ
        jazz(
            "The Christmas Song (Chestnuts Roasting on an Open Fire)",
            "Nat King Cole",
        ),
        jazz("Have Yourself a Merry Little Christmas", "Ella Fitzgerald"),
        jazz("Winter Wonderland", "Tony Bennett"),
        jazz("Let It Snow! Let It Snow! Let It Snow!", "Dean Martin"),
        jazz("White Christmas", "Bing Crosby"),
        jazz("I'll Be Home for Christmas", "Frank Sinatra"),
        jazz("Sleigh Ride", "The Ronettes"),
        jazz("Blue Christmas", "Elvis Presley"),
        jazz("O Holy Night", "Louis Armstrong"),
        jazz("What Are You Doing New Year's Eve?", "Nancy Wilson"),
        SeedSong {
            listen_url: Some("https://flomuz.io/s/b.CRq7e"),
            ..jazz("Christmas Time Is Here (Vocal)", "Vince Guaraldi Trio")
        },
        SeedSong {
            listen_url: Some("https://flomuz.io/s/a.bwZSJ"),
            ..jazz("잘 되길 바랄게", "소수빈")
        },
        jazz("My Favorite Things", "John Coltrane"),
        jazz("Santa Claus Is Coming To Town", "Bill Evans"),
        jazz("I've Got My Love to Keep Me Warm", "Billie Holiday"),
        jazz("Let It Snow", "Diana Krall"),
        jazz("I'll Be Home for Christmas", "Oscar Peterson"),
        jazz("Winter Weather", "Benny Goodman"),
        jazz("The Christmas Waltz", "Peggy Lee"),
        jazz("A Child Is Born", "Thad Jones & Mel Lewis Orchestra"),
        jazz("Greensleeves", "Vince Guaraldi Trio"),
        jazz("Silent Night", "Chet Baker"),
        // KPOP
        kpop("Miracles in December", "EXO", "exo"),
        kpop("The First Snow", "EXO", "exo"),
        kpop("December, 2014 (The Winter's Tale)", "EXO", "exo"),
        kpop("Sing For You", "EXO", "exo"),
        kpop("Unfair", "EXO", "exo"),
        kpop("This Christmas", "Taeyeon", "taeyeon"),
        kpop("Candy Cane", "Taeyeon", "taeyeon"),
        kpop("Christmas Without You", "Taeyeon", "taeyeon"),
        kpop("Merry & Happy", "TWICE", "twice"),
        kpop("The Best Thing I Ever Did", "TWICE", "twice"),
        kpop("Heart Shaker", "TWICE", "twice"),
        kpop("Doughnut", "TWICE", "twice"),
        kpop("Christmas EveL", "Stray Kids", "stray-kids"),
        kpop("Winter Falls", "Stray Kids", "stray-kids"),
        kpop("24 to 25", "Stray Kids", "stray-kids"),
        kpop("Candle Light", "NCT DREAM", "nct-dream"),
        kpop("Joy", "NCT DREAM", "nct-dream"),
        kpop("Merry Christmas in Advance", "IU", "iu"),
        kpop("Butter (Holiday Remix)", "BTS", "bts"),
        kpop("Dynamite (Holiday Remix)", "BTS", "bts"),
        kpop("Ditto", "NewJeans", "newjeans"),
        kpop("Christmas Tree", "V", "v"),
        kpop("Snow Flower", "V", "v"),
        kpop("The Winter's Tale", "BTOB", "btob"),
        kpop("Because It's Christmas", "BTOB", "btob"),
    ]
}

/// Counts reported by a seed run.
#[derive(Debug)]
pub struct SeedSummary {
    pub artist_groups: usize,
    pub songs: usize,
}

/// Reset and repopulate the catalog.
pub fn run(conn: &mut Connection) -> Result<SeedSummary> {
    let dataset = songs();
    let tx = conn.transaction()?;

    tx.execute("DELETE FROM cards", [])?;
    tx.execute("DELETE FROM songs", [])?;
    tx.execute("DELETE FROM artist_groups", [])?;

    let mut group_ids: HashMap<&str, i64> = HashMap::new();
    for (slug, name) in ARTIST_GROUPS {
        tx.execute(
            "INSERT INTO artist_groups (slug, name) VALUES (?1, ?2)",
            params![slug, name],
        )?;
        group_ids.insert(slug, tx.last_insert_rowid());
    }

    for song in &dataset {
        let listen_url = match song.listen_url {
            Some(url) => url.to_string(),
            None => flo_search_url(song.artist, song.title),
        };
        let group_id = match song.group_slug {
            Some(slug) => Some(group_ids.get(slug).copied().ok_or_else(|| {
                AppError::Internal(format!(
                    "Seed song '{}' references unknown artist group '{}'",
                    song.title, slug
                ))
            })?),
            None => None,
        };
        tx.execute(
            "INSERT INTO songs (genre, title, artist, listen_url, artist_group_id) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                song.genre.to_string(),
                song.title,
                song.artist,
                listen_url,
                group_id
            ],
        )?;
    }

    tx.commit()?;

    Ok(SeedSummary {
        artist_groups: ARTIST_GROUPS.len(),
        songs: dataset.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db_memory;

    #[test]
    fn test_seed_populates_catalog() {
        let mut conn = init_db_memory().unwrap();
        let summary = run(&mut conn).unwrap();

        assert_eq!(summary.artist_groups, 10);
        assert!(summary.songs > 60);

        let kpop_without_group: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM songs WHERE genre = 'KPOP' AND artist_group_id IS NULL",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kpop_without_group, 0);

        let empty_urls: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM songs WHERE listen_url = ''",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(empty_urls, 0);
    }

    #[test]
    fn test_seed_is_a_reset() {
        let mut conn = init_db_memory().unwrap();
        run(&mut conn).unwrap();
        let first: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
            .unwrap();

        run(&mut conn).unwrap();
        let second: i64 = conn
            .query_row("SELECT COUNT(*) FROM songs", [], |row| row.get(0))
            .unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_songs_reference_known_groups() {
        let known: std::collections::HashSet<&str> =
            ARTIST_GROUPS.iter().map(|(slug, _)| *slug).collect();
        for song in songs() {
            if let Some(slug) = song.group_slug {
                assert!(known.contains(slug), "unknown artist group '{}'", slug);
            }
        }
    }

    #[test]
    fn test_flo_search_url_encodes_query() {
        let url = flo_search_url("Wham!", "Last Christmas");
        assert!(url.starts_with("https://www.music-flo.com/search/search?query="));
        assert!(!url.contains(' '));
    }
}
