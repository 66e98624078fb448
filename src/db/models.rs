use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Music genre for the card catalog.
///
/// Stored as TEXT in SQLite and serialized in uppercase on the wire
/// (`"POP"`, `"JAZZ"`, `"KPOP"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Genre {
    Pop,
    Jazz,
    Kpop,
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Genre::Pop => write!(f, "POP"),
            Genre::Jazz => write!(f, "JAZZ"),
            Genre::Kpop => write!(f, "KPOP"),
        }
    }
}

impl FromStr for Genre {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POP" => Ok(Genre::Pop),
            "JAZZ" => Ok(Genre::Jazz),
            "KPOP" => Ok(Genre::Kpop),
            _ => Err(()),
        }
    }
}

impl Genre {
    /// Map the internal genre to Spotify's seed-genre taxonomy.
    pub fn spotify_seed(&self) -> &'static str {
        match self {
            Genre::Pop => "pop",
            Genre::Jazz => "jazz",
            Genre::Kpop => "k-pop",
        }
    }
}

/// A catalog song. Immutable after seeding.
#[derive(Debug, Clone, Serialize)]
pub struct Song {
    pub id: i64,
    pub genre: Genre,
    pub title: String,
    pub artist: String,
    pub listen_url: String,
    /// Set only for KPOP songs belonging to a named artist group.
    pub artist_group_id: Option<i64>,
}

/// A named artist group (KPOP only), selectable by slug.
#[derive(Debug, Clone, Serialize)]
pub struct ArtistGroup {
    pub id: i64,
    pub slug: String,
    pub name: String,
}

/// A persisted greeting card.
#[derive(Debug, Clone)]
pub struct Card {
    /// Public unguessable token; case-sensitive lookup key.
    pub id: String,
    pub message: String,
    pub genre: Genre,
    pub song_id: i64,
    pub created_at: String,
    pub view_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_roundtrip() {
        for (s, g) in [
            ("POP", Genre::Pop),
            ("JAZZ", Genre::Jazz),
            ("KPOP", Genre::Kpop),
        ] {
            assert_eq!(s.parse::<Genre>().unwrap(), g);
            assert_eq!(g.to_string(), s);
        }
    }

    #[test]
    fn test_genre_rejects_unknown() {
        assert!("ROCK".parse::<Genre>().is_err());
        assert!("pop".parse::<Genre>().is_err());
        assert!("".parse::<Genre>().is_err());
    }

    #[test]
    fn test_genre_serde_uppercase() {
        let json = serde_json::to_string(&Genre::Kpop).unwrap();
        assert_eq!(json, "\"KPOP\"");
    }
}
