//! Application services for the carolcard backend.

pub mod seed;
pub mod selector;
pub mod spotify;

pub use spotify::SpotifyClient;
