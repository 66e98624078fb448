//! API endpoint handlers for the carolcard backend.

pub mod artists;
pub mod cards;
pub mod recommendations;
