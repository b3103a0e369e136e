//! Domain Layer
//!
//! Catalog entities, the song query model, and repository traits.

pub mod entity;
pub mod repository;
pub mod song_query;

pub use entity::{
    artist::Artist,
    comment::Comment,
    genre::Genre,
    history::{History, StreamEntry},
    listing::{Format, FormatType, ListedSong},
    song::Song,
};
pub use song_query::{SongQuery, SongSort, SortOrder};
