//! Application Layer
//!
//! One use case per catalog entity. Reads are public; every mutation
//! takes the authenticated caller and checks roles or ownership.

pub mod access;
pub mod accounts;
pub mod artists;
pub mod comments;
pub mod genres;
pub mod histories;
pub mod listings;
pub mod lookup;
pub mod songs;

pub use accounts::AccountContentCleanup;
pub use artists::{ArtistInput, ArtistUseCase};
pub use comments::{CommentStateInput, CommentUseCase, PostCommentInput};
pub use genres::{GenreInput, GenreUseCase};
pub use histories::HistoryUseCase;
pub use listings::{ListingInput, ListingUseCase};
pub use songs::SongUseCase;
