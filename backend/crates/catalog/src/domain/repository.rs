//! Repository Traits
//!
//! Interfaces for catalog persistence. Method names carry the entity so
//! one struct can implement every trait without ambiguity.

use kernel::id::{ArtistId, CommentId, GenreId, HistoryId, ListedSongId, SongId, UserId};

use crate::domain::entity::{
    artist::Artist, comment::Comment, genre::Genre, history::History, listing::ListedSong,
    song::Song,
};
use crate::domain::song_query::SongQuery;
use crate::error::CatalogResult;

#[trait_variant::make(GenreRepository: Send)]
pub trait LocalGenreRepository {
    async fn list_genres(&self) -> CatalogResult<Vec<Genre>>;

    async fn find_genre(&self, genre_id: &GenreId) -> CatalogResult<Option<Genre>>;

    async fn insert_genre(&self, genre: &Genre) -> CatalogResult<()>;

    /// Lock the genre, apply `change` and persist name and song list.
    /// `None` when the genre does not exist; an error from `change` leaves
    /// it untouched.
    async fn modify_genre<F>(&self, genre_id: &GenreId, change: F) -> CatalogResult<Option<Genre>>
    where
        F: FnOnce(&mut Genre) -> CatalogResult<()> + Send;

    async fn remove_genre(&self, genre_id: &GenreId) -> CatalogResult<bool>;
}

#[trait_variant::make(ArtistRepository: Send)]
pub trait LocalArtistRepository {
    async fn list_artists(&self) -> CatalogResult<Vec<Artist>>;

    async fn find_artist(&self, artist_id: &ArtistId) -> CatalogResult<Option<Artist>>;

    async fn find_artist_by_user(&self, user_id: &UserId) -> CatalogResult<Option<Artist>>;

    async fn insert_artist(&self, artist: &Artist) -> CatalogResult<()>;

    async fn save_artist(&self, artist: &Artist) -> CatalogResult<()>;

    /// Like [`LocalGenreRepository::modify_genre`]
    async fn modify_artist<F>(&self, artist_id: &ArtistId, change: F) -> CatalogResult<Option<Artist>>
    where
        F: FnOnce(&mut Artist) -> CatalogResult<()> + Send;
}

#[trait_variant::make(SongRepository: Send)]
pub trait LocalSongRepository {
    async fn search_songs(&self, query: &SongQuery) -> CatalogResult<Vec<Song>>;

    async fn find_song(&self, song_id: &SongId) -> CatalogResult<Option<Song>>;

    /// The subset of `song_ids` that exist, in no particular order
    async fn existing_song_ids(&self, song_ids: &[SongId]) -> CatalogResult<Vec<SongId>>;

    async fn insert_song(&self, song: &Song) -> CatalogResult<()>;

    async fn save_song(&self, song: &Song) -> CatalogResult<()>;

    async fn remove_song(&self, song_id: &SongId) -> CatalogResult<bool>;
}

#[trait_variant::make(ListingRepository: Send)]
pub trait LocalListingRepository {
    async fn list_listings(&self) -> CatalogResult<Vec<ListedSong>>;

    async fn find_listing(&self, listing_id: &ListedSongId) -> CatalogResult<Option<ListedSong>>;

    async fn insert_listing(&self, listing: &ListedSong) -> CatalogResult<()>;

    async fn remove_listing(&self, listing_id: &ListedSongId) -> CatalogResult<bool>;
}

#[trait_variant::make(CommentRepository: Send)]
pub trait LocalCommentRepository {
    /// All comments, or only those on one listing
    async fn list_comments(
        &self,
        listing_id: Option<&ListedSongId>,
    ) -> CatalogResult<Vec<Comment>>;

    async fn find_comment(&self, comment_id: &CommentId) -> CatalogResult<Option<Comment>>;

    /// A reply is attached to its parent while the parent row is locked.
    /// `NotFound` when the parent is gone.
    async fn insert_comment(&self, comment: &Comment) -> CatalogResult<()>;

    /// Lock the comment, apply `change` and persist message, flag and votes
    async fn modify_comment<F>(&self, comment_id: &CommentId, change: F) -> CatalogResult<Option<Comment>>
    where
        F: FnOnce(&mut Comment) -> CatalogResult<()> + Send;

    /// A reply is detached from its parent in the same transaction
    async fn remove_comment(&self, comment_id: &CommentId) -> CatalogResult<bool>;
}

#[trait_variant::make(HistoryRepository: Send)]
pub trait LocalHistoryRepository {
    async fn list_histories(&self) -> CatalogResult<Vec<History>>;

    async fn find_history(&self, history_id: &HistoryId) -> CatalogResult<Option<History>>;

    async fn find_history_by_user(&self, user_id: &UserId) -> CatalogResult<Option<History>>;

    async fn insert_history(&self, history: &History) -> CatalogResult<()>;

    /// Lock the user's history, apply `change` and persist the streams
    async fn modify_history_by_user<F>(&self, user_id: &UserId, change: F) -> CatalogResult<Option<History>>
    where
        F: FnOnce(&mut History) -> CatalogResult<()> + Send;
}

/// View of the accounts owned by `auth`
#[trait_variant::make(UserDirectory: Send)]
pub trait LocalUserDirectory {
    /// Case-insensitive, like login
    async fn user_id_by_name(&self, username: &str) -> CatalogResult<Option<UserId>>;

    async fn user_exists(&self, user_id: &UserId) -> CatalogResult<bool>;

    /// Drop everything the catalog holds for an account that is about to
    /// be deleted: its artist profile and songs, listings, comments and
    /// history. References to removed songs and comments held elsewhere
    /// are cleaned up too.
    async fn remove_user_content(&self, user_id: &UserId) -> CatalogResult<()>;
}

/// Everything the catalog routers need from one store
pub trait CatalogRepository:
    GenreRepository
    + ArtistRepository
    + SongRepository
    + ListingRepository
    + CommentRepository
    + HistoryRepository
    + UserDirectory
    + Clone
    + Send
    + Sync
    + 'static
{
}

impl<T> CatalogRepository for T where
    T: GenreRepository
        + ArtistRepository
        + SongRepository
        + ListingRepository
        + CommentRepository
        + HistoryRepository
        + UserDirectory
        + Clone
        + Send
        + Sync
        + 'static
{
}
