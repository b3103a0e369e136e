//! Listed song use cases

use std::sync::Arc;

use auth::AuthenticatedUser;
use kernel::id::{ListedSongId, SongId};

use crate::application::access::{CREATORS, caller_id, require_owner_or_admin};
use crate::application::lookup::require_song;
use crate::domain::entity::listing::{Format, ListedSong};
use crate::domain::repository::{ListingRepository, SongRepository, UserDirectory};
use crate::error::{CatalogError, CatalogResult};

pub struct ListingInput {
    pub song: Option<SongId>,
    pub price: Option<f64>,
    pub formats: Vec<Format>,
}

pub struct ListingUseCase<R>
where
    R: ListingRepository + SongRepository + UserDirectory,
{
    repo: Arc<R>,
}

impl<R> ListingUseCase<R>
where
    R: ListingRepository + SongRepository + UserDirectory,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<ListedSong>> {
        self.repo.list_listings().await
    }

    pub async fn get(&self, listing_id: &ListedSongId) -> CatalogResult<ListedSong> {
        self.repo
            .find_listing(listing_id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Listing", listing_id))
    }

    /// The caller becomes the listing's creator
    pub async fn create(&self, caller: &AuthenticatedUser, input: ListingInput) -> CatalogResult<ListedSong> {
        caller.require_any(CREATORS)?;
        let (Some(song_id), Some(price)) = (input.song, input.price) else {
            return Err(CatalogError::validation("song and price are required"));
        };

        require_song(self.repo.as_ref(), &song_id).await?;
        let creator = caller_id(self.repo.as_ref(), caller).await?;

        let listing = ListedSong::new(creator, song_id, price, input.formats)?;
        self.repo.insert_listing(&listing).await?;

        tracing::info!(
            listed_song_id = %listing.listed_song_id,
            song_id = %song_id,
            formats = listing.formats.len(),
            "Song listed"
        );
        Ok(listing)
    }

    pub async fn delete(&self, caller: &AuthenticatedUser, listing_id: &ListedSongId) -> CatalogResult<()> {
        let listing = self.get(listing_id).await?;
        require_owner_or_admin(self.repo.as_ref(), caller, &listing.creator).await?;

        if !self.repo.remove_listing(listing_id).await? {
            return Err(CatalogError::not_found("Listing", listing_id));
        }
        tracing::info!(listed_song_id = %listing_id, "Listing deleted");
        Ok(())
    }
}
