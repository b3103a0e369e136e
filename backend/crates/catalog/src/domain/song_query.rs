//! Song Query
//!
//! Filters and sort order for listing songs. Postgres evaluates it with a
//! `QueryBuilder`; [`SongQuery::apply`] is the same semantics over a slice.

use std::cmp::Ordering;
use std::str::FromStr;

use kernel::id::{ArtistId, GenreId};

use crate::domain::entity::song::Song;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SongSort {
    #[default]
    Title,
    Duration,
    Published,
    Likes,
    Shares,
    Purchases,
    Streams,
}

impl SongSort {
    /// Column expression to order by. Titles compare bytewise, like
    /// [`SongSort::compare`], whatever the database collation.
    pub const fn column(&self) -> &'static str {
        match self {
            Self::Title => r#"lower(title) COLLATE "C""#,
            Self::Duration => "duration",
            Self::Published => "published",
            Self::Likes => "likes",
            Self::Shares => "shares",
            Self::Purchases => "purchases",
            Self::Streams => "streams",
        }
    }

    fn compare(&self, a: &Song, b: &Song) -> Ordering {
        match self {
            Self::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            Self::Duration => a.duration.cmp(&b.duration),
            Self::Published => a.published.cmp(&b.published),
            Self::Likes => a.likes.cmp(&b.likes),
            Self::Shares => a.shares.cmp(&b.shares),
            Self::Purchases => a.purchases.cmp(&b.purchases),
            Self::Streams => a.streams.cmp(&b.streams),
        }
    }
}

impl FromStr for SongSort {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "duration" => Ok(Self::Duration),
            "published" => Ok(Self::Published),
            "likes" => Ok(Self::Likes),
            "shares" => Ok(Self::Shares),
            "purchases" => Ok(Self::Purchases),
            "streams" => Ok(Self::Streams),
            _ => Err(CatalogError::validation(format!("Cannot sort songs by {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(CatalogError::validation(format!(
                "Sort order must be asc or desc, got {s}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SongQuery {
    pub genre: Option<GenreId>,
    pub artist: Option<ArtistId>,
    /// Case-insensitive substring
    pub title: Option<String>,
    pub min_duration: Option<i32>,
    pub max_duration: Option<i32>,
    pub sort: SongSort,
    pub order: SortOrder,
}

impl SongQuery {
    pub fn validate(&self) -> CatalogResult<()> {
        if let (Some(min), Some(max)) = (self.min_duration, self.max_duration) {
            if min > max {
                return Err(CatalogError::validation(
                    "minDuration cannot be greater than maxDuration",
                ));
            }
        }
        Ok(())
    }

    /// Lower-cased title filter, `None` when absent or blank
    pub fn title_filter(&self) -> Option<String> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, song: &Song) -> bool {
        self.genre.is_none_or(|g| g == song.genre_id)
            && self.artist.is_none_or(|a| a == song.artist_id)
            && self.min_duration.is_none_or(|min| song.duration >= min)
            && self.max_duration.is_none_or(|max| song.duration <= max)
            && self
                .title_filter()
                .is_none_or(|t| song.title.to_lowercase().contains(&t))
    }

    /// Ties fall back to song id so the order is stable
    pub fn compare(&self, a: &Song, b: &Song) -> Ordering {
        let primary = match self.order {
            SortOrder::Asc => self.sort.compare(a, b),
            SortOrder::Desc => self.sort.compare(b, a),
        };
        primary.then_with(|| a.song_id.as_uuid().cmp(b.song_id.as_uuid()))
    }

    pub fn apply(&self, songs: impl IntoIterator<Item = Song>) -> Vec<Song> {
        let mut songs: Vec<Song> = songs.into_iter().filter(|s| self.matches(s)).collect();
        songs.sort_by(|a, b| self.compare(a, b));
        songs
    }
}
