//! Listed Song Entity
//!
//! A song offered for sale, with one or more purchasable formats.

use kernel::id::{ListedSongId, SongId, UserId};
use serde::{Deserialize, Serialize};

use super::required_text;
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormatType {
    Digital,
    Vinyl,
    #[serde(rename = "CD")]
    Cd,
}

/// Stored inside the listing as JSONB, in the order given
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Format {
    #[serde(rename = "type")]
    pub format_type: FormatType,
    pub price: f64,
    pub preview: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedSong {
    pub listed_song_id: ListedSongId,
    pub creator: UserId,
    pub song: SongId,
    pub formats: Vec<Format>,
    pub price: f64,
}

impl ListedSong {
    pub fn new(
        creator: UserId,
        song: SongId,
        price: f64,
        formats: Vec<Format>,
    ) -> CatalogResult<Self> {
        check_price(price)?;
        if formats.is_empty() {
            return Err(CatalogError::validation(
                "A listing needs at least one format",
            ));
        }

        let formats = formats
            .into_iter()
            .map(|format| {
                check_price(format.price)?;
                Ok(Format {
                    preview: required_text("Format preview", &format.preview)?,
                    source: required_text("Format source", &format.source)?,
                    ..format
                })
            })
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Self {
            listed_song_id: ListedSongId::new(),
            creator,
            song,
            formats,
            price,
        })
    }
}

fn check_price(price: f64) -> CatalogResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::validation("Price must be zero or more"));
    }
    Ok(())
}
