pub mod artist;
pub mod comment;
pub mod genre;
pub mod history;
pub mod listing;
pub mod song;

use crate::error::{CatalogError, CatalogResult};

/// Trimmed, non-empty text for a required field
pub(crate) fn required_text(field: &str, value: impl AsRef<str>) -> CatalogResult<String> {
    let value = value.as_ref().trim();
    if value.is_empty() {
        return Err(CatalogError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}
