//! Bearer token extraction
//!
//! Reads `Authorization: Bearer <token>` from request headers.

use axum::http::{HeaderMap, header};

/// Why a bearer token could not be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BearerError {
    #[error("Authorization header is not valid UTF-8")]
    InvalidEncoding,

    #[error("Authorization scheme must be Bearer")]
    WrongScheme,

    #[error("Bearer token is empty")]
    Empty,
}

/// Extract the bearer token.
///
/// Returns `Ok(None)` when the header is absent, so callers can decide
/// whether anonymous access is acceptable.
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<Option<String>, BearerError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| BearerError::InvalidEncoding)?;

    let (scheme, token) = value.trim().split_once(' ').ok_or(BearerError::WrongScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(BearerError::WrongScheme);
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(BearerError::Empty);
    }

    Ok(Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_absent_header() {
        assert_eq!(extract_bearer_token(&HeaderMap::new()), Ok(None));
    }

    #[test]
    fn test_valid_bearer() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(
            extract_bearer_token(&headers),
            Ok(Some("abc.def.ghi".to_string()))
        );

        let headers = headers_with("bearer   xyz");
        assert_eq!(extract_bearer_token(&headers), Ok(Some("xyz".to_string())));
    }

    #[test]
    fn test_wrong_scheme() {
        let headers = headers_with("Basic dXNlcjpwYXNz");
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::WrongScheme));

        let headers = headers_with("Bearer");
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::WrongScheme));
    }

    #[test]
    fn test_empty_token() {
        let headers = headers_with("Bearer   ");
        // "Bearer   " trims to "Bearer", which has no separator
        assert_eq!(extract_bearer_token(&headers), Err(BearerError::WrongScheme));
    }
}
