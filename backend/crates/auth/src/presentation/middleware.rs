//! Access-token middleware and the `AuthenticatedUser` extractor
//!
//! Tokens are verified statelessly: the roles in the claims are trusted
//! until the token expires. Refresh re-reads them from the database.

use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::bearer::extract_bearer_token;

use crate::application::config::AuthConfig;
use crate::application::principal::AuthenticatedUser;
use crate::application::tokens::TokenIssuer;
use crate::domain::value_object::role_name::RoleName;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AccessTokenState {
    issuer: Arc<TokenIssuer>,
}

impl AccessTokenState {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            issuer: Arc::new(TokenIssuer::new(config)),
        }
    }

    fn authenticate(&self, req: &Request<Body>) -> Result<Option<AuthenticatedUser>, AuthError> {
        let token = extract_bearer_token(req.headers()).map_err(|e| {
            tracing::debug!(error = %e, "Malformed Authorization header");
            AuthError::InvalidAccessToken
        })?;

        let Some(token) = token else {
            return Ok(None);
        };

        let claims = self.issuer.verify_access(&token)?;
        // names were valid when issued; keep them even if one was since renamed
        let roles = claims.roles.into_iter().map(RoleName::from_db).collect();

        Ok(Some(AuthenticatedUser::new(claims.sub, roles)))
    }
}

/// Verifies a bearer token when one is sent. Anonymous requests pass
/// through; an invalid token is a 401.
pub async fn check_access_token(
    State(state): State<AccessTokenState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match state.authenticate(&req) {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(e) => e.into_response(),
    }
}

/// Like `check_access_token`, but a missing token is also a 401
pub async fn require_access_token(
    State(state): State<AccessTokenState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match state.authenticate(&req) {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => AuthError::Unauthenticated.into_response(),
        Err(e) => e.into_response(),
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
