//! Access and refresh token issuance (HS256 JWT)
//!
//! Access and refresh tokens are signed with different keys and carry a
//! `typ` claim, so neither can stand in for the other.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::AuthConfig;
use crate::domain::value_object::role_name::RoleName;
use crate::error::{AuthError, AuthResult};

const ACCESS_TYPE: &str = "access";
const REFRESH_TYPE: &str = "refresh";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Username
    pub sub: String,
    pub roles: Vec<String>,
    pub iat: i64,
    pub exp: i64,
    pub typ: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Username
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    /// Unique per issue, so two logins in the same second get distinct tokens
    pub jti: String,
    pub typ: String,
}

pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access_encoding: EncodingKey::from_secret(&config.access_token_secret),
            access_decoding: DecodingKey::from_secret(&config.access_token_secret),
            refresh_encoding: EncodingKey::from_secret(&config.refresh_token_secret),
            refresh_decoding: DecodingKey::from_secret(&config.refresh_token_secret),
            access_ttl_secs: ttl_secs(config.access_token_ttl),
            refresh_ttl_secs: ttl_secs(config.refresh_token_ttl),
            validation,
        }
    }

    pub fn issue_access(&self, username: &str, roles: &[RoleName]) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = AccessClaims {
            sub: username.to_string(),
            roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
            iat: now,
            exp: expires_at(now, self.access_ttl_secs)?,
            typ: ACCESS_TYPE.to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.access_encoding)?)
    }

    pub fn issue_refresh(&self, username: &str) -> AuthResult<String> {
        let now = Utc::now().timestamp();
        let claims = RefreshClaims {
            sub: username.to_string(),
            iat: now,
            exp: expires_at(now, self.refresh_ttl_secs)?,
            jti: Uuid::new_v4().to_string(),
            typ: REFRESH_TYPE.to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.refresh_encoding)?)
    }

    /// Signature, expiry and type check. Any failure is a 401.
    pub fn verify_access(&self, token: &str) -> AuthResult<AccessClaims> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Access token rejected");
                AuthError::InvalidAccessToken
            })?;

        if data.claims.typ != ACCESS_TYPE {
            return Err(AuthError::InvalidAccessToken);
        }
        Ok(data.claims)
    }

    /// Signature, expiry and type check. Any failure is a 403.
    pub fn verify_refresh(&self, token: &str) -> AuthResult<RefreshClaims> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthError::RefreshTokenRejected
            })?;

        if data.claims.typ != REFRESH_TYPE {
            return Err(AuthError::RefreshTokenRejected);
        }
        Ok(data.claims)
    }
}

/// Saturates; an out-of-range lifetime fails at issue time instead
fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

fn expires_at(now: i64, ttl_secs: i64) -> AuthResult<i64> {
    now.checked_add(ttl_secs)
        .ok_or_else(|| AuthError::Internal("Token lifetime is out of range".to_string()))
}

/// Digest stored server-side in place of the refresh token
pub fn refresh_token_digest(token: &str) -> String {
    platform::crypto::sha256_base64url(token.as_bytes())
}
