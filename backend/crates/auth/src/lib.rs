//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Register / login / refresh / logout with username + password
//! - Short-lived HS256 access tokens carrying username and role names
//! - One server-side refresh token per user, delivered as an HttpOnly cookie
//! - Roles (Listener, Artist, Admin, plus admin-defined ones)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B style policy)
//! - Only a SHA-256 digest of the refresh token is stored
//! - The Admin role cannot be self-assigned at registration

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::principal::AuthenticatedUser;
pub use domain::repository::{NoUserContent, UserContentCleanup};
pub use domain::value_object::role_name::RoleName;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, roles_router, users_router, users_router_with_cleanup};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
