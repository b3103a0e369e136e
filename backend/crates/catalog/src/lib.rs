//! Catalog Backend Module
//!
//! Genres, artists, songs, listed songs with their formats, comments, and
//! per-user listening history.
//!
//! Same layering as `auth`:
//! - `domain/` - Entities, song queries, repository traits
//! - `application/` - Use cases with role and ownership checks
//! - `infra/` - PostgreSQL implementation
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! Callers are identified by the `auth::AuthenticatedUser` that the access
//! middleware puts on the request. "Owner" checks resolve the caller's
//! username to a user id through [`domain::repository::UserDirectory`].

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

pub use application::AccountContentCleanup;
pub use domain::repository::CatalogRepository;
pub use error::{CatalogError, CatalogResult};
pub use infra::postgres::PgCatalogRepository;
pub use presentation::router::{catalog_router, catalog_router_generic};
