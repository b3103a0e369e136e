//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{AccessTokenState, check_access_token, require_access_token};
pub use router::{auth_router, auth_router_generic, roles_router, users_router};
