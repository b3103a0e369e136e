//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod principal;
pub mod refresh;
pub mod register;
pub mod role_admin;
pub mod roles;
pub mod tokens;
pub mod user_admin;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use principal::AuthenticatedUser;
pub use refresh::{RefreshOutput, RefreshUseCase};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use role_admin::{RoleAdminUseCase, RoleInput};
pub use tokens::{AccessClaims, RefreshClaims, TokenIssuer};
pub use user_admin::{ProfileInput, UserAdminUseCase};
