//! Auth Routers
//!
//! `auth_router` serves `/api/auth`, `roles_router` serves `/api/roles`,
//! `users_router` serves `/api/users`. The access middleware is applied by
//! the binary around all of them.
//!
//! When other modules store data keyed by user id, mount
//! `users_router_with_cleanup` so deleting an account removes it too.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{NoUserContent, RoleRepository, UserContentCleanup, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState, UsersAppState};

fn state<R>(repo: R, config: AuthConfig) -> AuthAppState<R>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
    }
}

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", get(handlers::refresh::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .with_state(state(repo, config))
}

pub fn roles_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            get(handlers::list_roles::<R>).post(handlers::create_role::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_role::<R>)
                .put(handlers::update_role::<R>)
                .delete(handlers::delete_role::<R>),
        )
        .route("/{id}/users", post(handlers::add_users_to_role::<R>))
        .with_state(state(repo, config))
}

pub fn users_router<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    users_router_with_cleanup(repo, config, NoUserContent)
}

/// `cleanup` runs before an account is deleted
pub fn users_router_with_cleanup<R, C>(repo: R, config: AuthConfig, cleanup: C) -> Router
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    C: UserContentCleanup + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::list_users::<R>))
        .route(
            "/{id}",
            get(handlers::get_user::<R>)
                .patch(handlers::update_user::<R>)
                .delete(handlers::delete_user::<R, C>),
        )
        .with_state(UsersAppState {
            auth: state(repo, config),
            cleanup: Arc::new(cleanup),
        })
}
