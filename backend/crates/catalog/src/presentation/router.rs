//! Catalog Routers
//!
//! Every resource is nested under its own prefix. The binary mounts the
//! result under `/api` behind the access-token middleware.

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use std::sync::Arc;

use crate::domain::repository::CatalogRepository;
use crate::infra::postgres::PgCatalogRepository;
use crate::presentation::handlers::{self, CatalogAppState};

/// Create the catalog router with PostgreSQL repository
pub fn catalog_router(repo: PgCatalogRepository) -> Router {
    catalog_router_generic(repo)
}

/// Create the catalog router for any repository implementation
pub fn catalog_router_generic<R: CatalogRepository>(repo: R) -> Router {
    let state = CatalogAppState {
        repo: Arc::new(repo),
    };

    Router::new()
        .nest("/genres", genres_routes(state.clone()))
        .nest("/artists", artists_routes(state.clone()))
        .nest("/songs", songs_routes(state.clone()))
        .nest("/listings", listings_routes(state.clone()))
        .nest("/comments", comments_routes(state.clone()))
        .nest("/histories", histories_routes(state))
}

fn genres_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_genres::<R>).post(handlers::create_genre::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_genre::<R>)
                .put(handlers::update_genre::<R>)
                .delete(handlers::delete_genre::<R>),
        )
        .route(
            "/{id}/songs",
            patch(handlers::add_songs_to_genre::<R>),
        )
        .with_state(state)
}

fn artists_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_artists::<R>).post(handlers::create_artist::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_artist::<R>).put(handlers::update_artist::<R>),
        )
        .route(
            "/{id}/songs/{song_id}",
            post(handlers::add_song_to_artist::<R>).delete(handlers::remove_song_from_artist::<R>),
        )
        .with_state(state)
}

fn songs_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_songs::<R>).post(handlers::create_song::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_song::<R>)
                .put(handlers::update_song::<R>)
                .patch(handlers::update_song_properties::<R>)
                .delete(handlers::delete_song::<R>),
        )
        .with_state(state)
}

fn listings_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_listings::<R>).post(handlers::create_listing::<R>),
        )
        .route(
            "/{id}",
            get(handlers::get_listing::<R>).delete(handlers::delete_listing::<R>),
        )
        .route(
            "/{id}/comments",
            get(handlers::list_listing_comments::<R>).post(handlers::post_comment::<R>),
        )
        .with_state(state)
}

fn comments_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route("/", get(handlers::list_comments::<R>))
        .route(
            "/{id}",
            get(handlers::get_comment::<R>)
                .put(handlers::update_comment::<R>)
                .patch(handlers::update_comment_state::<R>)
                .delete(handlers::delete_comment::<R>),
        )
        .with_state(state)
}

fn histories_routes<R: CatalogRepository>(state: CatalogAppState<R>) -> Router {
    Router::new()
        .route(
            "/",
            get(handlers::list_histories::<R>).post(handlers::create_history::<R>),
        )
        .route("/{id}", get(handlers::get_history::<R>))
        .route(
            "/user/{user_id}",
            put(handlers::update_history::<R>),
        )
        .route(
            "/user/{user_id}/streams/{song_id}",
            post(handlers::add_stream::<R>).delete(handlers::remove_stream::<R>),
        )
        .with_state(state)
}
