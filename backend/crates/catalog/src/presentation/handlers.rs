//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use std::sync::Arc;

use auth::AuthenticatedUser;
use auth::presentation::dto::MessageResponse;
use kernel::id::{ArtistId, CommentId, GenreId, HistoryId, ListedSongId, SongId, UserId};

use crate::application::{
    ArtistInput, ArtistUseCase, CommentStateInput, CommentUseCase, GenreInput, GenreUseCase,
    HistoryUseCase, ListingInput, ListingUseCase, PostCommentInput, SongUseCase,
};
use crate::domain::entity::{
    artist::Artist, comment::Comment, genre::Genre, history::History, listing::ListedSong,
    song::Song,
};
use crate::domain::repository::CatalogRepository;
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{
    AddSongsRequest, ArtistRequest, CommentRequest, CommentStateRequest, CreateHistoryRequest,
    GenreRequest, ListingRequest, SongPatchRequest, SongQueryParams, SongRequest,
    UpdateHistoryRequest,
};

/// Shared state for catalog handlers
#[derive(Clone)]
pub struct CatalogAppState<R>
where
    R: CatalogRepository,
{
    pub repo: Arc<R>,
}

type Created<T> = (StatusCode, Json<T>);

// ============================================================================
// Genres
// ============================================================================

/// GET /api/genres
pub async fn list_genres<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<Genre>>> {
    Ok(Json(GenreUseCase::new(state.repo).list().await?))
}

/// GET /api/genres/{id}
pub async fn get_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(genre_id): Path<GenreId>,
) -> CatalogResult<Json<Genre>> {
    Ok(Json(GenreUseCase::new(state.repo).get(&genre_id).await?))
}

/// POST /api/genres
pub async fn create_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<GenreRequest>,
) -> CatalogResult<Created<Genre>> {
    let genre = GenreUseCase::new(state.repo)
        .create(
            &caller,
            GenreInput {
                name: req.name,
                songs: req.songs,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(genre)))
}

/// PUT /api/genres/{id}
pub async fn update_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(genre_id): Path<GenreId>,
    Json(req): Json<GenreRequest>,
) -> CatalogResult<Json<Genre>> {
    let genre = GenreUseCase::new(state.repo)
        .update(
            &caller,
            &genre_id,
            GenreInput {
                name: req.name,
                songs: req.songs,
            },
        )
        .await?;
    Ok(Json(genre))
}

/// PATCH /api/genres/{id}/songs
pub async fn add_songs_to_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(genre_id): Path<GenreId>,
    Json(req): Json<AddSongsRequest>,
) -> CatalogResult<Json<Genre>> {
    let genre = GenreUseCase::new(state.repo)
        .add_songs(&caller, &genre_id, &req.songs)
        .await?;
    Ok(Json(genre))
}

/// DELETE /api/genres/{id}
pub async fn delete_genre<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(genre_id): Path<GenreId>,
) -> CatalogResult<Json<MessageResponse>> {
    GenreUseCase::new(state.repo).delete(&caller, &genre_id).await?;
    Ok(Json(MessageResponse::new("Genre deleted")))
}

// ============================================================================
// Artists
// ============================================================================

fn artist_input(req: ArtistRequest) -> ArtistInput {
    ArtistInput {
        username: req.username,
        user_id: req.user_id,
        genre_id: req.genre_id,
        songs: req.songs,
    }
}

/// GET /api/artists
pub async fn list_artists<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<Artist>>> {
    Ok(Json(ArtistUseCase::new(state.repo).list().await?))
}

/// GET /api/artists/{id}
pub async fn get_artist<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(artist_id): Path<ArtistId>,
) -> CatalogResult<Json<Artist>> {
    Ok(Json(ArtistUseCase::new(state.repo).get(&artist_id).await?))
}

/// POST /api/artists
pub async fn create_artist<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<ArtistRequest>,
) -> CatalogResult<Created<Artist>> {
    let artist = ArtistUseCase::new(state.repo)
        .create(&caller, artist_input(req))
        .await?;
    Ok((StatusCode::CREATED, Json(artist)))
}

/// PUT /api/artists/{id}
pub async fn update_artist<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(artist_id): Path<ArtistId>,
    Json(req): Json<ArtistRequest>,
) -> CatalogResult<Json<Artist>> {
    let artist = ArtistUseCase::new(state.repo)
        .update(&caller, &artist_id, artist_input(req))
        .await?;
    Ok(Json(artist))
}

/// POST /api/artists/{id}/songs/{song_id}
pub async fn add_song_to_artist<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path((artist_id, song_id)): Path<(ArtistId, SongId)>,
) -> CatalogResult<Json<Artist>> {
    let artist = ArtistUseCase::new(state.repo)
        .add_song(&caller, &artist_id, &song_id)
        .await?;
    Ok(Json(artist))
}

/// DELETE /api/artists/{id}/songs/{song_id}
pub async fn remove_song_from_artist<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path((artist_id, song_id)): Path<(ArtistId, SongId)>,
) -> CatalogResult<Json<Artist>> {
    let artist = ArtistUseCase::new(state.repo)
        .remove_song(&caller, &artist_id, &song_id)
        .await?;
    Ok(Json(artist))
}

// ============================================================================
// Songs
// ============================================================================

/// GET /api/songs
pub async fn list_songs<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Query(params): Query<SongQueryParams>,
) -> CatalogResult<Json<Vec<Song>>> {
    let query = params.into_query()?;
    Ok(Json(SongUseCase::new(state.repo).list(&query).await?))
}

/// GET /api/songs/{id}
pub async fn get_song<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(song_id): Path<SongId>,
) -> CatalogResult<Json<Song>> {
    Ok(Json(SongUseCase::new(state.repo).get(&song_id).await?))
}

/// POST /api/songs
pub async fn create_song<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<SongRequest>,
) -> CatalogResult<Created<Song>> {
    let song = SongUseCase::new(state.repo)
        .create(&caller, req.into_draft()?)
        .await?;
    Ok((StatusCode::CREATED, Json(song)))
}

/// PUT /api/songs/{id}
pub async fn update_song<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(song_id): Path<SongId>,
    Json(req): Json<SongRequest>,
) -> CatalogResult<Json<Song>> {
    let song = SongUseCase::new(state.repo)
        .update(&caller, &song_id, req.into_draft()?)
        .await?;
    Ok(Json(song))
}

/// PATCH /api/songs/{id}
pub async fn update_song_properties<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(song_id): Path<SongId>,
    Json(req): Json<SongPatchRequest>,
) -> CatalogResult<Json<Song>> {
    let song = SongUseCase::new(state.repo)
        .update_properties(&caller, &song_id, req.into())
        .await?;
    Ok(Json(song))
}

/// DELETE /api/songs/{id}
pub async fn delete_song<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(song_id): Path<SongId>,
) -> CatalogResult<Json<MessageResponse>> {
    SongUseCase::new(state.repo).delete(&caller, &song_id).await?;
    Ok(Json(MessageResponse::new("Song deleted")))
}

// ============================================================================
// Listings
// ============================================================================

/// GET /api/listings
pub async fn list_listings<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<ListedSong>>> {
    Ok(Json(ListingUseCase::new(state.repo).list().await?))
}

/// GET /api/listings/{id}
pub async fn get_listing<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(listing_id): Path<ListedSongId>,
) -> CatalogResult<Json<ListedSong>> {
    Ok(Json(ListingUseCase::new(state.repo).get(&listing_id).await?))
}

/// POST /api/listings
pub async fn create_listing<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<ListingRequest>,
) -> CatalogResult<Created<ListedSong>> {
    let listing = ListingUseCase::new(state.repo)
        .create(
            &caller,
            ListingInput {
                song: req.song,
                price: req.price,
                formats: req.formats,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// DELETE /api/listings/{id}
pub async fn delete_listing<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(listing_id): Path<ListedSongId>,
) -> CatalogResult<Json<MessageResponse>> {
    ListingUseCase::new(state.repo)
        .delete(&caller, &listing_id)
        .await?;
    Ok(Json(MessageResponse::new("Listing deleted")))
}

// ============================================================================
// Comments
// ============================================================================

/// GET /api/listings/{id}/comments
pub async fn list_listing_comments<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(listing_id): Path<ListedSongId>,
) -> CatalogResult<Json<Vec<Comment>>> {
    let comments = CommentUseCase::new(state.repo)
        .list(Some(&listing_id))
        .await?;
    Ok(Json(comments))
}

/// POST /api/listings/{id}/comments
pub async fn post_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(listing_id): Path<ListedSongId>,
    Json(req): Json<CommentRequest>,
) -> CatalogResult<Created<Comment>> {
    let comment = CommentUseCase::new(state.repo)
        .post(
            &caller,
            &listing_id,
            PostCommentInput {
                message: req.message,
                reply_to: req.reply_to,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET /api/comments
pub async fn list_comments<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
) -> CatalogResult<Json<Vec<Comment>>> {
    Ok(Json(CommentUseCase::new(state.repo).list(None).await?))
}

/// GET /api/comments/{id}
pub async fn get_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    Path(comment_id): Path<CommentId>,
) -> CatalogResult<Json<Comment>> {
    Ok(Json(CommentUseCase::new(state.repo).get(&comment_id).await?))
}

/// PUT /api/comments/{id}
pub async fn update_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(comment_id): Path<CommentId>,
    Json(req): Json<CommentRequest>,
) -> CatalogResult<Json<Comment>> {
    let comment = CommentUseCase::new(state.repo)
        .update(&caller, &comment_id, req.message)
        .await?;
    Ok(Json(comment))
}

/// PATCH /api/comments/{id}
pub async fn update_comment_state<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(comment_id): Path<CommentId>,
    Json(req): Json<CommentStateRequest>,
) -> CatalogResult<Json<Comment>> {
    let comment = CommentUseCase::new(state.repo)
        .update_state(
            &caller,
            &comment_id,
            CommentStateInput {
                flag: req.flag,
                vote: req.vote,
            },
        )
        .await?;
    Ok(Json(comment))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(comment_id): Path<CommentId>,
) -> CatalogResult<Json<MessageResponse>> {
    CommentUseCase::new(state.repo)
        .delete(&caller, &comment_id)
        .await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}

// ============================================================================
// Histories
// ============================================================================

/// GET /api/histories
pub async fn list_histories<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
) -> CatalogResult<Json<Vec<History>>> {
    Ok(Json(HistoryUseCase::new(state.repo).list(&caller).await?))
}

/// GET /api/histories/{id}
pub async fn get_history<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(history_id): Path<HistoryId>,
) -> CatalogResult<Json<History>> {
    let history = HistoryUseCase::new(state.repo)
        .get(&caller, &history_id)
        .await?;
    Ok(Json(history))
}

/// POST /api/histories
pub async fn create_history<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<CreateHistoryRequest>,
) -> CatalogResult<Created<History>> {
    let history = HistoryUseCase::new(state.repo)
        .create(&caller, req.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(history)))
}

/// PUT /api/histories/user/{user_id}
pub async fn update_history<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path(user_id): Path<UserId>,
    Json(req): Json<UpdateHistoryRequest>,
) -> CatalogResult<Json<History>> {
    let streams = req
        .streams
        .ok_or_else(|| CatalogError::validation("streams is required"))?;
    let history = HistoryUseCase::new(state.repo)
        .update(&caller, &user_id, streams)
        .await?;
    Ok(Json(history))
}

/// POST /api/histories/user/{user_id}/streams/{song_id}
pub async fn add_stream<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path((user_id, song_id)): Path<(UserId, SongId)>,
) -> CatalogResult<Json<History>> {
    let history = HistoryUseCase::new(state.repo)
        .add_stream(&caller, &user_id, &song_id)
        .await?;
    Ok(Json(history))
}

/// DELETE /api/histories/user/{user_id}/streams/{song_id}
pub async fn remove_stream<R: CatalogRepository>(
    State(state): State<CatalogAppState<R>>,
    caller: AuthenticatedUser,
    Path((user_id, song_id)): Path<(UserId, SongId)>,
) -> CatalogResult<Json<History>> {
    let history = HistoryUseCase::new(state.repo)
        .remove_stream(&caller, &user_id, &song_id)
        .await?;
    Ok(Json(history))
}
