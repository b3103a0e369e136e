//! Use-case and HTTP tests against an in-memory catalog

use std::sync::{Arc, Mutex};

use auth::application::tokens::TokenIssuer;
use auth::middleware::{AccessTokenState, check_access_token};
use auth::{AuthConfig, AuthenticatedUser, RoleName, UserContentCleanup};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use kernel::id::{ArtistId, CommentId, GenreId, HistoryId, ListedSongId, SongId, UserId};
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::{
    AccountContentCleanup, CommentStateInput, CommentUseCase, HistoryUseCase, SongUseCase,
    artists::ArtistUseCase,
};
use crate::domain::entity::{
    artist::Artist, comment::Comment, genre::Genre, history::History, listing::ListedSong,
    song::Song,
};
use crate::domain::repository::{
    ArtistRepository, CommentRepository, GenreRepository, HistoryRepository, ListingRepository,
    SongRepository, UserDirectory,
};
use crate::domain::song_query::SongQuery;
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::router::catalog_router_generic;

// ============================================================================
// In-memory repository
// ============================================================================

#[derive(Default)]
struct Store {
    users: Vec<(String, UserId)>,
    genres: Vec<Genre>,
    artists: Vec<Artist>,
    songs: Vec<Song>,
    listings: Vec<ListedSong>,
    comments: Vec<Comment>,
    histories: Vec<History>,
}

#[derive(Clone, Default)]
struct InMemoryCatalog {
    store: Arc<Mutex<Store>>,
}

impl InMemoryCatalog {
    fn add_user(&self, username: &str) -> UserId {
        let user_id = UserId::new();
        self.store
            .lock()
            .unwrap()
            .users
            .push((username.to_ascii_lowercase(), user_id));
        user_id
    }

    fn genre(&self, genre_id: &GenreId) -> Genre {
        let store = self.store.lock().unwrap();
        store.genres.iter().find(|g| &g.genre_id == genre_id).cloned().unwrap()
    }

    fn artist(&self, artist_id: &ArtistId) -> Artist {
        let store = self.store.lock().unwrap();
        store.artists.iter().find(|a| &a.artist_id == artist_id).cloned().unwrap()
    }
}

fn upsert<T: Clone>(items: &mut Vec<T>, item: &T, same: impl Fn(&T) -> bool) {
    match items.iter_mut().find(|i| same(i)) {
        Some(slot) => *slot = item.clone(),
        None => items.push(item.clone()),
    }
}

/// Applies `change` to a copy so a failed change leaves the slot as it was
fn modify<T: Clone>(
    slot: Option<&mut T>,
    change: impl FnOnce(&mut T) -> CatalogResult<()>,
) -> CatalogResult<Option<T>> {
    let Some(slot) = slot else {
        return Ok(None);
    };
    let mut item = slot.clone();
    change(&mut item)?;
    *slot = item.clone();
    Ok(Some(item))
}

impl GenreRepository for InMemoryCatalog {
    async fn list_genres(&self) -> CatalogResult<Vec<Genre>> {
        Ok(self.store.lock().unwrap().genres.clone())
    }

    async fn find_genre(&self, genre_id: &GenreId) -> CatalogResult<Option<Genre>> {
        let store = self.store.lock().unwrap();
        Ok(store.genres.iter().find(|g| &g.genre_id == genre_id).cloned())
    }

    async fn insert_genre(&self, genre: &Genre) -> CatalogResult<()> {
        self.store.lock().unwrap().genres.push(genre.clone());
        Ok(())
    }

    async fn modify_genre<F>(&self, genre_id: &GenreId, change: F) -> CatalogResult<Option<Genre>>
    where
        F: FnOnce(&mut Genre) -> CatalogResult<()> + Send,
    {
        let mut store = self.store.lock().unwrap();
        modify(store.genres.iter_mut().find(|g| &g.genre_id == genre_id), change)
    }

    async fn remove_genre(&self, genre_id: &GenreId) -> CatalogResult<bool> {
        let mut store = self.store.lock().unwrap();
        let in_use = store.songs.iter().any(|s| &s.genre_id == genre_id)
            || store.artists.iter().any(|a| &a.genre_id == genre_id);
        if in_use {
            return Err(CatalogError::Conflict(format!(
                "Genre {genre_id} is still used by songs or artists"
            )));
        }
        let before = store.genres.len();
        store.genres.retain(|g| &g.genre_id != genre_id);
        Ok(store.genres.len() < before)
    }
}

impl ArtistRepository for InMemoryCatalog {
    async fn list_artists(&self) -> CatalogResult<Vec<Artist>> {
        Ok(self.store.lock().unwrap().artists.clone())
    }

    async fn find_artist(&self, artist_id: &ArtistId) -> CatalogResult<Option<Artist>> {
        let store = self.store.lock().unwrap();
        Ok(store.artists.iter().find(|a| &a.artist_id == artist_id).cloned())
    }

    async fn find_artist_by_user(&self, user_id: &UserId) -> CatalogResult<Option<Artist>> {
        let store = self.store.lock().unwrap();
        Ok(store.artists.iter().find(|a| &a.user_id == user_id).cloned())
    }

    async fn insert_artist(&self, artist: &Artist) -> CatalogResult<()> {
        self.store.lock().unwrap().artists.push(artist.clone());
        Ok(())
    }

    async fn save_artist(&self, artist: &Artist) -> CatalogResult<()> {
        let mut store = self.store.lock().unwrap();
        upsert(&mut store.artists, artist, |a| a.artist_id == artist.artist_id);
        Ok(())
    }

    async fn modify_artist<F>(&self, artist_id: &ArtistId, change: F) -> CatalogResult<Option<Artist>>
    where
        F: FnOnce(&mut Artist) -> CatalogResult<()> + Send,
    {
        let mut store = self.store.lock().unwrap();
        modify(store.artists.iter_mut().find(|a| &a.artist_id == artist_id), change)
    }
}

impl SongRepository for InMemoryCatalog {
    async fn search_songs(&self, query: &SongQuery) -> CatalogResult<Vec<Song>> {
        let songs = self.store.lock().unwrap().songs.clone();
        Ok(query.apply(songs))
    }

    async fn find_song(&self, song_id: &SongId) -> CatalogResult<Option<Song>> {
        let store = self.store.lock().unwrap();
        Ok(store.songs.iter().find(|s| &s.song_id == song_id).cloned())
    }

    async fn existing_song_ids(&self, song_ids: &[SongId]) -> CatalogResult<Vec<SongId>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .songs
            .iter()
            .map(|s| s.song_id)
            .filter(|id| song_ids.contains(id))
            .collect())
    }

    async fn insert_song(&self, song: &Song) -> CatalogResult<()> {
        self.store.lock().unwrap().songs.push(song.clone());
        Ok(())
    }

    async fn save_song(&self, song: &Song) -> CatalogResult<()> {
        let mut store = self.store.lock().unwrap();
        upsert(&mut store.songs, song, |s| s.song_id == song.song_id);
        Ok(())
    }

    async fn remove_song(&self, song_id: &SongId) -> CatalogResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.songs.len();
        store.drop_songs(&[*song_id]);
        Ok(store.songs.len() < before)
    }
}

impl Store {
    /// Songs with the foreign-key fallout: list entries, listings and their
    /// comments
    fn drop_songs(&mut self, song_ids: &[SongId]) {
        for genre in self.genres.iter_mut() {
            genre.songs.retain(|s| !song_ids.contains(s));
        }
        for artist in self.artists.iter_mut() {
            artist.songs.retain(|s| !song_ids.contains(s));
        }
        for history in self.histories.iter_mut() {
            history.streams.retain(|e| !song_ids.contains(&e.song));
        }
        let dropped: Vec<ListedSongId> = self
            .listings
            .iter()
            .filter(|l| song_ids.contains(&l.song))
            .map(|l| l.listed_song_id)
            .collect();
        self.drop_listings(&dropped);
        self.songs.retain(|s| !song_ids.contains(&s.song_id));
    }

    fn drop_listings(&mut self, listing_ids: &[ListedSongId]) {
        self.comments.retain(|c| !listing_ids.contains(&c.listed_song));
        self.listings.retain(|l| !listing_ids.contains(&l.listed_song_id));
    }

    /// Detaches each from its parent and orphans its replies
    fn drop_comments(&mut self, comment_ids: &[CommentId]) {
        for comment in self.comments.iter_mut() {
            for id in comment_ids {
                comment.detach_reply(id);
            }
            if comment.parent.is_some_and(|p| comment_ids.contains(&p)) {
                comment.parent = None;
            }
        }
        self.comments.retain(|c| !comment_ids.contains(&c.comment_id));
    }
}

impl ListingRepository for InMemoryCatalog {
    async fn list_listings(&self) -> CatalogResult<Vec<ListedSong>> {
        Ok(self.store.lock().unwrap().listings.clone())
    }

    async fn find_listing(&self, listing_id: &ListedSongId) -> CatalogResult<Option<ListedSong>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .listings
            .iter()
            .find(|l| &l.listed_song_id == listing_id)
            .cloned())
    }

    async fn insert_listing(&self, listing: &ListedSong) -> CatalogResult<()> {
        self.store.lock().unwrap().listings.push(listing.clone());
        Ok(())
    }

    async fn remove_listing(&self, listing_id: &ListedSongId) -> CatalogResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.listings.len();
        store.drop_listings(&[*listing_id]);
        Ok(store.listings.len() < before)
    }
}

impl CommentRepository for InMemoryCatalog {
    async fn list_comments(&self, listing_id: Option<&ListedSongId>) -> CatalogResult<Vec<Comment>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .comments
            .iter()
            .filter(|c| listing_id.is_none_or(|id| &c.listed_song == id))
            .cloned()
            .collect())
    }

    async fn find_comment(&self, comment_id: &CommentId) -> CatalogResult<Option<Comment>> {
        let store = self.store.lock().unwrap();
        Ok(store.comments.iter().find(|c| &c.comment_id == comment_id).cloned())
    }

    async fn insert_comment(&self, comment: &Comment) -> CatalogResult<()> {
        let mut store = self.store.lock().unwrap();
        if let Some(parent_id) = &comment.parent {
            let parent = store
                .comments
                .iter_mut()
                .find(|c| &c.comment_id == parent_id)
                .ok_or_else(|| CatalogError::not_found("Comment", parent_id))?;
            parent.attach_reply(comment.comment_id);
        }
        store.comments.push(comment.clone());
        Ok(())
    }

    async fn modify_comment<F>(&self, comment_id: &CommentId, change: F) -> CatalogResult<Option<Comment>>
    where
        F: FnOnce(&mut Comment) -> CatalogResult<()> + Send,
    {
        let mut store = self.store.lock().unwrap();
        modify(store.comments.iter_mut().find(|c| &c.comment_id == comment_id), change)
    }

    async fn remove_comment(&self, comment_id: &CommentId) -> CatalogResult<bool> {
        let mut store = self.store.lock().unwrap();
        let before = store.comments.len();
        store.drop_comments(&[*comment_id]);
        Ok(store.comments.len() < before)
    }
}

impl HistoryRepository for InMemoryCatalog {
    async fn list_histories(&self) -> CatalogResult<Vec<History>> {
        Ok(self.store.lock().unwrap().histories.clone())
    }

    async fn find_history(&self, history_id: &HistoryId) -> CatalogResult<Option<History>> {
        let store = self.store.lock().unwrap();
        Ok(store
            .histories
            .iter()
            .find(|h| &h.history_id == history_id)
            .cloned())
    }

    async fn find_history_by_user(&self, user_id: &UserId) -> CatalogResult<Option<History>> {
        let store = self.store.lock().unwrap();
        Ok(store.histories.iter().find(|h| &h.user_id == user_id).cloned())
    }

    async fn insert_history(&self, history: &History) -> CatalogResult<()> {
        self.store.lock().unwrap().histories.push(history.clone());
        Ok(())
    }

    async fn modify_history_by_user<F>(&self, user_id: &UserId, change: F) -> CatalogResult<Option<History>>
    where
        F: FnOnce(&mut History) -> CatalogResult<()> + Send,
    {
        let mut store = self.store.lock().unwrap();
        modify(store.histories.iter_mut().find(|h| &h.user_id == user_id), change)
    }
}

impl UserDirectory for InMemoryCatalog {
    async fn user_id_by_name(&self, username: &str) -> CatalogResult<Option<UserId>> {
        let store = self.store.lock().unwrap();
        let wanted = username.to_ascii_lowercase();
        Ok(store
            .users
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, id)| *id))
    }

    async fn user_exists(&self, user_id: &UserId) -> CatalogResult<bool> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().any(|(_, id)| id == user_id))
    }

    async fn remove_user_content(&self, user_id: &UserId) -> CatalogResult<()> {
        let mut store = self.store.lock().unwrap();
        let artists: Vec<ArtistId> = store
            .artists
            .iter()
            .filter(|a| &a.user_id == user_id)
            .map(|a| a.artist_id)
            .collect();
        let songs: Vec<SongId> = store
            .songs
            .iter()
            .filter(|s| artists.contains(&s.artist_id))
            .map(|s| s.song_id)
            .collect();
        store.drop_songs(&songs);

        let comments: Vec<CommentId> = store
            .comments
            .iter()
            .filter(|c| &c.posted_by == user_id)
            .map(|c| c.comment_id)
            .collect();
        store.drop_comments(&comments);

        let listings: Vec<ListedSongId> = store
            .listings
            .iter()
            .filter(|l| &l.creator == user_id)
            .map(|l| l.listed_song_id)
            .collect();
        store.drop_listings(&listings);

        store.artists.retain(|a| &a.user_id != user_id);
        store.histories.retain(|h| &h.user_id != user_id);
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    repo: InMemoryCatalog,
    app: Router,
    admin: String,
    burial: String,
    burial_id: UserId,
    kode9: String,
    kode9_id: UserId,
    fan: String,
    fan_id: UserId,
}

impl Fixture {
    fn new() -> Self {
        let repo = InMemoryCatalog::default();
        let config = AuthConfig::development();
        let issuer = TokenIssuer::new(&config);
        let app = Router::new()
            .nest("/api", catalog_router_generic(repo.clone()))
            .layer(axum::middleware::from_fn_with_state(
                AccessTokenState::new(&config),
                check_access_token,
            ));

        repo.add_user("root");
        let burial_id = repo.add_user("burial");
        let kode9_id = repo.add_user("kode9");
        let fan_id = repo.add_user("fan");

        let token = |name: &str, role: RoleName| issuer.issue_access(name, &[role]).unwrap();
        Self {
            admin: token("root", RoleName::admin()),
            burial: token("burial", RoleName::artist()),
            kode9: token("kode9", RoleName::artist()),
            fan: token("fan", RoleName::listener()),
            repo,
            app,
            burial_id,
            kode9_id,
            fan_id,
        }
    }

    async fn send(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn genre(&self, name: &str) -> String {
        let (status, body) = self
            .send(Method::POST, "/api/genres", Some(&self.admin), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["genreId"].as_str().unwrap().to_string()
    }

    async fn artist(&self, token: &str, user_id: UserId, genre: &str) -> String {
        let username = if user_id == self.burial_id { "burial" } else { "kode9" };
        let (status, body) = self
            .send(
                Method::POST,
                "/api/artists",
                Some(token),
                Some(json!({ "username": username, "userId": user_id, "genreId": genre })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["artistId"].as_str().unwrap().to_string()
    }

    async fn song(&self, token: &str, artist: &str, genre: &str, title: &str, duration: i32) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/songs",
                Some(token),
                Some(json!({
                    "artistId": artist,
                    "genreId": genre,
                    "title": title,
                    "duration": duration
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["songId"].as_str().unwrap().to_string()
    }

    async fn stream(&self, song: &str) -> (StatusCode, Value) {
        let uri = format!("/api/histories/user/{}/streams/{song}", self.fan_id);
        self.send(Method::POST, &uri, Some(&self.fan), None).await
    }

    async fn listing(&self, token: &str, song: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/listings",
                Some(token),
                Some(json!({
                    "song": song,
                    "price": 1.5,
                    "formats": [{ "type": "Digital", "price": 1.5, "preview": "p.mp3", "source": "s.flac" }]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["listedSongId"].as_str().unwrap().to_string()
    }
}

// ============================================================================
// Genres
// ============================================================================

#[tokio::test]
async fn genre_lifecycle() {
    let fx = Fixture::new();

    let (status, body) = fx.send(Method::GET, "/api/genres", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, _) = fx
        .send(Method::POST, "/api/genres", None, Some(json!({ "name": "Dubstep" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = fx
        .send(Method::POST, "/api/genres", Some(&fx.fan), Some(json!({ "name": "Dubstep" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = SongId::new();
    let (status, _) = fx
        .send(
            Method::POST,
            "/api/genres",
            Some(&fx.burial),
            Some(json!({ "name": "Dubstep", "songs": [missing] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = fx
        .send(Method::POST, "/api/genres", Some(&fx.burial), Some(json!({ "name": "Dubstep" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let genre = body["genreId"].as_str().unwrap().to_string();

    let (status, _) = fx
        .send(
            Method::PUT,
            &format!("/api/genres/{genre}"),
            Some(&fx.burial),
            Some(json!({ "name": "UK Garage" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(
            Method::PUT,
            &format!("/api/genres/{genre}"),
            Some(&fx.admin),
            Some(json!({ "name": "UK Garage" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "UK Garage");

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/genres/{genre}"), Some(&fx.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = fx.send(Method::GET, &format!("/api/genres/{genre}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_songs_to_genre_appends_and_rejects_duplicates() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let a = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let b = fx.song(&fx.burial, &artist, &genre, "Near Dark", 234).await;

    let uri = format!("/api/genres/{genre}/songs");
    let (status, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "songs": [a, b] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"], json!([a, b]));

    let (status, _) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "songs": [b] })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // still referenced by songs and the artist profile
    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/genres/{genre}"), Some(&fx.admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

// ============================================================================
// Artists
// ============================================================================

#[tokio::test]
async fn artist_profiles() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;

    let (status, body) = fx.send(Method::GET, "/api/artists", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    // an artist cannot create a profile for someone else
    let (status, _) = fx
        .send(
            Method::POST,
            "/api/artists",
            Some(&fx.burial),
            Some(json!({ "username": "kode9", "userId": fx.kode9_id, "genreId": genre })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/artists",
            Some(&fx.burial),
            Some(json!({ "username": "burial", "userId": fx.burial_id, "genreId": GenreId::new() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/artists",
            Some(&fx.admin),
            Some(json!({ "username": "ghost", "userId": UserId::new(), "genreId": genre })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/artists",
            Some(&fx.admin),
            Some(json!({ "username": "burial", "userId": fx.burial_id, "genreId": genre })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // admin may create for anyone
    fx.artist(&fx.admin, fx.kode9_id, &genre).await;

    let (status, body) = fx.send(Method::GET, &format!("/api/artists/{artist}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], json!(fx.burial_id));
}

#[tokio::test]
async fn artist_song_list_is_most_recent_first() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let a = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let b = fx.song(&fx.burial, &artist, &genre, "Etched Headplate", 360).await;

    for song in [&a, &b, &a] {
        let (status, _) = fx
            .send(
                Method::POST,
                &format!("/api/artists/{artist}/songs/{song}"),
                Some(&fx.burial),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let artist_id: ArtistId = artist.parse().unwrap();
    let songs: Vec<String> = fx
        .repo
        .artist(&artist_id)
        .songs
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(songs, vec![b.clone(), a.clone()]);

    let (status, _) = fx
        .send(
            Method::POST,
            &format!("/api/artists/{artist}/songs/{a}"),
            Some(&fx.kode9),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = fx
        .send(
            Method::POST,
            &format!("/api/artists/{artist}/songs/{}", SongId::new()),
            Some(&fx.burial),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = fx
        .send(
            Method::DELETE,
            &format!("/api/artists/{artist}/songs/{b}"),
            Some(&fx.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"], json!([a]));
}

#[tokio::test]
async fn artist_update_checks_references() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let other = fx.genre("Garage").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Untrue", 373).await;

    let uri = format!("/api/artists/{artist}");
    let (status, _) = fx
        .send(
            Method::PUT,
            &uri,
            Some(&fx.burial),
            Some(json!({ "username": "Burial", "userId": fx.burial_id, "genreId": other, "songs": [SongId::new()] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = fx
        .send(
            Method::PUT,
            &uri,
            Some(&fx.burial),
            Some(json!({ "username": "Burial", "userId": fx.kode9_id, "genreId": other })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(
            Method::PUT,
            &uri,
            Some(&fx.burial),
            Some(json!({ "username": "Burial", "userId": fx.burial_id, "genreId": other, "songs": [song] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "Burial");
    assert_eq!(body["genreId"], json!(other));
    assert_eq!(body["songs"], json!([song]));
}

// ============================================================================
// Songs
// ============================================================================

#[tokio::test]
async fn song_ownership_and_properties() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let burial = fx.artist(&fx.burial, fx.burial_id, &genre).await;

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/songs",
            Some(&fx.kode9),
            Some(json!({ "artistId": burial, "genreId": genre, "title": "Fake", "duration": 100 })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(
            Method::POST,
            "/api/songs",
            Some(&fx.burial),
            Some(json!({ "artistId": burial, "genreId": genre, "title": "Archangel", "duration": 239 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["license"], "Creative Commons");
    assert_eq!(body["explicit"], false);
    assert_eq!(body["streams"], 0);
    let song = body["songId"].as_str().unwrap().to_string();

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/songs",
            Some(&fx.burial),
            Some(json!({ "artistId": burial, "genreId": genre, "title": "Zero", "duration": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/songs/{song}");
    let (status, _) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "likes": -3 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fx
        .send(Method::PATCH, &uri, Some(&fx.kode9), Some(json!({ "likes": 3 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "likes": 3, "explicit": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["likes"], 3);
    assert_eq!(body["explicit"], true);
    assert_eq!(body["title"], "Archangel");

    let (status, body) = fx
        .send(
            Method::PUT,
            &uri,
            Some(&fx.admin),
            Some(json!({ "artistId": burial, "genreId": genre, "title": "Archangel (VIP)", "duration": 250 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Archangel (VIP)");
    assert_eq!(body["explicit"], false);
    assert_eq!(body["likes"], 3);
}

#[tokio::test]
async fn song_patch_clears_description_and_cover_art() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let uri = format!("/api/songs/{song}");

    let (_, body) = fx
        .send(
            Method::PATCH,
            &uri,
            Some(&fx.burial),
            Some(json!({ "description": "Untrue, 2007", "coverArt": "untrue.jpg" })),
        )
        .await;
    assert_eq!(body["description"], "Untrue, 2007");
    assert_eq!(body["coverArt"], "untrue.jpg");

    // a missing key keeps the value, null clears it
    let (status, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "description": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["coverArt"], "untrue.jpg");

    let (_, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.burial), Some(json!({ "coverArt": null })))
        .await;
    assert_eq!(body["coverArt"], Value::Null);
}

#[tokio::test]
async fn song_search_filters_and_sorts() {
    let fx = Fixture::new();
    let dubstep = fx.genre("Dubstep").await;
    let garage = fx.genre("Garage").await;
    let burial = fx.artist(&fx.burial, fx.burial_id, &dubstep).await;
    let kode9 = fx.artist(&fx.kode9, fx.kode9_id, &dubstep).await;

    fx.song(&fx.burial, &burial, &dubstep, "Archangel", 239).await;
    fx.song(&fx.burial, &burial, &garage, "Near Dark", 234).await;
    fx.song(&fx.kode9, &kode9, &dubstep, "Black Sun", 300).await;
    fx.song(&fx.kode9, &kode9, &garage, "Nine", 120).await;

    let titles = |body: &Value| -> Vec<String> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|s| s["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = fx.send(Method::GET, "/api/songs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body), vec!["Archangel", "Black Sun", "Near Dark", "Nine"]);

    let (_, body) = fx
        .send(Method::GET, &format!("/api/songs?genre={garage}&sort=duration&order=desc"), None, None)
        .await;
    assert_eq!(titles(&body), vec!["Near Dark", "Nine"]);

    let (_, body) = fx
        .send(Method::GET, &format!("/api/songs?artist={kode9}&minDuration=200"), None, None)
        .await;
    assert_eq!(titles(&body), vec!["Black Sun"]);

    let (_, body) = fx.send(Method::GET, "/api/songs?title=AR", None, None).await;
    assert_eq!(titles(&body), vec!["Archangel", "Near Dark"]);

    let (status, _) = fx.send(Method::GET, "/api/songs?sort=rating", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fx
        .send(Method::GET, "/api/songs?minDuration=300&maxDuration=100", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_song_cleans_up_references() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;

    fx.send(Method::PATCH, &format!("/api/genres/{genre}/songs"), Some(&fx.admin), Some(json!({ "songs": [song] })))
        .await;
    fx.send(Method::POST, &format!("/api/artists/{artist}/songs/{song}"), Some(&fx.burial), None)
        .await;
    let listing = fx.listing(&fx.burial, &song).await;

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/songs/{song}"), Some(&fx.kode9), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/songs/{song}"), Some(&fx.burial), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let genre_id: GenreId = genre.parse().unwrap();
    let artist_id: ArtistId = artist.parse().unwrap();
    assert!(fx.repo.genre(&genre_id).songs.is_empty());
    assert!(fx.repo.artist(&artist_id).songs.is_empty());
    let (status, _) = fx.send(Method::GET, &format!("/api/listings/{listing}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn song_use_case_refuses_caller_without_account() {
    let repo = InMemoryCatalog::default();
    let genre = Genre::new("Dubstep", vec![]).unwrap();
    repo.insert_genre(&genre).await.unwrap();
    let owner = repo.add_user("burial");
    let artist = Artist::new("burial", owner, genre.genre_id).unwrap();
    repo.insert_artist(&artist).await.unwrap();

    // token is valid but the account no longer exists
    let ghost = AuthenticatedUser::new("ghost", vec![RoleName::artist()]);
    let err = SongUseCase::new(Arc::new(repo.clone()))
        .create(
            &ghost,
            crate::domain::entity::song::SongDraft {
                artist_id: artist.artist_id,
                genre_id: genre.genre_id,
                title: "Ghost Hardware".to_string(),
                duration: 290,
                explicit: None,
                license: None,
                description: None,
                published: None,
                cover_art: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Forbidden));

    let err = ArtistUseCase::new(Arc::new(repo))
        .get(&ArtistId::new())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Listings and comments
// ============================================================================

#[tokio::test]
async fn listings() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;

    let (status, _) = fx
        .send(Method::POST, "/api/listings", Some(&fx.burial), Some(json!({ "song": song, "price": 1.0 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/listings",
            Some(&fx.fan),
            Some(json!({ "song": song, "price": 1.0, "formats": [{ "type": "CD", "price": 9.0, "preview": "p", "source": "s" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = fx
        .send(
            Method::POST,
            "/api/listings",
            Some(&fx.burial),
            Some(json!({ "song": SongId::new(), "price": 1.0, "formats": [{ "type": "CD", "price": 9.0, "preview": "p", "source": "s" }] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let listing = fx.listing(&fx.burial, &song).await;
    let (status, body) = fx.send(Method::GET, &format!("/api/listings/{listing}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["creator"], json!(fx.burial_id));
    assert_eq!(body["formats"][0]["type"], "Digital");

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/listings/{listing}"), Some(&fx.kode9), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/listings/{listing}"), Some(&fx.burial), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn comments_and_replies() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let other_song = fx.song(&fx.burial, &artist, &genre, "Near Dark", 234).await;
    let listing = fx.listing(&fx.burial, &song).await;
    let other_listing = fx.listing(&fx.burial, &other_song).await;
    let uri = format!("/api/listings/{listing}/comments");

    let (status, _) = fx
        .send(Method::POST, &uri, None, Some(json!({ "message": "tune" })))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = fx
        .send(
            Method::POST,
            &format!("/api/listings/{}/comments", ListedSongId::new()),
            Some(&fx.fan),
            Some(json!({ "message": "tune" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = fx
        .send(Method::POST, &uri, Some(&fx.fan), Some(json!({ "message": "  " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = fx
        .send(Method::POST, &uri, Some(&fx.fan), Some(json!({ "message": "tune" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["postedBy"], json!(fx.fan_id));
    assert_eq!(body["flagged"], "");
    let parent = body["commentId"].as_str().unwrap().to_string();

    let (status, _) = fx
        .send(
            Method::POST,
            &format!("/api/listings/{other_listing}/comments"),
            Some(&fx.burial),
            Some(json!({ "message": "wrong thread", "replyTo": parent })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = fx
        .send(Method::POST, &uri, Some(&fx.burial), Some(json!({ "message": "cheers", "replyTo": parent })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let reply = body["commentId"].as_str().unwrap().to_string();

    let (_, body) = fx.send(Method::GET, &format!("/api/comments/{parent}"), None, None).await;
    assert_eq!(body["repliedBy"], json!([reply]));
    assert_eq!(body["replies"], 1);

    let (_, body) = fx.send(Method::GET, &uri, None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (_, body) = fx.send(Method::GET, "/api/comments", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/comments/{reply}"), Some(&fx.fan), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = fx
        .send(Method::DELETE, &format!("/api/comments/{reply}"), Some(&fx.burial), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = fx.send(Method::GET, &format!("/api/comments/{parent}"), None, None).await;
    assert_eq!(body["repliedBy"], json!([]));
    assert_eq!(body["replies"], 0);
}

#[tokio::test]
async fn comment_editing_flags_and_votes() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let listing = fx.listing(&fx.burial, &song).await;

    let (_, body) = fx
        .send(
            Method::POST,
            &format!("/api/listings/{listing}/comments"),
            Some(&fx.fan),
            Some(json!({ "message": "first" })),
        )
        .await;
    let uri = format!("/api/comments/{}", body["commentId"].as_str().unwrap());

    let (status, _) = fx
        .send(Method::PUT, &uri, Some(&fx.kode9), Some(json!({ "message": "hijack" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(Method::PUT, &uri, Some(&fx.fan), Some(json!({ "message": "edited" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "edited");

    let (status, _) = fx
        .send(Method::PATCH, &uri, Some(&fx.kode9), Some(json!({ "vote": 2 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = fx.send(Method::PATCH, &uri, Some(&fx.kode9), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.kode9), Some(json!({ "vote": -1, "flag": "spoiler" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["votes"], -1);
    assert_eq!(body["flagged"], "spoiler");

    let (_, body) = fx
        .send(Method::PATCH, &uri, Some(&fx.admin), Some(json!({ "flag": "" })))
        .await;
    assert_eq!(body["flagged"], "");
    assert_eq!(body["votes"], -1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_votes_are_all_counted() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let listing = fx.listing(&fx.burial, &song).await;
    let (_, body) = fx
        .send(
            Method::POST,
            &format!("/api/listings/{listing}/comments"),
            Some(&fx.fan),
            Some(json!({ "message": "tune" })),
        )
        .await;
    let comment_id: CommentId = body["commentId"].as_str().unwrap().parse().unwrap();

    let comments = Arc::new(CommentUseCase::new(Arc::new(fx.repo.clone())));
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let comments = comments.clone();
        tasks.spawn(async move {
            let caller = AuthenticatedUser::new("kode9", vec![RoleName::artist()]);
            let input = CommentStateInput {
                flag: None,
                vote: Some(1),
            };
            comments.update_state(&caller, &comment_id, input).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let (_, body) = fx.send(Method::GET, &format!("/api/comments/{comment_id}"), None, None).await;
    assert_eq!(body["votes"], 32);
}

// ============================================================================
// Listening history
// ============================================================================

#[tokio::test]
async fn history_ownership() {
    let fx = Fixture::new();

    let (status, _) = fx
        .send(Method::POST, "/api/histories", Some(&fx.fan), Some(json!({ "userId": fx.burial_id })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fx
        .send(Method::POST, "/api/histories", Some(&fx.fan), Some(json!({ "userId": fx.fan_id })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["streams"], json!([]));
    let history = body["historyId"].as_str().unwrap().to_string();

    let (status, _) = fx
        .send(Method::POST, "/api/histories", Some(&fx.admin), Some(json!({ "userId": fx.fan_id })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = fx
        .send(Method::POST, "/api/histories", Some(&fx.admin), Some(json!({ "userId": UserId::new() })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/histories/{history}");
    assert_eq!(fx.send(Method::GET, &uri, Some(&fx.fan), None).await.0, StatusCode::OK);
    assert_eq!(fx.send(Method::GET, &uri, Some(&fx.burial), None).await.0, StatusCode::FORBIDDEN);
    assert_eq!(fx.send(Method::GET, &uri, Some(&fx.admin), None).await.0, StatusCode::OK);

    assert_eq!(fx.send(Method::GET, "/api/histories", Some(&fx.fan), None).await.0, StatusCode::FORBIDDEN);
    let (status, body) = fx.send(Method::GET, "/api/histories", Some(&fx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn history_streams() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let a = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    let b = fx.song(&fx.burial, &artist, &genre, "Near Dark", 234).await;
    let fan = fx.fan_id;

    let (status, _) = fx.stream(&a).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    fx.send(Method::POST, "/api/histories", Some(&fx.fan), Some(json!({ "userId": fan })))
        .await;

    fx.stream(&a).await;
    fx.stream(&b).await;
    let (status, body) = fx.stream(&a).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["streams"],
        json!([{ "song": a, "timesStreamed": 2 }, { "song": b, "timesStreamed": 1 }])
    );

    let (status, _) = fx.stream(&SongId::new().to_string()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = fx
        .send(
            Method::POST,
            &format!("/api/histories/user/{fan}/streams/{a}"),
            Some(&fx.kode9),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/histories/user/{fan}");
    let (status, _) = fx
        .send(Method::PUT, &uri, Some(&fx.fan), Some(json!({ "streams": [{ "song": a, "timesStreamed": 0 }] })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = fx
        .send(Method::PUT, &uri, Some(&fx.fan), Some(json!({ "streams": [{ "song": b, "timesStreamed": 5 }] })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"], json!([{ "song": b, "timesStreamed": 5 }]));

    // removing an absent song is a no-op
    let (status, body) = fx
        .send(Method::DELETE, &format!("/api/histories/user/{fan}/streams/{a}"), Some(&fx.fan), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"].as_array().unwrap().len(), 1);

    let (status, body) = fx
        .send(Method::DELETE, &format!("/api/histories/user/{fan}/streams/{b}"), Some(&fx.fan), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"], json!([]));

    let (status, body) = fx.send(Method::PUT, &uri, Some(&fx.admin), Some(json!({ "streams": [] }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streams"], json!([]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_streams_are_all_recorded() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let artist = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let song = fx.song(&fx.burial, &artist, &genre, "Archangel", 239).await;
    fx.send(Method::POST, "/api/histories", Some(&fx.fan), Some(json!({ "userId": fx.fan_id })))
        .await;
    let song_id: SongId = song.parse().unwrap();
    let fan_id = fx.fan_id;

    let histories = Arc::new(HistoryUseCase::new(Arc::new(fx.repo.clone())));
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..32 {
        let histories = histories.clone();
        tasks.spawn(async move {
            let caller = AuthenticatedUser::new("fan", vec![RoleName::listener()]);
            histories.add_stream(&caller, &fan_id, &song_id).await
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap().unwrap();
    }

    let (_, body) = fx.stream(&song).await;
    assert_eq!(body["streams"], json!([{ "song": song, "timesStreamed": 33 }]));
}

// ============================================================================
// Account deletion
// ============================================================================

#[tokio::test]
async fn deleting_an_account_clears_its_catalog_content() {
    let fx = Fixture::new();
    let genre = fx.genre("Dubstep").await;
    let burial = fx.artist(&fx.burial, fx.burial_id, &genre).await;
    let kode9 = fx.artist(&fx.kode9, fx.kode9_id, &genre).await;
    let archangel = fx.song(&fx.burial, &burial, &genre, "Archangel", 239).await;
    let black_sun = fx.song(&fx.kode9, &kode9, &genre, "Black Sun", 300).await;
    fx.send(
        Method::PATCH,
        &format!("/api/genres/{genre}/songs"),
        Some(&fx.admin),
        Some(json!({ "songs": [archangel, black_sun] })),
    )
    .await;

    fx.send(Method::POST, "/api/histories", Some(&fx.fan), Some(json!({ "userId": fx.fan_id })))
        .await;
    fx.stream(&archangel).await;
    fx.stream(&black_sun).await;
    fx.send(Method::POST, "/api/histories", Some(&fx.admin), Some(json!({ "userId": fx.burial_id })))
        .await;

    let listing = fx.listing(&fx.kode9, &black_sun).await;
    let burial_listing = fx.listing(&fx.burial, &black_sun).await;
    let comments = format!("/api/listings/{listing}/comments");
    let (_, body) = fx
        .send(Method::POST, &comments, Some(&fx.fan), Some(json!({ "message": "tune" })))
        .await;
    let parent = body["commentId"].as_str().unwrap().to_string();
    let (_, body) = fx
        .send(Method::POST, &comments, Some(&fx.burial), Some(json!({ "message": "cheers", "replyTo": parent })))
        .await;
    let reply = body["commentId"].as_str().unwrap().to_string();
    fx.send(Method::POST, &comments, Some(&fx.kode9), Some(json!({ "message": "thanks", "replyTo": parent })))
        .await;

    AccountContentCleanup::new(Arc::new(fx.repo.clone()))
        .remove_user_content(&fx.burial_id)
        .await
        .unwrap();

    let genre_id: GenreId = genre.parse().unwrap();
    let black_sun_id: SongId = black_sun.parse().unwrap();
    assert_eq!(fx.repo.genre(&genre_id).songs, vec![black_sun_id]);

    let fan_history = fx.repo.find_history_by_user(&fx.fan_id).await.unwrap().unwrap();
    assert_eq!(json!(fan_history.streams), json!([{ "song": black_sun, "timesStreamed": 1 }]));
    let (_, body) = fx.send(Method::GET, "/api/histories", Some(&fx.admin), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = fx.send(Method::GET, &format!("/api/comments/{parent}"), None, None).await;
    assert_eq!(body["replies"], 1);
    assert_eq!(body["repliedBy"].as_array().unwrap().len(), 1);
    assert_ne!(body["repliedBy"][0], json!(reply));

    for uri in [
        format!("/api/artists/{burial}"),
        format!("/api/songs/{archangel}"),
        format!("/api/comments/{reply}"),
        format!("/api/listings/{burial_listing}"),
    ] {
        let (status, _) = fx.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
    let (status, _) = fx.send(Method::GET, &format!("/api/artists/{kode9}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
}
