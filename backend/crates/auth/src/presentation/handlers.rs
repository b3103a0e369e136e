//! HTTP Handlers

use axum::Json;
use axum::extract::{FromRef, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::id::{RoleId, UserId};
use std::sync::Arc;

use platform::cookie::extract_cookie;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthenticatedUser, LoginInput, LoginUseCase, LogoutUseCase, ProfileInput, RefreshUseCase,
    RegisterInput, RegisterUseCase, RoleAdminUseCase, RoleInput, UserAdminUseCase,
};
use crate::domain::repository::{RoleRepository, UserContentCleanup, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AccessTokenResponse, AddUsersToRoleRequest, LoginRequest, MessageResponse, RegisterRequest,
    RegisterResponse, RoleRequest, RoleResponse, UpdateProfileRequest, UserResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
}

/// State for `/api/users`: the auth state plus the hook run before an
/// account is deleted
#[derive(Clone)]
pub struct UsersAppState<R, C>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    C: UserContentCleanup + Clone + Send + Sync + 'static,
{
    pub auth: AuthAppState<R>,
    pub cleanup: Arc<C>,
}

impl<R, C> FromRef<UsersAppState<R, C>> for AuthAppState<R>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    C: UserContentCleanup + Clone + Send + Sync + 'static,
{
    fn from_ref(state: &UsersAppState<R, C>) -> Self {
        state.auth.clone()
    }
}

// ============================================================================
// Register / Login / Refresh / Logout
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<RegisterResponse>)>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case =
        RegisterUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(RegisterInput {
            username: req.username,
            password: req.password,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            roles: req.roles,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully!".to_string(),
            user_id: output.user_id,
            username: output.username,
            roles: output.roles,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Response>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case
        .execute(LoginInput {
            username: req.username,
            password: req.password,
        })
        .await?;

    let cookie = state
        .config
        .refresh_cookie()
        .set_cookie_header(&output.refresh_token)
        .ok_or_else(|| AuthError::Internal("Refresh token is not a valid header value".into()))?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(AccessTokenResponse {
            access_token: output.access_token,
            roles: output.roles,
        }),
    )
        .into_response())
}

/// GET /api/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Json<AccessTokenResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);
    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.config.clone());

    let output = use_case.execute(token.as_deref()).await?;

    Ok(Json(AccessTokenResponse {
        access_token: output.access_token,
        roles: output.roles,
    }))
}

/// POST /api/auth/logout
///
/// The cookie is cleared on every outcome except a missing cookie.
pub async fn logout<R>(State(state): State<AuthAppState<R>>, headers: HeaderMap) -> Response
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let token = extract_cookie(&headers, &state.config.refresh_cookie_name);
    let use_case = LogoutUseCase::new(state.repo.clone());

    let response = match use_case.execute(token.as_deref()).await {
        Ok(()) => Json(MessageResponse::new("Logout successful")).into_response(),
        Err(AuthError::RefreshTokenMissing) => {
            return AuthError::RefreshTokenMissing.into_response();
        }
        Err(e) => e.into_response(),
    };

    with_cleared_cookie(&state.config, response)
}

fn with_cleared_cookie(config: &AuthConfig, mut response: Response) -> Response {
    if let Some(cookie) = config.refresh_cookie().delete_cookie_header() {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    response
}

// ============================================================================
// Roles
// ============================================================================

/// GET /api/roles
pub async fn list_roles<R>(
    State(state): State<AuthAppState<R>>,
) -> AuthResult<Json<Vec<RoleResponse>>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let roles = RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .list()
        .await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// GET /api/roles/{id}
pub async fn get_role<R>(
    State(state): State<AuthAppState<R>>,
    Path(role_id): Path<RoleId>,
) -> AuthResult<Json<RoleResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let role = RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .get(&role_id)
        .await?;
    Ok(Json(role.into()))
}

/// POST /api/roles
pub async fn create_role<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Json(req): Json<RoleRequest>,
) -> AuthResult<(StatusCode, Json<RoleResponse>)>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let role = RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .create(
            &caller,
            RoleInput {
                name: req.name,
                clearance_level: req.clearance_level,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(role.into())))
}

/// PUT /api/roles/{id}
pub async fn update_role<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Path(role_id): Path<RoleId>,
    Json(req): Json<RoleRequest>,
) -> AuthResult<Json<RoleResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let role = RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .update(
            &caller,
            &role_id,
            RoleInput {
                name: req.name,
                clearance_level: req.clearance_level,
            },
        )
        .await?;
    Ok(Json(role.into()))
}

/// POST /api/roles/{id}/users
pub async fn add_users_to_role<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Path(role_id): Path<RoleId>,
    Json(req): Json<AddUsersToRoleRequest>,
) -> AuthResult<Json<RoleResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let role = RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .add_users(&caller, &role_id, &req.user_ids)
        .await?;
    Ok(Json(role.into()))
}

/// DELETE /api/roles/{id}
pub async fn delete_role<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Path(role_id): Path<RoleId>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    RoleAdminUseCase::new(state.repo.clone(), state.repo.clone())
        .delete(&caller, &role_id)
        .await?;
    Ok(Json(MessageResponse::new("Role deleted")))
}

// ============================================================================
// Users
// ============================================================================

/// GET /api/users
pub async fn list_users<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
) -> AuthResult<Json<Vec<UserResponse>>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let users = UserAdminUseCase::new(state.repo.clone()).list(&caller).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
pub async fn get_user<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Path(user_id): Path<UserId>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let user = UserAdminUseCase::new(state.repo.clone())
        .get(&caller, &user_id)
        .await?;
    Ok(Json(user.into()))
}

/// PATCH /api/users/{id}
pub async fn update_user<R>(
    State(state): State<AuthAppState<R>>,
    caller: AuthenticatedUser,
    Path(user_id): Path<UserId>,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
{
    let user = UserAdminUseCase::new(state.repo.clone())
        .update_profile(
            &caller,
            &user_id,
            ProfileInput {
                email: req.email,
                first_name: req.first_name,
                last_name: req.last_name,
            },
        )
        .await?;
    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
pub async fn delete_user<R, C>(
    State(state): State<UsersAppState<R, C>>,
    caller: AuthenticatedUser,
    Path(user_id): Path<UserId>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RoleRepository + Clone + Send + Sync + 'static,
    C: UserContentCleanup + Clone + Send + Sync + 'static,
{
    UserAdminUseCase::new(state.auth.repo.clone())
        .delete(&caller, &user_id, state.cleanup.as_ref())
        .await?;
    Ok(Json(MessageResponse::new("User deleted")))
}
