//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{RoleId, UserId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{role::Role, user::User};
use crate::domain::repository::{RoleRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, role_name::RoleName, user_name::UserName, user_password::UserPassword,
    user_status::UserStatus,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    username,
    email,
    first_name,
    last_name,
    password_hash,
    user_status,
    role_ids,
    refresh_token_hash,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, filter: &str, value: &str) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create_user(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                username,
                username_canonical,
                email,
                first_name,
                last_name,
                password_hash,
                user_status,
                role_ids,
                refresh_token_hash,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.username.original())
        .bind(user.username.canonical())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.password_hash.as_phc_string())
        .bind(user.status.id())
        .bind(RoleId::to_uuids(&user.role_ids))
        .bind(user.refresh_token_hash.as_deref())
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| conflict_or(e, AuthError::UserNameTaken))?;

        Ok(())
    }

    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_name(&self, username: &UserName) -> AuthResult<Option<User>> {
        self.fetch_user("username_canonical", username.canonical())
            .await
    }

    async fn exists_by_user_name(&self, username: &UserName) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username_canonical = $1)",
        )
        .bind(username.canonical())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_user_by_refresh_token(&self, token_hash: &str) -> AuthResult<Option<User>> {
        self.fetch_user("refresh_token_hash", token_hash).await
    }

    async fn set_refresh_token(
        &self,
        user_id: &UserId,
        token_hash: Option<&str>,
    ) -> AuthResult<()> {
        sqlx::query(
            "UPDATE users SET refresh_token_hash = $2, updated_at = now() WHERE user_id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_users(&self) -> AuthResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                first_name = $3,
                last_name = $4,
                updated_at = $5
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_user(&self, user_id: &UserId) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Role Repository Implementation
// ============================================================================

impl RoleRepository for PgAuthRepository {
    async fn list_roles(&self) -> AuthResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT role_id, name, clearance_level FROM roles ORDER BY clearance_level, name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn find_role_by_id(&self, role_id: &RoleId) -> AuthResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(
            "SELECT role_id, name, clearance_level FROM roles WHERE role_id = $1",
        )
        .bind(role_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoleRow::into_role))
    }

    async fn find_roles_by_names(&self, names: &[RoleName]) -> AuthResult<Vec<Role>> {
        let names: Vec<String> = names.iter().map(|n| n.as_str().to_string()).collect();
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT role_id, name, clearance_level FROM roles WHERE name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn find_roles_by_ids(&self, role_ids: &[RoleId]) -> AuthResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            "SELECT role_id, name, clearance_level FROM roles WHERE role_id = ANY($1)",
        )
        .bind(RoleId::to_uuids(role_ids))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoleRow::into_role).collect())
    }

    async fn exists_by_role_name(&self, name: &RoleName) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)")
                .bind(name.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create_role(&self, role: &Role) -> AuthResult<()> {
        sqlx::query("INSERT INTO roles (role_id, name, clearance_level) VALUES ($1, $2, $3)")
            .bind(role.role_id.as_uuid())
            .bind(role.name.as_str())
            .bind(role.clearance_level)
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or(e, AuthError::RoleNameTaken))?;

        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AuthResult<()> {
        sqlx::query("UPDATE roles SET name = $2, clearance_level = $3 WHERE role_id = $1")
            .bind(role.role_id.as_uuid())
            .bind(role.name.as_str())
            .bind(role.clearance_level)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_role(&self, role_id: &RoleId) -> AuthResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET role_ids = array_remove(role_ids, $1) WHERE $1 = ANY(role_ids)")
            .bind(role_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM roles WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn add_role_to_users(&self, role_id: &RoleId, user_ids: &[UserId]) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                role_ids = array_append(role_ids, $1),
                updated_at = now()
            WHERE user_id = ANY($2) AND NOT ($1 = ANY(role_ids))
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(UserId::to_uuids(user_ids))
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Unique violations become `conflict`; anything else stays a database error
fn conflict_or(err: sqlx::Error, conflict: AuthError) -> AuthError {
    let is_unique = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    if is_unique { conflict } else { AuthError::Database(err) }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    user_status: i16,
    role_ids: Vec<Uuid>,
    refresh_token_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let password_hash = UserPassword::from_phc_string(self.password_hash)?;
        let status = UserStatus::from_id(self.user_status).ok_or_else(|| {
            AuthError::Internal(format!("Invalid user_status: {}", self.user_status))
        })?;

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            username: UserName::from_db(&self.username),
            email: Email::from_db(self.email),
            first_name: self.first_name,
            last_name: self.last_name,
            password_hash,
            status,
            role_ids: RoleId::from_uuids(self.role_ids),
            refresh_token_hash: self.refresh_token_hash,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoleRow {
    role_id: Uuid,
    name: String,
    clearance_level: i16,
}

impl RoleRow {
    fn into_role(self) -> Role {
        Role {
            role_id: RoleId::from_uuid(self.role_id),
            name: RoleName::from_db(self.name),
            clearance_level: self.clearance_level,
        }
    }
}
