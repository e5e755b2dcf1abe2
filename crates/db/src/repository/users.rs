//! User lookups used by the sharing layer.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, models::UserRow, scope::GlobalRole};

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, global_role, created_at";

/// Fields needed to create a user. Leave `password_hash` empty for an
/// invited (pending) user.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub global_role: GlobalRole,
}

/// Insert a user; the id is generated here.
pub async fn create_user(pool: &PgPool, user: &NewUser<'_>) -> Result<UserRow, DbError> {
    let sql = format!(
        "INSERT INTO users (id, email, first_name, last_name, password_hash, global_role) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, UserRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.first_name)
        .bind(user.last_name)
        .bind(user.password_hash)
        .bind(user.global_role.as_str())
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Fetch a single user by its primary key.
pub async fn get_user(pool: &PgPool, id: Uuid) -> Result<UserRow, DbError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound("user"))
}

/// The user holding the `owner` global role. Oldest wins if there are several.
pub async fn get_instance_owner(pool: &PgPool) -> Result<UserRow, DbError> {
    let sql = format!(
        "SELECT {USER_COLUMNS} FROM users WHERE global_role = $1 ORDER BY created_at ASC LIMIT 1"
    );
    sqlx::query_as::<_, UserRow>(&sql)
        .bind(GlobalRole::Owner.as_str())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound("instance owner"))
}
