use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

/// A registered user, as stored in the `users` table.
///
/// The id is assigned at registration and never changes. The password hash is
/// the only mutable credential, rotated through [`User::update_password`], and
/// is never serialized into responses.
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    /// Unique, email-shaped username.
    pub username: String,
    /// bcrypt digest of the user's password.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";

impl User {
    /// Looks a user up by username, for the login path.
    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Looks a user up by id, for requests carrying a resolved identity.
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Registers a new user with an already-hashed password.
    ///
    /// The username column carries a unique constraint, and that constraint is
    /// what actually decides duplicate registrations: two concurrent requests
    /// can both pass a pre-insert lookup, so the loser's insert error must map
    /// to the same client-facing response as the sequential duplicate path.
    pub async fn create(pool: &PgPool, username: &str, password_hash: &str) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await
        .map_err(map_insert_error)?;

        Ok(user)
    }

    /// Replaces the stored password hash for a user.
    pub async fn update_password(pool: &PgPool, id: i32, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".into()));
        }

        Ok(())
    }
}

/// Maps insert failures to client-facing errors: a unique-constraint
/// violation means the username is taken (a 400, not a 500); anything else is
/// a genuine database error.
fn map_insert_error(error: sqlx::Error) -> AppError {
    if matches!(&error, sqlx::Error::Database(db) if db.is_unique_violation()) {
        AppError::BadRequest("username already registered".into())
    } else {
        AppError::from(error)
    }
}
