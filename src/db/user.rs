use crate::models::{NewUser, User};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, user: &NewUser) -> Result<User, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new user into the database", username = %user.username);
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, email, password_hash, created_at, is_active)
        VALUES ($1, $2, $3, $4, NOW() at time zone 'utc', TRUE)
        RETURNING id, username, email, password_hash, created_at, last_login, is_active
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"SELECT id, username, email, password_hash, created_at, last_login, is_active
           FROM users
           WHERE username = $1"#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"SELECT id, username, email, password_hash, created_at, last_login, is_active
           FROM users
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_last_login(
    pool: &PgPool,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    sqlx::query("UPDATE users SET last_login = $2 WHERE id = $1")
        .bind(id)
        .bind(at)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
}
