use crate::models::Chat;
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

pub async fn insert(pool: &PgPool, chat: &Chat) -> Result<Chat, sqlx::Error> {
    let query_span = tracing::info_span!("Saving new chat into the database");
    sqlx::query_as::<_, Chat>(
        r#"
        INSERT INTO chats (id, user_id, title, created_at, last_updated, is_archived, ai_model_version)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, user_id, title, created_at, last_updated, is_archived, ai_model_version
        "#,
    )
    .bind(chat.id)
    .bind(chat.user_id)
    .bind(&chat.title)
    .bind(chat.created_at)
    .bind(chat.last_updated)
    .bind(chat.is_archived)
    .bind(&chat.ai_model_version)
    .fetch_one(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch(pool: &PgPool, id: Uuid) -> Result<Option<Chat>, sqlx::Error> {
    sqlx::query_as::<_, Chat>(
        r#"SELECT id, user_id, title, created_at, last_updated, is_archived, ai_model_version
           FROM chats
           WHERE id = $1"#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn fetch_by_user(
    pool: &PgPool,
    user_id: Uuid,
    recent_first: bool,
) -> Result<Vec<Chat>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch chats by user id.");
    let order = if recent_first {
        "last_updated DESC, created_at DESC"
    } else {
        "created_at ASC"
    };
    let query = format!(
        r#"SELECT id, user_id, title, created_at, last_updated, is_archived, ai_model_version
           FROM chats
           WHERE user_id = $1
           ORDER BY {}"#,
        order
    );

    sqlx::query_as::<_, Chat>(&query)
        .bind(user_id)
        .fetch_all(pool)
        .instrument(query_span)
        .await
}

/// `ai_model_version` is deliberately absent from the SET list: it is bound
/// at creation.
pub async fn update(pool: &PgPool, chat: &Chat) -> Result<u64, sqlx::Error> {
    let query_span = tracing::info_span!("Updating chat");
    sqlx::query(
        r#"
        UPDATE chats
        SET title = $2,
            last_updated = GREATEST($3, created_at),
            is_archived = $4
        WHERE id = $1
        "#,
    )
    .bind(chat.id)
    .bind(&chat.title)
    .bind(chat.last_updated)
    .bind(chat.is_archived)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|result| result.rows_affected())
}

#[tracing::instrument(name = "Delete chat.", skip(pool))]
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    sqlx::query("DELETE FROM chats WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .map(|result| result.rows_affected())
}
