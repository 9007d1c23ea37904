use crate::models::{Message, MessageContent};
use sqlx::PgPool;
use tracing::Instrument;
use uuid::Uuid;

/// Inserting the same message id twice is a no-op, which makes retried
/// writes safe.
pub async fn insert(pool: &PgPool, message: &Message) -> Result<(), sqlx::Error> {
    let query_span = tracing::info_span!("Saving message into the database", role = %message.role);
    sqlx::query(
        r#"
        INSERT INTO messages (id, chat_id, user_id, role, content, created_at, is_edited)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(message.id)
    .bind(message.chat_id)
    .bind(message.user_id)
    .bind(message.role.as_str())
    .bind(&message.content)
    .bind(message.created_at)
    .bind(message.is_edited)
    .execute(pool)
    .instrument(query_span)
    .await
    .map(|_| ())
}

pub async fn fetch_by_chat(pool: &PgPool, chat_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch messages by chat id.");
    sqlx::query_as::<_, Message>(
        r#"SELECT id, chat_id, user_id, role, content, created_at, is_edited
           FROM messages
           WHERE chat_id = $1
           ORDER BY created_at ASC, seq ASC"#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}

pub async fn fetch_context_by_chat(
    pool: &PgPool,
    chat_id: Uuid,
) -> Result<Vec<MessageContent>, sqlx::Error> {
    let query_span = tracing::info_span!("Fetch message context by chat id.");
    sqlx::query_as::<_, MessageContent>(
        r#"SELECT role, content
           FROM messages
           WHERE chat_id = $1
           ORDER BY created_at ASC, seq ASC"#,
    )
    .bind(chat_id)
    .fetch_all(pool)
    .instrument(query_span)
    .await
}
