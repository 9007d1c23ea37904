//! Repository seams between services and persistence.
//!
//! `PgStore` is the production implementation over the `db` query functions;
//! `InMemoryStore` backs the test suites.

pub mod memory;
pub mod postgres;

use crate::models::{AiModel, Chat, Message, MessageContent, NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage io: {0}")]
    Io(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => StoreError::Conflict(db_err.message().to_string()),
                // foreign key violation: the parent row is gone
                Some("23503") => StoreError::NotFound,
                _ => StoreError::Io(db_err.to_string()),
            },
            other => StoreError::Io(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn create_chat(
        &self,
        user_id: Uuid,
        title: String,
        ai_model_version: String,
        now: DateTime<Utc>,
    ) -> StoreResult<Chat>;

    async fn get_chat_by_id(&self, chat_id: Uuid) -> StoreResult<Chat>;

    async fn update_chat(&self, chat: &Chat) -> StoreResult<()>;

    /// Context window of a chat in creation order.
    async fn get_message_context_by_chat_id(
        &self,
        chat_id: Uuid,
    ) -> StoreResult<Vec<MessageContent>>;

    async fn get_messages_by_chat_id(&self, chat_id: Uuid) -> StoreResult<Vec<Message>>;

    /// Idempotent on `message.id`.
    async fn create_message(&self, message: &Message) -> StoreResult<()>;

    async fn get_chats_by_user_id(
        &self,
        user_id: Uuid,
        sort_by_recency: bool,
    ) -> StoreResult<Vec<Chat>>;

    /// Removes the chat and every message in it.
    async fn delete_chat(&self, chat_id: Uuid) -> StoreResult<()>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<User>;

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<()>;
}

#[async_trait]
pub trait ModelCatalog: Send + Sync {
    async fn list_active_models(&self) -> StoreResult<Vec<AiModel>>;
}

/// Every repository the HTTP layer needs, each behind its trait.
#[derive(Clone)]
pub struct Storage {
    pub conversations: Arc<dyn ConversationStore>,
    pub users: Arc<dyn UserStore>,
    pub models: Arc<dyn ModelCatalog>,
}

impl Storage {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            conversations: store.clone(),
            users: store.clone(),
            models: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(Arc::new(InMemoryStore::default()))
    }

    /// Shares one in-memory store so tests can inspect what the app wrote.
    pub fn from_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            conversations: store.clone(),
            users: store.clone(),
            models: store,
        }
    }
}
