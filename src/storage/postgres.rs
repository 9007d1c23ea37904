use super::{ConversationStore, ModelCatalog, StoreError, StoreResult, UserStore};
use crate::db;
use crate::models::{AiModel, Chat, Message, MessageContent, NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn log_failure(err: sqlx::Error) -> StoreError {
    let err = StoreError::from(err);
    if let StoreError::Io(ref msg) = err {
        tracing::error!("Failed to execute query: {:?}", msg);
    }
    err
}

#[async_trait]
impl ConversationStore for PgStore {
    async fn create_chat(
        &self,
        user_id: Uuid,
        title: String,
        ai_model_version: String,
        now: DateTime<Utc>,
    ) -> StoreResult<Chat> {
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id,
            title,
            created_at: now,
            last_updated: now,
            is_archived: false,
            ai_model_version,
        };
        db::chat::insert(&self.pool, &chat).await.map_err(log_failure)
    }

    async fn get_chat_by_id(&self, chat_id: Uuid) -> StoreResult<Chat> {
        db::chat::fetch(&self.pool, chat_id)
            .await
            .map_err(log_failure)?
            .ok_or(StoreError::NotFound)
    }

    async fn update_chat(&self, chat: &Chat) -> StoreResult<()> {
        match db::chat::update(&self.pool, chat).await.map_err(log_failure)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    async fn get_message_context_by_chat_id(
        &self,
        chat_id: Uuid,
    ) -> StoreResult<Vec<MessageContent>> {
        db::message::fetch_context_by_chat(&self.pool, chat_id)
            .await
            .map_err(log_failure)
    }

    async fn get_messages_by_chat_id(&self, chat_id: Uuid) -> StoreResult<Vec<Message>> {
        db::message::fetch_by_chat(&self.pool, chat_id)
            .await
            .map_err(log_failure)
    }

    async fn create_message(&self, message: &Message) -> StoreResult<()> {
        db::message::insert(&self.pool, message)
            .await
            .map_err(log_failure)
    }

    async fn get_chats_by_user_id(
        &self,
        user_id: Uuid,
        sort_by_recency: bool,
    ) -> StoreResult<Vec<Chat>> {
        db::chat::fetch_by_user(&self.pool, user_id, sort_by_recency)
            .await
            .map_err(log_failure)
    }

    async fn delete_chat(&self, chat_id: Uuid) -> StoreResult<()> {
        match db::chat::delete(&self.pool, chat_id).await.map_err(log_failure)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        db::user::insert(&self.pool, &user).await.map_err(log_failure)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        db::user::fetch_by_username(&self.pool, username)
            .await
            .map_err(log_failure)?
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<User> {
        db::user::fetch(&self.pool, user_id)
            .await
            .map_err(log_failure)?
            .ok_or(StoreError::NotFound)
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        match db::user::update_last_login(&self.pool, user_id, at)
            .await
            .map_err(log_failure)?
        {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ModelCatalog for PgStore {
    async fn list_active_models(&self) -> StoreResult<Vec<AiModel>> {
        db::ai_model::fetch_active(&self.pool)
            .await
            .map_err(log_failure)
    }
}
