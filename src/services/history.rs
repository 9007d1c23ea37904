use crate::models::{Chat, Message};
use crate::services::ServiceError;
use crate::storage::{ConversationStore, StoreError};
use std::sync::Arc;
use uuid::Uuid;

/// Ownership-checked reads and deletes of stored conversations.
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn ConversationStore>,
}

fn store_failure(err: StoreError) -> ServiceError {
    match err {
        StoreError::NotFound => ServiceError::not_found("h-001", "Chat not found"),
        other => ServiceError::persistence("h-003", format!("Storage error: {}", other)),
    }
}

impl HistoryService {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    async fn owned_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<Chat, ServiceError> {
        let chat = self.store.get_chat_by_id(chat_id).await.map_err(store_failure)?;
        if !chat.is_owned_by(&user_id) {
            return Err(ServiceError::forbidden(
                "h-002",
                "You do not have access to this chat",
            ));
        }
        Ok(chat)
    }

    #[tracing::instrument(name = "Get conversation.", skip(self))]
    pub async fn get_conversation(
        &self,
        chat_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Message>, ServiceError> {
        self.owned_chat(chat_id, user_id).await?;
        self.store
            .get_messages_by_chat_id(chat_id)
            .await
            .map_err(store_failure)
    }

    #[tracing::instrument(name = "Get chat history.", skip(self))]
    pub async fn get_chat_history(&self, user_id: Uuid) -> Result<Vec<Chat>, ServiceError> {
        self.store
            .get_chats_by_user_id(user_id, true)
            .await
            .map_err(store_failure)
    }

    #[tracing::instrument(name = "Delete chat.", skip(self))]
    pub async fn delete_chat(&self, chat_id: Uuid, user_id: Uuid) -> Result<(), ServiceError> {
        self.owned_chat(chat_id, user_id).await?;
        self.store.delete_chat(chat_id).await.map_err(store_failure)?;
        tracing::info!(%chat_id, "chat deleted");
        Ok(())
    }
}
