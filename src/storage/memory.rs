use super::{ConversationStore, ModelCatalog, StoreError, StoreResult, UserStore};
use crate::models::{AiModel, Chat, Message, MessageContent, NewUser, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    chats: HashMap<Uuid, Chat>,
    // insertion order doubles as the `seq` tiebreaker
    messages: Vec<Message>,
    models: Vec<AiModel>,
}

/// Process-local store with the same semantics as the Postgres schema.
///
/// Writes can be made to fail a given number of times, which lets tests
/// exercise retry paths.
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    failing_message_writes: AtomicUsize,
    failing_chat_updates: AtomicUsize,
    failing_reads: AtomicUsize,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        let models = [
            ("GPT-4o", "gpt-4o", "Flagship multimodal model"),
            ("GPT-4o mini", "gpt-4o-mini", "Small, fast and affordable"),
            ("GPT-4 Turbo", "gpt-4-turbo", "Previous high-intelligence model"),
            ("GPT-3.5 Turbo", "gpt-3.5-turbo-0125", "Fast model for simple tasks"),
        ]
        .into_iter()
        .enumerate()
        .map(|(idx, (name, version, description))| AiModel {
            id: idx as i32 + 1,
            name: name.to_string(),
            version: version.to_string(),
            description: description.to_string(),
            is_active: true,
        })
        .collect();

        Self::with_models(models)
    }
}

impl InMemoryStore {
    pub fn with_models(models: Vec<AiModel>) -> Self {
        Self {
            tables: Mutex::new(Tables {
                models,
                ..Tables::default()
            }),
            failing_message_writes: AtomicUsize::new(0),
            failing_chat_updates: AtomicUsize::new(0),
            failing_reads: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_message_writes(&self, count: usize) {
        self.failing_message_writes.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_chat_updates(&self, count: usize) {
        self.failing_chat_updates.store(count, Ordering::SeqCst);
    }

    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// Flips `is_active` for an existing account; false if there is none.
    pub fn set_user_active(&self, username: &str, active: bool) -> bool {
        let Ok(mut tables) = self.tables() else {
            return false;
        };
        match tables.users.iter_mut().find(|u| u.username == username) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        }
    }

    pub fn chat_count(&self) -> usize {
        self.tables().map(|t| t.chats.len()).unwrap_or_default()
    }

    pub fn message_count(&self) -> usize {
        self.tables().map(|t| t.messages.len()).unwrap_or_default()
    }

    fn tables(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Io("in-memory store lock poisoned".to_string()))
    }

    fn injected(counter: &AtomicUsize) -> StoreResult<()> {
        let tripped = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            Err(StoreError::Io("injected failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
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
        self.tables()?.chats.insert(chat.id, chat.clone());
        Ok(chat)
    }

    async fn get_chat_by_id(&self, chat_id: Uuid) -> StoreResult<Chat> {
        Self::injected(&self.failing_reads)?;
        self.tables()?
            .chats
            .get(&chat_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_chat(&self, chat: &Chat) -> StoreResult<()> {
        Self::injected(&self.failing_chat_updates)?;
        let mut tables = self.tables()?;
        let stored = tables.chats.get_mut(&chat.id).ok_or(StoreError::NotFound)?;
        stored.title = chat.title.clone();
        stored.is_archived = chat.is_archived;
        stored.touch(chat.last_updated);
        Ok(())
    }

    async fn get_message_context_by_chat_id(
        &self,
        chat_id: Uuid,
    ) -> StoreResult<Vec<MessageContent>> {
        Ok(self
            .get_messages_by_chat_id(chat_id)
            .await?
            .iter()
            .map(Message::context)
            .collect())
    }

    async fn get_messages_by_chat_id(&self, chat_id: Uuid) -> StoreResult<Vec<Message>> {
        let mut messages: Vec<Message> = self
            .tables()?
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        // stable sort keeps insertion order for equal timestamps
        messages.sort_by_key(|m| m.created_at);
        Ok(messages)
    }

    async fn create_message(&self, message: &Message) -> StoreResult<()> {
        Self::injected(&self.failing_message_writes)?;
        let mut tables = self.tables()?;
        if !tables.chats.contains_key(&message.chat_id) {
            return Err(StoreError::NotFound);
        }
        if tables.messages.iter().any(|m| m.id == message.id) {
            return Ok(());
        }
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn get_chats_by_user_id(
        &self,
        user_id: Uuid,
        sort_by_recency: bool,
    ) -> StoreResult<Vec<Chat>> {
        let mut chats: Vec<Chat> = self
            .tables()?
            .chats
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        if sort_by_recency {
            chats.sort_by(|a, b| {
                b.last_updated
                    .cmp(&a.last_updated)
                    .then(b.created_at.cmp(&a.created_at))
            });
        } else {
            chats.sort_by_key(|c| c.created_at);
        }
        Ok(chats)
    }

    async fn delete_chat(&self, chat_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables()?;
        tables.chats.remove(&chat_id).ok_or(StoreError::NotFound)?;
        tables.messages.retain(|m| m.chat_id != chat_id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict("username already taken".to_string()));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("email already registered".to_string()));
        }
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
            last_login: None,
            is_active: true,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn get_user_by_username(&self, username: &str) -> StoreResult<User> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> StoreResult<User> {
        self.tables()?
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn record_login(&self, user_id: Uuid, at: DateTime<Utc>) -> StoreResult<()> {
        let mut tables = self.tables()?;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(StoreError::NotFound)?;
        user.last_login = Some(at);
        Ok(())
    }
}

#[async_trait]
impl ModelCatalog for InMemoryStore {
    async fn list_active_models(&self) -> StoreResult<Vec<AiModel>> {
        let mut models: Vec<AiModel> = self
            .tables()?
            .models
            .iter()
            .filter(|m| m.is_active)
            .cloned()
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }
}
