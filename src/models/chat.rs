use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub is_archived: bool,
    pub ai_model_version: String,
}

impl Chat {
    /// Title derived from the first message of a conversation.
    pub fn title_from(content: &str) -> String {
        content.chars().take(TITLE_MAX_CHARS).collect()
    }

    pub fn is_owned_by(&self, user_id: &Uuid) -> bool {
        &self.user_id == user_id
    }

    /// Moves `last_updated` forward, never backwards past `created_at`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_updated = at.max(self.created_at);
    }
}
