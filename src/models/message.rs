use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown message role: {0}")]
pub struct RoleParseError(String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(RoleParseError(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    /// Chat owner; assistant rows carry the same user, `role` tells them apart.
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub is_edited: bool,
}

impl Message {
    pub fn new(
        chat_id: Uuid,
        user_id: Uuid,
        role: Role,
        content: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            chat_id,
            user_id,
            role,
            content,
            created_at,
            is_edited: false,
        }
    }

    pub fn context(&self) -> MessageContent {
        MessageContent {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// One element of the context window sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageContent {
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub content: String,
}

impl MessageContent {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}
