use crate::forms::ConversationForm;
use crate::services::ServiceError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum TurnTarget {
    NewChat { ai_model_version: String },
    Continue { chat_id: Uuid },
}

/// A turn that passed validation. Building one has no side effects.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub target: TurnTarget,
    pub content: String,
    /// Client-reported time. Validated, but stored rows use the server clock.
    pub client_created_at: DateTime<Utc>,
    pub is_edited: bool,
}

fn parse_chat_id(raw: Option<&str>) -> Result<Option<Uuid>, ServiceError> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };
    let chat_id = Uuid::parse_str(raw)
        .map_err(|_| ServiceError::invalid("c-003", format!("Invalid chat_id: {}", raw)))?;
    Ok(if chat_id.is_nil() { None } else { Some(chat_id) })
}

impl TryFrom<ConversationForm> for Turn {
    type Error = ServiceError;

    fn try_from(form: ConversationForm) -> Result<Self, Self::Error> {
        let content = match form.content {
            Some(content) if !content.trim().is_empty() => content,
            _ => return Err(ServiceError::invalid("c-002", "Message content is required")),
        };

        let target = match parse_chat_id(form.chat_id.as_deref())? {
            Some(chat_id) => TurnTarget::Continue { chat_id },
            None => match form.ai_model_version {
                Some(version) if !version.trim().is_empty() => TurnTarget::NewChat {
                    ai_model_version: version.trim().to_string(),
                },
                _ => {
                    return Err(ServiceError::invalid(
                        "c-004",
                        "ai_model_version is required for a new chat",
                    ))
                }
            },
        };

        let client_created_at = form
            .created_at
            .as_deref()
            .ok_or_else(|| ServiceError::invalid("c-005", "created_at is required"))
            .and_then(|raw| {
                DateTime::parse_from_rfc3339(raw).map_err(|_| {
                    ServiceError::invalid("c-005", format!("Invalid created_at: {}", raw))
                })
            })?
            .with_timezone(&Utc);

        Ok(Self {
            target,
            content,
            client_created_at,
            is_edited: form.is_edited.unwrap_or(false),
        })
    }
}
