use serde_derive::Deserialize;

/// Body of `POST /conversation`. Every field is optional at the wire level;
/// the orchestrator decides what a valid turn is.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ConversationForm {
    pub content: Option<String>,
    pub chat_id: Option<String>,
    pub ai_model_version: Option<String>,
    pub created_at: Option<String>,
    pub is_edited: Option<bool>,
}
