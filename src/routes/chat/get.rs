use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{HistoryService, ServiceError};
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;

pub(super) fn parse_chat_id(raw: &str) -> Result<Uuid, ServiceError> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::not_found("h-001", "Chat not found"))
}

/// GET /chat/{id}
/// Ordered messages of one of the caller's chats.
#[tracing::instrument(name = "Get chat.", skip(user, history))]
#[get("/chat/{id}")]
pub async fn item(
    user: web::ReqData<Arc<models::AuthUser>>,
    path: web::Path<(String,)>,
    history: web::Data<HistoryService>,
) -> Result<HttpResponse, ServiceError> {
    let chat_id = parse_chat_id(&path.0)?;
    let messages = history.get_conversation(chat_id, user.id).await?;

    Ok(JsonResponse::build()
        .set_id(chat_id)
        .set_list(messages)
        .ok("OK"))
}
