use super::get::parse_chat_id;
use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{HistoryService, ServiceError};
use actix_web::{delete, web, HttpResponse};
use std::sync::Arc;

/// DELETE /chat/{id}
/// Removes one of the caller's chats together with its messages.
#[tracing::instrument(name = "Delete chat.", skip(user, history))]
#[delete("/chat/{id}")]
pub async fn item(
    user: web::ReqData<Arc<models::AuthUser>>,
    path: web::Path<(String,)>,
    history: web::Data<HistoryService>,
) -> Result<HttpResponse, ServiceError> {
    let chat_id = parse_chat_id(&path.0)?;
    history.delete_chat(chat_id, user.id).await?;

    Ok(JsonResponse::<models::Chat>::build()
        .set_id(chat_id)
        .ok("Chat deleted"))
}
