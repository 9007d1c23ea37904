use crate::helpers::JsonResponse;
use crate::models;
use crate::services::{HistoryService, ServiceError};
use actix_web::{get, web, HttpResponse};
use std::sync::Arc;

/// GET /chat-history
/// The caller's chats, most recently updated first.
#[tracing::instrument(name = "Get chat history.", skip(user, history))]
#[get("/chat-history")]
pub async fn list(
    user: web::ReqData<Arc<models::AuthUser>>,
    history: web::Data<HistoryService>,
) -> Result<HttpResponse, ServiceError> {
    let chats = history.get_chat_history(user.id).await?;
    Ok(JsonResponse::build().set_list(chats).ok("OK"))
}
