use crate::forms;
use crate::models;
use crate::services::{ConversationOrchestrator, ServiceError};
use actix_web::http::header::{CacheControl, CacheDirective};
use actix_web::{post, web, HttpResponse};
use std::sync::Arc;

pub const CHAT_ID_HEADER: &str = "X-Chat-Id";

/// POST /conversation
/// Streams the assistant reply as raw text. The chat the turn landed in is
/// returned in `X-Chat-Id`.
#[tracing::instrument(name = "Conversation.", skip_all)]
#[post("/conversation")]
pub async fn handler(
    user: Option<web::ReqData<Arc<models::AuthUser>>>,
    form: web::Json<forms::ConversationForm>,
    orchestrator: web::Data<ConversationOrchestrator>,
) -> Result<HttpResponse, ServiceError> {
    let identity = user.map(|user| user.id);
    let turn = orchestrator.handle_turn(identity, form.into_inner()).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .insert_header((CHAT_ID_HEADER, turn.chat_id.to_string()))
        .streaming(turn.body))
}
