use crate::helpers::JsonResponse;
use crate::services::ServiceError;
use crate::storage::Storage;
use actix_web::{get, web, HttpResponse};

/// GET /models
#[tracing::instrument(name = "List active models.", skip(storage))]
#[get("/models")]
pub async fn list(storage: web::Data<Storage>) -> Result<HttpResponse, ServiceError> {
    storage
        .models
        .list_active_models()
        .await
        .map(|models| JsonResponse::build().set_list(models).ok("OK"))
        .map_err(|err| ServiceError::persistence("m-001", format!("Failed to list models: {}", err)))
}
