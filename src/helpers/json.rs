use actix_web::error::InternalError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, HttpResponseBuilder};
use serde_derive::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct JsonResponse<T> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<T>>,
}

/// Error envelope. `message` always ends with the bracketed code.
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub message: String,
    pub code: &'static str,
}

impl JsonError {
    pub fn new(message: impl AsRef<str>, code: &'static str) -> Self {
        Self {
            message: format!("{} [{}]", message.as_ref(), code),
            code,
        }
    }

    pub fn response(self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }

    /// For places that need an `actix_web::Error`, e.g. middleware and
    /// extractor error handlers.
    pub fn into_error(self, status: StatusCode) -> actix_web::Error {
        let message = self.message.clone();
        InternalError::from_response(message, self.response(status)).into()
    }
}

pub struct JsonResponseBuilder<T> {
    message: String,
    id: Option<Uuid>,
    item: Option<T>,
    list: Option<Vec<T>>,
}

impl<T> JsonResponse<T>
where
    T: serde::Serialize,
{
    pub fn build() -> JsonResponseBuilder<T> {
        JsonResponseBuilder {
            message: String::new(),
            id: None,
            item: None,
            list: None,
        }
    }
}

impl<T> JsonResponseBuilder<T>
where
    T: serde::Serialize,
{
    pub fn set_msg(mut self, msg: impl Into<String>) -> Self {
        self.message = msg.into();
        self
    }

    pub fn set_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn set_item(mut self, item: T) -> Self {
        self.item = Some(item);
        self
    }

    pub fn set_list(mut self, list: Vec<T>) -> Self {
        self.list = Some(list);
        self
    }

    fn to_json_response(self) -> JsonResponse<T> {
        JsonResponse {
            message: self.message,
            id: self.id,
            item: self.item,
            list: self.list,
        }
    }

    pub fn ok(self, msg: impl Into<String>) -> HttpResponse {
        HttpResponse::Ok().json(self.set_msg(msg).to_json_response())
    }

    pub fn created(self, msg: impl Into<String>) -> HttpResponse {
        HttpResponse::Created().json(self.set_msg(msg).to_json_response())
    }

    /// Finishes a response whose status and headers the caller already set.
    pub fn respond(self, mut response: HttpResponseBuilder, msg: impl Into<String>) -> HttpResponse {
        response.json(self.set_msg(msg).to_json_response())
    }
}
