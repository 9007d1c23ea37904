use crate::configuration::Settings;
use crate::connectors::{self, CompletionConnector};
use crate::helpers::JsonError;
use crate::middleware;
use crate::routes;
use crate::routes::conversation::CHAT_ID_HEADER;
use crate::services::{ConversationOrchestrator, CredentialService, HistoryService, SystemClock};
use crate::storage::Storage;
use actix_cors::Cors;
use actix_web::{dev::Server, error, http, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

pub async fn run(
    listener: TcpListener,
    storage: Storage,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let completion = connectors::init_completion_service(&settings.connectors.completion_service)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err.to_string()))?;

    run_with_connector(listener, storage, completion, settings)
}

/// Same as [`run`] with the completion connector supplied by the caller.
pub fn run_with_connector(
    listener: TcpListener,
    storage: Storage,
    completion: Arc<dyn CompletionConnector>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let credentials = web::Data::new(CredentialService::new(&settings.auth));
    let history = web::Data::new(HistoryService::new(storage.conversations.clone()));
    let orchestrator = web::Data::new(ConversationOrchestrator::new(
        storage.conversations.clone(),
        completion,
        Arc::new(SystemClock),
        settings.conversation.clone(),
    ));
    let storage = web::Data::new(storage);
    let settings = web::Data::new(settings);

    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let msg = match &err {
            error::JsonPayloadError::Deserialize(err) => format!(
                "Invalid JSON body at line {}, column {}: {}",
                err.line(),
                err.column(),
                err
            ),
            other => format!("Invalid JSON body: {}", other),
        };
        tracing::warn!(code = "c-000", "{}", msg);
        JsonError::new(msg, "c-000").into_error(http::StatusCode::BAD_REQUEST)
    });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive().expose_headers(vec![CHAT_ID_HEADER]);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(json_config.clone())
            .app_data(storage.clone())
            .app_data(settings.clone())
            .app_data(credentials.clone())
            .app_data(history.clone())
            .app_data(orchestrator.clone())
            .service(routes::health_check)
            .service(routes::auth::register_handler)
            .service(routes::auth::login_handler)
            .service(routes::auth::refresh_handler)
            .service(
                web::scope("")
                    .wrap(middleware::authentication::BearerAuth)
                    .service(routes::conversation::handler)
                    .service(routes::chat::get::item)
                    .service(routes::chat::delete::item)
                    .service(routes::chat::history::list)
                    .service(routes::models::list),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
