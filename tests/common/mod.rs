#![allow(dead_code)]

use chatrelay::configuration::{
    AuthSettings, ConversationSettings, DatabaseSettings, Settings,
};
use chatrelay::connectors::{CompletionServiceConfig, ConnectorConfig};
use chatrelay::storage::{InMemoryStore, Storage};
use reqwest::header::{COOKIE, SET_COOKIE};
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub llm: MockServer,
    pub client: reqwest::Client,
}

pub struct Session {
    pub access_token: String,
    pub refresh_cookie: String,
}

pub fn test_settings(llm_base_url: String) -> Settings {
    Settings {
        database: DatabaseSettings {
            username: "postgres".into(),
            password: "postgres".into(),
            host: "127.0.0.1".into(),
            port: 5432,
            database_name: "chatrelay".into(),
            max_connections: 5,
            acquire_timeout_secs: 5,
        },
        app_port: 0,
        app_host: "127.0.0.1".into(),
        auth: AuthSettings {
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 3600,
            secure_cookie: false,
            hash_salt: "integration-salt".into(),
            jwt_secret: "integration-secret".into(),
        },
        connectors: ConnectorConfig {
            completion_service: CompletionServiceConfig {
                base_url: llm_base_url,
                connect_timeout_secs: 2,
                api_key: Some("test-key".into()),
            },
        },
        conversation: ConversationSettings {
            stream_timeout_secs: 2,
            persist_attempts: 3,
            persist_backoff_ms: 5,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    let llm = MockServer::start().await;
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryStore::default());
    let settings = test_settings(format!("{}/v1", llm.uri()));
    let server = chatrelay::startup::run(listener, Storage::from_memory(store.clone()), settings)
        .await
        .expect("Failed to bind address.");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        llm,
        client: reqwest::Client::new(),
    }
}

/// Fresh database with migrations applied. Callers skip when postgres is
/// not reachable.
pub async fn configure_database() -> Result<PgPool, sqlx::Error> {
    let mut config = test_settings(String::new()).database;
    config.database_name = uuid::Uuid::new_v4().to_string();

    let mut connection = PgConnection::connect(&config.connection_string_without_db()).await?;
    connection
        .execute(format!(r#"CREATE DATABASE "{}""#, config.database_name).as_str())
        .await?;

    let pool = PgPool::connect(&config.connection_string()).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// SSE body the provider would send for the given fragments.
pub fn sse_body(fragments: &[&str]) -> String {
    let mut body = String::new();
    for fragment in fragments {
        let chunk = json!({"choices": [{"index": 0, "delta": {"content": fragment}}]});
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

impl TestApp {
    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.address, route)
    }

    pub async fn mock_completion(&self, fragments: &[&str]) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(sse_body(fragments).into_bytes(), "text/event-stream"),
            )
            .mount(&self.llm)
            .await;
    }

    pub async fn register(&self, username: &str) -> reqwest::Response {
        self.client
            .post(self.url("/register"))
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "correct-horse",
            }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn signed_up(&self, username: &str) -> Session {
        let response = self.register(username).await;
        assert_eq!(response.status().as_u16(), 201);
        session_from(response).await
    }

    pub async fn converse(&self, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/conversation"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_authed(&self, route: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(route))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn refresh(&self, cookie: &str) -> reqwest::Response {
        self.client
            .post(self.url("/refresh"))
            .header(COOKIE, cookie)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn wait_for_messages(&self, count: usize) {
        for _ in 0..200 {
            if self.store.message_count() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("expected {} messages, found {}", count, self.store.message_count());
    }
}

/// Pulls the access token out of the body and the `name=value` pair out of
/// the refresh cookie.
pub async fn session_from(response: reqwest::Response) -> Session {
    let refresh_cookie = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("refresh_token="))
        .and_then(|value| value.split(';').next())
        .expect("refresh cookie missing")
        .to_string();
    let body: Value = response.json().await.expect("body is not json");
    let access_token = body["item"]["access_token"]
        .as_str()
        .expect("access token missing")
        .to_string();

    Session {
        access_token,
        refresh_cookie,
    }
}

pub fn turn(content: &str) -> Value {
    json!({
        "content": content,
        "ai_model_version": "gpt-4o-mini",
        "created_at": chrono::Utc::now().to_rfc3339(),
    })
}
