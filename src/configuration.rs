use crate::connectors::ConnectorConfig;
use serde;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub app_port: u16,
    pub app_host: String,
    pub auth: AuthSettings,
    #[serde(default)]
    pub connectors: ConnectorConfig,
    #[serde(default)]
    pub conversation: ConversationSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub database_name: String,
    #[serde(default = "DatabaseSettings::default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "DatabaseSettings::default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

/// Token lifetimes and the secrets used by the credential service.
///
/// `hash_salt` and `jwt_secret` are never read from the yaml file; they come
/// from `HASH_SALT` and `JWT_SECRET`.
#[derive(Clone, serde::Deserialize)]
pub struct AuthSettings {
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    #[serde(default = "AuthSettings::default_secure_cookie")]
    pub secure_cookie: bool,
    #[serde(skip)]
    pub hash_salt: String,
    #[serde(skip)]
    pub jwt_secret: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ConversationSettings {
    /// Hard upper bound on a whole gateway interaction.
    pub stream_timeout_secs: u64,
    /// Attempts for each post-stream write (assistant message, chat bump).
    pub persist_attempts: usize,
    pub persist_backoff_ms: u64,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            stream_timeout_secs: 60,
            persist_attempts: 3,
            persist_backoff_ms: 200,
        }
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("access_token_ttl_secs", &self.access_token_ttl_secs)
            .field("refresh_token_ttl_secs", &self.refresh_token_ttl_secs)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl AuthSettings {
    fn default_secure_cookie() -> bool {
        true
    }

    pub fn load_secrets_from_env(&mut self) -> Result<(), config::ConfigError> {
        self.hash_salt = std::env::var("HASH_SALT")
            .map_err(|_| config::ConfigError::NotFound("HASH_SALT".to_string()))?;
        self.jwt_secret = std::env::var("JWT_SECRET")
            .map_err(|_| config::ConfigError::NotFound("JWT_SECRET".to_string()))?;

        if self.hash_salt.is_empty() || self.jwt_secret.is_empty() {
            return Err(config::ConfigError::Message(
                "HASH_SALT and JWT_SECRET must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl DatabaseSettings {
    fn default_max_connections() -> u32 {
        5
    }

    fn default_acquire_timeout() -> u64 {
        30
    }

    // Connection string: postgresql://<username>:<password>@<host>:<port>/<database_name>
    pub fn connection_string(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name,
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port,
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration"))
        .build()?;

    let mut config: Settings = settings.try_deserialize()?;

    config.auth.load_secrets_from_env()?;
    config.connectors.completion_service.load_api_key_from_env();

    Ok(config)
}
