use serde::{Deserialize, Serialize};

/// Configuration for external service connectors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectorConfig {
    #[serde(default)]
    pub completion_service: CompletionServiceConfig,
}

/// OpenAI-compatible chat completion provider
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionServiceConfig {
    /// Base URL of the provider API, without the `/chat/completions` suffix
    pub base_url: String,
    /// TCP connect timeout in seconds. The overall stream deadline is owned by
    /// the conversation settings.
    #[serde(default = "CompletionServiceConfig::default_connect_timeout")]
    pub connect_timeout_secs: u64,
    /// Provider API key (from env: API_KEY)
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl CompletionServiceConfig {
    fn default_connect_timeout() -> u64 {
        10
    }

    pub fn load_api_key_from_env(&mut self) {
        if self.api_key.is_none() {
            self.api_key = std::env::var("API_KEY").ok().filter(|key| !key.is_empty());
        }
    }
}

impl Default for CompletionServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            connect_timeout_secs: Self::default_connect_timeout(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for CompletionServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionServiceConfig")
            .field("base_url", &self.base_url)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}
