//! External Service Connectors
//!
//! Adapters for communicating with external services. The completion
//! provider is reached only through a connector so the conversation logic
//! stays testable without network access.
//!
//! ## Architecture Pattern
//!
//! 1. Define trait in `{service}/mod.rs` → allows mocking in tests
//! 2. Implement the HTTP client in `{service}/client.rs`
//! 3. Configuration in `config.rs`
//! 4. Inject the trait object into services → they never depend on HTTP details
//!
//! ## Usage
//!
//! ```ignore
//! let completion = connectors::init_completion_service(&settings.connectors.completion_service)?;
//! let mut fragments = completion.stream_completion(window, "gpt-4o").await?;
//! while let Some(fragment) = fragments.next().await { /* ... */ }
//! ```

pub mod completion_service;
pub mod config;
pub mod errors;

pub use completion_service::{CompletionConnector, FragmentStream, OpenAiCompletionClient};
pub use config::{CompletionServiceConfig, ConnectorConfig};
pub use errors::ConnectorError;

pub use completion_service::init as init_completion_service;
