pub mod conversation;
pub mod credentials;
mod errors;
pub mod history;

pub use conversation::{ConversationOrchestrator, SystemClock, TurnResponse};
pub use credentials::{CredentialError, CredentialService};
pub use errors::ServiceError;
pub use history::HistoryService;
