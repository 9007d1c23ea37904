pub mod conversation;
pub mod user;

pub use conversation::ConversationForm;
pub use user::{LoginForm, RegisterForm};
