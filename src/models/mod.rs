mod ai_model;
pub mod chat;
pub mod message;
pub mod user;

pub use ai_model::*;
pub use chat::*;
pub use message::*;
pub use user::*;
