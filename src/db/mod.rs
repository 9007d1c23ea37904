pub mod ai_model;
pub mod chat;
pub mod message;
pub mod user;
