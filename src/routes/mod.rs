pub mod auth;
pub mod chat;
pub mod conversation;
pub mod health_checks;
pub mod models;

pub use health_checks::*;
