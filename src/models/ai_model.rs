use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize, sqlx::FromRow)]
pub struct AiModel {
    pub id: i32,
    pub name: String,
    pub version: String,
    pub description: String,
    pub is_active: bool,
}
