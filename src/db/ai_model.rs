use crate::models::AiModel;
use sqlx::PgPool;

pub async fn fetch_active(pool: &PgPool) -> Result<Vec<AiModel>, sqlx::Error> {
    sqlx::query_as::<_, AiModel>(
        r#"SELECT id, name, version, description, is_active
           FROM ai_models
           WHERE is_active
           ORDER BY name"#,
    )
    .fetch_all(pool)
    .await
}
