//! Repository for the `watermark_contents` table.

use sqlx::PgPool;

use crate::models::content::WatermarkContent;

/// Stores watermark text submitted with embed jobs.
pub struct ContentRepo;

impl ContentRepo {
    /// Insert a content row and return it.
    pub async fn create(pool: &PgPool, content: &str) -> Result<WatermarkContent, sqlx::Error> {
        sqlx::query_as::<_, WatermarkContent>(
            "INSERT INTO watermark_contents (content) VALUES ($1) \
             RETURNING id, content, created_at",
        )
        .bind(content)
        .fetch_one(pool)
        .await
    }

}
