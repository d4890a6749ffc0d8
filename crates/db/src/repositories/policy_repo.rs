//! Repository for the `policies` table.

use dyemark_core::policy::{
    or_default_text, Policy, DEFAULT_COLOR, DEFAULT_EMBED_DEPTH, DEFAULT_FILE_TYPES,
    DEFAULT_FONT_SIZE, DEFAULT_OPACITY, DEFAULT_POSITION,
};
use dyemark_core::types::DbId;
use sqlx::PgPool;

use crate::models::policy::{CreatePolicy, PolicyListQuery, PolicyRow};

/// Column list for `policies` queries.
const COLUMNS: &str = "\
    id, name, description, watermark_text, opacity, font_size, embed_depth, \
    color, position, file_types, sensitivity, is_active, created_by_id, \
    created_at, updated_at";

/// Provides CRUD operations for watermark policies.
pub struct PolicyRepo;

impl PolicyRepo {
    /// Insert a policy, filling omitted fields with their defaults.
    pub async fn create(pool: &PgPool, input: &CreatePolicy) -> Result<Policy, sqlx::Error> {
        let query = format!(
            "INSERT INTO policies \
                 (name, description, watermark_text, opacity, font_size, embed_depth, \
                  color, position, file_types, sensitivity, is_active, created_by_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, PolicyRow>(&query)
            .bind(input.name.trim())
            .bind(input.description.as_deref())
            .bind(input.watermark_text.trim())
            .bind(input.opacity.unwrap_or(DEFAULT_OPACITY))
            .bind(input.font_size.unwrap_or(DEFAULT_FONT_SIZE))
            .bind(input.embed_depth.unwrap_or(DEFAULT_EMBED_DEPTH))
            .bind(or_default_text(input.color.as_deref(), DEFAULT_COLOR))
            .bind(or_default_text(input.position.as_deref(), DEFAULT_POSITION))
            .bind(or_default_text(input.file_types.as_deref(), DEFAULT_FILE_TYPES))
            .bind(input.sensitivity.unwrap_or_default().as_str())
            .bind(input.is_active.unwrap_or(true))
            .bind(input.created_by_id)
            .fetch_one(pool)
            .await?;
        Ok(row.into())
    }

    /// Find a policy by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Policy>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM policies WHERE id = $1");
        let row = sqlx::query_as::<_, PolicyRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Policy::from))
    }

    /// List policies newest first, optionally filtered by `is_active`.
    pub async fn list(pool: &PgPool, params: &PolicyListQuery) -> Result<Vec<Policy>, sqlx::Error> {
        let rows = match params.active {
            Some(active) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM policies WHERE is_active = $1 \
                     ORDER BY created_at DESC, id DESC"
                );
                sqlx::query_as::<_, PolicyRow>(&query)
                    .bind(active)
                    .fetch_all(pool)
                    .await?
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM policies ORDER BY created_at DESC, id DESC");
                sqlx::query_as::<_, PolicyRow>(&query).fetch_all(pool).await?
            }
        };
        Ok(rows.into_iter().map(Policy::from).collect())
    }
}
