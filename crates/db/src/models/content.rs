//! Watermark content row model.

use dyemark_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `watermark_contents` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WatermarkContent {
    pub id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}
