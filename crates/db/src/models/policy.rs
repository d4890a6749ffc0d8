//! Watermark policy row model and DTOs.

use dyemark_core::policy::{Policy, Sensitivity};
use dyemark_core::types::{DbId, Timestamp};
use serde::Deserialize;
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `policies` table.
#[derive(Debug, Clone, FromRow)]
pub struct PolicyRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub watermark_text: String,
    pub opacity: f64,
    pub font_size: i32,
    pub embed_depth: i32,
    pub color: String,
    pub position: String,
    pub file_types: String,
    pub sensitivity: Option<String>,
    pub is_active: bool,
    pub created_by_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<PolicyRow> for Policy {
    fn from(row: PolicyRow) -> Self {
        Policy {
            id: row.id,
            name: row.name,
            description: row.description,
            watermark_text: row.watermark_text,
            opacity: row.opacity,
            font_size: row.font_size,
            embed_depth: row.embed_depth,
            color: row.color,
            position: row.position,
            file_types: row.file_types,
            sensitivity: Sensitivity::normalize(row.sensitivity.as_deref()),
            is_active: row.is_active,
            created_by_id: row.created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// DTO for creating a policy via `POST /api/v1/policies`.
///
/// Omitted optional fields take the defaults in `dyemark_core::policy`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePolicy {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub watermark_text: String,
    pub opacity: Option<f64>,
    pub font_size: Option<i32>,
    pub embed_depth: Option<i32>,
    pub color: Option<String>,
    pub position: Option<String>,
    pub file_types: Option<String>,
    pub sensitivity: Option<Sensitivity>,
    pub is_active: Option<bool>,
    pub created_by_id: Option<DbId>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be empty".into());
        return Err(err);
    }
    Ok(())
}

/// Query parameters for `GET /api/v1/policies`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyListQuery {
    /// When set, only policies with this `is_active` value are returned.
    pub active: Option<bool>,
}
