//! Watermark policy defaults and validation.

use serde::Serialize;

use crate::error::CoreError;
use crate::normalize::define_normalized_enum;
use crate::types::{DbId, Timestamp};

pub const DEFAULT_OPACITY: f64 = 0.3;
pub const DEFAULT_FONT_SIZE: i32 = 24;
pub const DEFAULT_EMBED_DEPTH: i32 = 5;
pub const DEFAULT_COLOR: &str = "#666666";
pub const DEFAULT_POSITION: &str = "center";
pub const DEFAULT_FILE_TYPES: &str = "all";

/// Upper bound for `font_size`, in points.
pub const MAX_FONT_SIZE: i32 = 512;

/// Upper bound for `embed_depth`.
pub const MAX_EMBED_DEPTH: i32 = 10;

define_normalized_enum! {
    /// Extraction sensitivity for a watermark policy.
    Sensitivity default Medium {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// A normalized watermark policy as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
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
    pub sensitivity: Sensitivity,
    pub is_active: bool,
    pub created_by_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validate the numeric rendering parameters of a policy.
pub fn validate_rendering(opacity: f64, font_size: i32, embed_depth: i32) -> Result<(), CoreError> {
    if !(0.0..=1.0).contains(&opacity) {
        return Err(CoreError::Validation(format!(
            "opacity must be between 0 and 1, got {opacity}"
        )));
    }
    if !(1..=MAX_FONT_SIZE).contains(&font_size) {
        return Err(CoreError::Validation(format!(
            "fontSize must be between 1 and {MAX_FONT_SIZE}, got {font_size}"
        )));
    }
    if !(1..=MAX_EMBED_DEPTH).contains(&embed_depth) {
        return Err(CoreError::Validation(format!(
            "embedDepth must be between 1 and {MAX_EMBED_DEPTH}, got {embed_depth}"
        )));
    }
    Ok(())
}

/// Use `value` when it is present and non-blank, otherwise `default`.
pub fn or_default_text(value: Option<&str>, default: &str) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}
