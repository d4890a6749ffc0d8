//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` row struct matching the database row
//! - A conversion into the canonical `dyemark_core` entity
//! - `Deserialize` DTOs for inserts and list queries

pub mod content;
pub mod policy;
pub mod record;
pub mod traffic_rule;
