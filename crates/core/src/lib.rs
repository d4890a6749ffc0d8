//! Pure domain logic for dyemark: entity normalization, task lifecycle
//! projection, correlation tags, pagination, and policy rules.
//!
//! Nothing in this crate performs I/O.

pub mod correlation;
pub mod error;
pub mod normalize;
pub mod pagination;
pub mod policy;
pub mod record;
pub mod task;
pub mod traffic;
pub mod types;
