//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod content_repo;
pub mod policy_repo;
pub mod record_repo;
pub mod traffic_rule_repo;

pub use content_repo::ContentRepo;
pub use policy_repo::PolicyRepo;
pub use record_repo::RecordRepo;
pub use traffic_rule_repo::TrafficRuleRepo;
