pub mod fallback;
pub mod policies;
pub mod records;
pub mod traffic_rules;
pub mod watermark;
