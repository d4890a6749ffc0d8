//! Client library for the external task processor.
//!
//! Provides the wire envelope types, the [`api::ExternalProcessor`] trait
//! consumed by the API server, and its HTTP implementation.

pub mod api;
pub mod messages;
