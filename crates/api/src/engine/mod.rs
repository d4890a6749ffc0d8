//! Task engine.
//!
//! Submits jobs to the external processor, projects polled processor status
//! into progress and ETA, and creates retry attempts for existing records.
//! Nothing here holds state between requests.

pub mod poller;
pub mod retry;
pub mod submission;
