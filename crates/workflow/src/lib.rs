//! New-engagement creation workflow.
//!
//! Sequences the dependent creates for a new engagement, triggers the
//! external workflow engine, and fans out the independent section creates.

pub mod backend;
pub mod error;
pub mod join;
pub mod orchestrator;

pub use backend::{EngagementBackend, RestEngagementBackend};
pub use error::{Step, WorkflowError};
pub use join::JoinPolicy;
pub use orchestrator::EngagementOrchestrator;
