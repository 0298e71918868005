use std::fmt;

use intake_client::ClientError;
use intake_core::engagement::ResponseSection;
use intake_core::types::EntityId;

/// A sequential step of the creation sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateEngagement,
    CreateInitialSetup,
    StartWorkflow,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CreateEngagement => "creating the engagement instance",
            Self::CreateInitialSetup => "creating the initial setup response",
            Self::StartWorkflow => "starting the engagement workflow",
        })
    }
}

/// Errors from the engagement-creation sequence.
///
/// Entities created before the failing step are left in place.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// One of the sequential steps failed; later steps were not attempted.
    #[error("Failed while {step}: {source}")]
    Step {
        step: Step,
        #[source]
        source: ClientError,
    },

    /// The engagement instance was created but its response had no integer id.
    #[error("Engagement instance response carried no integer id")]
    MissingId,

    /// A section create was rejected.
    #[error("Creating the {} section failed: {source}", .section.label())]
    Section {
        section: ResponseSection,
        #[source]
        source: ClientError,
    },

    /// A section task panicked or was cancelled by the runtime.
    #[error("The {} section task did not complete: {message}", .section.label())]
    TaskAborted {
        section: ResponseSection,
        message: String,
    },

    /// Every section was attempted and at least one failed.
    #[error("{} of {} sections failed for engagement {engagement_id}", .failures.len(), ResponseSection::ALL.len())]
    SectionsFailed {
        engagement_id: EntityId,
        failures: Vec<WorkflowError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
