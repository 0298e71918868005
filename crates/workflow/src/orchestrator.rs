//! Engagement-creation sequence.
//!
//! [`EngagementOrchestrator::start_workflow`] creates the root engagement
//! instance and its dependents in dependency order:
//!
//! 1. `newEngagementInstances` with the creating user's id;
//! 2. `initialSetupResponses` from the "select client" form, keyed by the
//!    new root id;
//! 3. the workflow-start RPC for the root id;
//! 4. the ten [`ResponseSection`] entities, concurrently.
//!
//! Steps 1-3 run strictly one after the other and any failure aborts the
//! sequence. Nothing already created is rolled back and nothing is retried.
//! Callers wanting a deadline wrap the call in `tokio::time::timeout`.

use std::sync::Arc;

use intake_client::ClientError;
use intake_core::engagement::{
    InitialSetupResponse, NewEngagementInstance, ResponseSection, WorkflowSession,
    WorkflowStartRequest,
};
use intake_core::resource::catalog;
use intake_core::types::EntityId;

use crate::backend::EngagementBackend;
use crate::error::{Step, WorkflowError};
use crate::join::{create_sections, JoinPolicy};

pub struct EngagementOrchestrator<B> {
    backend: Arc<B>,
    join: JoinPolicy,
}

impl<B: EngagementBackend> EngagementOrchestrator<B> {
    /// Orchestrator with the [`JoinPolicy::FailFast`] fan-out join.
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            join: JoinPolicy::default(),
        }
    }

    pub fn with_join_policy(mut self, join: JoinPolicy) -> Self {
        self.join = join;
        self
    }

    /// Create a new engagement and return the root instance id.
    pub async fn start_workflow(&self, session: &WorkflowSession) -> Result<EntityId, WorkflowError> {
        let user = &session.user;
        let form = &session.select_client;

        let root = self
            .backend
            .create(
                &catalog::NEW_ENGAGEMENT_INSTANCES,
                serde_json::to_value(NewEngagementInstance { created_by: user.id })?,
            )
            .await
            .map_err(at(Step::CreateEngagement))?;
        let engagement_id = root.id().ok_or(WorkflowError::MissingId)?;
        tracing::info!(engagement_id, user_id = user.id, "Engagement instance created");

        let setup = InitialSetupResponse::from_form(engagement_id, form);
        self.backend
            .create(&catalog::INITIAL_SETUP_RESPONSES, serde_json::to_value(&setup)?)
            .await
            .map_err(at(Step::CreateInitialSetup))?;
        tracing::debug!(engagement_id, "Initial setup response created");

        self.backend
            .start_workflow(WorkflowStartRequest {
                new_engagement_instance_id: engagement_id,
            })
            .await
            .map_err(at(Step::StartWorkflow))?;
        tracing::info!(engagement_id, "Engagement workflow started");

        let created = create_sections(Arc::clone(&self.backend), engagement_id, self.join).await?;
        tracing::info!(
            engagement_id,
            sections = created.len(),
            expected = ResponseSection::ALL.len(),
            "Engagement section responses created",
        );

        Ok(engagement_id)
    }
}

fn at(step: Step) -> impl FnOnce(ClientError) -> WorkflowError {
    move |source| WorkflowError::Step { step, source }
}
