//! Concurrent creation of the per-section response entities.
//!
//! Each section create runs as its own Tokio task. How the orchestrator
//! waits for them is a [`JoinPolicy`]:
//!
//! - [`JoinPolicy::FailFast`]: the first rejection fails the join. Tasks
//!   still in flight are detached, not aborted; they run to completion in
//!   the background and their results are dropped.
//! - [`JoinPolicy::Settled`]: every task is awaited, then all failures are
//!   reported together.

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use serde_json::Value;

use intake_core::engagement::{ResponseSection, SectionResponse};
use intake_core::types::{EntityId, Versioned};

use crate::backend::EngagementBackend;
use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinPolicy {
    #[default]
    FailFast,
    Settled,
}

/// Create every [`ResponseSection`] for `engagement_id` concurrently.
pub async fn create_sections<B: EngagementBackend>(
    backend: Arc<B>,
    engagement_id: EntityId,
    policy: JoinPolicy,
) -> Result<Vec<(ResponseSection, Versioned<Value>)>, WorkflowError> {
    let body = serde_json::to_value(SectionResponse {
        new_engagement_instance_id: engagement_id,
    })?;

    let tasks = ResponseSection::ALL.map(|section| {
        let backend = Arc::clone(&backend);
        let body = body.clone();
        let handle =
            tokio::spawn(async move { backend.create(section.resource(), body).await });
        async move {
            match handle.await {
                Ok(Ok(created)) => Ok((section, created)),
                Ok(Err(source)) => {
                    tracing::warn!(
                        engagement_id,
                        section = section.label(),
                        error = %source,
                        "Section create failed",
                    );
                    Err(WorkflowError::Section { section, source })
                }
                Err(e) => Err(WorkflowError::TaskAborted {
                    section,
                    message: e.to_string(),
                }),
            }
        }
    });

    match policy {
        JoinPolicy::FailFast => try_join_all(tasks).await,
        JoinPolicy::Settled => {
            let mut created = Vec::with_capacity(ResponseSection::ALL.len());
            let mut failures = Vec::new();
            for result in join_all(tasks).await {
                match result {
                    Ok(ok) => created.push(ok),
                    Err(e) => failures.push(e),
                }
            }
            if failures.is_empty() {
                Ok(created)
            } else {
                Err(WorkflowError::SectionsFailed {
                    engagement_id,
                    failures,
                })
            }
        }
    }
}
