//! The calls the orchestrator makes against the backend.
//!
//! [`EngagementBackend`] is the seam between the creation sequence and the
//! network: production code uses [`RestEngagementBackend`], tests use a
//! recording fake.

use serde_json::Value;

use intake_client::{ClientError, ResourceApi, ResourceClient};
use intake_core::engagement::WorkflowStartRequest;
use intake_core::query::QueryOptions;
use intake_core::resource::{ResourceSpec, DEFAULT_API_VERSION};
use intake_core::types::Versioned;

/// Backend operations used to create an engagement.
pub trait EngagementBackend: Send + Sync + 'static {
    /// Create one entity of `resource` from `body`.
    fn create(
        &self,
        resource: &'static ResourceSpec,
        body: Value,
    ) -> impl std::future::Future<Output = Result<Versioned<Value>, ClientError>> + Send;

    /// Notify the external workflow engine that an engagement exists.
    fn start_workflow(
        &self,
        request: WorkflowStartRequest,
    ) -> impl std::future::Future<Output = Result<Value, ClientError>> + Send;
}

/// [`EngagementBackend`] over the REST resource client.
#[derive(Clone)]
pub struct RestEngagementBackend {
    client: ResourceClient,
    workflow_start_path: String,
}

impl RestEngagementBackend {
    /// * `workflow_start_path` - RPC path of the workflow-start endpoint,
    ///   relative to the client's base URL.
    pub fn new(client: ResourceClient, workflow_start_path: impl Into<String>) -> Self {
        Self {
            client,
            workflow_start_path: workflow_start_path.into(),
        }
    }
}

impl EngagementBackend for RestEngagementBackend {
    async fn create(
        &self,
        resource: &'static ResourceSpec,
        body: Value,
    ) -> Result<Versioned<Value>, ClientError> {
        ResourceApi::new(self.client.clone(), resource)
            .post(&body)
            .await
    }

    async fn start_workflow(&self, request: WorkflowStartRequest) -> Result<Value, ClientError> {
        self.client
            .rpc_post(
                &self.workflow_start_path,
                &QueryOptions::new().api_version(DEFAULT_API_VERSION),
                &request,
            )
            .await
    }
}
