//! Per-resource view of the [`ResourceClient`].
//!
//! A [`ResourceApi`] binds one [`ResourceSpec`] (name, API version, verbs)
//! to the generic client. Calls keep the exact contracts of the underlying
//! primitives; the only additions are the defaulted `apiVersion` and a
//! refusal, before any request is made, of verbs the resource does not
//! support.

use serde::de::DeserializeOwned;
use serde::Serialize;

use intake_core::patch::PatchDocument;
use intake_core::query::QueryOptions;
use intake_core::resource::{ResourceSpec, Verb};
use intake_core::types::{Collection, ETag, EntityId, Versioned};

use crate::error::ClientError;
use crate::resource_client::ResourceClient;

#[derive(Clone)]
pub struct ResourceApi {
    client: ResourceClient,
    spec: &'static ResourceSpec,
}

impl ResourceApi {
    pub fn new(client: ResourceClient, spec: &'static ResourceSpec) -> Self {
        Self { client, spec }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        id: EntityId,
        query: QueryOptions,
    ) -> Result<Versioned<T>, ClientError> {
        self.require(Verb::Get)?;
        self.client.get(self.spec.name, id, &self.versioned(query)).await
    }

    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        query: QueryOptions,
    ) -> Result<Collection<T>, ClientError> {
        self.require(Verb::GetCollection)?;
        self.client
            .get_collection(self.spec.name, &self.versioned(query))
            .await
    }

    pub async fn patch(
        &self,
        id: EntityId,
        patch: &PatchDocument,
        etag: &ETag,
    ) -> Result<Option<ETag>, ClientError> {
        self.require(Verb::Patch)?;
        self.client
            .patch(self.spec.name, id, &self.versioned(QueryOptions::new()), patch, etag)
            .await
    }

    pub async fn post<B, T>(&self, data: &B) -> Result<Versioned<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.require(Verb::Post)?;
        self.client
            .post(self.spec.name, &self.versioned(QueryOptions::new()), data)
            .await
    }

    pub async fn delete(&self, id: EntityId, etag: &ETag) -> Result<(), ClientError> {
        self.require(Verb::Delete)?;
        self.client
            .delete(self.spec.name, id, &self.versioned(QueryOptions::new()), etag)
            .await
    }

    fn versioned(&self, query: QueryOptions) -> QueryOptions {
        query.with_default_version(self.spec.api_version)
    }

    fn require(&self, verb: Verb) -> Result<(), ClientError> {
        if self.spec.supports(verb) {
            Ok(())
        } else {
            Err(ClientError::UnsupportedVerb {
                resource: self.spec.name,
                verb,
            })
        }
    }
}
