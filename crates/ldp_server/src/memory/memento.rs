//! In-memory [`MementoService`] (spec.md §6): a time-indexed history of a
//! resource's [`super::store::Entry`] snapshots, one per
//! [`MementoService::put`] call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use ldp_http::problem::Problem;
use ldp_repo::collaborator::MementoService;
use ldp_repo::status::ResourceStatusToken;

use super::resource::token_for;
use super::store::Store;

/// In-memory [`MementoService`].
pub struct MemoryMementoService {
    store: Arc<Store>,
}

impl MemoryMementoService {
    /// New service over `store`.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MementoService for MemoryMementoService {
    async fn get(&self, internal_iri: &str, instant: DateTime<Utc>) -> Result<ResourceStatusToken, Problem> {
        Ok(self
            .store
            .memento_at_or_before(internal_iri, instant)
            .as_ref()
            .map(token_for)
            .unwrap_or(ResourceStatusToken::Missing))
    }

    async fn mementos(&self, internal_iri: &str) -> Result<Vec<DateTime<Utc>>, Problem> {
        Ok(self.store.mementos(internal_iri))
    }

    async fn put(&self, internal_iri: &str) -> Result<(), Problem> {
        self.store.snapshot(internal_iri);
        Ok(())
    }
}
