//! In-memory [`BinaryService`] (spec.md §6): NonRDFSource byte storage,
//! sharing [`Store`] entries with [`super::resource::MemoryResourceService`]
//! so a binary's metadata (content type, length, last-modified) stays
//! consistent with its resource status.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use rand::distributions::{Alphanumeric, DistString};

use ldp_http::problem::{catalogue, Problem};
use ldp_repo::collaborator::{BinaryContent, BinaryService, MutationMetadata};

use super::store::{new_entry, Store};

/// In-memory [`BinaryService`].
pub struct MemoryBinaryService {
    store: Arc<Store>,
}

impl MemoryBinaryService {
    /// New service over `store`.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

fn not_found() -> Problem {
    catalogue::NOT_FOUND.new_problem_builder().finish()
}

#[async_trait]
impl BinaryService for MemoryBinaryService {
    async fn get_content(&self, internal_iri: &str) -> Result<BinaryContent, Problem> {
        let entry = self.store.get(internal_iri).ok_or_else(not_found)?;
        let bytes = entry.binary.ok_or_else(not_found)?;
        let total_length = bytes.len() as u64;
        Ok(BinaryContent {
            bytes,
            content_type: entry.content_type.unwrap_or_else(|| "application/octet-stream".to_owned()),
            total_length,
        })
    }

    async fn get_content_range(&self, internal_iri: &str, start: u64, end: u64) -> Result<BinaryContent, Problem> {
        let full = self.get_content(internal_iri).await?;
        let start = start.min(full.total_length) as usize;
        let end = end.saturating_add(1).min(full.total_length) as usize;
        if start >= end {
            return Err(catalogue::RANGE_NOT_SATISFIABLE.new_problem_builder().finish());
        }
        Ok(BinaryContent {
            bytes: full.bytes.slice(start..end),
            content_type: full.content_type,
            total_length: full.total_length,
        })
    }

    async fn set_content(&self, metadata: MutationMetadata, bytes: Bytes) -> Result<(), Problem> {
        let now = Utc::now();
        let mut entry = self.store.get(&metadata.internal_iri).unwrap_or_else(|| new_entry(metadata.interaction_model, now));
        entry.deleted_at = None;
        entry.interaction_model = metadata.interaction_model;
        entry.binary = Some(bytes);
        if metadata.content_type.is_some() {
            entry.content_type = metadata.content_type;
        }
        entry.last_modified = now;
        self.store.insert(metadata.internal_iri, entry);
        Ok(())
    }

    async fn purge_content(&self, internal_iri: &str) -> Result<(), Problem> {
        self.store.remove_binary(internal_iri);
        Ok(())
    }

    fn generate_identifier(&self) -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), 12)
    }
}
