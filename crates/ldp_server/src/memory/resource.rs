//! In-memory [`ResourceService`] (spec.md §6): resource CRUD plus the
//! identity mapping between external URLs and internal `trellis:data/`
//! identities, via [`IdentityScheme`] (spec.md §3).

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::{Alphanumeric, DistString};

use ldp_http::problem::{catalogue, Problem};
use ldp_repo::collaborator::{Dataset, MutationMetadata, ResourceService};
use ldp_repo::model::{IdentityScheme, InteractionModel, NamedGraph};
use ldp_repo::status::{DeletedResourceToken, ExistingResourceToken, ResourceStatusToken};

use super::store::{new_entry, Entry, Store};
use std::sync::Arc;

/// The interaction models this deployment accepts as the asserted type of
/// a newly created resource.
const SUPPORTED_MODELS: &[InteractionModel] = &[
    InteractionModel::RDFSource,
    InteractionModel::NonRDFSource,
    InteractionModel::BasicContainer,
    InteractionModel::DirectContainer,
    InteractionModel::IndirectContainer,
];

/// In-memory [`ResourceService`].
pub struct MemoryResourceService {
    store: Arc<Store>,
    identity: IdentityScheme,
}

impl MemoryResourceService {
    /// New service over `store`, mapping identities against `base_url`.
    pub fn new(store: Arc<Store>, base_url: impl Into<String>) -> Self {
        Self {
            store,
            identity: IdentityScheme { base_url: base_url.into() },
        }
    }

    /// `ldp:contains <child>` quads for a container's immediate children,
    /// synthesized from [`Store::children`] rather than persisted.
    fn containment_quads(&self, internal_iri: &str) -> Vec<String> {
        self.store
            .children(internal_iri)
            .into_iter()
            .map(|child| format!("<{internal_iri}> <http://www.w3.org/ns/ldp#contains> <{child}>"))
            .collect()
    }
}

/// Build the status token a store [`Entry`] reports as (shared with
/// [`super::memento::MemoryMementoService`], whose mementos are entries
/// of the same shape).
pub(crate) fn token_for(entry: &Entry) -> ResourceStatusToken {
    if let Some(deleted_at) = entry.deleted_at {
        return ResourceStatusToken::Deleted(DeletedResourceToken { deleted_at });
    }
    ResourceStatusToken::Existing(ExistingResourceToken {
        interaction_model: entry.interaction_model,
        last_modified: entry.last_modified,
        etag: entry.etag(),
        etag_is_weak: entry.interaction_model != InteractionModel::NonRDFSource,
        content_type: entry.content_type.clone(),
        content_length: entry.content_length(),
    })
}

fn not_found() -> Problem {
    catalogue::NOT_FOUND.new_problem_builder().finish()
}

#[async_trait]
impl ResourceService for MemoryResourceService {
    async fn get(&self, internal_iri: &str) -> Result<ResourceStatusToken, Problem> {
        Ok(self.store.get(internal_iri).as_ref().map(token_for).unwrap_or(ResourceStatusToken::Missing))
    }

    async fn get_dataset(&self, internal_iri: &str, graph: NamedGraph) -> Result<Dataset, Problem> {
        let entry = self.store.get(internal_iri).ok_or_else(not_found)?;
        Ok(match graph {
            NamedGraph::PreferUserManaged => {
                let mut dataset = entry.user_graph;
                if entry.interaction_model.is_container_like() {
                    dataset.quads.extend(self.containment_quads(internal_iri));
                }
                dataset
            }
            NamedGraph::PreferAccessControl => entry.acl_graph.unwrap_or_default(),
            NamedGraph::PreferAudit => entry.audit_graph,
            NamedGraph::PreferContainment | NamedGraph::PreferMembership => {
                Dataset { quads: self.containment_quads(internal_iri) }
            }
            // Server-managed metadata triples are synthesized from status
            // tokens (spec.md §4.6 Link headers), not persisted as quads;
            // this reference implementation has no separate graph for them.
            NamedGraph::PreferServerManaged => Dataset::default(),
        })
    }

    async fn create(&self, metadata: MutationMetadata, dataset: Dataset) -> Result<(), Problem> {
        let now = Utc::now();
        let mut entry = self.store.get(&metadata.internal_iri).unwrap_or_else(|| new_entry(metadata.interaction_model, now));
        entry.deleted_at = None;
        entry.interaction_model = metadata.interaction_model;
        entry.created_at = entry.created_at.min(now);
        entry.last_modified = now;
        apply_dataset(&mut entry, metadata.target_graph, dataset);
        if metadata.content_type.is_some() {
            entry.content_type = metadata.content_type;
        }
        self.store.insert(metadata.internal_iri, entry);
        Ok(())
    }

    async fn replace(&self, metadata: MutationMetadata, dataset: Dataset) -> Result<(), Problem> {
        self.create(metadata, dataset).await
    }

    async fn delete(&self, metadata: MutationMetadata) -> Result<(), Problem> {
        let now = Utc::now();
        self.store
            .mutate(&metadata.internal_iri, |entry| {
                entry.deleted_at = Some(now);
                entry.last_modified = now;
            })
            .ok_or_else(not_found)?;
        Ok(())
    }

    async fn add(&self, internal_iri: &str, dataset: Dataset) -> Result<(), Problem> {
        self.store
            .mutate(internal_iri, |entry| entry.audit_graph.quads.extend(dataset.quads))
            .ok_or_else(not_found)?;
        Ok(())
    }

    fn to_internal(&self, external_url: &str) -> String {
        let path = external_url.strip_prefix(&self.identity.base_url).unwrap_or(external_url).trim_start_matches('/');
        self.identity.internal(path).as_str().to_owned()
    }

    fn to_external(&self, internal_iri: &str) -> String {
        let path = internal_iri.strip_prefix(ldp_repo::model::InternalIri::PREFIX).unwrap_or(internal_iri);
        self.identity.external(path).as_str().to_owned()
    }

    fn generate_identifier(&self) -> String {
        Alphanumeric.sample_string(&mut rand::thread_rng(), 12)
    }

    fn supported_interaction_models(&self) -> &[InteractionModel] {
        SUPPORTED_MODELS
    }

    async fn touch(&self, internal_iri: &str) -> Result<(), Problem> {
        let now = Utc::now();
        self.store.mutate(internal_iri, |entry| entry.last_modified = now).ok_or_else(not_found)?;
        Ok(())
    }
}

fn apply_dataset(entry: &mut Entry, graph: NamedGraph, dataset: Dataset) {
    match graph {
        NamedGraph::PreferAccessControl => entry.acl_graph = Some(dataset),
        NamedGraph::PreferAudit => entry.audit_graph = dataset,
        _ => entry.user_graph = dataset,
    }
}
