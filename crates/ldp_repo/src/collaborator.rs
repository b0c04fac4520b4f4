//! Collaborator interfaces (spec.md §6): the boundary the HTTP protocol
//! engine relies on, realized as object-safe `async_trait` traits so
//! `ldp_server` can wire reference implementations without threading
//! generic parameters through the engine. A deliberate simplification
//! from the teacher's fully generic `Repo`/`SolidStorageSpace`
//! associated-type design (see DESIGN.md).

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use ldp_http::problem::Problem;

use crate::model::{AccessMode, InteractionModel, NamedGraph};
use crate::status::ResourceStatusToken;

/// Metadata a mutation carries: the target identity, the interaction
/// model being asserted, and the session performing it.
#[derive(Debug, Clone)]
pub struct MutationMetadata {
    /// Internal identity of the target resource.
    pub internal_iri: String,
    /// Interaction model asserted for the target (for create/replace).
    pub interaction_model: InteractionModel,
    /// Content type of the incoming representation, if any.
    pub content_type: Option<String>,
    /// Slug suggested by the client, already sanitized.
    pub slug: Option<String>,
    /// Named graph the dataset should be persisted into (spec.md §4.6 PUT
    /// step 5: `ext=acl` writes to [`NamedGraph::PreferAccessControl`]
    /// rather than the user-managed graph).
    pub target_graph: NamedGraph,
}

/// An in-memory RDF dataset handed across the collaborator boundary.
/// Opaque to the HTTP engine: it is produced and consumed only by the
/// I/O Service and passed through unexamined otherwise.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Serialized quads, engine-internal representation.
    pub quads: Vec<String>,
}

/// The Resource Service (spec.md §6): CRUD plus identity mapping over
/// RDF-bearing resources.
#[async_trait]
pub trait ResourceService: Send + Sync {
    /// Look up a resource by internal identity.
    async fn get(&self, internal_iri: &str) -> Result<ResourceStatusToken, Problem>;

    /// Load a resource's dataset for the given named graph (spec.md §4.6
    /// PATCH step 1: "Load the current user-managed graph (or
    /// access-control graph for `ext=acl`)").
    async fn get_dataset(&self, internal_iri: &str, graph: NamedGraph) -> Result<Dataset, Problem>;

    /// Create a new resource.
    async fn create(&self, metadata: MutationMetadata, dataset: Dataset) -> Result<(), Problem>;

    /// Replace an existing resource's state.
    async fn replace(&self, metadata: MutationMetadata, dataset: Dataset) -> Result<(), Problem>;

    /// Delete (tombstone) a resource.
    async fn delete(&self, metadata: MutationMetadata) -> Result<(), Problem>;

    /// Append triples to a resource's audit graph without altering its
    /// user-managed state (used by the Audit Service's recorded events).
    async fn add(&self, internal_iri: &str, dataset: Dataset) -> Result<(), Problem>;

    /// Map an external URL to its internal identity.
    fn to_internal(&self, external_url: &str) -> String;

    /// Map an internal identity to its external URL.
    fn to_external(&self, internal_iri: &str) -> String;

    /// Allocate a new child identifier under a container path.
    fn generate_identifier(&self) -> String;

    /// Interaction models this deployment accepts on creation.
    fn supported_interaction_models(&self) -> &[InteractionModel];

    /// Touch a resource's last-modified instant without changing its
    /// state (used after a contained-member event).
    async fn touch(&self, internal_iri: &str) -> Result<(), Problem>;
}

/// The Memento Service (spec.md §6): time-indexed resource history.
#[async_trait]
pub trait MementoService: Send + Sync {
    /// Resolve the memento nearest at or before `instant`.
    async fn get(&self, internal_iri: &str, instant: DateTime<Utc>) -> Result<ResourceStatusToken, Problem>;

    /// All memento instants recorded for a resource, oldest first.
    async fn mementos(&self, internal_iri: &str) -> Result<Vec<DateTime<Utc>>, Problem>;

    /// Record the resource's current state as a new memento.
    async fn put(&self, internal_iri: &str) -> Result<(), Problem>;
}

/// A binary's content, either whole or range-sliced.
#[derive(Debug, Clone)]
pub struct BinaryContent {
    /// Byte payload.
    pub bytes: Bytes,
    /// Stored content type.
    pub content_type: String,
    /// Total stored length (independent of any requested range).
    pub total_length: u64,
}

/// The Binary Service (spec.md §6): NonRDFSource byte storage.
#[async_trait]
pub trait BinaryService: Send + Sync {
    /// Fetch a binary's full content.
    async fn get_content(&self, internal_iri: &str) -> Result<BinaryContent, Problem>;

    /// Fetch a byte range `[start, end]` inclusive.
    async fn get_content_range(&self, internal_iri: &str, start: u64, end: u64) -> Result<BinaryContent, Problem>;

    /// Replace a binary's content.
    async fn set_content(&self, metadata: MutationMetadata, bytes: Bytes) -> Result<(), Problem>;

    /// Purge stored bytes, independent of the resource's metadata
    /// (spec.md's purge-binary-on-delete toggle).
    async fn purge_content(&self, internal_iri: &str) -> Result<(), Problem>;

    /// Allocate a new binary identifier.
    fn generate_identifier(&self) -> String;
}

/// The I/O Service (spec.md §6): RDF codec and SPARQL-Update application,
/// kept entirely outside the HTTP engine's concern.
#[async_trait]
pub trait IoService: Send + Sync {
    /// Parse an RDF document of the given syntax into a dataset.
    async fn read(&self, body: Bytes, base_iri: &str, syntax: &str) -> Result<Dataset, Problem>;

    /// Serialize a dataset into the given syntax (and, for JSON-LD, the
    /// given profile).
    async fn write(&self, dataset: &Dataset, syntax: &str, profile: Option<&str>) -> Result<Bytes, Problem>;

    /// Apply a SPARQL-Update document to a dataset, returning the result.
    async fn update(&self, dataset: Dataset, sparql: &str, base_iri: &str) -> Result<Dataset, Problem>;
}

/// The Access Control Service (spec.md §6): WebAC mode resolution.
#[async_trait]
pub trait AccessControlService: Send + Sync {
    /// Resolve the access modes a session holds over a resource.
    async fn get_access_modes(&self, internal_iri: &str, session: &crate::session::Session) -> Result<Vec<AccessMode>, Problem>;
}

/// A domain event, fire-and-forget (spec.md §6, §4.8).
#[derive(Debug, Clone)]
pub struct Event {
    /// Internal identity of the affected resource.
    pub internal_iri: String,
    /// Event kind (Create, Update, Delete).
    pub kind: EventKind,
}

/// The kind of a fire-and-forget domain event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A resource was created.
    Create,
    /// A resource's state was replaced or patched.
    Update,
    /// A resource was deleted.
    Delete,
}

/// The Event Service (spec.md §6): fire-and-forget notification, used to
/// drive WebSub hub pings. Failures are logged and swallowed, never
/// surfaced to the requesting client (spec.md §7 propagation policy).
#[async_trait]
pub trait EventService: Send + Sync {
    /// Emit an event. Implementations must not fail the caller's request;
    /// any internal error should be logged and absorbed.
    async fn emit(&self, event: Event);
}

/// The Audit Service (spec.md §6): derives audit quads describing a
/// mutation, to be merged into a resource's `PreferAudit` graph.
#[async_trait]
pub trait AuditService: Send + Sync {
    /// Audit quads for a creation.
    async fn creation(&self, metadata: &MutationMetadata, session: &crate::session::Session) -> Result<Dataset, Problem>;

    /// Audit quads for a deletion.
    async fn deletion(&self, metadata: &MutationMetadata, session: &crate::session::Session) -> Result<Dataset, Problem>;

    /// Audit quads for an update (replace or patch).
    async fn update(&self, metadata: &MutationMetadata, session: &crate::session::Session) -> Result<Dataset, Problem>;
}
