//! Method Handlers (spec.md §4.6): one module per HTTP method, plus a
//! TimeMap/Memento sub-handler. Each handler is a plain async function
//! `handle(&MethodContext) -> Result<AssembledResponse, Problem>` — the
//! "base method service" half of the teacher's two-phase pattern (see
//! [`crate::service`] for the marshalling half, which turns this
//! `Result` into an infallible `http::Response`).

pub mod delete;
pub mod head_get;
pub mod options;
pub mod patch;
pub mod post;
pub mod put;
pub mod timemap;

use std::sync::Arc;

use ldp_http::problem::Problem;
use ldp_http::request::RequestModel;
use ldp_http::response::AssembledResponse;
use ldp_repo::collaborator::{
    AccessControlService, AuditService, BinaryService, EventService, IoService, MementoService, ResourceService,
};
use ldp_repo::model::AccessMode;
use ldp_repo::session::Session;

use crate::config::EngineConfig;

/// The result type every method handler returns: either an assembled
/// success response, or a reified problem for the marshaller to render.
pub type HandlerResult = Result<AssembledResponse, Problem>;

/// The collaborator set a method handler is invoked against (spec.md §6).
pub struct Collaborators {
    /// Resource Service.
    pub resource: Arc<dyn ResourceService>,
    /// Memento Service.
    pub memento: Arc<dyn MementoService>,
    /// Binary Service.
    pub binary: Arc<dyn BinaryService>,
    /// I/O Service.
    pub io: Arc<dyn IoService>,
    /// Access Control Service.
    pub access_control: Arc<dyn AccessControlService>,
    /// Event Service.
    pub event: Arc<dyn EventService>,
    /// Audit Service.
    pub audit: Arc<dyn AuditService>,
}

/// Everything a method handler needs: the parsed request, the resolved
/// session and granted modes, configuration, and the collaborator set.
pub struct MethodContext {
    /// The request's raw headers, for [`ldp_http::conditional::evaluate`],
    /// which works directly against a `HeaderMap` rather than the parsed
    /// [`RequestModel`] (spec.md §4.3 is stateless and header-driven).
    pub headers: http::HeaderMap,
    /// Parsed request model (spec.md §4.1).
    pub request: RequestModel,
    /// Raw request body, for methods that carry one (POST/PUT/PATCH).
    pub body: bytes::Bytes,
    /// Resolved agent session (spec.md §4.4).
    pub session: Session,
    /// ACL modes granted to `session` over the target (spec.md §4.4).
    pub granted_modes: Vec<AccessMode>,
    /// Process-wide configuration.
    pub config: Arc<EngineConfig>,
    /// Collaborator set.
    pub collaborators: Arc<Collaborators>,
}

impl MethodContext {
    /// The resource's internal identity for this request's path.
    pub fn internal_iri(&self) -> String {
        self.collaborators.resource.to_internal(&self.external_url())
    }

    /// The resource's external URL for this request's path.
    pub fn external_url(&self) -> String {
        self.external_url_for(&self.request.path)
    }

    /// The external URL for an arbitrary storage-relative path under this
    /// deployment's base URL (used for children created by POST).
    pub fn external_url_for(&self, path: &str) -> String {
        if path.is_empty() {
            format!("{}/", self.config.base_url)
        } else {
            format!("{}/{}", self.config.base_url, path)
        }
    }
}
