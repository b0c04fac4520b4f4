//! In-memory [`AuditService`] (spec.md §6): derives one audit line per
//! mutation, in the same engine-defined textual convention
//! [`super::access_control`] uses for ACL graphs — `<iri> audit:<action>
//! <agent> <rfc3339-instant>` — appended by the caller via
//! [`ldp_repo::collaborator::ResourceService::add`].

use async_trait::async_trait;
use chrono::Utc;

use ldp_http::problem::Problem;
use ldp_repo::collaborator::{AuditService, Dataset, MutationMetadata};
use ldp_repo::session::Session;

/// In-memory [`AuditService`].
#[derive(Default)]
pub struct MemoryAuditService;

fn audit_line(action: &str, metadata: &MutationMetadata, session: &Session) -> Dataset {
    Dataset {
        quads: vec![format!("{} audit:{} {} {}", metadata.internal_iri, action, session.agent_iri, Utc::now().to_rfc3339())],
    }
}

#[async_trait]
impl AuditService for MemoryAuditService {
    async fn creation(&self, metadata: &MutationMetadata, session: &Session) -> Result<Dataset, Problem> {
        Ok(audit_line("create", metadata, session))
    }

    async fn deletion(&self, metadata: &MutationMetadata, session: &Session) -> Result<Dataset, Problem> {
        Ok(audit_line("delete", metadata, session))
    }

    async fn update(&self, metadata: &MutationMetadata, session: &Session) -> Result<Dataset, Problem> {
        Ok(audit_line("update", metadata, session))
    }
}
