//! Resource status tokens: a sentinel capturing whether a path names a
//! live, tombstoned, or never-existing resource, plus the validators the
//! precondition evaluator needs (spec.md §4.3, §4.6's deletion lifecycle).

use chrono::{DateTime, Utc};

use crate::model::InteractionModel;

/// State of a storage-relative path as reported by the Resource Service.
#[derive(Debug, Clone)]
pub enum ResourceStatusToken {
    /// A live resource exists at this path.
    Existing(ExistingResourceToken),
    /// The path once held a resource, now tombstoned (spec.md §4.6: a
    /// DELETEd resource's path returns 410 Gone, not 404, until purged).
    Deleted(DeletedResourceToken),
    /// No resource, live or tombstoned, has ever occupied this path.
    Missing,
}

impl ResourceStatusToken {
    /// True if a live resource occupies the path.
    pub fn exists(&self) -> bool {
        matches!(self, Self::Existing(_))
    }

    /// True if the path is tombstoned.
    pub fn is_gone(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }

    /// The existing token, if this path is live.
    pub fn as_existing(&self) -> Option<&ExistingResourceToken> {
        match self {
            Self::Existing(token) => Some(token),
            _ => None,
        }
    }
}

/// Metadata for a live resource, sufficient to drive precondition
/// evaluation and response-header assembly without a further round trip.
#[derive(Debug, Clone)]
pub struct ExistingResourceToken {
    /// The resource's interaction model.
    pub interaction_model: InteractionModel,
    /// Last-Modified instant.
    pub last_modified: DateTime<Utc>,
    /// Current ETag value (unquoted).
    pub etag: String,
    /// Whether the ETag is weak (RDFSource) or strong (NonRDFSource),
    /// per spec.md §4.3.
    pub etag_is_weak: bool,
    /// Stored content type, meaningful only for NonRDFSource.
    pub content_type: Option<String>,
    /// Stored content length in bytes, meaningful only for NonRDFSource.
    pub content_length: Option<u64>,
}

/// Metadata retained for a tombstoned resource: when it was deleted, so
/// Memento/audit views can still describe it.
#[derive(Debug, Clone)]
pub struct DeletedResourceToken {
    /// Instant the resource was deleted.
    pub deleted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn existing() -> ExistingResourceToken {
        ExistingResourceToken {
            interaction_model: InteractionModel::RDFSource,
            last_modified: Utc::now(),
            etag: "abc123".to_owned(),
            etag_is_weak: true,
            content_type: None,
            content_length: None,
        }
    }

    #[test]
    fn existing_token_reports_exists_true_gone_false() {
        let token = ResourceStatusToken::Existing(existing());
        assert!(token.exists());
        assert!(!token.is_gone());
    }

    #[test]
    fn deleted_token_reports_gone_not_exists() {
        let token = ResourceStatusToken::Deleted(DeletedResourceToken { deleted_at: Utc::now() });
        assert!(!token.exists());
        assert!(token.is_gone());
    }

    #[test]
    fn missing_token_reports_neither() {
        let token = ResourceStatusToken::Missing;
        assert!(!token.exists());
        assert!(!token.is_gone());
        assert!(token.as_existing().is_none());
    }
}
