//! In-memory [`AccessControlService`] (spec.md §6): a minimal WebAC
//! resolver. An ACL graph is a sequence of `<agent> <mode>` lines — the
//! agent IRI or the wildcard `*` (public), followed by one of
//! `Read`/`Write`/`Append`/`Control` — consistent with [`Dataset`] being
//! an opaque, engine-defined textual form rather than parsed RDF.
//!
//! A resource with no ACL graph of its own inherits its nearest
//! ancestor's; a deployment with no ACL graph anywhere (the default, for
//! this reference server) grants every mode to every agent, since
//! deep WebAC semantics are explicitly out of this engine's scope
//! (spec.md §6) and a workable default is more useful than a locked-out
//! store.

use std::sync::Arc;

use async_trait::async_trait;

use ldp_http::problem::Problem;
use ldp_repo::collaborator::{AccessControlService, Dataset};
use ldp_repo::model::AccessMode;
use ldp_repo::session::Session;

use super::store::Store;

const ALL_MODES: [AccessMode; 4] = [AccessMode::Read, AccessMode::Write, AccessMode::Append, AccessMode::Control];
const PUBLIC_AGENT: &str = "*";

/// In-memory [`AccessControlService`].
pub struct MemoryAccessControlService {
    store: Arc<Store>,
}

impl MemoryAccessControlService {
    /// New service over `store`.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// The nearest ACL graph governing `internal_iri`: its own, or the
    /// first ancestor's found walking up to the root.
    fn nearest_acl(&self, internal_iri: &str) -> Option<Dataset> {
        let mut current = internal_iri.trim_end_matches('/').to_owned();
        loop {
            if let Some(entry) = self.store.get(&format!("{current}/")).or_else(|| self.store.get(&current)) {
                if let Some(acl) = entry.acl_graph {
                    if !acl.quads.is_empty() {
                        return Some(acl);
                    }
                }
            }
            match current.rsplit_once('/') {
                Some((parent, _)) if !parent.is_empty() => current = parent.to_owned(),
                _ => return None,
            }
        }
    }
}

fn modes_for_agent(acl: &Dataset, agent_iri: &str) -> Vec<AccessMode> {
    acl.quads
        .iter()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let agent = parts.next()?;
            let mode = parts.next()?;
            if agent == agent_iri || agent == PUBLIC_AGENT {
                parse_mode(mode)
            } else {
                None
            }
        })
        .collect()
}

fn parse_mode(token: &str) -> Option<AccessMode> {
    Some(match token {
        "Read" => AccessMode::Read,
        "Write" => AccessMode::Write,
        "Append" => AccessMode::Append,
        "Control" => AccessMode::Control,
        _ => return None,
    })
}

#[async_trait]
impl AccessControlService for MemoryAccessControlService {
    async fn get_access_modes(&self, internal_iri: &str, session: &Session) -> Result<Vec<AccessMode>, Problem> {
        Ok(match self.nearest_acl(internal_iri) {
            Some(acl) => modes_for_agent(&acl, &session.agent_iri),
            None => ALL_MODES.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_wildcard_grants_every_agent() {
        let acl = Dataset { quads: vec!["* Read".to_owned()] };
        assert_eq!(modes_for_agent(&acl, "https://alice.example/#me"), vec![AccessMode::Read]);
    }

    #[test]
    fn named_agent_grant_is_not_seen_by_others() {
        let acl = Dataset { quads: vec!["https://alice.example/#me Write".to_owned()] };
        assert!(modes_for_agent(&acl, "https://bob.example/#me").is_empty());
    }
}
