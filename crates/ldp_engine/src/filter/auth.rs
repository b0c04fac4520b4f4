//! Authentication Filter (spec.md §4.4): maps the transport principal
//! (if any) to an internal agent IRI, via a configurable mapping
//! function. Anonymous requests map to the well-known anonymous agent.

use ldp_repo::session::Session;

/// Maps a transport-surfaced principal name to an internal agent IRI.
/// Deployments plug in their own mapping (e.g. WebID lookup via a
/// bearer token); the default identity mapping below is used only when
/// none is configured.
pub trait PrincipalMapper: Send + Sync {
    /// Resolve a transport principal to an agent IRI.
    fn map(&self, principal: &str) -> String;
}

/// Maps a principal string to itself, treating it as an already-resolved
/// agent IRI. Suitable when the transport surfaces a WebID directly.
pub struct IdentityPrincipalMapper;

impl PrincipalMapper for IdentityPrincipalMapper {
    fn map(&self, principal: &str) -> String {
        principal.to_owned()
    }
}

/// Resolve the session for a request, given the transport's surfaced
/// principal (`None` for anonymous).
pub fn resolve(principal: Option<&str>, mapper: &dyn PrincipalMapper) -> Session {
    match principal {
        Some(p) if !p.is_empty() => Session { agent_iri: mapper.map(p) },
        _ => Session::anonymous(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_principal_resolves_to_anonymous() {
        let session = resolve(None, &IdentityPrincipalMapper);
        assert!(session.is_anonymous());
    }

    #[test]
    fn empty_principal_resolves_to_anonymous() {
        let session = resolve(Some(""), &IdentityPrincipalMapper);
        assert!(session.is_anonymous());
    }

    #[test]
    fn present_principal_maps_through() {
        let session = resolve(Some("https://alice.example/profile#me"), &IdentityPrincipalMapper);
        assert_eq!(session.agent_iri, "https://alice.example/profile#me");
    }
}
