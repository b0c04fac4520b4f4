//! Core domain types exposed at the HTTP boundary (spec.md §3): resource
//! identity, the LDP interaction-model hierarchy, named-graph partitions,
//! and WebAC access modes.

use std::fmt;

/// A resource's internal identity: `trellis:data/<path>` (spec.md §3). The
/// root resource has an empty path and identity `trellis:data/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InternalIri(String);

impl InternalIri {
    /// Internal prefix every resource identity is rooted under.
    pub const PREFIX: &'static str = "trellis:data/";

    /// Build the internal identity for a storage-relative path.
    pub fn for_path(path: &str) -> Self {
        Self(format!("{}{}", Self::PREFIX, path))
    }

    /// The underlying IRI string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InternalIri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A resource's external URL: `<baseURL>/<path>` (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalUrl(String);

impl ExternalUrl {
    /// Build the external URL for a storage-relative path under a base URL.
    /// `base_url` must not carry a trailing slash.
    pub fn for_path(base_url: &str, path: &str) -> Self {
        if path.is_empty() {
            Self(format!("{base_url}/"))
        } else {
            Self(format!("{base_url}/{path}"))
        }
    }

    /// The underlying URL string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Converts between a storage-relative path and the two identity forms
/// (spec.md §3's "The two forms are converted by the Resource Service").
#[derive(Debug, Clone)]
pub struct IdentityScheme {
    /// Configured external base URL, without a trailing slash.
    pub base_url: String,
}

impl IdentityScheme {
    /// Internal identity for a path.
    pub fn internal(&self, path: &str) -> InternalIri {
        InternalIri::for_path(path)
    }

    /// External URL for a path.
    pub fn external(&self, path: &str) -> ExternalUrl {
        ExternalUrl::for_path(&self.base_url, path)
    }
}

/// The LDP interaction model of a resource (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionModel {
    /// The root LDP type; every resource reports at least this.
    Resource,
    /// An RDF-bearing resource.
    RDFSource,
    /// An opaque byte-stream resource.
    NonRDFSource,
    /// The base LDP container type.
    Container,
    /// A plain container with no membership semantics beyond containment.
    BasicContainer,
    /// A container whose membership is stated against a fixed resource.
    DirectContainer,
    /// A container whose membership triples are derived via an indirection.
    IndirectContainer,
}

impl InteractionModel {
    /// Supertypes of this model, most specific first, always ending in
    /// [`InteractionModel::Resource`] (spec.md §3: "the model plus all
    /// supertypes in the LDP hierarchy: every Container subtype also
    /// reports Container, RDFSource, and Resource").
    pub fn supertypes(&self) -> &'static [InteractionModel] {
        use InteractionModel::*;
        match self {
            Resource => &[Resource],
            RDFSource => &[RDFSource, Resource],
            NonRDFSource => &[NonRDFSource, Resource],
            Container => &[Container, RDFSource, Resource],
            BasicContainer => &[BasicContainer, Container, RDFSource, Resource],
            DirectContainer => &[DirectContainer, Container, RDFSource, Resource],
            IndirectContainer => &[IndirectContainer, Container, RDFSource, Resource],
        }
    }

    /// Whether POST is admissible against this model (spec.md §3:
    /// "whether POST is allowed (Container-like only)").
    pub fn is_container_like(&self) -> bool {
        matches!(
            self,
            Self::Container | Self::BasicContainer | Self::DirectContainer | Self::IndirectContainer
        )
    }

    /// The vocabulary IRI for this model's LDP class, used in `Link
    /// type="..."` headers.
    pub fn type_iri(&self) -> &'static str {
        match self {
            Self::Resource => "http://www.w3.org/ns/ldp#Resource",
            Self::RDFSource => "http://www.w3.org/ns/ldp#RDFSource",
            Self::NonRDFSource => "http://www.w3.org/ns/ldp#NonRDFSource",
            Self::Container => "http://www.w3.org/ns/ldp#Container",
            Self::BasicContainer => "http://www.w3.org/ns/ldp#BasicContainer",
            Self::DirectContainer => "http://www.w3.org/ns/ldp#DirectContainer",
            Self::IndirectContainer => "http://www.w3.org/ns/ldp#IndirectContainer",
        }
    }

    /// Parse a `Link rel="type"` target IRI into a known interaction
    /// model, if recognized (spec.md §4.6 POST step 1: "unknown types
    /// fall back to RDFSource").
    pub fn from_type_iri(iri: &str) -> Option<Self> {
        use InteractionModel::*;
        Some(match iri {
            "http://www.w3.org/ns/ldp#Resource" => Resource,
            "http://www.w3.org/ns/ldp#RDFSource" => RDFSource,
            "http://www.w3.org/ns/ldp#NonRDFSource" => NonRDFSource,
            "http://www.w3.org/ns/ldp#Container" => Container,
            "http://www.w3.org/ns/ldp#BasicContainer" => BasicContainer,
            "http://www.w3.org/ns/ldp#DirectContainer" => DirectContainer,
            "http://www.w3.org/ns/ldp#IndirectContainer" => IndirectContainer,
            _ => return None,
        })
    }
}

/// Named graphs partitioning an RDFSource representation (spec.md §3,
/// §4.1's `Prefer` selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedGraph {
    /// Client-authored triples.
    PreferUserManaged,
    /// Server-managed creation/modification metadata.
    PreferServerManaged,
    /// Derived audit quads.
    PreferAudit,
    /// The WebAC access-control graph.
    PreferAccessControl,
    /// `ldp:contains` triples.
    PreferContainment,
    /// Direct/Indirect Container membership triples.
    PreferMembership,
}

impl NamedGraph {
    /// The `Prefer: include=...`/`omit=...` IRI naming this graph.
    pub fn prefer_iri(&self) -> &'static str {
        match self {
            Self::PreferUserManaged => "http://www.w3.org/ns/ldp#PreferUserManaged",
            Self::PreferServerManaged => "http://www.w3.org/ns/ldp#PreferServerManaged",
            Self::PreferAudit => "urn:ldp_repo:PreferAudit",
            Self::PreferAccessControl => "urn:ldp_repo:PreferAccessControl",
            Self::PreferContainment => "http://www.w3.org/ns/ldp#PreferContainment",
            Self::PreferMembership => "http://www.w3.org/ns/ldp#PreferMembership",
        }
    }
}

/// A WebAC access mode (spec.md §4.4, Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Permission to read a resource's state.
    Read,
    /// Permission to write (replace/delete) a resource's state.
    Write,
    /// Permission to append (create containees) without overwriting.
    Append,
    /// Permission to read/write the resource's ACL.
    Control,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indirect_container_supertypes_include_full_chain() {
        let supers = InteractionModel::IndirectContainer.supertypes();
        assert_eq!(
            supers,
            &[
                InteractionModel::IndirectContainer,
                InteractionModel::Container,
                InteractionModel::RDFSource,
                InteractionModel::Resource,
            ]
        );
    }

    #[test]
    fn only_container_like_models_allow_post() {
        assert!(InteractionModel::BasicContainer.is_container_like());
        assert!(!InteractionModel::RDFSource.is_container_like());
        assert!(!InteractionModel::NonRDFSource.is_container_like());
    }

    #[test]
    fn type_iri_round_trips_through_from_type_iri() {
        for model in [
            InteractionModel::Resource,
            InteractionModel::RDFSource,
            InteractionModel::NonRDFSource,
            InteractionModel::Container,
            InteractionModel::BasicContainer,
            InteractionModel::DirectContainer,
            InteractionModel::IndirectContainer,
        ] {
            assert_eq!(InteractionModel::from_type_iri(model.type_iri()), Some(model));
        }
    }

    #[test]
    fn root_identity_has_empty_path() {
        let scheme = IdentityScheme {
            base_url: "https://pod.example/storage".to_owned(),
        };
        assert_eq!(scheme.internal("").as_str(), "trellis:data/");
        assert_eq!(scheme.external("").as_str(), "https://pod.example/storage/");
        assert_eq!(scheme.external("a/b").as_str(), "https://pod.example/storage/a/b");
    }
}
