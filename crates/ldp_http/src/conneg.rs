//! Content negotiation (spec.md §4.2): choice of RDF syntax and JSON-LD
//! profile from an `Accept` list, and the resolution of an `Accept-Post`/
//! `Accept-Patch` surface.

use crate::request::AcceptEntry;

/// An RDF serialization this engine can read and write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfSyntax {
    /// `text/turtle`.
    Turtle,
    /// `application/n-triples`.
    NTriples,
    /// `application/ld+json`.
    JsonLd,
    /// `text/html` (RDFa), output-only per spec.md §4.2.
    RdfaHtml,
}

impl RdfSyntax {
    /// Canonical media type for this syntax.
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Turtle => "text/turtle",
            Self::NTriples => "application/n-triples",
            Self::JsonLd => "application/ld+json",
            Self::RdfaHtml => "text/html",
        }
    }

    /// Syntaxes eligible for input (POST/PUT/PATCH bodies): RDFa is
    /// output-only per spec.md §4.2.
    pub fn input_syntaxes() -> &'static [RdfSyntax] {
        &[Self::Turtle, Self::NTriples, Self::JsonLd]
    }

    /// All syntaxes eligible for output, in the engine's preference order
    /// when a request accepts more than one equally.
    pub fn output_syntaxes() -> &'static [RdfSyntax] {
        &[Self::Turtle, Self::NTriples, Self::JsonLd, Self::RdfaHtml]
    }

    fn compatible(&self, media_range: &str) -> bool {
        media_range == "*/*" || media_range == self.media_type()
    }

    /// Resolve a request's `Content-Type` into one of the input syntaxes,
    /// if it names one (spec.md §4.6 POST step 3: "RDF types → RDFSource").
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let base = media_type.split(';').next().unwrap_or(media_type).trim();
        Self::input_syntaxes().iter().copied().find(|s| s.media_type() == base)
    }
}

/// The JSON-LD profile chosen for a response (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLdProfile {
    /// `http://www.w3.org/ns/json-ld#compacted`.
    Compacted,
    /// `http://www.w3.org/ns/json-ld#expanded`.
    Expanded,
}

impl JsonLdProfile {
    /// The profile IRI this variant names.
    pub fn iri(&self) -> &'static str {
        match self {
            Self::Compacted => "http://www.w3.org/ns/json-ld#compacted",
            Self::Expanded => "http://www.w3.org/ns/json-ld#expanded",
        }
    }

    fn from_profile_param(raw: &str) -> Option<Self> {
        raw.split_whitespace().find_map(|iri| match iri {
            "http://www.w3.org/ns/json-ld#compacted" => Some(Self::Compacted),
            "http://www.w3.org/ns/json-ld#expanded" => Some(Self::Expanded),
            _ => None,
        })
    }
}

/// A chosen RDF representation: syntax plus, for JSON-LD, profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegotiatedRdf {
    /// Chosen syntax.
    pub syntax: RdfSyntax,
    /// Chosen profile, meaningful only for [`RdfSyntax::JsonLd`].
    pub profile: Option<JsonLdProfile>,
}

/// Whether the `Accept` list is empty or contains only `*/*` (spec.md
/// §4.2's "Accept absent" default-to-Turtle case).
fn accept_is_absent_or_wildcard_only(accept: &[AcceptEntry]) -> bool {
    accept.is_empty() || accept.iter().all(|e| e.media_range == "*/*")
}

/// Negotiate an RDF syntax (and, for JSON-LD, profile) for an RDFSource or
/// Container representation (spec.md §4.2).
pub fn negotiate_rdf(accept: &[AcceptEntry], default_profile: JsonLdProfile) -> Option<NegotiatedRdf> {
    if accept_is_absent_or_wildcard_only(accept) {
        return Some(NegotiatedRdf {
            syntax: RdfSyntax::Turtle,
            profile: None,
        });
    }

    let mut ranked: Vec<&AcceptEntry> = accept.iter().filter(|e| e.q > 0.0).collect();
    ranked.sort_by(|a, b| b.q.partial_cmp(&a.q).unwrap_or(std::cmp::Ordering::Equal));

    for entry in ranked {
        for syntax in RdfSyntax::output_syntaxes() {
            if syntax.compatible(&entry.media_range) {
                let profile = if *syntax == RdfSyntax::JsonLd {
                    entry
                        .profile
                        .as_deref()
                        .and_then(JsonLdProfile::from_profile_param)
                        .or(Some(default_profile))
                } else {
                    None
                };
                return Some(NegotiatedRdf { syntax: *syntax, profile });
            }
        }
    }
    None
}

/// Negotiate representation for a NonRDFSource: either its stored MIME
/// type, or (if the Accept list names an RDF syntax instead) its RDF
/// description (spec.md §4.2 "Binary description").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryNegotiation {
    /// Serve the stored bytes with the given content type.
    Bytes,
    /// Serve the RDF description of the binary instead of its bytes.
    Description(NegotiatedRdf),
}

/// Negotiate for a NonRDFSource target. `stored_mime` is the binary's
/// stored content type.
pub fn negotiate_binary(
    accept: &[AcceptEntry],
    stored_mime: &str,
    default_profile: JsonLdProfile,
) -> Option<BinaryNegotiation> {
    if accept_is_absent_or_wildcard_only(accept) {
        return Some(BinaryNegotiation::Bytes);
    }

    let stored_compatible = accept
        .iter()
        .any(|e| e.media_range == "*/*" || e.media_range == stored_mime.to_ascii_lowercase());
    if stored_compatible {
        return Some(BinaryNegotiation::Bytes);
    }

    // Fall back to serving the RDF description, if an RDF syntax matches.
    negotiate_rdf(accept, default_profile).map(BinaryNegotiation::Description)
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    fn entry(media_range: &str, q: f32, profile: Option<&str>) -> AcceptEntry {
        AcceptEntry {
            media_range: media_range.to_owned(),
            q,
            profile: profile.map(str::to_owned),
        }
    }

    #[test]
    fn defaults_to_turtle_when_accept_absent() {
        let result = negotiate_rdf(&[], JsonLdProfile::Compacted);
        assert_eq!(result, Some(NegotiatedRdf { syntax: RdfSyntax::Turtle, profile: None }));
    }

    #[test]
    fn defaults_to_turtle_for_wildcard_only() {
        let result = negotiate_rdf(&[entry("*/*", 1.0, None)], JsonLdProfile::Compacted);
        assert_eq!(result.unwrap().syntax, RdfSyntax::Turtle);
    }

    #[test]
    fn selects_highest_q_compatible_entry() {
        let accept = vec![
            entry("application/n-triples", 0.5, None),
            entry("text/turtle", 0.9, None),
        ];
        let result = negotiate_rdf(&accept, JsonLdProfile::Compacted).unwrap();
        assert_eq!(result.syntax, RdfSyntax::Turtle);
    }

    #[test]
    fn jsonld_profile_param_selects_expanded() {
        let accept = vec![entry(
            "application/ld+json",
            1.0,
            Some("http://www.w3.org/ns/json-ld#expanded"),
        )];
        let result = negotiate_rdf(&accept, JsonLdProfile::Compacted).unwrap();
        assert_eq!(result.profile, Some(JsonLdProfile::Expanded));
    }

    #[test]
    fn jsonld_without_profile_param_uses_default() {
        let accept = vec![entry("application/ld+json", 1.0, None)];
        let result = negotiate_rdf(&accept, JsonLdProfile::Expanded).unwrap();
        assert_eq!(result.profile, Some(JsonLdProfile::Expanded));
    }

    #[test]
    fn no_compatible_entry_yields_none() {
        let accept = vec![entry("application/pdf", 1.0, None)];
        assert_eq!(negotiate_rdf(&accept, JsonLdProfile::Compacted), None);
    }

    #[test]
    fn binary_prefers_stored_mime_when_compatible() {
        let accept = vec![entry("image/png", 1.0, None)];
        let result = negotiate_binary(&accept, "image/png", JsonLdProfile::Compacted);
        assert_eq!(result, Some(BinaryNegotiation::Bytes));
    }

    #[test]
    fn binary_falls_back_to_description_for_rdf_accept() {
        let accept = vec![entry("text/turtle", 1.0, None)];
        let result = negotiate_binary(&accept, "image/png", JsonLdProfile::Compacted);
        assert!(matches!(result, Some(BinaryNegotiation::Description(_))));
    }

    #[test]
    fn binary_with_incompatible_accept_yields_none() {
        let accept = vec![entry("application/pdf", 1.0, None)];
        let result = negotiate_binary(&accept, "image/png", JsonLdProfile::Compacted);
        assert_eq!(result, None);
    }
}
