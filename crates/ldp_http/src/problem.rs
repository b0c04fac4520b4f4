//! A reified, dynamically-typed error ([`Problem`]) that crosses
//! collaborator boundaries, plus a catalogue of named problem types and
//! the single mapping table from a [`Problem`] to an [`ApiError`] that the
//! HTTP edge actually returns.

use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::{Deref, DerefMut},
};

use http::{
    header::{CONTENT_LENGTH, CONTENT_TYPE},
    HeaderValue, Response, StatusCode,
};
use headers::HeaderMapExt;
use http_api_problem::{ApiError, ApiErrorBuilder, PROBLEM_JSON_MEDIA_TYPE};
use typed_record::{TypedRecord, TypedRecordKey};

use crate::body::{self, Body};
use crate::header::link::{Link, LinkValue};

/// A dynamically typed problem, encoding its kind as a type-url.
///
/// Mirrors the split the engine needs between collaborator-internal errors
/// (which only know their semantic kind) and HTTP-edge errors (which also
/// know their status code): a `Problem` carries the former and is mapped
/// to an [`ApiError`] exactly once, at the method-handler boundary.
pub struct Problem(ApiError);

/// Alias for results with [`Problem`] as error type.
pub type ProbResult<T> = Result<T, Problem>;

impl Default for Problem {
    fn default() -> Self {
        Self(ApiError::new(StatusCode::IM_A_TEAPOT))
    }
}

impl Problem {
    /// New, untyped problem.
    pub fn new() -> Self {
        Self::default()
    }

    /// New problem builder.
    pub fn builder() -> ProblemBuilder {
        ProblemBuilder(ApiError::builder(StatusCode::IM_A_TEAPOT))
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match (self.0.title().as_ref(), self.0.detail_message()) {
            (Some(title), Some(detail)) => write!(f, "{title} - {detail}"),
            (Some(title), None) => write!(f, "{title}"),
            (None, Some(detail)) => write!(f, "{detail}"),
            (None, None) => match self.0.type_url().as_ref() {
                Some(type_url) => write!(f, "problem of type {type_url}"),
                None => write!(f, "unspecified problem"),
            },
        }
    }
}

impl Debug for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Error for Problem {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl Deref for Problem {
    type Target = ApiError;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Problem {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<ApiError> for Problem {
    fn from(inner: ApiError) -> Self {
        Self(inner)
    }
}

impl Problem {
    /// Render this problem as a `problem+json` HTTP response (spec.md
    /// §7: "a plain-text message"; rendered here as a structured problem
    /// document, the richer analogue the rest of the body covers). A
    /// [`KConstraintViolation`] extension, if present, is rendered as the
    /// `Link rel="constrainedBy"` header spec.md §4.6 POST/PUT requires.
    /// Callers that need other extra headers (`WWW-Authenticate`, `Allow`)
    /// attach them to the returned response themselves, since nothing
    /// else on `Problem` carries header-level state.
    pub fn into_response(self) -> Response<Body> {
        let violation = self.0.extensions().get_rv::<KConstraintViolation>().copied();
        let problem = self.0.into_http_api_problem();
        let json = problem.json_bytes();
        let length = json.len() as u64;

        let mut response = Response::new(body::full(json));
        *response.status_mut() = problem.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON_MEDIA_TYPE));
        response.headers_mut().insert(
            CONTENT_LENGTH,
            HeaderValue::from_str(&length.to_string()).unwrap_or_else(|_| HeaderValue::from_static("0")),
        );
        if let Some(violation) = violation {
            let link = Link {
                values: vec![LinkValue::new(violation.vocab_iri(), "http://www.w3.org/ns/ldp#constrainedBy")],
            };
            response.headers_mut().typed_insert(link);
        }
        response
    }
}

/// Builder for [`Problem`].
pub struct ProblemBuilder(ApiErrorBuilder);

impl ProblemBuilder {
    /// Human-facing title.
    pub fn title<T: Display>(mut self, title: T) -> Self {
        self.0 = self.0.title(title);
        self
    }

    /// Human-facing detail message.
    pub fn message<M: Display>(mut self, message: M) -> Self {
        self.0 = self.0.message(message);
        self
    }

    /// Problem-type identifying url.
    pub fn type_url<U: Display>(mut self, type_url: U) -> Self {
        self.0 = self.0.type_url(type_url);
        self
    }

    /// Underlying source error.
    pub fn source<E: Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.0 = self.0.source(source);
        self
    }

    /// Finish, producing a [`Problem`].
    pub fn finish(self) -> Problem {
        Problem(self.0.finish())
    }
}

impl Deref for ProblemBuilder {
    type Target = ApiErrorBuilder;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ProblemBuilder {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Extension trait letting [`ProblemBuilder`]/[`ApiErrorBuilder`] carry
/// strongly typed extension values instead of raw `http::Extensions`
/// insertions.
pub trait ProblemBuilderExt: Sized {
    /// Attach a typed extension value.
    fn extend_with<K: TypedRecordKey>(self, v: K::Value) -> Self;

    /// Attach a typed extension value if present.
    fn extend_with_opt<K: TypedRecordKey>(self, v: Option<K::Value>) -> Self;
}

impl ProblemBuilderExt for ApiErrorBuilder {
    fn extend_with<K: TypedRecordKey>(mut self, v: K::Value) -> Self {
        self.extensions.insert_rec_item::<K>(v);
        self
    }

    fn extend_with_opt<K: TypedRecordKey>(self, v: Option<K::Value>) -> Self {
        match v {
            Some(v) => self.extend_with::<K>(v),
            None => self,
        }
    }
}

impl ProblemBuilderExt for ProblemBuilder {
    fn extend_with<K: TypedRecordKey>(mut self, v: K::Value) -> Self {
        self.0 = self.0.extend_with::<K>(v);
        self
    }

    fn extend_with_opt<K: TypedRecordKey>(mut self, v: Option<K::Value>) -> Self {
        self.0 = self.0.extend_with_opt::<K>(v);
        self
    }
}

/// A named problem type: a type-url plus a title, reusable across call
/// sites so a given failure mode is only ever spelled once.
pub struct ProblemType {
    /// Type-identifying url.
    pub id: &'static str,
    /// Short human-readable title.
    pub title: &'static str,
}

impl ProblemType {
    /// New [`ProblemBuilder`] seeded with this type's url and title.
    pub fn new_problem_builder(&self) -> ProblemBuilder {
        Problem::builder().type_url(self.id).title(self.title)
    }

    /// New [`Problem`] of this type, with no further detail.
    pub fn new_problem(&self) -> Problem {
        self.new_problem_builder().finish()
    }

    /// Whether the given problem carries this type's url.
    pub fn is_type_of(&self, p: &Problem) -> bool {
        p.type_url().map(|u| u == self.id).unwrap_or(false)
    }

    /// New [`ApiErrorBuilder`] of this type at a specific HTTP status,
    /// for call sites that map one problem kind to more than one status
    /// depending on context (e.g. access-denied is 401 for an anonymous
    /// agent, 403 otherwise).
    pub fn new_api_error_builder(&self, status: StatusCode) -> ApiErrorBuilder {
        ApiError::builder(status).type_url(self.id).title(self.title)
    }
}

/// Catalogue of problem kinds used across the engine (spec.md §7 taxonomy
/// plus internal-only kinds), each mapped to exactly one HTTP status by
/// the method-handler `map_problem` functions that consume them.
pub mod catalogue {
    use super::ProblemType;

    /// Agent lacks a required ACL mode; whether this becomes 401 or 403
    /// depends on whether the agent is anonymous (decided by the caller).
    pub static ACCESS_DENIED: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/access-denied",
        title: "Access denied",
    };

    /// A conditional request header was not satisfied.
    pub static PRECONDITIONS_NOT_SATISFIED: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/preconditions-not-satisfied",
        title: "Preconditions not satisfied",
    };

    /// Operation not supported for the resource's interaction model.
    pub static UNSUPPORTED_OPERATION: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/unsupported-operation",
        title: "Unsupported operation",
    };

    /// A `Range` request could not be satisfied against the resource.
    pub static RANGE_NOT_SATISFIABLE: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/range-not-satisfiable",
        title: "Range not satisfiable",
    };

    /// An LDP constraint (type/cardinality/range) was violated.
    pub static CONSTRAINT_VIOLATION: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/constraint-violation",
        title: "LDP constraint violation",
    };

    /// Malformed client input (header, RDF body, SPARQL-Update, Slug...).
    pub static CLIENT_SYNTAX: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/client-syntax",
        title: "Malformed request",
    };

    /// Target resource does not exist and never did.
    pub static NOT_FOUND: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/not-found",
        title: "Not found",
    };

    /// Target resource existed once but was deleted.
    pub static GONE: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/gone",
        title: "Gone",
    };

    /// No acceptable representation for the request's `Accept`.
    pub static NOT_ACCEPTABLE: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/not-acceptable",
        title: "Not acceptable",
    };

    /// Collaborator fault with no more specific mapping; surfaces as 500.
    pub static INTERNAL_ERROR: ProblemType = ProblemType {
        id: "tag:ldp_http,2024:problem/internal-error",
        title: "Internal error",
    };
}

/// Vocabulary IRIs used in `Link: rel="http://www.w3.org/ns/ldp#constrainedBy"`
/// responses (spec.md §4.6 POST/PUT, §7). Represented as an enum rather than
/// bare strings so call sites can't typo the rel target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    /// A statement uses a property with an illegal object type (e.g.
    /// `rdf:type` with a literal object).
    InvalidRange,
    /// A Direct/Indirect Container membership triple has illegal cardinality.
    InvalidCardinality,
    /// A `Link rel="type"` names an interaction model incompatible with the
    /// parent or body.
    UnsupportedInteractionModel,
}

impl ConstraintViolation {
    /// The vocabulary IRI this violation kind is reported under.
    pub fn vocab_iri(&self) -> &'static str {
        match self {
            Self::InvalidRange => "http://www.w3.org/ns/ldp#constrainedByInvalidRange",
            Self::InvalidCardinality => "http://www.w3.org/ns/ldp#constrainedByInvalidCardinality",
            Self::UnsupportedInteractionModel => {
                "http://www.w3.org/ns/ldp#constrainedByUnsupportedInteractionModel"
            }
        }
    }
}

/// Typed-record key carrying a [`ConstraintViolation`] on a 409 [`Problem`],
/// read back by response assembly to emit the `constrainedBy` Link header.
#[derive(Debug, Clone, Copy)]
pub struct KConstraintViolation;

impl TypedRecordKey for KConstraintViolation {
    type Value = ConstraintViolation;
}
