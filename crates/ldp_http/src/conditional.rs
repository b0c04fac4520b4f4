//! Preconditions evaluation (spec.md §4.3): `If-Match`, `If-None-Match`,
//! `If-Modified-Since`, `If-Unmodified-Since` against a resource's
//! last-modified time and computed [`ETag`]. A pure, side-effect free
//! function, matching spec.md §4.3's closing sentence and §5's "filters
//! are stateless" rule.

use chrono::{DateTime, Utc};
use headers::{ETag, Header};
use http::{HeaderMap, Method, StatusCode};

/// A single entity-tag list entry: either `*` or a concrete tag.
#[derive(Debug, Clone)]
enum MatchEntry {
    Any,
    Tag { value: String, weak: bool },
}

fn parse_match_list(headers: &HeaderMap, name: http::HeaderName) -> Vec<MatchEntry> {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(','))
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                None
            } else if entry == "*" {
                Some(MatchEntry::Any)
            } else if let Some(rest) = entry.strip_prefix("W/") {
                Some(MatchEntry::Tag {
                    value: rest.trim_matches('"').to_owned(),
                    weak: true,
                })
            } else {
                Some(MatchEntry::Tag {
                    value: entry.trim_matches('"').to_owned(),
                    weak: false,
                })
            }
        })
        .collect()
}

/// Validators computed for the resolved target resource, as consumed by
/// [`evaluate`]. `etag`/`last_modified` are `None` when the resource does
/// not exist (so `*` is the only entry that can reference it).
#[derive(Debug, Clone)]
pub struct ResourceValidators {
    /// Whether a representation currently exists at the target.
    pub exists: bool,
    /// Resource's last-modified instant, if it exists.
    pub last_modified: Option<DateTime<Utc>>,
    /// Resource's computed ETag (weak for RDFSource, strong for
    /// NonRDFSource — spec.md §3), if it exists.
    pub etag: Option<ETag>,
}

/// Build an [`ETag`] header value from an opaque value and its weakness
/// (spec.md §3: weak for RDFSource, strong for NonRDFSource).
pub fn build_etag(value: &str, weak: bool) -> ETag {
    let rendered = if weak { format!(r#"W/"{value}""#) } else { format!(r#""{value}""#) };
    rendered.parse().unwrap_or_else(|_| r#""invalid""#.parse().expect("literal etag always parses"))
}

fn etag_value(etag: &ETag) -> (String, bool) {
    let mut values = Vec::new();
    etag.encode(&mut values);
    let rendered = values
        .first()
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let weak = rendered.starts_with("W/");
    let value = rendered
        .trim_start_matches("W/")
        .trim_matches('"')
        .to_owned();
    (value, weak)
}

/// Strong comparison: same opaque value and neither side is weak.
fn strong_matches(entry: &MatchEntry, validators: &ResourceValidators) -> bool {
    let Some(etag) = &validators.etag else {
        return false;
    };
    let (value, weak) = etag_value(etag);
    match entry {
        MatchEntry::Any => validators.exists,
        MatchEntry::Tag { value: v, weak: w } => !weak && !w && v == &value,
    }
}

/// Weak comparison: same opaque value, either side may be weak.
fn weak_matches(entry: &MatchEntry, validators: &ResourceValidators) -> bool {
    let Some(etag) = &validators.etag else {
        return false;
    };
    let (value, _weak) = etag_value(etag);
    match entry {
        MatchEntry::Any => validators.exists,
        MatchEntry::Tag { value: v, .. } => v == &value,
    }
}

/// Outcome of precondition evaluation: either continue processing the
/// request, or short-circuit with the given status (304/412).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconditionOutcome {
    /// No precondition vetoed the request.
    Proceed,
    /// Short-circuit with this status code.
    ShortCircuit(StatusCode),
}

/// Evaluate preconditions in the order spec.md §4.3 mandates.
pub fn evaluate(method: &Method, headers: &HeaderMap, validators: &ResourceValidators) -> PreconditionOutcome {
    // 1. If-Match.
    let if_match = parse_match_list(headers, http::header::IF_MATCH);
    if !if_match.is_empty() && !if_match.iter().any(|e| strong_matches(e, validators)) {
        return PreconditionOutcome::ShortCircuit(StatusCode::PRECONDITION_FAILED);
    }

    // 2. If-Unmodified-Since.
    if let Some(raw) = headers.get(http::header::IF_UNMODIFIED_SINCE).and_then(|v| v.to_str().ok()) {
        if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
            if let Some(lm) = validators.last_modified {
                if lm > date.with_timezone(&Utc) {
                    return PreconditionOutcome::ShortCircuit(StatusCode::PRECONDITION_FAILED);
                }
            }
        }
    }

    let safe = matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);

    // 3. If-None-Match.
    let if_none_match = parse_match_list(headers, http::header::IF_NONE_MATCH);
    if !if_none_match.is_empty() {
        let any_weak_match = if_none_match.iter().any(|e| weak_matches(e, validators));
        if any_weak_match {
            return PreconditionOutcome::ShortCircuit(if safe {
                StatusCode::NOT_MODIFIED
            } else {
                StatusCode::PRECONDITION_FAILED
            });
        }
    }

    // 4. If-Modified-Since (safe methods only).
    if safe {
        if let Some(raw) = headers.get(http::header::IF_MODIFIED_SINCE).and_then(|v| v.to_str().ok()) {
            if let Ok(date) = DateTime::parse_from_rfc2822(raw) {
                if let Some(lm) = validators.last_modified {
                    if lm <= date.with_timezone(&Utc) {
                        return PreconditionOutcome::ShortCircuit(StatusCode::NOT_MODIFIED);
                    }
                }
            }
            // Invalid dates are ignored per spec.md §4.3.
        }
    }

    PreconditionOutcome::Proceed
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use rstest::*;

    use super::*;

    fn validators(exists: bool, etag: Option<&str>) -> ResourceValidators {
        ResourceValidators {
            exists,
            last_modified: Some(Utc::now()),
            etag: etag.map(|s| s.parse().unwrap()),
        }
    }

    #[test]
    fn if_match_weak_tag_never_satisfies() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_MATCH, HeaderValue::from_static(r#"W/"e1""#));
        let v = validators(true, Some(r#"W/"e1""#));
        let outcome = evaluate(&Method::PUT, &headers, &v);
        assert_eq!(outcome, PreconditionOutcome::ShortCircuit(StatusCode::PRECONDITION_FAILED));
    }

    #[test]
    fn if_match_strong_tag_matches() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_MATCH, HeaderValue::from_static(r#""e1""#));
        let v = validators(true, Some(r#""e1""#));
        assert_eq!(evaluate(&Method::PUT, &headers, &v), PreconditionOutcome::Proceed);
    }

    #[test]
    fn if_match_star_requires_existence() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_MATCH, HeaderValue::from_static("*"));
        let missing = validators(false, None);
        assert_eq!(
            evaluate(&Method::PUT, &headers, &missing),
            PreconditionOutcome::ShortCircuit(StatusCode::PRECONDITION_FAILED)
        );
        let existing = validators(true, Some(r#""e1""#));
        assert_eq!(evaluate(&Method::PUT, &headers, &existing), PreconditionOutcome::Proceed);
    }

    #[rstest]
    #[case(Method::GET, StatusCode::NOT_MODIFIED)]
    #[case(Method::PUT, StatusCode::PRECONDITION_FAILED)]
    fn if_none_match_weak_match_depends_on_safety(#[case] method: Method, #[case] expected: StatusCode) {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_NONE_MATCH, HeaderValue::from_static(r#"W/"e1""#));
        let v = validators(true, Some(r#"W/"e1""#));
        assert_eq!(evaluate(&method, &headers, &v), PreconditionOutcome::ShortCircuit(expected));
    }

    #[test]
    fn if_modified_since_not_modified() {
        let mut headers = HeaderMap::new();
        let lm = DateTime::parse_from_rfc2822("Mon, 01 Jan 2024 00:00:00 GMT").unwrap();
        headers.insert(
            http::header::IF_MODIFIED_SINCE,
            HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"),
        );
        let v = ResourceValidators {
            exists: true,
            last_modified: Some(lm.with_timezone(&Utc)),
            etag: None,
        };
        assert_eq!(evaluate(&Method::GET, &headers, &v), PreconditionOutcome::ShortCircuit(StatusCode::NOT_MODIFIED));
    }

    #[test]
    fn build_etag_round_trips_weak_and_strong() {
        assert_eq!(build_etag("abc", true).to_string(), r#"W/"abc""#);
        assert_eq!(build_etag("abc", false).to_string(), r#""abc""#);
    }

    #[test]
    fn invalid_if_modified_since_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_MODIFIED_SINCE, HeaderValue::from_static("not-a-date"));
        let v = validators(true, None);
        assert_eq!(evaluate(&Method::GET, &headers, &v), PreconditionOutcome::Proceed);
    }
}
