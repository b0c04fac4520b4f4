//! The Request Model (spec.md §4.1): a parsed view of an incoming request
//! carrying exactly the fields the rest of the engine needs, plus path
//! normalization and POST `Slug` sanitization.

use headers::{
    ETag, HeaderMapExt, IfMatch, IfModifiedSince, IfNoneMatch, IfUnmodifiedSince, Range,
};
use http::{request::Parts, Method};

use crate::{
    header::{digest::Digest, link::Link, prefer::Prefer, slug::Slug},
    problem::{catalogue, Problem, ProblemBuilderExt},
};

/// Name of the `ext` query parameter.
pub const EXT_PARAM: &str = "ext";
/// Name of the `version` query parameter.
pub const VERSION_PARAM: &str = "version";

/// The virtual extension a request targets, from the `ext`/`version` query
/// parameters (spec.md §3 "Extension").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    /// No extension: the resource itself.
    None,
    /// `ext=acl`.
    Acl,
    /// `ext=timemap`.
    TimeMap,
    /// `?version=<epoch-seconds>`.
    Version(i64),
}

impl Extension {
    /// Whether this extension is mutually exclusive with state-changing
    /// methods other than GET/HEAD/OPTIONS (spec.md §3 invariants).
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::TimeMap | Self::Version(_))
    }
}

/// Parsed `Accept-Datetime` header (an HTTP-date naming the instant a
/// Memento TimeGate lookup should resolve against).
#[derive(Debug, Clone, Copy)]
pub struct AcceptDatetime(pub chrono::DateTime<chrono::Utc>);

/// The parsed view of an incoming request that filters and method
/// handlers operate over.
#[derive(Debug, Clone)]
pub struct RequestModel {
    /// HTTP method.
    pub method: Method,
    /// External path, with leading slash stripped (spec.md §4.1).
    pub path: String,
    /// Whether the original request path carried a trailing slash.
    pub trailing_slash: bool,
    /// `ext`/`version` derived target extension.
    pub extension: Extension,
    /// Optional LDF triple-pattern selectors (spec.md §6 query params).
    pub ldf_subject: Option<String>,
    pub ldf_predicate: Option<String>,
    pub ldf_object: Option<String>,
    /// Parsed `Accept` list (media type + raw parameter string), in
    /// client-stated order.
    pub accept: Vec<AcceptEntry>,
    /// Parsed `Prefer` header.
    pub prefer: Option<Prefer>,
    /// Parsed `Slug` header (POST only), pre-sanitization.
    pub slug: Option<Slug>,
    /// Parsed `Digest` header.
    pub digest: Option<Digest>,
    /// Parsed `Link` header.
    pub link: Option<Link>,
    /// Parsed `Accept-Datetime` header.
    pub accept_datetime: Option<AcceptDatetime>,
    /// Parsed `Range` header.
    pub range: Option<Range>,
    /// `If-Match`.
    pub if_match: Option<IfMatch>,
    /// `If-None-Match`.
    pub if_none_match: Option<IfNoneMatch>,
    /// `If-Modified-Since`.
    pub if_modified_since: Option<IfModifiedSince>,
    /// `If-Unmodified-Since`.
    pub if_unmodified_since: Option<IfUnmodifiedSince>,
    /// Raw `ETag` carried for diagnostics/testing convenience only.
    pub etag: Option<ETag>,
}

/// One entry of a parsed `Accept` header: media type plus raw parameters
/// (kept raw since `profile="..."` needs its literal IRI list, not a mime
/// crate round-trip).
#[derive(Debug, Clone)]
pub struct AcceptEntry {
    /// `type/subtype`, lowercased.
    pub media_range: String,
    /// q-value, default 1.0.
    pub q: f32,
    /// Raw `profile` parameter value, if present (space-separated IRIs).
    pub profile: Option<String>,
}

impl RequestModel {
    /// Build a [`RequestModel`] from request parts and the configured
    /// external base path prefix (already stripped by the router).
    ///
    /// Returns a `400`-flavoured [`Problem`] if `Prefer`, `Accept-Datetime`,
    /// `Range`, or `Digest` are present but unparseable (spec.md §4.1).
    pub fn parse(parts: &Parts, raw_path: &str, raw_query: Option<&str>) -> Result<Self, Problem> {
        let trailing_slash = raw_path.len() > 1 && raw_path.ends_with('/');
        let path = raw_path.trim_start_matches('/').trim_end_matches('/').to_owned();

        let query = raw_query.map(parse_query).unwrap_or_default();
        let extension = resolve_extension(&query)?;

        let prefer = parts
            .headers
            .get(crate::header::prefer::PREFER.clone())
            .map(|_| {
                parts
                    .headers
                    .typed_get::<Prefer>()
                    .ok_or_else(|| bad_request("Malformed Prefer header"))
            })
            .transpose()?;

        let digest = parts
            .headers
            .get(crate::header::digest::DIGEST.clone())
            .map(|_| {
                parts
                    .headers
                    .typed_get::<Digest>()
                    .ok_or_else(|| bad_request("Malformed Digest header"))
            })
            .transpose()?;

        let link = parts.headers.typed_get::<Link>();
        let slug = parts.headers.typed_get::<Slug>();

        let accept_datetime = parts
            .headers
            .get(http::header::HeaderName::from_static("accept-datetime"))
            .map(|v| {
                let text = v.to_str().map_err(|_| bad_request("Malformed Accept-Datetime header"))?;
                chrono::DateTime::parse_from_rfc2822(text)
                    .map(|dt| AcceptDatetime(dt.with_timezone(&chrono::Utc)))
                    .map_err(|_| bad_request("Malformed Accept-Datetime header"))
            })
            .transpose()?;

        let range = parts
            .headers
            .get(http::header::RANGE)
            .map(|_| {
                parts
                    .headers
                    .typed_get::<Range>()
                    .ok_or_else(|| bad_request("Malformed Range header"))
            })
            .transpose()?;

        let accept = parts
            .headers
            .get_all(http::header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(parse_accept_header)
            .collect();

        Ok(Self {
            method: parts.method.clone(),
            path,
            trailing_slash,
            extension,
            ldf_subject: query.get("subject").cloned(),
            ldf_predicate: query.get("predicate").cloned(),
            ldf_object: query.get("object").cloned(),
            accept,
            prefer,
            slug,
            digest,
            link,
            accept_datetime,
            range,
            if_match: parts.headers.typed_get(),
            if_none_match: parts.headers.typed_get(),
            if_modified_since: parts.headers.typed_get(),
            if_unmodified_since: parts.headers.typed_get(),
            etag: parts.headers.typed_get(),
        })
    }

    /// Whether this is one of the three safe, state-preserving methods.
    pub fn is_safe_method(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD | Method::OPTIONS)
    }

    /// The parent path for a POST-created child (spec.md §4.1).
    pub fn child_path(&self, slug_segment: &str) -> String {
        if self.path.is_empty() {
            slug_segment.to_owned()
        } else {
            format!("{}/{}", self.path, slug_segment)
        }
    }
}

fn bad_request(msg: &'static str) -> Problem {
    catalogue::CLIENT_SYNTAX
        .new_problem_builder()
        .message(msg)
        .finish()
}

fn resolve_extension(query: &std::collections::HashMap<String, String>) -> Result<Extension, Problem> {
    if let Some(v) = query.get(VERSION_PARAM) {
        let epoch: i64 = v
            .parse()
            .map_err(|_| bad_request("Malformed version query parameter"))?;
        return Ok(Extension::Version(epoch));
    }
    match query.get(EXT_PARAM).map(String::as_str) {
        Some("acl") => Ok(Extension::Acl),
        Some("timemap") => Ok(Extension::TimeMap),
        Some(_) | None => Ok(Extension::None),
    }
}

fn parse_query(raw: &str) -> std::collections::HashMap<String, String> {
    raw.split('&')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let k = percent_encoding::percent_decode_str(k).decode_utf8_lossy().into_owned();
            let v = percent_encoding::percent_decode_str(v).decode_utf8_lossy().into_owned();
            Some((k, v))
        })
        .collect()
}

fn parse_accept_header(text: &str) -> Vec<AcceptEntry> {
    text.split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';').map(str::trim);
            let media_range = parts.next()?.to_ascii_lowercase();
            if media_range.is_empty() {
                return None;
            }
            let mut q = 1.0f32;
            let mut profile = None;
            for param in parts {
                if let Some(v) = param.strip_prefix("q=") {
                    q = v.trim().parse().unwrap_or(1.0);
                } else if let Some(v) = param.strip_prefix("profile=") {
                    profile = Some(v.trim().trim_matches('"').to_owned());
                }
            }
            Some(AcceptEntry { media_range, q, profile })
        })
        .collect()
}

/// Percent-decode, strip fragment/query, collapse whitespace/`/` runs into
/// a single `_`, falling back to `None` (server-generated identifier) when
/// the result is empty or the header failed to decode (spec.md §4.1).
pub fn sanitize_slug(slug: &Slug) -> Option<String> {
    let raw: &str = slug;
    let cut = raw
        .find(['#', '?'])
        .map(|i| &raw[..i])
        .unwrap_or(raw);

    let mut out = String::with_capacity(cut.len());
    let mut last_was_sep = false;
    for c in cut.chars() {
        if c.is_whitespace() || c == '/' {
            if !last_was_sep && !out.is_empty() {
                out.push('_');
            }
            last_was_sep = true;
        } else {
            out.push(c);
            last_was_sep = false;
        }
    }
    // Trailing separator run collapses to nothing, not a trailing `_`.
    while out.ends_with('_') {
        out.pop();
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("my post title", "my_post_title")]
    #[case("a//b   c", "a_b_c")]
    #[case("trailing/", "trailing")]
    #[case("###only-fragment", "")]
    #[case("   ", "")]
    fn sanitize_slug_matches_spec(#[case] input: &str, #[case] expected: &str) {
        let slug: Slug = input.into();
        let result = sanitize_slug(&slug);
        if expected.is_empty() {
            assert!(result.is_none());
        } else {
            assert_eq!(result.as_deref(), Some(expected));
        }
    }

    #[test]
    fn child_path_joins_parent_and_slug() {
        let req = RequestModel {
            method: Method::POST,
            path: "c".to_owned(),
            trailing_slash: false,
            extension: Extension::None,
            ldf_subject: None,
            ldf_predicate: None,
            ldf_object: None,
            accept: vec![],
            prefer: None,
            slug: None,
            digest: None,
            link: None,
            accept_datetime: None,
            range: None,
            if_match: None,
            if_none_match: None,
            if_modified_since: None,
            if_unmodified_since: None,
            etag: None,
        };
        assert_eq!(req.child_path("child"), "c/child");
    }

    #[test]
    fn root_child_path_has_no_leading_slash() {
        let req = RequestModel {
            method: Method::POST,
            path: String::new(),
            trailing_slash: false,
            extension: Extension::None,
            ldf_subject: None,
            ldf_predicate: None,
            ldf_object: None,
            accept: vec![],
            prefer: None,
            slug: None,
            digest: None,
            link: None,
            accept_datetime: None,
            range: None,
            if_match: None,
            if_none_match: None,
            if_modified_since: None,
            if_unmodified_since: None,
            etag: None,
        };
        assert_eq!(req.child_path("child"), "child");
    }
}
