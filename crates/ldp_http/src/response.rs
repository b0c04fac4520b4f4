//! Response Assembly (spec.md §4.7): a small builder collecting the
//! headers method handlers contribute, emitted in the order spec.md §4.7
//! specifies. Handlers push onto an [`AssembledResponse`]; it is
//! finalized into an `http::Response` exactly once per request.

use headers::{ETag, HeaderMapExt, LastModified};
use http::{HeaderMap, Response, StatusCode};

use crate::{
    body::{self, Body},
    header::link::Link,
};

/// Accumulates response metadata as a method handler runs, so the final
/// `http::Response` is assembled in one place (spec.md §4.7's ordered
/// header list), regardless of how many intermediate steps contributed to
/// it.
#[derive(Debug, Default)]
pub struct AssembledResponse {
    /// Status code; defaults to 200 if never set.
    pub status: Option<StatusCode>,
    /// Last-Modified.
    pub last_modified: Option<LastModified>,
    /// ETag (weak for RDFSource, strong for NonRDFSource).
    pub etag: Option<ETag>,
    /// All Link header values accumulated so far (type hierarchy, hub,
    /// self, describes/describedby, timegate/original/timemap/memento,
    /// constrainedBy...).
    pub links: Link,
    /// Any other headers (Allow, Accept-Patch, Accept-Post, Vary,
    /// Content-Type, Cache-Control, Memento-Datetime,
    /// Preference-Applied, Content-Location, Location, Accept-Ranges).
    pub extra_headers: HeaderMap,
    /// Response body.
    pub body: Option<Body>,
}

impl AssembledResponse {
    /// New, empty assembler defaulting to 200 OK.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Set Last-Modified.
    pub fn last_modified(mut self, lm: LastModified) -> Self {
        self.last_modified = Some(lm);
        self
    }

    /// Set ETag.
    pub fn etag(mut self, etag: ETag) -> Self {
        self.etag = Some(etag);
        self
    }

    /// Append a Link value.
    pub fn add_link(mut self, value: crate::header::link::LinkValue) -> Self {
        self.links.values.push(value);
        self
    }

    /// Insert a raw header.
    pub fn header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// Append a raw header (allowing repeats, e.g. multiple `Vary` tokens
    /// are instead joined by the caller into one value).
    pub fn append_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self {
        self.extra_headers.append(name, value);
        self
    }

    /// Insert a typed header via its `headers::Header` encoding.
    pub fn typed_header<H: headers::Header>(mut self, value: H) -> Self {
        self.extra_headers.typed_insert(value);
        self
    }

    /// Set the body.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Finalize into an `http::Response`.
    pub fn finish(self) -> Response<Body> {
        let mut builder = Response::builder().status(self.status.unwrap_or(StatusCode::OK));

        {
            let headers = builder.headers_mut().expect("builder has no error yet");
            if let Some(lm) = &self.last_modified {
                headers.typed_insert(lm.clone());
            }
            if let Some(etag) = &self.etag {
                headers.typed_insert(etag.clone());
            }
            if !self.links.values.is_empty() {
                headers.typed_insert(self.links.clone());
            }
            for (name, value) in self.extra_headers.iter() {
                headers.append(name.clone(), value.clone());
            }
        }

        builder
            .body(self.body.unwrap_or_else(body::empty))
            .expect("assembled response parts are always valid")
    }
}

#[cfg(test)]
mod tests {
    use http::header::CACHE_CONTROL;

    use super::*;
    use crate::header::link::LinkValue;

    #[test]
    fn finish_applies_accumulated_headers() {
        let response = AssembledResponse::new()
            .status(StatusCode::OK)
            .add_link(LinkValue::new("http://example.org/r", "self"))
            .header(CACHE_CONTROL, http::HeaderValue::from_static("max-age=60"))
            .finish();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(http::header::LINK).is_some());
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "max-age=60"
        );
    }
}
