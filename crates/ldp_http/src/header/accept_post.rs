//! `Accept-Post` typed header, [LDP §4.2.1.5](https://www.w3.org/TR/ldp/#ldpc-post-acceptposthdr).

use headers::{Header, HeaderName, HeaderValue};
use mime::Mime;

/// Constant for the `accept-post` header name.
pub static ACCEPT_POST: HeaderName = HeaderName::from_static("accept-post");

/// The `Accept-Post` response header: the RDF input syntaxes a container
/// accepts, plus `*/*` to admit arbitrary binaries (spec.md §4.6 POST).
#[derive(Debug, Clone)]
pub struct AcceptPost {
    /// Accepted media ranges.
    pub media_ranges: Vec<Mime>,
}

impl Default for AcceptPost {
    fn default() -> Self {
        Self {
            media_ranges: vec![
                "text/turtle".parse().expect("valid mime"),
                "application/n-triples".parse().expect("valid mime"),
                "application/ld+json".parse().expect("valid mime"),
                "*/*".parse().expect("valid mime"),
            ],
        }
    }
}

impl Header for AcceptPost {
    fn name() -> &'static HeaderName {
        &ACCEPT_POST
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let mut ranges = Vec::new();
        for value in values {
            let text = value.to_str().map_err(|_| headers::Error::invalid())?;
            for part in text.split(',') {
                ranges.push(part.trim().parse().map_err(|_| headers::Error::invalid())?);
            }
        }
        if ranges.is_empty() {
            return Err(headers::Error::invalid());
        }
        Ok(Self { media_ranges: ranges })
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let text = self
            .media_ranges
            .iter()
            .map(|m| m.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&text) {
            values.extend(std::iter::once(value));
        }
    }
}
