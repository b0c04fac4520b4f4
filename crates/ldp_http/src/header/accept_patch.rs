//! `Accept-Patch` typed header, [RFC5789](https://datatracker.ietf.org/doc/html/rfc5789#section-3.1).

use headers::{Header, HeaderName, HeaderValue};
use mime::Mime;

/// Constant for the `accept-patch` header name.
pub static ACCEPT_PATCH: HeaderName = HeaderName::from_static("accept-patch");

/// The `Accept-Patch` response header. The engine only ever advertises
/// `application/sparql-update` (spec.md §4.6 PATCH).
#[derive(Debug, Clone)]
pub struct AcceptPatch {
    /// Accepted media ranges.
    pub media_ranges: Vec<Mime>,
}

impl Default for AcceptPatch {
    fn default() -> Self {
        Self {
            media_ranges: vec!["application/sparql-update".parse().expect("valid mime")],
        }
    }
}

impl Header for AcceptPatch {
    fn name() -> &'static HeaderName {
        &ACCEPT_PATCH
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
