//! `Memento-Datetime` typed header, [RFC7089 §2.1.1](https://datatracker.ietf.org/doc/html/rfc7089#section-2.1.1).

use chrono::{DateTime, Utc};
use headers::{Header, HeaderName, HeaderValue};

/// Constant for the `memento-datetime` header name.
pub static MEMENTO_DATETIME: HeaderName = HeaderName::from_static("memento-datetime");

/// The `Memento-Datetime` response header: an RFC1123 timestamp stating
/// when the served Memento was captured (spec.md §4.6 GET, §4.6.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MementoDatetime(pub DateTime<Utc>);

impl std::fmt::Display for MementoDatetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.to_rfc2822())
    }
}

impl Header for MementoDatetime {
    fn name() -> &'static HeaderName {
        &MEMENTO_DATETIME
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let text = value.to_str().map_err(|_| headers::Error::invalid())?;
        let parsed = DateTime::parse_from_rfc2822(text).map_err(|_| headers::Error::invalid())?;
        Ok(Self(parsed.with_timezone(&Utc)))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let text = self.0.to_rfc2822();
        if let Ok(value) = HeaderValue::from_str(&text) {
            values.extend(std::iter::once(value));
        }
    }
}
