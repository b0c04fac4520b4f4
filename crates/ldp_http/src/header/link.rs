//! `Link` typed header, [RFC8288](https://datatracker.ietf.org/doc/html/rfc8288),
//! modelling only the parameters spec.md uses: `rel`, `type`, `datetime`,
//! `title`.

use std::fmt::Write as _;

use headers::{Header, HeaderName, HeaderValue};

/// Rel value for the LDP interaction-model type links.
pub const TYPE_REL: &str = "type";
/// Rel value for a WebSub hub advertisement.
pub const HUB_REL: &str = "hub";
/// Rel value for the canonical self link.
pub const SELF_REL: &str = "self";
/// Rel value pointing from a binary's metadata response to its bytes.
pub const DESCRIBES_REL: &str = "describes";
/// Rel value pointing from a binary's bytes to its RDF description.
pub const DESCRIBEDBY_REL: &str = "describedby";
/// Rel value for the Memento TimeGate.
pub const TIMEGATE_REL: &str = "timegate";
/// Rel value for the original (versioned) resource, from a Memento/TimeGate.
pub const ORIGINAL_REL: &str = "original";
/// Rel value for a resource's TimeMap.
pub const TIMEMAP_REL: &str = "timemap";
/// Rel value for a single Memento entry in a TimeMap.
pub const MEMENTO_REL: &str = "memento";
/// Rel value for the constraint vocabulary IRI on a 409 response.
pub const CONSTRAINED_BY_REL: &str = "http://www.w3.org/ns/ldp#constrainedBy";

/// A single `Link` header value: target IRI plus its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkValue {
    /// Target IRI.
    pub target: String,
    /// `rel` parameter.
    pub rel: String,
    /// Optional Memento `datetime` parameter (RFC 1123 formatted).
    pub datetime: Option<String>,
    /// Additional free-form parameters rendered as `name="value"`, in
    /// insertion order (used for e.g. `first`/`last` markers' own `rel`
    /// duplication or a memento's `rel="memento first"`).
    pub extra_params: Vec<(String, String)>,
}

impl LinkValue {
    /// New link value with just a target and rel.
    pub fn new(target: impl Into<String>, rel: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            rel: rel.into(),
            datetime: None,
            extra_params: Vec::new(),
        }
    }

    /// Attach a `datetime` parameter.
    pub fn with_datetime(mut self, datetime: impl Into<String>) -> Self {
        self.datetime = Some(datetime.into());
        self
    }

    /// Attach an arbitrary extra parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_params.push((name.into(), value.into()));
        self
    }

    fn write(&self, out: &mut String) {
        let _ = write!(out, "<{}>; rel=\"{}\"", self.target, self.rel);
        if let Some(dt) = &self.datetime {
            let _ = write!(out, "; datetime=\"{dt}\"");
        }
        for (name, value) in &self.extra_params {
            let _ = write!(out, "; {name}=\"{value}\"");
        }
    }
}

impl std::fmt::Display for LinkValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        self.write(&mut out);
        f.write_str(&out)
    }
}

/// The `Link` header: one or more [`LinkValue`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    /// The parsed link values, in header order.
    pub values: Vec<LinkValue>,
}

/// Constant for the `link` header name.
pub static LINK: HeaderName = HeaderName::from_static("link");

impl Header for Link {
    fn name() -> &'static HeaderName {
        &LINK
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let mut out = Vec::new();
        for value in values {
            let text = value.to_str().map_err(|_| headers::Error::invalid())?;
            for entry in split_link_entries(text) {
                out.push(parse_link_value(entry).ok_or_else(headers::Error::invalid)?);
            }
        }
        Ok(Link { values: out })
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if self.values.is_empty() {
            return;
        }
        let mut text = String::new();
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                text.push_str(", ");
            }
            v.write(&mut text);
        }
        if let Ok(value) = HeaderValue::from_str(&text) {
            values.extend(std::iter::once(value));
        }
    }
}

/// Split a `Link` header value into comma-separated entries, respecting
/// commas inside quoted parameter values.
fn split_link_entries(text: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                entries.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    let last = text[start..].trim();
    if !last.is_empty() {
        entries.push(last);
    }
    entries
}

fn parse_link_value(entry: &str) -> Option<LinkValue> {
    let entry = entry.trim();
    let (target, rest) = entry.strip_prefix('<').and_then(|s| s.split_once('>'))?;
    let mut rel = String::new();
    let mut datetime = None;
    let mut extra_params = Vec::new();
    for param in rest.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, value) = param.split_once('=')?;
        let value = value.trim().trim_matches('"');
        match name.trim() {
            "rel" => rel = value.to_owned(),
            "datetime" => datetime = Some(value.to_owned()),
            other => extra_params.push((other.to_owned(), value.to_owned())),
        }
    }
    Some(LinkValue {
        target: target.to_owned(),
        rel,
        datetime,
        extra_params,
    })
}

#[cfg(test)]
mod tests {
    use claims::*;

    use super::*;

    #[test]
    fn round_trips_single_value() {
        let value = assert_ok!(HeaderValue::from_str(
            "<http://example.org/r>; rel=\"type\""
        ));
        let link = assert_ok!(Link::decode(&mut std::iter::once(&value)));
        assert_eq!(link.values.len(), 1);
        assert_eq!(link.values[0].target, "http://example.org/r");
        assert_eq!(link.values[0].rel, "type");
    }

    #[test]
    fn decodes_multiple_comma_separated_values() {
        let value = assert_ok!(HeaderValue::from_str(
            "<http://example.org/a>; rel=\"memento\"; datetime=\"Mon, 01 Jan 2024 00:00:00 GMT\", <http://example.org/b>; rel=\"self\""
        ));
        let link = assert_ok!(Link::decode(&mut std::iter::once(&value)));
        assert_eq!(link.values.len(), 2);
        assert_eq!(link.values[0].rel, "memento");
        assert_eq!(
            link.values[0].datetime.as_deref(),
            Some("Mon, 01 Jan 2024 00:00:00 GMT")
        );
        assert_eq!(link.values[1].rel, "self");
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let link = Link {
            values: vec![
                LinkValue::new("http://example.org/r", TYPE_REL),
                LinkValue::new("http://example.org/r", "hub"),
            ],
        };
        let mut encoded = Vec::new();
        link.encode(&mut encoded);
        let decoded = assert_ok!(Link::decode(&mut encoded.iter()));
        assert_eq!(decoded, link);
    }
}
