//! `Slug` typed header, [RFC5023 §9.7](https://datatracker.ietf.org/doc/html/rfc5023#section-9.7).

use std::{borrow::Cow, fmt::Display, ops::Deref};

use headers::{Header, HeaderName, HeaderValue};
use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, CONTROLS};

/// Constant for the `slug` header name.
pub static SLUG: HeaderName = HeaderName::from_static("slug");

/// Ascii-set encoded when writing a `Slug` header value back out.
pub static SLUG_ENCODE_ASCII_SET: AsciiSet = CONTROLS.add(b'%');

/// The `Slug` header: a client hint for the path segment a POST-created
/// resource should be stored under (spec.md §4.1).
///
/// Decoding percent-decodes the raw header bytes per RFC5023; it does not
/// perform the sanitization spec.md §4.1 requires for POST (stripping
/// fragment/query, collapsing whitespace/`/`) — that happens in
/// `request::sanitize_slug`, kept separate so header decoding stays a pure
/// reflection of wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slug {
    pct_decoded: String,
}

impl Header for Slug {
    fn name() -> &'static HeaderName {
        &SLUG
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let mut text = String::new();
        for value in values {
            let decoded = percent_decode(value.as_bytes()).decode_utf8_lossy();
            if !text.is_empty() {
                text.push(',');
            }
            text.push_str(decoded.as_ref());
        }
        Ok(Self { pct_decoded: text })
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let encoded: Cow<str> = utf8_percent_encode(&self.pct_decoded, &SLUG_ENCODE_ASCII_SET).into();
        values.extend(std::iter::once(
            HeaderValue::from_str(encoded.as_ref()).expect("percent-encoded slug is a valid header value"),
        ));
    }
}

impl Display for Slug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.pct_decoded.fmt(f)
    }
}

impl Deref for Slug {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.pct_decoded
    }
}

impl From<String> for Slug {
    fn from(s: String) -> Self {
        Self { pct_decoded: s }
    }
}

impl From<&str> for Slug {
    fn from(s: &str) -> Self {
        Self {
            pct_decoded: s.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use claims::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(&[""], "")]
    #[case(&["a b"], "a b")]
    #[case(&["abc", "def"], "abc,def")]
    #[case(&["my%20post"], "my post")]
    fn decode_works_correctly(#[case] raw: &[&str], #[case] expected: &str) {
        let values: Vec<HeaderValue> = raw.iter().map(|v| assert_ok!(HeaderValue::from_str(v))).collect();
        let slug = assert_ok!(Slug::decode(&mut values.iter()));
        assert_eq!(&*slug, expected);
    }

    #[rstest]
    #[case("a/b", "a/b")]
    #[case("a%b", "a%25b")]
    fn encode_works_correctly(#[case] input: &str, #[case] expected: &str) {
        let slug: Slug = input.into();
        let mut values = Vec::new();
        slug.encode(&mut values);
        assert_eq!(values[0].to_str().unwrap(), expected);
    }
}
