//! `Digest` typed header, [RFC3230](https://datatracker.ietf.org/doc/html/rfc3230),
//! restricted to the algorithms spec.md §4.6 POST requires validating
//! (`sha-256`, `sha-1`, `md5` — the widely deployed ones; others are
//! reported as unsupported rather than rejected at decode time, so the
//! caller can distinguish "malformed header" (400) from "unsupported
//! algorithm" (400, but a different message)).

use headers::{Header, HeaderName, HeaderValue};

/// Constant for the `digest` header name.
pub static DIGEST: HeaderName = HeaderName::from_static("digest");

/// A digest algorithm named in a `Digest` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// `sha-256`.
    Sha256,
    /// `sha-1`.
    Sha1,
    /// `md5`.
    Md5,
    /// Any other token; unsupported by this engine.
    Other,
}

impl DigestAlgorithm {
    fn parse(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "sha-256" => Self::Sha256,
            "sha-1" | "sha" => Self::Sha1,
            "md5" => Self::Md5,
            _ => Self::Other,
        }
    }

    /// Whether this engine can compute and compare this algorithm.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// A decoded `Digest` header: algorithm plus base64-encoded digest value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    /// Named algorithm.
    pub algorithm: DigestAlgorithm,
    /// Base64-encoded digest bytes, as received (not yet decoded).
    pub value_base64: String,
}

impl Header for Digest {
    fn name() -> &'static HeaderName {
        &DIGEST
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let text = value.to_str().map_err(|_| headers::Error::invalid())?;
        let (alg, b64) = text.split_once('=').ok_or_else(headers::Error::invalid)?;
        if b64.is_empty() {
            return Err(headers::Error::invalid());
        }
        Ok(Digest {
            algorithm: DigestAlgorithm::parse(alg.trim()),
            value_base64: b64.trim().to_owned(),
        })
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let alg = match self.algorithm {
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha1 => "sha-1",
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Other => "unknown",
        };
        if let Ok(value) = HeaderValue::from_str(&format!("{alg}={}", self.value_base64)) {
            values.extend(std::iter::once(value));
        }
    }
}

#[cfg(test)]
mod tests {
    use claims::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("sha-256=abcd", DigestAlgorithm::Sha256, "abcd")]
    #[case("md5=xyz==", DigestAlgorithm::Md5, "xyz==")]
    fn decode_works(#[case] raw: &str, #[case] expected_alg: DigestAlgorithm, #[case] expected_b64: &str) {
        let value = assert_ok!(HeaderValue::from_str(raw));
        let digest = assert_ok!(Digest::decode(&mut std::iter::once(&value)));
        assert_eq!(digest.algorithm, expected_alg);
        assert_eq!(digest.value_base64, expected_b64);
    }

    #[test]
    fn decode_rejects_missing_equals() {
        let value = assert_ok!(HeaderValue::from_str("sha-256"));
        assert_err!(Digest::decode(&mut std::iter::once(&value)));
    }

    #[test]
    fn unknown_algorithm_decodes_but_is_unsupported() {
        let value = assert_ok!(HeaderValue::from_str("crc32c=abcd"));
        let digest = assert_ok!(Digest::decode(&mut std::iter::once(&value)));
        assert!(!digest.algorithm.is_supported());
    }
}
