//! `Prefer` typed header, [RFC7240](https://datatracker.ietf.org/doc/html/rfc7240).
//!
//! Only the subset spec.md §3/§4.6 needs is modelled: `return=minimal` /
//! `return=representation`, with optional `include`/`omit` parameters
//! naming named-graph IRIs, and the LDP containment/membership prefer
//! tokens used for container representation selection.

use headers::{Header, HeaderName, HeaderValue};

/// Constant for the `prefer` header name.
pub static PREFER: HeaderName = HeaderName::from_static("prefer");

/// Constant for the `preference-applied` header name, used on the response.
pub static PREFERENCE_APPLIED: HeaderName = HeaderName::from_static("preference-applied");

/// The requested `return=` preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnPreference {
    /// Client wants the post-mutation representation in the response body.
    Representation,
    /// Client wants an empty body (the default for PUT/PATCH/POST/DELETE).
    Minimal,
}

/// A decoded `Prefer` request header.
#[derive(Debug, Clone, Default)]
pub struct Prefer {
    /// The `return=` preference, if stated.
    pub return_pref: Option<ReturnPreference>,
    /// Named-graph IRIs from `include="..."`.
    pub include: Vec<String>,
    /// Named-graph IRIs from `omit="..."`.
    pub omit: Vec<String>,
}

impl Header for Prefer {
    fn name() -> &'static HeaderName {
        &PREFER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let mut prefer = Prefer::default();
        let mut saw_any = false;
        for value in values {
            let text = value.to_str().map_err(|_| headers::Error::invalid())?;
            for preference in text.split(',') {
                saw_any = true;
                parse_preference(preference.trim(), &mut prefer)?;
            }
        }
        if !saw_any {
            return Err(headers::Error::invalid());
        }
        Ok(prefer)
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let mut parts = Vec::new();
        match self.return_pref {
            Some(ReturnPreference::Representation) => parts.push("return=representation".to_owned()),
            Some(ReturnPreference::Minimal) => parts.push("return=minimal".to_owned()),
            None => {}
        }
        if !self.include.is_empty() {
            parts.push(format!("include=\"{}\"", self.include.join(" ")));
        }
        if !self.omit.is_empty() {
            parts.push(format!("omit=\"{}\"", self.omit.join(" ")));
        }
        if let Ok(value) = HeaderValue::from_str(&parts.join("; ")) {
            values.extend(std::iter::once(value));
        }
    }
}

fn parse_preference(token: &str, prefer: &mut Prefer) -> Result<(), headers::Error> {
    if token.is_empty() {
        return Ok(());
    }
    // Preference items may have `;`-separated parameters; we only care about
    // the first `name=value` pair of each.
    for item in token.split(';') {
        let item = item.trim();
        let Some((name, value)) = item.split_once('=') else {
            continue;
        };
        let name = name.trim();
        let value = value.trim().trim_matches('"');
        match name {
            "return" => {
                prefer.return_pref = Some(match value {
                    "representation" => ReturnPreference::Representation,
                    "minimal" => ReturnPreference::Minimal,
                    _ => return Err(headers::Error::invalid()),
                });
            }
            "include" => prefer.include.extend(value.split_whitespace().map(str::to_owned)),
            "omit" => prefer.omit.extend(value.split_whitespace().map(str::to_owned)),
            _ => {}
        }
    }
    Ok(())
}

/// The `Preference-Applied` response header, echoing which `return=`
/// preference the server actually honored (spec.md §4.7).
#[derive(Debug, Clone, Copy)]
pub struct PreferenceApplied(pub ReturnPreference);

impl Header for PreferenceApplied {
    fn name() -> &'static HeaderName {
        &PREFERENCE_APPLIED
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, headers::Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(headers::Error::invalid)?;
        let text = value.to_str().map_err(|_| headers::Error::invalid())?;
        match text.trim() {
            "return=representation" => Ok(Self(ReturnPreference::Representation)),
            "return=minimal" => Ok(Self(ReturnPreference::Minimal)),
            _ => Err(headers::Error::invalid()),
        }
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let text = match self.0 {
            ReturnPreference::Representation => "return=representation",
            ReturnPreference::Minimal => "return=minimal",
        };
        values.extend(std::iter::once(HeaderValue::from_static(text)));
    }
}

#[cfg(test)]
mod tests {
    use claims::*;
    use rstest::*;

    use super::*;

    #[rstest]
    #[case("return=minimal", Some(ReturnPreference::Minimal), 0, 0)]
    #[case("return=representation; include=\"a b\"", Some(ReturnPreference::Representation), 2, 0)]
    #[case("return=representation; omit=\"c\"", Some(ReturnPreference::Representation), 0, 1)]
    fn decode_works(
        #[case] raw: &str,
        #[case] expect_return: Option<ReturnPreference>,
        #[case] include_len: usize,
        #[case] omit_len: usize,
    ) {
        let value = assert_ok!(HeaderValue::from_str(raw));
        let prefer = assert_ok!(Prefer::decode(&mut std::iter::once(&value)));
        assert_eq!(prefer.return_pref, expect_return);
        assert_eq!(prefer.include.len(), include_len);
        assert_eq!(prefer.omit.len(), omit_len);
    }

    #[test]
    fn decode_rejects_empty_header() {
        let value = assert_ok!(HeaderValue::from_str(""));
        assert_err!(Prefer::decode(&mut std::iter::once(&value)));
    }
}
