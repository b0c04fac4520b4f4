//! Authorization Filter (spec.md §4.4): maps method + `ext` to the
//! required ACL mode(s), and renders the 401/403 denial per spec.

use http::{Method, StatusCode};
use ldp_http::problem::{catalogue, Problem};
use ldp_http::request::Extension;
use ldp_repo::model::AccessMode;
use ldp_repo::session::Session;

use crate::config::AuthChallenge;

/// Whether an existing containee is being replaced (requires Write) or a
/// new one created (requires Append); see spec.md §4.4: "A POST that
/// replaces an existing containee requires Write; a POST that creates a
/// new containee requires Append."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostDisposition {
    /// Creating a new containee.
    Create,
    /// Replacing an existing containee (e.g. POST with a client-supplied
    /// Slug that collides and the deployment opts to overwrite).
    Replace,
}

/// Resolve the required ACL mode(s) for a method + extension, any one of
/// which suffices to authorize the request. Returns `None` for methods
/// the authorization table denies outright regardless of mode.
pub fn required_modes(method: &Method, extension: Extension, post_disposition: PostDisposition) -> Option<Vec<AccessMode>> {
    if extension == Extension::Acl {
        return match *method {
            Method::HEAD | Method::GET | Method::OPTIONS | Method::PUT | Method::PATCH | Method::DELETE => {
                Some(vec![AccessMode::Control])
            }
            _ => None,
        };
    }

    match *method {
        Method::HEAD | Method::GET | Method::OPTIONS => Some(vec![AccessMode::Read]),
        Method::POST => Some(match post_disposition {
            PostDisposition::Create => vec![AccessMode::Append],
            PostDisposition::Replace => vec![AccessMode::Write],
        }),
        Method::PUT | Method::PATCH | Method::DELETE => Some(vec![AccessMode::Write]),
        _ => None,
    }
}

/// Decide whether `granted` satisfies any of `required`.
pub fn is_authorized(required: &[AccessMode], granted: &[AccessMode]) -> bool {
    required.iter().any(|mode| granted.contains(mode))
}

/// The denial outcome for an unauthorized request: the reified
/// [`Problem`], plus (for the anonymous-agent case) the `WWW-Authenticate`
/// header value the caller must attach to the marshalled response, since
/// `Problem` carries no header-level state of its own.
pub struct Denial {
    /// The access-denied problem, at 401 or 403.
    pub problem: Problem,
    /// `WWW-Authenticate` value to attach, present only for anonymous
    /// denial.
    pub www_authenticate: Option<String>,
}

/// Build the denial for an unauthorized request: 401 with
/// `WWW-Authenticate` challenges for the anonymous agent, 403 otherwise
/// (spec.md §4.4).
pub fn denial(session: &Session, challenges: &[AuthChallenge]) -> Denial {
    if session.is_anonymous() {
        let challenge_value = challenges
            .iter()
            .map(|c| format!("{} realm=\"{}\"", c.scheme, c.realm))
            .collect::<Vec<_>>()
            .join(", ");
        Denial {
            problem: catalogue::ACCESS_DENIED
                .new_api_error_builder(StatusCode::UNAUTHORIZED)
                .message("authentication required")
                .finish()
                .into(),
            www_authenticate: Some(challenge_value),
        }
    } else {
        Denial {
            problem: catalogue::ACCESS_DENIED
                .new_api_error_builder(StatusCode::FORBIDDEN)
                .message("insufficient access modes")
                .finish()
                .into(),
            www_authenticate: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(Method::GET, Extension::None, vec![AccessMode::Read])]
    #[case(Method::GET, Extension::Acl, vec![AccessMode::Control])]
    #[case(Method::PUT, Extension::None, vec![AccessMode::Write])]
    #[case(Method::PUT, Extension::Acl, vec![AccessMode::Control])]
    fn required_modes_match_spec_table(#[case] method: Method, #[case] extension: Extension, #[case] expected: Vec<AccessMode>) {
        assert_eq!(required_modes(&method, extension, PostDisposition::Create), Some(expected));
    }

    #[test]
    fn post_create_requires_append_post_replace_requires_write() {
        assert_eq!(
            required_modes(&Method::POST, Extension::None, PostDisposition::Create),
            Some(vec![AccessMode::Append])
        );
        assert_eq!(
            required_modes(&Method::POST, Extension::None, PostDisposition::Replace),
            Some(vec![AccessMode::Write])
        );
    }

    #[test]
    fn unknown_method_has_no_required_modes() {
        assert_eq!(required_modes(&Method::TRACE, Extension::None, PostDisposition::Create), None);
    }

    #[test]
    fn granted_superset_authorizes() {
        assert!(is_authorized(&[AccessMode::Write], &[AccessMode::Read, AccessMode::Write]));
        assert!(!is_authorized(&[AccessMode::Write], &[AccessMode::Read]));
    }

    #[test]
    fn anonymous_denial_is_401_with_challenges() {
        let denial = denial(
            &Session::anonymous(),
            &[AuthChallenge { scheme: "Bearer".to_owned(), realm: "ldp".to_owned() }],
        );
        assert_eq!(denial.problem.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(denial.www_authenticate.as_deref(), Some("Bearer realm=\"ldp\""));
    }

    #[test]
    fn known_agent_denial_is_403() {
        let session = Session { agent_iri: "https://alice.example/#me".to_owned() };
        let denial = denial(&session, &[]);
        assert_eq!(denial.problem.status(), StatusCode::FORBIDDEN);
        assert!(denial.www_authenticate.is_none());
    }
}
