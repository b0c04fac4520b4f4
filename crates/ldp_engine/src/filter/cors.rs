//! CORS Filter (spec.md §4.5): preflight and simple-request handling per
//! a configured origin/method/header policy.

use http::{HeaderMap, HeaderValue, Method, Response, StatusCode};

use crate::config::CorsConfig;
use ldp_http::body;

/// `Access-Control-Request-Method`/`-Headers` are only present on
/// preflight requests; their absence, or a non-OPTIONS method, makes the
/// request "simple" per spec.md §4.5.
fn is_preflight(method: &Method, headers: &HeaderMap) -> bool {
    method == Method::OPTIONS && headers.contains_key("access-control-request-method")
}

fn origin_is_allowed(origin: &str, config: &CorsConfig) -> bool {
    config.allowed_origins.iter().any(|o| o == "*" || o == origin)
}

fn allow_origin_value(origin: &str, config: &CorsConfig) -> HeaderValue {
    if config.allowed_origins.iter().any(|o| o == "*") && !config.allow_credentials {
        HeaderValue::from_static("*")
    } else {
        HeaderValue::from_str(origin).unwrap_or_else(|_| HeaderValue::from_static("null"))
    }
}

/// Decision reached by the CORS filter, carried forward so the eventual
/// response (for simple requests) or the immediate short-circuit (for
/// preflight) can be annotated (spec.md §4.5: "Never set preflight-only
/// headers on simple responses").
#[derive(Debug, Clone)]
pub enum CorsDecision {
    /// Request carried no `Origin`, or the origin was rejected: no CORS
    /// headers are added anywhere.
    NotApplicable,
    /// A simple (non-preflight) cross-origin request; annotate the
    /// eventual response with these headers.
    Simple { headers: Vec<(http::HeaderName, HeaderValue)> },
    /// A preflight request; respond immediately with these headers.
    Preflight { headers: Vec<(http::HeaderName, HeaderValue)> },
    /// A preflight request that failed validation: respond with no CORS
    /// headers at all (spec.md §4.5: "Any validation failure: emit no
    /// CORS headers (status remains 204)").
    PreflightRejected,
}

/// Evaluate the CORS policy for a request's method, headers, and
/// configuration.
pub fn decide(method: &Method, headers: &HeaderMap, config: &CorsConfig) -> CorsDecision {
    let Some(origin) = headers.get(http::header::ORIGIN).and_then(|v| v.to_str().ok()) else {
        return CorsDecision::NotApplicable;
    };
    if !origin_is_allowed(origin, config) {
        return CorsDecision::NotApplicable;
    }

    if is_preflight(method, headers) {
        return decide_preflight(origin, headers, config);
    }

    let mut out = vec![(
        http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        allow_origin_value(origin, config),
    )];
    if config.allow_credentials {
        out.push((
            http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ));
    }
    if !config.exposed_headers.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&config.exposed_headers.join(", ")) {
            out.push((http::header::ACCESS_CONTROL_EXPOSE_HEADERS, value));
        }
    }
    CorsDecision::Simple { headers: out }
}

fn decide_preflight(origin: &str, headers: &HeaderMap, config: &CorsConfig) -> CorsDecision {
    const SAFE_METHODS: [&str; 3] = ["GET", "HEAD", "POST"];

    let requested_method = headers
        .get("access-control-request-method")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let method_allowed = config
        .allowed_methods
        .iter()
        .any(|m| m.eq_ignore_ascii_case(requested_method))
        || SAFE_METHODS.iter().any(|m| m.eq_ignore_ascii_case(requested_method));
    if !method_allowed {
        return CorsDecision::PreflightRejected;
    }

    let requested_headers: Vec<&str> = headers
        .get("access-control-request-headers")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(',').map(str::trim).filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    let mut matched = Vec::new();
    for requested in &requested_headers {
        let allowed = config
            .allowed_headers
            .iter()
            .find(|h| h.eq_ignore_ascii_case(requested));
        match allowed {
            Some(canonical) => matched.push(canonical.to_ascii_lowercase()),
            None => return CorsDecision::PreflightRejected,
        }
    }

    let methods_value = config.allowed_methods.join(", ");

    let mut out = vec![
        (
            http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
            allow_origin_value(origin, config),
        ),
        (
            http::header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_str(&config.max_age.as_secs().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("0")),
        ),
    ];
    if let Ok(value) = HeaderValue::from_str(&methods_value) {
        out.push((http::header::ACCESS_CONTROL_ALLOW_METHODS, value));
    }
    if !matched.is_empty() {
        if let Ok(value) = HeaderValue::from_str(&matched.join(", ")) {
            out.push((http::header::ACCESS_CONTROL_ALLOW_HEADERS, value));
        }
    }
    if config.allow_credentials {
        out.push((
            http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        ));
    }
    CorsDecision::Preflight { headers: out }
}

/// Turn a preflight decision into its immediate response, or `None` if
/// the request was not a preflight (the caller should instead annotate
/// the eventual response via [`annotate`]).
pub fn preflight_response(decision: &CorsDecision) -> Option<Response<ldp_http::body::Body>> {
    match decision {
        CorsDecision::Preflight { headers } => {
            let mut builder = Response::builder().status(StatusCode::NO_CONTENT);
            for (name, value) in headers {
                builder = builder.header(name, value);
            }
            Some(builder.body(body::empty()).expect("preflight response is always valid"))
        }
        CorsDecision::PreflightRejected => Some(
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .body(body::empty())
                .expect("preflight rejection response is always valid"),
        ),
        _ => None,
    }
}

/// Annotate a successfully handled response with the headers a
/// [`CorsDecision::Simple`] decision computed.
pub fn annotate(response: &mut Response<ldp_http::body::Body>, decision: &CorsDecision) {
    if let CorsDecision::Simple { headers } = decision {
        for (name, value) in headers {
            response.headers_mut().insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CorsConfig {
        CorsConfig {
            allowed_origins: vec!["https://app.example".to_owned()],
            allowed_methods: vec!["GET".to_owned(), "PUT".to_owned()],
            allowed_headers: vec!["Content-Type".to_owned(), "Authorization".to_owned()],
            exposed_headers: vec!["ETag".to_owned()],
            allow_credentials: true,
            max_age: std::time::Duration::from_secs(600),
        }
    }

    #[test]
    fn missing_origin_is_not_applicable() {
        let headers = HeaderMap::new();
        assert!(matches!(decide(&Method::GET, &headers, &config()), CorsDecision::NotApplicable));
    }

    #[test]
    fn disallowed_origin_is_not_applicable() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ORIGIN, HeaderValue::from_static("https://evil.example"));
        assert!(matches!(decide(&Method::GET, &headers, &config()), CorsDecision::NotApplicable));
    }

    #[test]
    fn simple_request_from_allowed_origin_echoes_origin() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ORIGIN, HeaderValue::from_static("https://app.example"));
        match decide(&Method::GET, &headers, &config()) {
            CorsDecision::Simple { headers } => {
                assert!(headers
                    .iter()
                    .any(|(n, v)| n == http::header::ACCESS_CONTROL_ALLOW_ORIGIN && v == "https://app.example"));
            }
            other => panic!("expected Simple, got {other:?}"),
        }
    }

    #[test]
    fn preflight_with_disallowed_header_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ORIGIN, HeaderValue::from_static("https://app.example"));
        headers.insert("access-control-request-method", HeaderValue::from_static("PUT"));
        headers.insert("access-control-request-headers", HeaderValue::from_static("x-evil"));
        assert!(matches!(
            decide(&Method::OPTIONS, &headers, &config()),
            CorsDecision::PreflightRejected
        ));
    }

    #[test]
    fn preflight_with_allowed_header_lowercases_echo() {
        let mut headers = HeaderMap::new();
        headers.insert(http::header::ORIGIN, HeaderValue::from_static("https://app.example"));
        headers.insert("access-control-request-method", HeaderValue::from_static("PUT"));
        headers.insert("access-control-request-headers", HeaderValue::from_static("Content-Type"));
        match decide(&Method::OPTIONS, &headers, &config()) {
            CorsDecision::Preflight { headers } => {
                let allow_headers = headers
                    .iter()
                    .find(|(n, _)| *n == http::header::ACCESS_CONTROL_ALLOW_HEADERS)
                    .unwrap();
                assert_eq!(allow_headers.1, "content-type");
            }
            other => panic!("expected Preflight, got {other:?}"),
        }
    }
}
