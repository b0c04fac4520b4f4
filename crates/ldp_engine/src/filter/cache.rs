//! Cache-Control Filter (spec.md §4.7: "`Cache-Control` (successful reads
//! only)"). A response post-processor, applied after the method handler
//! runs, since "successful" is not known beforehand.

use http::{Method, Response, StatusCode};

/// Apply `Cache-Control: max-age=<n>` to a successful response to a safe
/// (read) method. No-op for mutations or non-2xx/3xx responses.
pub fn apply(response: &mut Response<ldp_http::body::Body>, method: &Method, max_age: std::time::Duration) {
    let is_read = matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS);
    let status = response.status();
    let is_success = status.is_success() || status == StatusCode::NOT_MODIFIED;
    if is_read && is_success {
        if let Ok(value) = http::HeaderValue::from_str(&format!("max-age={}", max_age.as_secs())) {
            response.headers_mut().insert(http::header::CACHE_CONTROL, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use ldp_http::body;

    use super::*;

    #[test]
    fn sets_cache_control_on_successful_get() {
        let mut response = Response::builder().status(StatusCode::OK).body(body::empty()).unwrap();
        apply(&mut response, &Method::GET, Duration::from_secs(60));
        assert_eq!(response.headers().get(http::header::CACHE_CONTROL).unwrap(), "max-age=60");
    }

    #[test]
    fn skips_cache_control_on_mutation() {
        let mut response = Response::builder().status(StatusCode::CREATED).body(body::empty()).unwrap();
        apply(&mut response, &Method::POST, Duration::from_secs(60));
        assert!(response.headers().get(http::header::CACHE_CONTROL).is_none());
    }

    #[test]
    fn skips_cache_control_on_error() {
        let mut response = Response::builder().status(StatusCode::NOT_FOUND).body(body::empty()).unwrap();
        apply(&mut response, &Method::GET, Duration::from_secs(60));
        assert!(response.headers().get(http::header::CACHE_CONTROL).is_none());
    }
}
