//! WebSub Header Filter (spec.md §4.7: "`Link rel=\"hub\"` on read
//! responses"). A response post-processor applied alongside the
//! Cache-Control filter.

use http::{Method, Response};
use ldp_http::header::link::{LinkValue, HUB_REL};

/// Append `Link rel="hub"` pointing at the configured WebSub hub to a
/// successful read response, if a hub is configured.
pub fn apply(response: &mut Response<ldp_http::body::Body>, method: &Method, hub_url: Option<&str>) {
    let Some(hub_url) = hub_url else { return };
    if !matches!(*method, Method::GET | Method::HEAD) || !response.status().is_success() {
        return;
    }

    use headers::HeaderMapExt;
    let mut link = response
        .headers()
        .typed_get::<ldp_http::header::link::Link>()
        .unwrap_or_default();
    link.values.push(LinkValue::new(hub_url, HUB_REL));
    response.headers_mut().typed_insert(link);
}

#[cfg(test)]
mod tests {
    use http::StatusCode;
    use ldp_http::body;

    use super::*;

    #[test]
    fn adds_hub_link_on_successful_get_when_configured() {
        let mut response = Response::builder().status(StatusCode::OK).body(body::empty()).unwrap();
        apply(&mut response, &Method::GET, Some("https://hub.example/"));
        assert!(response.headers().get(http::header::LINK).is_some());
    }

    #[test]
    fn skips_hub_link_when_not_configured() {
        let mut response = Response::builder().status(StatusCode::OK).body(body::empty()).unwrap();
        apply(&mut response, &Method::GET, None);
        assert!(response.headers().get(http::header::LINK).is_none());
    }

    #[test]
    fn skips_hub_link_on_mutation() {
        let mut response = Response::builder().status(StatusCode::CREATED).body(body::empty()).unwrap();
        apply(&mut response, &Method::POST, Some("https://hub.example/"));
        assert!(response.headers().get(http::header::LINK).is_none());
    }
}
