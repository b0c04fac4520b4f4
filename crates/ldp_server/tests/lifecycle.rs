//! End-to-end exercise of the composed [`LdpService`] over the in-memory
//! collaborators, driven with `tower::ServiceExt::oneshot` the way the
//! teacher drives its own method services under test (no real TCP
//! listener needed).

use std::sync::Arc;

use http::{Request, StatusCode};
use tower::{Service, ServiceExt};

use ldp_engine::config::EngineConfig;
use ldp_engine::filter::auth::IdentityPrincipalMapper;
use ldp_engine::service::LdpService;
use ldp_http::body;

const BASE_URL: &str = "https://pod.example/storage";

fn service() -> LdpService {
    let config = Arc::new(EngineConfig::with_defaults(BASE_URL));
    let collaborators = Arc::new(ldp_server::memory::build(BASE_URL));
    LdpService::new(config, collaborators, Arc::new(IdentityPrincipalMapper))
}

fn turtle_request(method: &str, path: &str, body: &'static str) -> Request<ldp_http::body::Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header("content-type", "text/turtle")
        .body(body::full(body))
        .unwrap()
}

#[tokio::test]
async fn put_then_get_round_trips_turtle() {
    let mut svc = service();

    let put = turtle_request("PUT", "/widgets/1", "<http://example.org/s> <http://example.org/p> \"v\" .\n");
    let response = svc.ready().await.unwrap().call(put).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let get = Request::builder().method("GET").uri("/widgets/1").body(body::empty()).unwrap();
    let response = svc.ready().await.unwrap().call(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("etag").is_some());

    let body_bytes = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
    let text = std::str::from_utf8(&body_bytes).unwrap();
    assert!(text.contains("example.org/p"));
}

#[tokio::test]
async fn get_missing_resource_is_404() {
    let mut svc = service();
    let get = Request::builder().method("GET").uri("/nope").body(body::empty()).unwrap();
    let response = svc.ready().await.unwrap().call(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stale_if_match_is_rejected_with_412() {
    let mut svc = service();

    let put = turtle_request("PUT", "/widgets/2", "<http://example.org/s> <http://example.org/p> \"v\" .\n");
    svc.ready().await.unwrap().call(put).await.unwrap();

    let conditional_put = Request::builder()
        .method("PUT")
        .uri("/widgets/2")
        .header("content-type", "text/turtle")
        .header("if-match", "\"not-the-real-etag\"")
        .body(body::full("<http://example.org/s> <http://example.org/p> \"v2\" .\n"))
        .unwrap();
    let response = svc.ready().await.unwrap().call(conditional_put).await.unwrap();
    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
}

#[tokio::test]
async fn delete_then_get_is_410_gone() {
    let mut svc = service();

    let put = turtle_request("PUT", "/widgets/3", "<http://example.org/s> <http://example.org/p> \"v\" .\n");
    svc.ready().await.unwrap().call(put).await.unwrap();

    let delete = Request::builder().method("DELETE").uri("/widgets/3").body(body::empty()).unwrap();
    let response = svc.ready().await.unwrap().call(delete).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let get = Request::builder().method("GET").uri("/widgets/3").body(body::empty()).unwrap();
    let response = svc.ready().await.unwrap().call(get).await.unwrap();
    assert_eq!(response.status(), StatusCode::GONE);
}

#[tokio::test]
async fn sparql_patch_inserts_a_triple() {
    let mut svc = service();

    let put = turtle_request("PUT", "/widgets/4", "<http://example.org/s> <http://example.org/p> \"v\" .\n");
    svc.ready().await.unwrap().call(put).await.unwrap();

    let patch = Request::builder()
        .method("PATCH")
        .uri("/widgets/4")
        .header("content-type", "application/sparql-update")
        .body(body::full("INSERT DATA { <http://example.org/s> <http://example.org/q> \"w\" . }"))
        .unwrap();
    let response = svc.ready().await.unwrap().call(patch).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let get = Request::builder().method("GET").uri("/widgets/4").body(body::empty()).unwrap();
    let response = svc.ready().await.unwrap().call(get).await.unwrap();
    let body_bytes = http_body_util::BodyExt::collect(response.into_body()).await.unwrap().to_bytes();
    let text = std::str::from_utf8(&body_bytes).unwrap();
    assert!(text.contains("example.org/q"));
}

#[tokio::test]
async fn put_with_literal_rdf_type_object_is_rejected_with_409() {
    let mut svc = service();

    let put = turtle_request("PUT", "/widgets/5", "<http://example.org/r> <rdf:type> \"literal\" .\n");
    let response = svc.ready().await.unwrap().call(put).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let link = response.headers().get("link").and_then(|v| v.to_str().ok()).unwrap_or_default();
    assert!(link.contains("http://www.w3.org/ns/ldp#constrainedBy"));
    assert!(link.contains("InvalidRange"));
}
