//! The composed `tower::Service` (spec.md §4): CORS → Auth → AuthZ →
//! Path/Extension → method dispatch → Cache-Control/WebSub, following the
//! teacher's `RouteByMethod` shape (`Error = Infallible`,
//! `Future = BoxHttpResponseFuture<Body>`) but as a single service rather
//! than a per-method routing table, since every method shares the same
//! pre-dispatch pipeline here.

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{Method, Request, Response};
use http_body_util::BodyExt;
use tower::Service;

use ldp_http::body::Body;
use ldp_http::problem::{catalogue, Problem};

use crate::config::EngineConfig;
use crate::filter::authz::PostDisposition;
use crate::filter::{auth, authz, cors, path_ext};
use crate::method::{Collaborators, MethodContext};

/// A future resolving to an infallible `http::Response`.
pub type BoxHttpResponseFuture = BoxFuture<'static, Result<Response<Body>, Infallible>>;

/// Transport header carrying the authenticated principal name, if any
/// (spec.md §4.4: "The transport surfaces a principal name (or none)").
/// A reverse proxy or TLS-terminating frontend is expected to set this
/// after its own authentication step; the engine itself performs none.
pub const PRINCIPAL_HEADER: &str = "x-remote-user";

/// The top-level LDP protocol engine service.
#[derive(Clone)]
pub struct LdpService {
    config: Arc<EngineConfig>,
    collaborators: Arc<Collaborators>,
    principal_mapper: Arc<dyn auth::PrincipalMapper>,
}

impl LdpService {
    /// Build a new engine service over the given configuration,
    /// collaborator set, and principal-to-agent mapping function.
    pub fn new(config: Arc<EngineConfig>, collaborators: Arc<Collaborators>, principal_mapper: Arc<dyn auth::PrincipalMapper>) -> Self {
        Self { config, collaborators, principal_mapper }
    }
}

impl Service<Request<Body>> for LdpService {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxHttpResponseFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let config = self.config.clone();
        let collaborators = self.collaborators.clone();
        let principal_mapper = self.principal_mapper.clone();

        Box::pin(async move {
            Ok(handle(req, config, collaborators, principal_mapper.as_ref()).await)
        })
    }
}

async fn handle(
    req: Request<Body>,
    config: Arc<EngineConfig>,
    collaborators: Arc<Collaborators>,
    principal_mapper: &dyn auth::PrincipalMapper,
) -> Response<Body> {
    let method = req.method().clone();
    let headers = req.headers().clone();

    // CORS Filter (spec.md §4.5) runs first; a rejected/accepted preflight
    // short-circuits immediately, a simple request's decision is applied
    // to the eventual response below.
    let cors_decision = cors::decide(&method, &headers, &config.cors);
    if let Some(preflight) = cors::preflight_response(&cors_decision) {
        return preflight;
    }

    let (parts, body) = req.into_parts();
    let raw_path = parts.uri.path().to_owned();
    let raw_query = parts.uri.query().map(str::to_owned);

    let request_model = match path_ext::normalize(&parts, &raw_path, raw_query.as_deref()) {
        Ok(model) => model,
        Err(problem) => return finish(problem.into_response(), &method, &cors_decision, &config),
    };

    let body_bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(never) => match never {},
    };

    // Authentication Filter (spec.md §4.4).
    let principal = parts.headers.get(PRINCIPAL_HEADER).and_then(|v| v.to_str().ok());
    let session = auth::resolve(principal, principal_mapper);

    // Authorization Filter (spec.md §4.4). POST never requires Write in
    // this deployment: Slug collisions fall back to a server-generated
    // identifier rather than replacing an existing containee (SPEC_FULL.md
    // §9 open-question decision), so POST always creates.
    let required_modes = match authz::required_modes(&parts.method, request_model.extension, PostDisposition::Create) {
        Some(modes) => modes,
        None => {
            let problem = method_not_allowed();
            return finish(problem.into_response(), &method, &cors_decision, &config);
        }
    };

    let internal_iri = collaborators.resource.to_internal(&external_url(&config, &request_model.path));
    let granted_modes = match collaborators.access_control.get_access_modes(&internal_iri, &session).await {
        Ok(modes) => modes,
        Err(problem) => return finish(problem.into_response(), &method, &cors_decision, &config),
    };

    if !authz::is_authorized(&required_modes, &granted_modes) {
        let denial = authz::denial(&session, &config.auth_challenges);
        let mut response = denial.problem.into_response();
        if let Some(value) = denial.www_authenticate {
            if let Ok(header_value) = http::HeaderValue::from_str(&value) {
                response.headers_mut().insert(http::header::WWW_AUTHENTICATE, header_value);
            }
        }
        return finish(response, &method, &cors_decision, &config);
    }

    let ctx = MethodContext {
        headers: parts.headers.clone(),
        request: request_model,
        body: body_bytes,
        session,
        granted_modes,
        config: config.clone(),
        collaborators,
    };

    let result = dispatch(&ctx).await;
    let response = match result {
        Ok(assembled) => assembled.finish(),
        Err(problem) => problem.into_response(),
    };

    finish(response, &method, &cors_decision, &config)
}

async fn dispatch(ctx: &MethodContext) -> crate::method::HandlerResult {
    match ctx.request.method {
        Method::GET => crate::method::head_get::handle(ctx, false).await,
        Method::HEAD => crate::method::head_get::handle(ctx, true).await,
        Method::OPTIONS => crate::method::options::handle(ctx).await,
        Method::POST => crate::method::post::handle(ctx).await,
        Method::PUT => crate::method::put::handle(ctx).await,
        Method::PATCH => crate::method::patch::handle(ctx).await,
        Method::DELETE => crate::method::delete::handle(ctx).await,
        _ => Err(method_not_allowed()),
    }
}

fn finish(mut response: Response<Body>, method: &Method, cors_decision: &cors::CorsDecision, config: &EngineConfig) -> Response<Body> {
    crate::filter::cache::apply(&mut response, method, config.cache_max_age);
    crate::filter::websub::apply(&mut response, method, config.websub_hub_url.as_deref());
    cors::annotate(&mut response, cors_decision);
    response
}

fn external_url(config: &EngineConfig, path: &str) -> String {
    if path.is_empty() {
        format!("{}/", config.base_url)
    } else {
        format!("{}/{}", config.base_url, path)
    }
}

fn method_not_allowed() -> Problem {
    catalogue::UNSUPPORTED_OPERATION
        .new_api_error_builder(http::StatusCode::METHOD_NOT_ALLOWED)
        .message("method not recognized")
        .finish()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_header_name_is_lowercase() {
        assert_eq!(PRINCIPAL_HEADER, PRINCIPAL_HEADER.to_ascii_lowercase());
    }
}
