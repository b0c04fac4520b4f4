//! OPTIONS handler (spec.md §4.6 OPTIONS).

use http::StatusCode;
use ldp_http::header::accept_patch::AcceptPatch;
use ldp_http::header::accept_post::AcceptPost;
use ldp_http::request::Extension;
use ldp_http::response::AssembledResponse;
use ldp_repo::status::ResourceStatusToken;

use super::{HandlerResult, MethodContext};

/// Handle OPTIONS. Never sets `Memento-Datetime`; restricted to
/// `{GET, HEAD, OPTIONS}` on TimeMap/version targets.
pub async fn handle(ctx: &MethodContext) -> HandlerResult {
    if ctx.request.extension.is_read_only() {
        return Ok(AssembledResponse::new()
            .status(StatusCode::NO_CONTENT)
            .header(http::header::ALLOW, http::HeaderValue::from_static("GET, HEAD, OPTIONS")));
    }

    let internal_iri = ctx.internal_iri();
    let status = ctx.collaborators.resource.get(&internal_iri).await?;
    let container_like = matches!(&status, ResourceStatusToken::Existing(token) if token.interaction_model.is_container_like());

    let mut methods = vec!["GET", "HEAD", "OPTIONS", "PUT", "PATCH", "DELETE"];
    if container_like {
        methods.push("POST");
    }

    let mut response = AssembledResponse::new()
        .status(StatusCode::NO_CONTENT)
        .header(http::header::ALLOW, http::HeaderValue::from_str(&methods.join(", ")).expect("ascii methods"))
        .typed_header(AcceptPatch::default());

    if container_like {
        response = response.typed_header(AcceptPost::default());
    }

    Ok(response)
}
