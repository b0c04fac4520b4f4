//! TimeMap & Memento sub-handler (spec.md §4.6 "TimeMap & Memento").
//!
//! Representation is negotiated between `application/link-format`
//! (default) and the RDF syntaxes; this implementation renders only the
//! `application/link-format` form explicitly, since the RDF form is
//! produced by the I/O Service from a dataset describing the TimeMap
//! (out of this engine's scope per spec.md §6).

use http::StatusCode;
use ldp_http::body;
use ldp_http::header::link::{LinkValue, MEMENTO_REL, ORIGINAL_REL, SELF_REL, TIMEGATE_REL, TIMEMAP_REL};
use ldp_http::header::memento_datetime::MementoDatetime;
use ldp_http::response::AssembledResponse;

use super::{HandlerResult, MethodContext};

/// Render the TimeMap for `internal_iri`.
pub async fn handle(ctx: &MethodContext, internal_iri: &str, is_head: bool) -> HandlerResult {
    let mementos = ctx.collaborators.memento.mementos(internal_iri).await?;
    let external = ctx.external_url();

    let mut response = AssembledResponse::new()
        .status(StatusCode::OK)
        .add_link(LinkValue::new(external.clone(), ORIGINAL_REL))
        .add_link(LinkValue::new(format!("{external}?ext=timemap"), SELF_REL))
        .add_link(LinkValue::new(format!("{external}?ext=timemap"), TIMEMAP_REL))
        .add_link(LinkValue::new(format!("{external}?ext=timemap"), TIMEGATE_REL))
        .header(http::header::CONTENT_TYPE, http::HeaderValue::from_static("application/link-format"));

    let mut lines = Vec::new();
    for (idx, instant) in mementos.iter().enumerate() {
        let mut value = LinkValue::new(format!("{external}?version={}", instant.timestamp()), MEMENTO_REL)
            .with_datetime(MementoDatetime(*instant).to_string());
        if idx == 0 {
            value = value.with_param("first", "true");
        }
        if idx + 1 == mementos.len() {
            value = value.with_param("last", "true");
        }
        lines.push(value.to_string());
    }

    if !is_head {
        response = response.body(body::full(lines.join(",\n")));
    }

    Ok(response)
}
