//! HEAD / GET handler (spec.md §4.6).

use chrono::Utc;
use headers::LastModified;
use http::{Method, StatusCode};
use ldp_http::body;
use ldp_http::conditional::{self, build_etag, PreconditionOutcome, ResourceValidators};
use ldp_http::conneg::{negotiate_binary, negotiate_rdf, BinaryNegotiation};
use ldp_http::header::accept_patch::AcceptPatch;
use ldp_http::header::accept_post::AcceptPost;
use ldp_http::header::link::{LinkValue, ORIGINAL_REL, SELF_REL, TIMEGATE_REL, TYPE_REL};
use ldp_http::header::memento_datetime::MementoDatetime;
use ldp_http::problem::catalogue;
use ldp_http::request::Extension;
use ldp_http::response::AssembledResponse;
use ldp_repo::status::ResourceStatusToken;

use super::{HandlerResult, MethodContext};

/// Handle HEAD or GET, distinguished only by whether the body is emitted.
pub async fn handle(ctx: &MethodContext, is_head: bool) -> HandlerResult {
    let internal_iri = ctx.internal_iri();

    let status = match ctx.request.extension {
        Extension::Version(epoch) => {
            let instant = chrono::DateTime::<Utc>::from_timestamp(epoch, 0)
                .ok_or_else(|| catalogue::CLIENT_SYNTAX.new_api_error_builder(StatusCode::BAD_REQUEST).finish())?;
            ctx.collaborators.memento.get(&internal_iri, instant).await?
        }
        _ => ctx.collaborators.resource.get(&internal_iri).await?,
    };

    let existing = match &status {
        ResourceStatusToken::Existing(token) => token,
        ResourceStatusToken::Deleted(_) => {
            return Err(catalogue::GONE.new_api_error_builder(StatusCode::GONE).finish().into())
        }
        ResourceStatusToken::Missing => {
            return Err(catalogue::NOT_FOUND.new_api_error_builder(StatusCode::NOT_FOUND).finish().into())
        }
    };

    // Accept-Datetime TimeGate negotiation (spec.md §4.6 step 2), only
    // when no explicit version was requested.
    if let (Some(accept_dt), Extension::None) = (&ctx.request.accept_datetime, ctx.request.extension) {
        let mementos = ctx.collaborators.memento.mementos(&internal_iri).await?;
        let closest = mementos.iter().rev().find(|m| **m <= accept_dt.0).copied();
        return match closest {
            Some(instant) => {
                let external = ctx.external_url();
                Ok(AssembledResponse::new()
                    .status(StatusCode::OK)
                    .typed_header(MementoDatetime(instant))
                    .add_link(LinkValue::new(format!("{external}?version={}", instant.timestamp()), SELF_REL)))
            }
            None => Err(catalogue::NOT_ACCEPTABLE.new_api_error_builder(StatusCode::NOT_ACCEPTABLE).finish().into()),
        };
    }

    // TimeMap representation (spec.md §4.6 step 4, §4.6 "TimeMap & Memento").
    if ctx.request.extension == Extension::TimeMap {
        return super::timemap::handle(ctx, &internal_iri, is_head).await;
    }

    // Preconditions (spec.md §4.6 step 3).
    let validators = ResourceValidators {
        exists: true,
        last_modified: Some(existing.last_modified),
        etag: Some(build_etag(&existing.etag, existing.etag_is_weak)),
    };
    if let PreconditionOutcome::ShortCircuit(code) = conditional::evaluate(&Method::GET, &ctx.headers, &validators) {
        return Ok(AssembledResponse::new().status(code));
    }

    let mut response = AssembledResponse::new()
        .status(StatusCode::OK)
        .last_modified(LastModified::from(std::time::SystemTime::from(existing.last_modified)))
        .etag(build_etag(&existing.etag, existing.etag_is_weak));

    for model in existing.interaction_model.supertypes() {
        response = response.add_link(LinkValue::new(model.type_iri(), TYPE_REL));
    }
    response = response
        .add_link(LinkValue::new(ctx.external_url(), SELF_REL))
        .add_link(LinkValue::new(format!("{}?ext=timemap", ctx.external_url()), TIMEGATE_REL))
        .add_link(LinkValue::new(ctx.external_url(), ORIGINAL_REL))
        .typed_header(AcceptPatch::default())
        .header(http::header::VARY, http::HeaderValue::from_static("accept-datetime, prefer"));

    if existing.interaction_model.is_container_like() {
        response = response.typed_header(AcceptPost::default());
    }

    let body = if let Some(stored_mime) = &existing.content_type {
        match negotiate_binary(&ctx.request.accept, stored_mime, ctx.config.default_json_ld_profile) {
            Some(BinaryNegotiation::Bytes) => {
                response = response.header(http::header::ACCEPT_RANGES, http::HeaderValue::from_static("bytes"));
                if is_head {
                    None
                } else if let Some((start, end)) = resolve_range(&ctx.request.range, existing.content_length) {
                    let content = ctx.collaborators.binary.get_content_range(&internal_iri, start, end).await?;
                    Some(body::full(content.bytes))
                } else {
                    let content = ctx.collaborators.binary.get_content(&internal_iri).await?;
                    Some(body::full(content.bytes))
                }
            }
            Some(BinaryNegotiation::Description(_negotiated)) => None,
            None => {
                return Err(catalogue::NOT_ACCEPTABLE.new_api_error_builder(StatusCode::NOT_ACCEPTABLE).finish().into())
            }
        }
    } else {
        match negotiate_rdf(&ctx.request.accept, ctx.config.default_json_ld_profile) {
            Some(negotiated) => {
                response = response.header(
                    http::header::CONTENT_TYPE,
                    http::HeaderValue::from_static(negotiated.syntax.media_type()),
                );
                if is_head {
                    None
                } else {
                    let dataset = ctx.collaborators.resource.get_dataset(&internal_iri, ldp_repo::model::NamedGraph::PreferUserManaged).await?;
                    let profile = negotiated.profile.map(|p| p.iri());
                    let bytes = ctx.collaborators.io.write(&dataset, negotiated.syntax.media_type(), profile).await?;
                    Some(body::full(bytes))
                }
            }
            None => {
                return Err(catalogue::NOT_ACCEPTABLE.new_api_error_builder(StatusCode::NOT_ACCEPTABLE).finish().into())
            }
        }
    };

    if let Some(body) = body {
        response = response.body(body);
    }

    Ok(response)
}

/// Resolve the first satisfiable range against a binary's total length
/// (spec.md §4.6 step 6). `None` when no `Range` header was sent, or the
/// header carries no satisfiable range over `total_length`.
fn resolve_range(range: &Option<headers::Range>, total_length: Option<u64>) -> Option<(u64, u64)> {
    let range = range.as_ref()?;
    let total_length = total_length?;
    range.satisfiable_ranges(total_length).next().map(|(start, end)| {
        use std::ops::Bound;
        let start = match start {
            Bound::Included(n) => n,
            Bound::Excluded(n) => n + 1,
            Bound::Unbounded => 0,
        };
        let end = match end {
            Bound::Included(n) => n,
            Bound::Excluded(n) => n.saturating_sub(1),
            Bound::Unbounded => total_length.saturating_sub(1),
        };
        (start, end)
    })
}
