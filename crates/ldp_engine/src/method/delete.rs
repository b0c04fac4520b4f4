//! DELETE handler (spec.md §4.6 DELETE).

use http::StatusCode;
use ldp_http::problem::{catalogue, Problem};
use ldp_http::response::AssembledResponse;
use ldp_repo::collaborator::{EventKind, MutationMetadata};
use ldp_repo::model::{InteractionModel, NamedGraph};
use ldp_repo::status::ResourceStatusToken;

use super::{HandlerResult, MethodContext};

/// Handle DELETE: tombstone a resource, optionally purging binary bytes.
pub async fn handle(ctx: &MethodContext) -> HandlerResult {
    if ctx.request.extension.is_read_only() {
        return Err(unsupported_operation());
    }

    let internal_iri = ctx.internal_iri();
    let status = ctx.collaborators.resource.get(&internal_iri).await?;
    let existing = match &status {
        ResourceStatusToken::Existing(token) => token,
        ResourceStatusToken::Deleted(_) => return Err(catalogue::GONE.new_problem_builder().finish()),
        ResourceStatusToken::Missing => return Err(catalogue::NOT_FOUND.new_problem_builder().finish()),
    };

    let metadata = MutationMetadata {
        internal_iri: internal_iri.clone(),
        interaction_model: existing.interaction_model,
        content_type: None,
        slug: None,
        target_graph: NamedGraph::PreferUserManaged,
    };
    let is_binary = existing.interaction_model == InteractionModel::NonRDFSource;

    let audit = ctx.collaborators.audit.deletion(&metadata, &ctx.session).await?;
    ctx.collaborators.resource.delete(metadata).await?;
    ctx.collaborators.resource.add(&internal_iri, audit).await?;
    if is_binary && ctx.config.purge_binary_on_delete {
        ctx.collaborators.binary.purge_content(&internal_iri).await?;
    }

    crate::event::dispatch(ctx, &internal_iri, &ctx.request.path, EventKind::Delete, false).await;

    Ok(AssembledResponse::new().status(StatusCode::NO_CONTENT))
}

fn unsupported_operation() -> Problem {
    catalogue::UNSUPPORTED_OPERATION
        .new_api_error_builder(StatusCode::METHOD_NOT_ALLOWED)
        .finish()
        .into()
}
