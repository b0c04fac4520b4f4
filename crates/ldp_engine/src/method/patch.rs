//! PATCH handler (spec.md §4.6 PATCH).

use http::StatusCode;
use ldp_http::conneg::negotiate_rdf;
use ldp_http::header::prefer::{PreferenceApplied, ReturnPreference};
use ldp_http::problem::{catalogue, Problem};
use ldp_http::request::Extension;
use ldp_http::response::AssembledResponse;
use ldp_repo::collaborator::{Dataset, MutationMetadata};
use ldp_repo::model::NamedGraph;
use ldp_repo::status::ResourceStatusToken;

use super::{HandlerResult, MethodContext};

const SPARQL_UPDATE_MIME: &str = "application/sparql-update";

/// Handle PATCH: apply a SPARQL-Update document to a resource's graph.
pub async fn handle(ctx: &MethodContext) -> HandlerResult {
    if ctx.request.extension.is_read_only() {
        return Err(unsupported_operation());
    }

    let content_type = ctx.headers.get(http::header::CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) != Some(SPARQL_UPDATE_MIME) {
        return Err(catalogue::CLIENT_SYNTAX
            .new_api_error_builder(StatusCode::UNSUPPORTED_MEDIA_TYPE)
            .message("PATCH accepts only application/sparql-update")
            .finish()
            .into());
    }

    let internal_iri = ctx.internal_iri();
    let status = ctx.collaborators.resource.get(&internal_iri).await?;
    let is_acl = ctx.request.extension == Extension::Acl;
    let target_graph = if is_acl { NamedGraph::PreferAccessControl } else { NamedGraph::PreferUserManaged };

    let (existed, interaction_model) = match &status {
        ResourceStatusToken::Existing(token) => (true, token.interaction_model),
        ResourceStatusToken::Deleted(_) => return Err(catalogue::GONE.new_problem_builder().finish()),
        ResourceStatusToken::Missing if ctx.config.patch_creates_missing => {
            (false, ldp_repo::model::InteractionModel::RDFSource)
        }
        ResourceStatusToken::Missing => return Err(catalogue::NOT_FOUND.new_problem_builder().finish()),
    };

    let sparql = std::str::from_utf8(&ctx.body)
        .map_err(|_| catalogue::CLIENT_SYNTAX.new_problem_builder().message("SPARQL-Update body is not UTF-8").finish())?;

    let current = if existed {
        ctx.collaborators.resource.get_dataset(&internal_iri, target_graph).await?
    } else {
        Dataset::default()
    };
    let updated = ctx.collaborators.io.update(current, sparql, &ctx.external_url()).await?;
    crate::constraint::validate(&updated, interaction_model)?;

    let metadata = MutationMetadata {
        internal_iri: internal_iri.clone(),
        interaction_model,
        content_type: None,
        slug: None,
        target_graph,
    };

    if existed {
        ctx.collaborators.resource.replace(metadata.clone(), updated.clone()).await?;
    } else {
        ctx.collaborators.resource.create(metadata.clone(), updated.clone()).await?;
    }

    let audit = if existed {
        ctx.collaborators.audit.update(&metadata, &ctx.session).await?
    } else {
        ctx.collaborators.audit.creation(&metadata, &ctx.session).await?
    };
    ctx.collaborators.resource.add(&internal_iri, audit).await?;

    ctx.collaborators.memento.put(&internal_iri).await?;
    crate::event::dispatch(
        ctx,
        &internal_iri,
        &ctx.request.path,
        if existed { ldp_repo::collaborator::EventKind::Update } else { ldp_repo::collaborator::EventKind::Create },
        false,
    )
    .await;

    let wants_representation =
        matches!(ctx.request.prefer.as_ref().and_then(|p| p.return_pref), Some(ReturnPreference::Representation));

    if !wants_representation {
        return Ok(AssembledResponse::new()
            .status(if existed { StatusCode::NO_CONTENT } else { StatusCode::CREATED })
            .typed_header(PreferenceApplied(ReturnPreference::Minimal)));
    }

    let negotiated = negotiate_rdf(&ctx.request.accept, ctx.config.default_json_ld_profile)
        .ok_or_else(|| catalogue::NOT_ACCEPTABLE.new_api_error_builder(StatusCode::NOT_ACCEPTABLE).finish())?;
    let body = ctx
        .collaborators
        .io
        .write(&updated, negotiated.syntax.media_type(), negotiated.profile.map(|_| "compacted"))
        .await?;

    Ok(AssembledResponse::new()
        .status(if existed { StatusCode::OK } else { StatusCode::CREATED })
        .header(http::header::CONTENT_TYPE, http::HeaderValue::from_static(negotiated.syntax.media_type()))
        .typed_header(PreferenceApplied(ReturnPreference::Representation))
        .body(ldp_http::body::full(body)))
}

fn unsupported_operation() -> Problem {
    catalogue::UNSUPPORTED_OPERATION
        .new_api_error_builder(StatusCode::METHOD_NOT_ALLOWED)
        .finish()
        .into()
}
