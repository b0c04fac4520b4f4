//! POST handler (spec.md §4.6 POST).

use base64::Engine;
use http::StatusCode;
use ldp_http::conneg::RdfSyntax;
use ldp_http::header::digest::DigestAlgorithm;
use ldp_http::header::link::{LinkValue, DESCRIBEDBY_REL, TYPE_REL};
use ldp_http::problem::{catalogue, ConstraintViolation, KConstraintViolation, Problem, ProblemBuilderExt};
use ldp_http::request::{sanitize_slug, Extension};
use sha2::{Digest as _, Sha256};
use ldp_http::response::AssembledResponse;
use ldp_repo::collaborator::{Dataset, MutationMetadata};
use ldp_repo::model::InteractionModel;
use ldp_repo::status::ResourceStatusToken;

use super::{HandlerResult, MethodContext};

/// Handle POST: create a new member under a Container-like resource.
pub async fn handle(ctx: &MethodContext) -> HandlerResult {
    if !matches!(ctx.request.extension, Extension::None) {
        return Err(unsupported_operation());
    }

    let internal_iri = ctx.internal_iri();
    let parent_status = ctx.collaborators.resource.get(&internal_iri).await?;
    let parent = match &parent_status {
        ResourceStatusToken::Existing(token) => token,
        ResourceStatusToken::Deleted(_) => return Err(catalogue::GONE.new_problem_builder().finish()),
        ResourceStatusToken::Missing => return Err(catalogue::NOT_FOUND.new_problem_builder().finish()),
    };
    if !parent.interaction_model.is_container_like() {
        return Err(unsupported_operation());
    }

    let content_type = ctx
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let link_type = ctx
        .request
        .link
        .as_ref()
        .and_then(|link| link.values.iter().find(|v| v.rel == TYPE_REL))
        .map(|v| v.target.clone());

    let declared_model = link_type.as_deref().map(|iri| InteractionModel::from_type_iri(iri).unwrap_or(InteractionModel::RDFSource));

    let body_syntax = content_type.as_deref().and_then(RdfSyntax::from_media_type);
    let body_is_binary = content_type.is_some() && body_syntax.is_none();

    if let Some(declared) = declared_model {
        let declared_is_binary = declared == InteractionModel::NonRDFSource;
        if content_type.is_some() && declared_is_binary != body_is_binary {
            return Err(constraint_violation(ConstraintViolation::UnsupportedInteractionModel));
        }
    }

    let child_model = declared_model.unwrap_or(if body_is_binary {
        InteractionModel::NonRDFSource
    } else {
        InteractionModel::RDFSource
    });

    let mut slug_segment = ctx
        .request
        .slug
        .as_ref()
        .and_then(sanitize_slug)
        .unwrap_or_else(|| ctx.collaborators.resource.generate_identifier());
    let mut child_path = ctx.request.child_path(&slug_segment);
    let mut child_external = ctx.external_url_for(&child_path);
    let mut child_internal = ctx.collaborators.resource.to_internal(&child_external);

    // A Slug collision falls back silently to a server-generated
    // identifier (SPEC_FULL.md §9 open-question decision), never 409.
    if let ResourceStatusToken::Existing(_) = ctx.collaborators.resource.get(&child_internal).await? {
        slug_segment = ctx.collaborators.resource.generate_identifier();
        child_path = ctx.request.child_path(&slug_segment);
        child_external = ctx.external_url_for(&child_path);
        child_internal = ctx.collaborators.resource.to_internal(&child_external);
    }

    let metadata = MutationMetadata {
        internal_iri: child_internal.clone(),
        interaction_model: child_model,
        content_type: content_type.clone(),
        slug: Some(slug_segment),
        target_graph: ldp_repo::model::NamedGraph::PreferUserManaged,
    };

    if child_model == InteractionModel::NonRDFSource {
        if let Some(digest) = &ctx.request.digest {
            validate_digest(digest, &ctx.body)?;
        }
        ctx.collaborators
            .binary
            .set_content(metadata.clone(), ctx.body.clone())
            .await?;
        ctx.collaborators.resource.create(metadata.clone(), Dataset::default()).await?;
    } else {
        let dataset = ctx
            .collaborators
            .io
            .read(ctx.body.clone(), &child_external, body_syntax.map(|s| s.media_type()).unwrap_or("text/turtle"))
            .await?;
        crate::constraint::validate(&dataset, child_model)?;
        ctx.collaborators.resource.create(metadata.clone(), dataset).await?;
    }

    let audit = ctx.collaborators.audit.creation(&metadata, &ctx.session).await?;
    ctx.collaborators.resource.add(&child_internal, audit).await?;

    ctx.collaborators.memento.put(&child_internal).await?;
    crate::event::dispatch(ctx, &child_internal, &child_path, ldp_repo::collaborator::EventKind::Create, false).await;

    let mut response = AssembledResponse::new()
        .status(StatusCode::CREATED)
        .header(http::header::LOCATION, http::HeaderValue::from_str(&child_external).expect("external url is ascii"));

    for model in child_model.supertypes() {
        response = response.add_link(LinkValue::new(model.type_iri(), TYPE_REL));
    }
    if child_model == InteractionModel::NonRDFSource {
        response = response.add_link(LinkValue::new(child_external, DESCRIBEDBY_REL));
    }

    Ok(response)
}

fn unsupported_operation() -> Problem {
    catalogue::UNSUPPORTED_OPERATION
        .new_api_error_builder(StatusCode::METHOD_NOT_ALLOWED)
        .finish()
        .into()
}

fn constraint_violation(kind: ConstraintViolation) -> Problem {
    catalogue::CONSTRAINT_VIOLATION
        .new_api_error_builder(StatusCode::CONFLICT)
        .extend_with::<KConstraintViolation>(kind)
        .finish()
        .into()
}

/// Validate a `Digest` header against the uploaded bytes (spec.md §4.6
/// POST step 5). Only `sha-256` is computable here; any other named
/// algorithm is reported as unsupported, per spec.
fn validate_digest(digest: &ldp_http::header::digest::Digest, body: &bytes::Bytes) -> Result<(), Problem> {
    if digest.algorithm != DigestAlgorithm::Sha256 {
        return Err(catalogue::CLIENT_SYNTAX
            .new_api_error_builder(StatusCode::BAD_REQUEST)
            .message("unsupported Digest algorithm")
            .finish()
            .into());
    }
    let expected = base64::engine::general_purpose::STANDARD
        .decode(digest.value_base64.as_bytes())
        .map_err(|_| {
            catalogue::CLIENT_SYNTAX
                .new_api_error_builder(StatusCode::BAD_REQUEST)
                .message("malformed Digest value")
                .finish()
        })?;
    let actual = Sha256::digest(body);
    if actual.as_slice() != expected.as_slice() {
        return Err(catalogue::CLIENT_SYNTAX
            .new_api_error_builder(StatusCode::BAD_REQUEST)
            .message("Digest does not match uploaded bytes")
            .finish()
            .into());
    }
    Ok(())
}
