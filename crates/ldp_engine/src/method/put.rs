//! PUT handler (spec.md §4.6 PUT).

use http::{Method, StatusCode};
use ldp_http::conditional::{self, build_etag, PreconditionOutcome, ResourceValidators};
use ldp_http::conneg::RdfSyntax;
use ldp_http::header::link::TYPE_REL;
use ldp_http::problem::{catalogue, ConstraintViolation, KConstraintViolation, Problem, ProblemBuilderExt};
use ldp_http::request::Extension;
use ldp_http::response::AssembledResponse;
use ldp_repo::collaborator::{Dataset, MutationMetadata};
use ldp_repo::model::{InteractionModel, NamedGraph};

use super::{HandlerResult, MethodContext};

/// Handle PUT: create-or-replace a resource's state.
pub async fn handle(ctx: &MethodContext) -> HandlerResult {
    if ctx.request.extension.is_read_only() {
        return Err(unsupported_operation());
    }

    let internal_iri = ctx.internal_iri();
    let status = ctx.collaborators.resource.get(&internal_iri).await?;

    let is_acl = ctx.request.extension == Extension::Acl;
    let existing = status.as_existing();

    if is_acl {
        if let Some(existing) = existing {
            if existing.interaction_model == InteractionModel::NonRDFSource {
                return Err(catalogue::UNSUPPORTED_OPERATION
                    .new_api_error_builder(StatusCode::NOT_ACCEPTABLE)
                    .message("cannot write an ACL graph onto a binary resource")
                    .finish()
                    .into());
            }
        }
    }

    let validators = ResourceValidators {
        exists: existing.is_some(),
        last_modified: existing.map(|e| e.last_modified),
        etag: existing.map(|e| build_etag(&e.etag, e.etag_is_weak)),
    };
    if let PreconditionOutcome::ShortCircuit(code) = conditional::evaluate(&Method::PUT, &ctx.headers, &validators) {
        return Ok(AssembledResponse::new().status(code));
    }

    let link_type = ctx
        .request
        .link
        .as_ref()
        .and_then(|link| link.values.iter().find(|v| v.rel == TYPE_REL))
        .map(|v| v.target.clone());
    let declared_model = link_type.as_deref().map(|iri| InteractionModel::from_type_iri(iri).unwrap_or(InteractionModel::RDFSource));

    let content_type = ctx
        .headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let body_syntax = content_type.as_deref().and_then(RdfSyntax::from_media_type);
    let body_is_binary = content_type.is_some() && body_syntax.is_none();

    // A replace that would flip RDFSource<->NonRDFSource across an
    // incompatible family is rejected (spec.md §4.6 PUT step 3).
    if let Some(existing) = existing {
        let existing_is_binary = existing.interaction_model == InteractionModel::NonRDFSource;
        if !is_acl && content_type.is_some() && existing_is_binary != body_is_binary {
            return Err(constraint_violation(ConstraintViolation::UnsupportedInteractionModel));
        }
    }
    if let Some(declared) = declared_model {
        let declared_is_binary = declared == InteractionModel::NonRDFSource;
        if content_type.is_some() && declared_is_binary != body_is_binary {
            return Err(constraint_violation(ConstraintViolation::UnsupportedInteractionModel));
        }
    }

    let target_model = declared_model
        .or_else(|| existing.map(|e| e.interaction_model))
        .unwrap_or(if body_is_binary {
            InteractionModel::NonRDFSource
        } else {
            InteractionModel::RDFSource
        });

    let target_graph = if is_acl {
        NamedGraph::PreferAccessControl
    } else {
        NamedGraph::PreferUserManaged
    };

    let metadata = MutationMetadata {
        internal_iri: internal_iri.clone(),
        interaction_model: target_model,
        content_type: content_type.clone(),
        slug: None,
        target_graph,
    };

    if target_model == InteractionModel::NonRDFSource && !is_acl {
        ctx.collaborators.binary.set_content(metadata.clone(), ctx.body.clone()).await?;
    } else {
        let syntax = body_syntax.map(|s| s.media_type()).unwrap_or("text/turtle");
        let dataset = ctx.collaborators.io.read(ctx.body.clone(), &ctx.external_url(), syntax).await?;
        // `ldp:contains` is server-managed; ignore any attempt to assert it
        // (spec.md §4.6 PUT step 4).
        let dataset = Dataset {
            quads: dataset.quads.into_iter().filter(|q| !q.contains("http://www.w3.org/ns/ldp#contains")).collect(),
        };
        crate::constraint::validate(&dataset, target_model)?;
        if existing.is_some() {
            ctx.collaborators.resource.replace(metadata.clone(), dataset).await?;
        } else {
            ctx.collaborators.resource.create(metadata.clone(), dataset).await?;
        }
    }

    let created = existing.is_none();
    let audit = if created {
        ctx.collaborators.audit.creation(&metadata, &ctx.session).await?
    } else {
        ctx.collaborators.audit.update(&metadata, &ctx.session).await?
    };
    ctx.collaborators.resource.add(&internal_iri, audit).await?;

    ctx.collaborators.memento.put(&internal_iri).await?;
    crate::event::dispatch(
        ctx,
        &internal_iri,
        &ctx.request.path,
        if created { ldp_repo::collaborator::EventKind::Create } else { ldp_repo::collaborator::EventKind::Update },
        created,
    )
    .await;

    let response = if existing.is_some() {
        AssembledResponse::new().status(StatusCode::NO_CONTENT)
    } else {
        AssembledResponse::new()
            .status(StatusCode::CREATED)
            .header(
                http::header::CONTENT_LOCATION,
                http::HeaderValue::from_str(&ctx.external_url()).expect("external url is ascii"),
            )
    };

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
