//! Event composition & dispatch (spec.md §4.8): on a successful state
//! change, compose the events the Event Service should see and submit
//! them fire-and-forget.

use ldp_repo::collaborator::{Event, EventKind};
use ldp_repo::model::{InteractionModel, NamedGraph};

use crate::method::MethodContext;

const MEMBERSHIP_RESOURCE_PREDICATE: &str = "<http://www.w3.org/ns/ldp#membershipResource>";

/// Compose and fire the events for a mutation on `internal_iri`.
///
/// `resource_path` is the mutated resource's own storage-relative path
/// (its parent names the container whose containment changed).
///
/// `created_uncontained` is set only by a PUT that created a new resource
/// while PUT-UNCONTAINED mode is configured on, in which case the parent
/// container already references the child and gets no separate event
/// (spec.md §4.8: "PUT creating a new resource ... emit 1 event").
pub async fn dispatch(ctx: &MethodContext, internal_iri: &str, resource_path: &str, kind: EventKind, created_uncontained: bool) {
    ctx.collaborators
        .event
        .emit(Event { internal_iri: internal_iri.to_owned(), kind })
        .await;

    if created_uncontained && ctx.config.put_uncontained {
        return;
    }

    let Some(parent_path) = parent_path(resource_path) else { return };
    let parent_external = ctx.external_url_for(&parent_path);
    let parent_internal = ctx.collaborators.resource.to_internal(&parent_external);
    ctx.collaborators
        .event
        .emit(Event { internal_iri: parent_internal.clone(), kind: EventKind::Update })
        .await;

    if let Some(membership_resource) = distinct_membership_resource(ctx, &parent_internal).await {
        ctx.collaborators
            .event
            .emit(Event { internal_iri: membership_resource, kind: EventKind::Update })
            .await;
    }
}

/// The parent's `ldp:membershipResource` object, if the parent is a
/// Direct/Indirect Container and that object names a resource distinct
/// from the container itself (spec.md §4.8: "additionally emit 1 event
/// for the membership resource when it is distinct from the container").
async fn distinct_membership_resource(ctx: &MethodContext, parent_internal: &str) -> Option<String> {
    let status = ctx.collaborators.resource.get(parent_internal).await.ok()?;
    let existing = status.as_existing()?;
    if !matches!(existing.interaction_model, InteractionModel::DirectContainer | InteractionModel::IndirectContainer) {
        return None;
    }
    let dataset = ctx
        .collaborators
        .resource
        .get_dataset(parent_internal, NamedGraph::PreferUserManaged)
        .await
        .ok()?;
    let membership_resource = dataset.quads.iter().find_map(|quad| membership_resource_object(quad))?;
    let membership_internal = ctx.collaborators.resource.to_internal(&membership_resource);
    if membership_internal == parent_internal {
        return None;
    }
    Some(membership_internal)
}

/// The object of an `ldp:membershipResource` quad line, stripped of its
/// enclosing `<` `>`, or `None` if `quad` asserts a different predicate.
fn membership_resource_object(quad: &str) -> Option<String> {
    let trimmed = quad.trim().trim_end_matches('.').trim();
    let mut parts = trimmed.splitn(3, char::is_whitespace);
    let _subject = parts.next()?;
    let predicate = parts.next()?;
    if predicate != MEMBERSHIP_RESOURCE_PREDICATE {
        return None;
    }
    let object = parts.next()?.trim();
    Some(object.trim_matches(|c: char| c == '<' || c == '>').to_owned())
}

/// The parent storage-relative path of `path`, or `None` at the root.
fn parent_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    Some(path.rsplit_once('/').map(|(parent, _)| parent.to_owned()).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{membership_resource_object, parent_path};

    #[test]
    fn root_has_no_parent() {
        assert_eq!(parent_path(""), None);
    }

    #[test]
    fn top_level_child_parent_is_root() {
        assert_eq!(parent_path("a").as_deref(), Some(""));
    }

    #[test]
    fn nested_child_parent_is_container_segment() {
        assert_eq!(parent_path("c/child").as_deref(), Some("c"));
    }

    #[test]
    fn membership_resource_object_extracts_iri() {
        let quad = "<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/a> .";
        assert_eq!(membership_resource_object(quad).as_deref(), Some("http://example.org/a"));
    }

    #[test]
    fn membership_resource_object_ignores_other_predicates() {
        let quad = "<http://example.org/c> <http://www.w3.org/ns/ldp#contains> <http://example.org/a> .";
        assert_eq!(membership_resource_object(quad), None);
    }
}
