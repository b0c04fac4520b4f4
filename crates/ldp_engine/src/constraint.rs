//! LDP constraint validation over a parsed [`Dataset`] (spec.md §4.6
//! POST step 4 / PUT step 3 / PATCH step 2): a statement using `rdf:type`
//! with a literal object, or a Direct/Indirect Container asserting more
//! than one `ldp:membershipResource`, is rejected with 409 before it
//! reaches the Resource Service.

use http::StatusCode;

use ldp_http::problem::{catalogue, ConstraintViolation, KConstraintViolation, Problem, ProblemBuilderExt};
use ldp_repo::collaborator::Dataset;
use ldp_repo::model::InteractionModel;

const MEMBERSHIP_RESOURCE_IRI: &str = "<http://www.w3.org/ns/ldp#membershipResource>";

/// Reject `dataset` if it violates an LDP range or cardinality constraint
/// for a resource asserted/retained as `interaction_model`.
pub fn validate(dataset: &Dataset, interaction_model: InteractionModel) -> Result<(), Problem> {
    let mut membership_resource_count = 0usize;
    for quad in &dataset.quads {
        let Some((_, predicate, object)) = statement_parts(quad) else { continue };
        if is_rdf_type_predicate(predicate) && object.starts_with('"') {
            return Err(constraint_violation(ConstraintViolation::InvalidRange));
        }
        if predicate == MEMBERSHIP_RESOURCE_IRI {
            membership_resource_count += 1;
        }
    }

    let is_direct_or_indirect =
        matches!(interaction_model, InteractionModel::DirectContainer | InteractionModel::IndirectContainer);
    if is_direct_or_indirect && membership_resource_count > 1 {
        return Err(constraint_violation(ConstraintViolation::InvalidCardinality));
    }

    Ok(())
}

/// Whether `predicate` names `rdf:type`, in any of the textual forms the
/// reference I/O Service's quad lines carry it (full IRI, prefixed name,
/// or the Turtle `a` shorthand).
fn is_rdf_type_predicate(predicate: &str) -> bool {
    matches!(predicate, "a" | "rdf:type" | "<http://www.w3.org/1999/02/22-rdf-syntax-ns#type>")
}

/// Split a quad line into `(subject, predicate, object)`, tolerating the
/// trailing `.` the I/O Service's statement lines carry.
fn statement_parts(quad: &str) -> Option<(&str, &str, &str)> {
    let trimmed = quad.trim().trim_end_matches('.').trim();
    let mut parts = trimmed.splitn(3, char::is_whitespace);
    let subject = parts.next()?;
    let predicate = parts.next()?;
    let object = parts.next()?.trim();
    Some((subject, predicate, object))
}

fn constraint_violation(kind: ConstraintViolation) -> Problem {
    catalogue::CONSTRAINT_VIOLATION
        .new_api_error_builder(StatusCode::CONFLICT)
        .extend_with::<KConstraintViolation>(kind)
        .finish()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(quads: &[&str]) -> Dataset {
        Dataset { quads: quads.iter().map(|q| q.to_owned().to_owned()).collect() }
    }

    #[test]
    fn rejects_rdf_type_with_literal_object() {
        let result = validate(&dataset(&["<http://example.org/r> <rdf:type> \"literal\" ."]), InteractionModel::RDFSource);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_turtle_shorthand_type_with_literal_object() {
        let result = validate(&dataset(&["<http://example.org/r> a \"literal\""]), InteractionModel::RDFSource);
        assert!(result.is_err());
    }

    #[test]
    fn allows_rdf_type_with_iri_object() {
        let result = validate(
            &dataset(&["<http://example.org/r> <rdf:type> <http://www.w3.org/ns/ldp#RDFSource> ."]),
            InteractionModel::RDFSource,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn rejects_duplicate_membership_resource_on_direct_container() {
        let result = validate(
            &dataset(&[
                "<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/a> .",
                "<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/b> .",
            ]),
            InteractionModel::DirectContainer,
        );
        assert!(result.is_err());
    }

    #[test]
    fn allows_single_membership_resource_on_direct_container() {
        let result = validate(
            &dataset(&["<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/a> ."]),
            InteractionModel::DirectContainer,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn duplicate_membership_resource_is_allowed_outside_dc_ic() {
        let result = validate(
            &dataset(&[
                "<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/a> .",
                "<http://example.org/c> <http://www.w3.org/ns/ldp#membershipResource> <http://example.org/b> .",
            ]),
            InteractionModel::BasicContainer,
        );
        assert!(result.is_ok());
    }
}
