//! In-memory [`IoService`] (spec.md §6): a deliberately minimal RDF codec
//! and SPARQL-Update applier, kept outside the HTTP engine's concern per
//! [`Dataset`]'s own contract — "opaque to the HTTP engine... passed
//! through unexamined". No RDF parser crate (e.g. `oxigraph`, `sophia`)
//! is in this workspace's dependency set, so quads are carried as
//! newline-delimited statement text rather than parsed triples; this is
//! sufficient to round-trip through every method handler, but it does
//! not validate Turtle/N-Triples/JSON-LD syntax, and SPARQL-Update
//! support is limited to `INSERT DATA` / `DELETE DATA` blocks.

use async_trait::async_trait;
use bytes::Bytes;

use ldp_http::problem::{catalogue, Problem};
use ldp_repo::collaborator::{Dataset, IoService};

/// In-memory [`IoService`].
#[derive(Default)]
pub struct MemoryIoService;

#[async_trait]
impl IoService for MemoryIoService {
    async fn read(&self, body: Bytes, _base_iri: &str, syntax: &str) -> Result<Dataset, Problem> {
        let text = std::str::from_utf8(&body)
            .map_err(|_| catalogue::CLIENT_SYNTAX.new_problem_builder().message("request body is not UTF-8").finish())?;

        if syntax == "application/ld+json" {
            let value: serde_json::Value = serde_json::from_str(text)
                .map_err(|_| catalogue::CLIENT_SYNTAX.new_problem_builder().message("malformed JSON-LD body").finish())?;
            let quads = match value {
                serde_json::Value::Array(items) => items.into_iter().map(|v| v.to_string()).collect(),
                other => vec![other.to_string()],
            };
            return Ok(Dataset { quads });
        }

        let quads = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("@prefix"))
            .map(str::to_owned)
            .collect();
        Ok(Dataset { quads })
    }

    async fn write(&self, dataset: &Dataset, syntax: &str, _profile: Option<&str>) -> Result<Bytes, Problem> {
        if syntax == "application/ld+json" {
            let array: Vec<serde_json::Value> = dataset
                .quads
                .iter()
                .map(|q| serde_json::from_str(q).unwrap_or_else(|_| serde_json::Value::String(q.clone())))
                .collect();
            let body = serde_json::to_vec(&array).expect("json-ld serialization of opaque quads never fails");
            return Ok(Bytes::from(body));
        }
        let mut body = dataset.quads.join("\n");
        if !body.is_empty() {
            body.push('\n');
        }
        Ok(Bytes::from(body))
    }

    async fn update(&self, dataset: Dataset, sparql: &str, _base_iri: &str) -> Result<Dataset, Problem> {
        let mut quads = dataset.quads;
        let mut touched = false;

        if let Some(block) = extract_block(sparql, "DELETE DATA") {
            for line in block_lines(block) {
                quads.retain(|q| q != line);
            }
            touched = true;
        }
        if let Some(block) = extract_block(sparql, "INSERT DATA") {
            for line in block_lines(block) {
                if !quads.iter().any(|q| q == line) {
                    quads.push(line.to_owned());
                }
            }
            touched = true;
        }

        if !touched {
            return Err(catalogue::CLIENT_SYNTAX
                .new_problem_builder()
                .message("only INSERT DATA / DELETE DATA SPARQL-Update forms are supported")
                .finish());
        }

        Ok(Dataset { quads })
    }
}

/// Extract the `{ ... }` block following a `keyword` token, if present.
fn extract_block<'a>(sparql: &'a str, keyword: &str) -> Option<&'a str> {
    let start = sparql.find(keyword)? + keyword.len();
    let open = sparql[start..].find('{')? + start + 1;
    let close = sparql[open..].find('}')? + open;
    Some(&sparql[open..close])
}

fn block_lines(block: &str) -> impl Iterator<Item = &str> {
    block
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_end_matches('.').trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_strips_comments_and_blank_lines() {
        let io = MemoryIoService;
        let body = Bytes::from("@prefix ex: <http://example.org/> .\n\n# a comment\nex:a ex:b ex:c .\n");
        let dataset = io.read(body, "http://example.org/", "text/turtle").await.unwrap();
        assert_eq!(dataset.quads, vec!["ex:a ex:b ex:c .".to_owned()]);
    }

    #[tokio::test]
    async fn update_applies_insert_then_delete() {
        let io = MemoryIoService;
        let dataset = Dataset { quads: vec!["ex:a ex:b ex:c .".to_owned()] };
        let sparql = "DELETE DATA { ex:a ex:b ex:c . } ; INSERT DATA { ex:a ex:b ex:d . }";
        let updated = io.update(dataset, sparql, "http://example.org/").await.unwrap();
        assert_eq!(updated.quads, vec!["ex:a ex:b ex:d".to_owned()]);
    }

    #[tokio::test]
    async fn update_rejects_unsupported_form() {
        let io = MemoryIoService;
        let dataset = Dataset::default();
        let result = io.update(dataset, "WITH <g> DELETE { ?s ?p ?o } WHERE { ?s ?p ?o }", "http://example.org/").await;
        assert!(result.is_err());
    }
}
