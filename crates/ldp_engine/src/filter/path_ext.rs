//! Path/Slug/Extension Normalizer (spec.md §4.1): parses the raw request
//! into a [`RequestModel`](ldp_http::request::RequestModel), the single
//! point where trailing-slash normalization, Slug sanitization, and
//! `ext`/`version` dispatch happen.

use http::request::Parts;
use ldp_http::problem::Problem;
use ldp_http::request::RequestModel;

/// Parse the request's head into a [`RequestModel`], per spec.md §4.1.
pub fn normalize(parts: &Parts, raw_path: &str, raw_query: Option<&str>) -> Result<RequestModel, Problem> {
    RequestModel::parse(parts, raw_path, raw_query)
}
