//! Request/response body type used across the engine: a boxed,
//! type-erased `http_body::Body` over [`Bytes`] frames, so filters and
//! method handlers never need to be generic over a concrete body type.

use bytes::Bytes;
use http_body_util::{combinators::BoxBody, BodyExt, Empty, Full};
use std::convert::Infallible;

/// Boxed body type used for both requests and responses throughout the
/// engine.
pub type Body = BoxBody<Bytes, Infallible>;

/// Build an empty body (used for 204/304/HEAD responses).
pub fn empty() -> Body {
    Empty::new().map_err(|never| match never {}).boxed()
}

/// Build a body from an in-memory byte buffer.
pub fn full<T: Into<Bytes>>(data: T) -> Body {
    Full::new(data.into()).map_err(|never| match never {}).boxed()
}
