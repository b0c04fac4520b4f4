//! This crate provides the HTTP-facing primitives the LDP protocol engine
//! is built from: the parsed Request Model, content negotiation,
//! preconditions evaluation, response assembly, typed headers not already
//! covered by the `headers` crate, and the `Problem`/`ApiError` error
//! split used at every collaborator and HTTP-edge boundary.

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod body;
pub mod conditional;
pub mod conneg;
pub mod header;
pub mod problem;
pub mod request;
pub mod response;
