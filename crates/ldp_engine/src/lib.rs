//! The LDP protocol engine (spec.md §2, §4): filters, method handlers,
//! event dispatch, and the top-level `tower::Service` that composes them,
//! built over the `ldp_http`/`ldp_repo` primitives.

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod config;
pub mod constraint;
pub mod event;
pub mod filter;
pub mod method;
pub mod service;
