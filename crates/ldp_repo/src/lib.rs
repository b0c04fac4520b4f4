//! Domain model and collaborator trait interfaces for the LDP HTTP
//! protocol engine: the interaction-model hierarchy, named-graph
//! partitions, WebAC access modes, resource status tokens, and the
//! Resource/Memento/Binary/IO/AccessControl/Event/Audit service
//! boundaries (spec.md §3, §6).

#![warn(missing_docs)]
#![deny(unused_qualifications)]

pub mod collaborator;
pub mod model;
pub mod session;
pub mod status;
