//! In-memory reference deployment of the LDP protocol engine
//! (`ldp_engine`): wires the seven collaborator traits
//! (`ldp_repo::collaborator`) to a shared in-memory store, loads
//! deployment configuration, and exposes the constructed
//! `ldp_engine::service::LdpService` for `main` (or integration tests)
//! to serve.

pub mod config;
pub mod memory;
pub mod tracing;
