//! In-memory reference implementations of the seven collaborator traits
//! (spec.md §6), all sharing one [`store::Store`].

pub mod access_control;
pub mod audit;
pub mod binary;
pub mod event;
pub mod io;
pub mod memento;
pub mod resource;
pub mod store;

use std::sync::Arc;

use chrono::Utc;
use ldp_engine::method::Collaborators;

/// Build a full [`Collaborators`] set backed by one shared, empty store
/// (besides its freshly provisioned root container).
pub fn build(base_url: impl Into<String>) -> Collaborators {
    let store = Arc::new(store::Store::new(Utc::now()));
    Collaborators {
        resource: Arc::new(resource::MemoryResourceService::new(store.clone(), base_url)),
        memento: Arc::new(memento::MemoryMementoService::new(store.clone())),
        binary: Arc::new(binary::MemoryBinaryService::new(store.clone())),
        io: Arc::new(io::MemoryIoService),
        access_control: Arc::new(access_control::MemoryAccessControlService::new(store)),
        event: Arc::new(event::MemoryEventService::default()),
        audit: Arc::new(audit::MemoryAuditService),
    }
}
