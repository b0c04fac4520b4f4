//! In-memory [`EventService`] (spec.md §6, §4.8): fire-and-forget event
//! sink for this reference deployment. No WebSub hub is actually pinged
//! here (no HTTP client crate is in this workspace's dependency set);
//! events are logged via `tracing` and kept in a bounded ring buffer so
//! tests and operators can inspect recent activity without a real
//! subscriber.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use ldp_repo::collaborator::{Event, EventService};

const RING_CAPACITY: usize = 256;

/// In-memory [`EventService`].
pub struct MemoryEventService {
    recent: Mutex<VecDeque<Event>>,
}

impl Default for MemoryEventService {
    fn default() -> Self {
        Self { recent: Mutex::new(VecDeque::with_capacity(RING_CAPACITY)) }
    }
}

impl MemoryEventService {
    /// The most recently emitted events, newest last.
    pub fn recent(&self) -> Vec<Event> {
        self.recent.lock().expect("event ring mutex poisoned").iter().cloned().collect()
    }
}

#[async_trait]
impl EventService for MemoryEventService {
    async fn emit(&self, event: Event) {
        info!(resource = %event.internal_iri, kind = ?event.kind, "resource event");
        let mut recent = self.recent.lock().expect("event ring mutex poisoned");
        if recent.len() == RING_CAPACITY {
            recent.pop_front();
        }
        recent.push_back(event);
    }
}

#[cfg(test)]
mod tests {
    use ldp_repo::collaborator::EventKind;

    use super::*;

    #[tokio::test]
    async fn emitted_events_are_retained_in_order() {
        let service = MemoryEventService::default();
        service.emit(Event { internal_iri: "trellis:data/a".to_owned(), kind: EventKind::Create }).await;
        service.emit(Event { internal_iri: "trellis:data/b".to_owned(), kind: EventKind::Update }).await;
        let recent = service.recent();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[1].internal_iri, "trellis:data/b");
    }
}
