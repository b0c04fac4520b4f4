//! The shared in-memory state backing every collaborator implementation
//! in this crate: one [`Store`] behind a single [`std::sync::Mutex`],
//! locked only for synchronous critical sections and never held across
//! an `.await` (mirrors the teacher's own rule for its object-store
//! backends, that repository state is mutated behind a lock taken and
//! released within a single non-async call).

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use base64::Engine;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use sha2::{Digest as _, Sha256};

use ldp_repo::collaborator::Dataset;
use ldp_repo::model::InteractionModel;

/// A resource's full in-memory state, keyed by internal identity.
#[derive(Debug, Clone)]
pub struct Entry {
    pub interaction_model: InteractionModel,
    pub user_graph: Dataset,
    pub acl_graph: Option<Dataset>,
    pub audit_graph: Dataset,
    pub content_type: Option<String>,
    pub binary: Option<Bytes>,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn new(interaction_model: InteractionModel, now: DateTime<Utc>) -> Self {
        Self {
            interaction_model,
            user_graph: Dataset::default(),
            acl_graph: None,
            audit_graph: Dataset::default(),
            content_type: None,
            binary: None,
            created_at: now,
            last_modified: now,
            deleted_at: None,
        }
    }

    /// A weak etag for an RDF-bearing representation, strong for a binary
    /// one (spec.md §4.3), derived from the content actually stored so two
    /// snapshots with identical content compare equal.
    pub fn etag(&self) -> String {
        let mut hasher = Sha256::new();
        match &self.binary {
            Some(bytes) => hasher.update(bytes),
            None => {
                for quad in &self.user_graph.quads {
                    hasher.update(quad.as_bytes());
                    hasher.update(b"\n");
                }
            }
        }
        let digest = hasher.finalize();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(&digest[..12])
    }

    pub fn content_length(&self) -> Option<u64> {
        self.binary.as_ref().map(|b| b.len() as u64)
    }
}

/// A point-in-time copy of an [`Entry`], recorded by the Memento Service.
pub type Snapshot = Entry;

/// Shared store: live resource entries plus their recorded mementos.
#[derive(Default)]
pub struct Store {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<String, Entry>,
    mementos: HashMap<String, BTreeMap<DateTime<Utc>, Snapshot>>,
}

impl Store {
    /// New, empty store with a freshly provisioned root container.
    pub fn new(now: DateTime<Utc>) -> Self {
        let store = Self::default();
        store.with_mut(|inner| {
            inner
                .entries
                .insert(ldp_repo::model::InternalIri::PREFIX.trim_end_matches('/').to_owned() + "/", Entry::new(InteractionModel::BasicContainer, now));
        });
        store
    }

    fn with<T>(&self, f: impl FnOnce(&StoreInner) -> T) -> T {
        f(&self.inner.lock().expect("store mutex poisoned"))
    }

    fn with_mut<T>(&self, f: impl FnOnce(&mut StoreInner) -> T) -> T {
        f(&mut self.inner.lock().expect("store mutex poisoned"))
    }

    pub fn get(&self, iri: &str) -> Option<Entry> {
        self.with(|s| s.entries.get(iri).cloned())
    }

    pub fn insert(&self, iri: String, entry: Entry) {
        self.with_mut(|s| {
            s.entries.insert(iri, entry);
        });
    }

    pub fn mutate(&self, iri: &str, f: impl FnOnce(&mut Entry)) -> Option<Entry> {
        self.with_mut(|s| {
            let entry = s.entries.get_mut(iri)?;
            f(entry);
            Some(entry.clone())
        })
    }

    pub fn remove_binary(&self, iri: &str) {
        self.with_mut(|s| {
            if let Some(entry) = s.entries.get_mut(iri) {
                entry.binary = None;
            }
        });
    }

    pub fn snapshot(&self, iri: &str) {
        self.with_mut(|s| {
            let Some(entry) = s.entries.get(iri).cloned() else { return };
            s.mementos.entry(iri.to_owned()).or_default().insert(entry.last_modified, entry);
        });
    }

    pub fn mementos(&self, iri: &str) -> Vec<DateTime<Utc>> {
        self.with(|s| s.mementos.get(iri).map(|m| m.keys().copied().collect()).unwrap_or_default())
    }

    pub fn memento_at_or_before(&self, iri: &str, instant: DateTime<Utc>) -> Option<Entry> {
        self.with(|s| {
            s.mementos
                .get(iri)
                .and_then(|m| m.range(..=instant).next_back())
                .map(|(_, snapshot)| snapshot.clone())
        })
    }

    /// Resources whose internal identity names the immediate children of
    /// `parent_iri` (used to derive `ldp:contains` membership on read).
    pub fn children(&self, parent_iri: &str) -> Vec<String> {
        self.with(|s| {
            s.entries
                .keys()
                .filter(|iri| {
                    iri.strip_prefix(parent_iri)
                        .map(|rest| !rest.is_empty() && !rest.trim_end_matches('/').contains('/'))
                        .unwrap_or(false)
                })
                .cloned()
                .collect()
        })
    }
}

pub(crate) fn new_entry(interaction_model: InteractionModel, now: DateTime<Utc>) -> Entry {
    Entry::new(interaction_model, now)
}
