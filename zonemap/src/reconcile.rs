//! Diffing a fresh fetch against the markers already loaded.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::marker::ClassifiedMarker;
use crate::overpass::{EntityId, RawEntity};

/// Outcome of comparing loaded markers with a new fetch.
#[derive(Debug, Default)]
pub struct Reconciliation {
    /// Loaded markers fetched again; reused as-is.
    pub keep: Vec<Arc<ClassifiedMarker>>,
    /// Loaded markers missing from the fetch.
    pub remove: Vec<Arc<ClassifiedMarker>>,
    /// Fetched entities with ids not loaded yet.
    pub create: Vec<RawEntity>,
}

impl Reconciliation {
    /// True when the fetch neither adds nor removes markers.
    pub fn is_unchanged(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty()
    }
}

/// Split `fetched` into markers to keep, remove and create.
///
/// Identity is the entity id alone. An entity appearing twice in one fetch is
/// taken from its first occurrence. Output lists are in id order for `keep`
/// and `remove`, fetch order for `create`.
pub fn reconcile(
    previous: &HashMap<EntityId, Arc<ClassifiedMarker>>,
    fetched: Vec<RawEntity>,
) -> Reconciliation {
    let mut seen: HashSet<EntityId> = HashSet::with_capacity(fetched.len());
    let mut keep = Vec::new();
    let mut create = Vec::new();

    for entity in fetched {
        if !seen.insert(entity.id.clone()) {
            continue;
        }
        match previous.get(&entity.id) {
            Some(marker) => keep.push(Arc::clone(marker)),
            None => create.push(entity),
        }
    }

    let mut remove: Vec<Arc<ClassifiedMarker>> = previous
        .iter()
        .filter(|(id, _)| !seen.contains(*id))
        .map(|(_, m)| Arc::clone(m))
        .collect();

    keep.sort_by(|a, b| a.id().cmp(b.id()));
    remove.sort_by(|a, b| a.id().cmp(b.id()));

    Reconciliation {
        keep,
        remove,
        create,
    }
}
