//! Concurrency-safe registry of tracked cluster nodes.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use node_registry_sdk::{NodeEntry, NodeRecord, TopologySnapshot};
use parking_lot::Mutex;
use tracing::debug;

use super::entry;

/// Predicate identifying which raw record describes the local node.
pub type SelfPredicate = Box<dyn Fn(&NodeRecord) -> bool + Send + Sync>;

/// Versioned, mutex-guarded map of every tracked node's network identity.
///
/// The cluster-state watch feeds mutations through [`NodeRegistry::update_node`]
/// and [`NodeRegistry::remove_node`]; the route reconciler consumes consistent
/// copies via [`NodeRegistry::snapshot`] after readiness has been signaled.
/// Every operation acquires the lock once for bounded work, so the registry is
/// safe to share across any number of threads.
pub struct NodeRegistry {
    me_predicate: SelfPredicate,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    ready: bool,
    nodes: HashMap<String, NodeEntry>,
    version: u64,
    /// Name of the entry bound as self; set at most once, never reassigned.
    self_name: Option<String>,
}

impl NodeRegistry {
    /// Creates an empty registry with the given self-identification predicate.
    #[must_use]
    pub fn new(me_predicate: SelfPredicate) -> Self {
        Self {
            me_predicate,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Upserts the entry for a raw record, returning whether anything changed.
    ///
    /// Entry creation, an attribute change produced by normalization, and the
    /// first match of the self-identification predicate each count as a
    /// change; any change advances the version exactly once. A record that
    /// normalizes to the entry's current attributes leaves the version
    /// untouched.
    pub fn update_node(&self, record: &NodeRecord) -> bool {
        let mut inner = self.inner.lock();

        let mut changed = false;
        let node = match inner.nodes.entry(record.name.clone()) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                changed = true;
                vacant.insert(NodeEntry::new(record.name.clone()))
            }
        };
        if entry::absorb(node, record) {
            changed = true;
        }

        if inner.self_name.is_none() && (self.me_predicate)(record) {
            inner.self_name = Some(record.name.clone());
            changed = true;
        }

        if changed {
            inner.version += 1;
            debug!(node = %record.name, version = inner.version, "node changed");
        }

        changed
    }

    /// Removes the named entry from the registry.
    ///
    /// Removal always advances the version, even for a name that was never
    /// tracked. A bound self name stays bound; snapshots resolve it by lookup
    /// and report no self entry while the node is gone.
    pub fn remove_node(&self, name: &str) {
        let mut inner = self.inner.lock();

        inner.nodes.remove(name);
        inner.version += 1;
        debug!(node = %name, version = inner.version, "node removed");
    }

    /// Marks the registry ready for snapshot consumers. Idempotent; readiness
    /// never reverts.
    pub fn mark_ready(&self) {
        self.inner.lock().ready = true;
    }

    /// Returns whether readiness has been signaled.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.inner.lock().ready
    }

    /// Returns whether the current version equals `version`.
    ///
    /// Lets a consumer check a previously taken snapshot for staleness
    /// without copying the full state again.
    #[must_use]
    pub fn is_version(&self, version: u64) -> bool {
        self.inner.lock().version == version
    }

    /// Takes an atomic, independent copy of the registry state.
    ///
    /// Returns `None` until [`NodeRegistry::mark_ready`] has been called,
    /// which is distinct from a ready registry tracking zero nodes. The
    /// returned self entry, node list, and version all describe the same
    /// instant; the node list carries no ordering guarantee.
    #[must_use]
    pub fn snapshot(&self) -> Option<TopologySnapshot> {
        let inner = self.inner.lock();

        if !inner.ready {
            return None;
        }

        let me = inner
            .self_name
            .as_ref()
            .and_then(|name| inner.nodes.get(name))
            .cloned();
        let nodes = inner.nodes.values().cloned().collect();

        Some(TopologySnapshot {
            me,
            nodes,
            version: inner.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use node_registry_sdk::{AddressType, NodeAddress};

    fn registry_with_self(node_name: &str) -> NodeRegistry {
        let node_name = node_name.to_owned();
        NodeRegistry::new(Box::new(move |record| record.name == node_name))
    }

    fn never_self() -> NodeRegistry {
        NodeRegistry::new(Box::new(|_| false))
    }

    fn record(name: &str, pod_cidr: &str, internal_ips: &[&str]) -> NodeRecord {
        NodeRecord {
            name: name.to_owned(),
            pod_cidr: pod_cidr.to_owned(),
            addresses: internal_ips
                .iter()
                .map(|ip| NodeAddress::new(AddressType::Internal, *ip))
                .collect(),
        }
    }

    #[test]
    fn test_new_node_is_a_change() {
        let registry = never_self();

        assert!(registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"])));
        assert!(registry.is_version(1));
    }

    #[test]
    fn test_identical_update_is_a_noop() {
        let registry = never_self();
        let rec = record("node-a", "10.244.1.0/24", &["10.0.0.1"]);

        assert!(registry.update_node(&rec));
        assert!(!registry.update_node(&rec));
        assert!(registry.is_version(1));
    }

    #[test]
    fn test_attribute_change_advances_version_once() {
        let registry = never_self();
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));

        // Both attributes change in one call; the version moves by one.
        assert!(registry.update_node(&record("node-a", "10.244.2.0/24", &["10.0.0.2"])));
        assert!(registry.is_version(2));
    }

    #[test]
    fn test_malformed_attributes_keep_node_tracked() {
        let registry = never_self();
        registry.update_node(&record("node-a", "not-a-cidr", &[]));
        registry.mark_ready();

        let snapshot = registry.snapshot().unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(snapshot.nodes[0].name, "node-a");
        assert!(snapshot.nodes[0].pod_cidr.is_none());
        assert!(snapshot.nodes[0].address.is_none());
    }

    #[test]
    fn test_remove_node_always_advances_version() {
        let registry = never_self();
        registry.update_node(&record("node-a", "", &[]));
        assert!(registry.is_version(1));

        registry.remove_node("node-a");
        assert!(registry.is_version(2));

        // Unknown name still bumps, nothing else changes.
        registry.remove_node("node-b");
        assert!(registry.is_version(3));

        registry.mark_ready();
        assert!(registry.snapshot().unwrap().nodes.is_empty());
    }

    #[test]
    fn test_snapshot_gated_on_readiness() {
        let registry = never_self();
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));

        assert!(registry.snapshot().is_none());
        assert!(!registry.is_ready());

        registry.mark_ready();
        registry.mark_ready();

        assert!(registry.is_ready());
        let snapshot = registry.snapshot().unwrap();
        assert_eq!(snapshot.nodes.len(), 1);
        assert!(registry.is_version(snapshot.version));
    }

    #[test]
    fn test_self_resolution_counts_as_a_change() {
        let registry = registry_with_self("node-a");
        let rec = record("node-a", "10.244.1.0/24", &["10.0.0.1"]);

        registry.update_node(&rec);
        assert!(registry.is_version(1));

        // Same attributes again: no normalization change, and self is
        // already bound, so nothing moves.
        assert!(!registry.update_node(&rec));
        assert!(registry.is_version(1));
    }

    #[test]
    fn test_self_binding_is_permanent() {
        let registry = registry_with_self("node-a");
        registry.update_node(&record("node-b", "10.244.2.0/24", &["10.0.0.2"]));
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        registry.mark_ready();

        let me = registry.snapshot().unwrap().me.unwrap();
        assert_eq!(me.name, "node-a");

        // Later updates of any node leave the binding alone.
        registry.update_node(&record("node-b", "10.244.3.0/24", &["10.0.0.2"]));
        let me = registry.snapshot().unwrap().me.unwrap();
        assert_eq!(me.name, "node-a");
    }

    #[test]
    fn test_unresolved_self_is_none() {
        let registry = registry_with_self("node-z");
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        registry.mark_ready();

        assert!(registry.snapshot().unwrap().me.is_none());
    }

    #[test]
    fn test_removed_self_resolves_to_none_until_it_returns() {
        let registry = registry_with_self("node-a");
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        registry.mark_ready();
        assert!(registry.snapshot().unwrap().me.is_some());

        registry.remove_node("node-a");
        assert!(registry.snapshot().unwrap().me.is_none());

        // The binding survives removal, so the entry resolves again when the
        // watch re-adds the node.
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        let me = registry.snapshot().unwrap().me.unwrap();
        assert_eq!(me.name, "node-a");
    }

    #[test]
    fn test_snapshot_is_an_independent_copy() {
        let registry = never_self();
        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        registry.mark_ready();

        let before = registry.snapshot().unwrap();
        registry.update_node(&record("node-a", "10.244.9.0/24", &["10.0.0.9"]));

        // The earlier copy is untouched and now detectably stale.
        assert_eq!(
            before.nodes[0].pod_cidr,
            Some("10.244.1.0/24".parse().unwrap())
        );
        assert!(!registry.is_version(before.version));
    }

    #[test]
    fn test_version_is_monotonic_across_mixed_operations() {
        let registry = registry_with_self("node-a");

        registry.update_node(&record("node-a", "10.244.1.0/24", &["10.0.0.1"]));
        assert!(registry.is_version(1));

        registry.update_node(&record("node-b", "", &[]));
        assert!(registry.is_version(2));

        registry.remove_node("node-b");
        assert!(registry.is_version(3));

        registry.update_node(&record("node-b", "10.244.2.0/24", &["10.0.0.2"]));
        assert!(registry.is_version(4));

        registry.mark_ready();
        assert_eq!(registry.snapshot().unwrap().version, 4);
    }
}
