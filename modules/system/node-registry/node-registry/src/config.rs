//! Configuration for the node registry module.

use serde::Deserialize;

use crate::domain::registry::SelfPredicate;

/// Configuration for the node registry module.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct NodeRegistryConfig {
    /// Name of the node this process is co-located with, as reported by the
    /// cluster-state watch. When unset, self is never resolved.
    pub node_name: Option<String>,
}

impl NodeRegistryConfig {
    /// Builds the self-identification predicate for this configuration.
    ///
    /// The predicate matches records whose name equals `node_name`; with no
    /// configured name it matches nothing.
    #[must_use]
    pub fn self_predicate(&self) -> SelfPredicate {
        let node_name = self.node_name.clone();
        Box::new(move |record| node_name.as_deref() == Some(record.name.as_str()))
    }
}
