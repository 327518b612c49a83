//! Node Registry Module Implementation
//!
//! Maintains a consistent, versioned, in-memory view of every cluster node's
//! network identity (internal address, assigned pod subnet). The cluster-state
//! watch pushes raw node records in through [`NodeRegistry::update_node`] and
//! [`NodeRegistry::remove_node`]; the route-reconciliation loop pulls atomic
//! [`TopologySnapshot`] copies out once readiness is signaled, and uses the
//! version counter to detect staleness without re-copying state.
//!
//! ## Architecture
//!
//! - **Passive synchronous structure**: all state sits behind one mutex, no
//!   operation performs I/O or unbounded work while holding it
//! - **Tolerant normalization**: malformed subnet or address input clears the
//!   attribute and logs a warning; only explicit removal evicts a node
//! - **Self binding by identity**: the local node is bound once by name and
//!   resolved by lookup at snapshot time

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

// === PUBLIC API (from SDK) ===
pub use node_registry_sdk::{AddressType, NodeAddress, NodeEntry, NodeRecord, TopologySnapshot};

// === CONFIGURATION ===
pub mod config;
pub use config::NodeRegistryConfig;

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod domain;

pub use domain::registry::{NodeRegistry, SelfPredicate};
