#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Node Registry Contract Types
//!
//! Models shared between the cluster-state watch (raw [`NodeRecord`] input)
//! and the route-reconciliation consumer ([`NodeEntry`] and
//! [`TopologySnapshot`] output). The registry itself lives in the
//! `rc-node-registry` crate; this crate carries no behavior beyond the
//! serialized shape of the watch records.

pub mod model;

pub use model::{AddressType, NodeAddress, NodeEntry, NodeRecord, TopologySnapshot};
