use std::net::IpAddr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

/// Classification tag on a raw node address record.
///
/// Only `Internal` addresses are consumed for route computation; tags this
/// enum does not know deserialize as `Other` and are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum AddressType {
    Internal,
    External,
    Hostname,
    Other,
}

impl From<String> for AddressType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "internal" => Self::Internal,
            "external" => Self::External,
            "hostname" => Self::Hostname,
            _ => Self::Other,
        }
    }
}

/// One address reported for a node, as delivered by the watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeAddress {
    /// Classification tag (`type` on the wire).
    #[serde(rename = "type")]
    pub address_type: AddressType,
    /// Address value, not yet validated.
    pub address: String,
}

impl NodeAddress {
    #[must_use]
    pub fn new(address_type: AddressType, address: impl Into<String>) -> Self {
        Self {
            address_type,
            address: address.into(),
        }
    }
}

/// Raw node record as delivered by the cluster-state watch.
///
/// Everything here is unvalidated input; the registry normalizes it into a
/// [`NodeEntry`] and tolerates malformed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Stable cluster-assigned node name.
    pub name: String,
    /// Assigned pod subnet in CIDR notation; empty while unallocated.
    #[serde(default)]
    pub pod_cidr: String,
    /// All addresses reported for the node, each tagged with a type.
    #[serde(default)]
    pub addresses: Vec<NodeAddress>,
}

/// One tracked node's normalized network identity.
///
/// Attributes always reflect the most recently successfully interpreted raw
/// input: malformed input clears an attribute to `None` rather than leaving a
/// stale value behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeEntry {
    /// Stable cluster-assigned node name.
    pub name: String,
    /// Internal reachable IP, absent when the node reports none, the choice
    /// is unparsable, or no candidate qualifies.
    pub address: Option<IpAddr>,
    /// Pod subnet routed to this node, absent when unset or unparsable.
    pub pod_cidr: Option<IpNet>,
}

impl NodeEntry {
    /// Creates an entry with no attributes resolved yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: None,
            pod_cidr: None,
        }
    }
}

/// Point-in-time copy of the registry state handed to consumers.
///
/// All three fields describe the same instant: the copy is taken in one
/// critical section, so no partially applied update is observable across
/// them. `nodes` carries no ordering guarantee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologySnapshot {
    /// Copy of the entry bound as the local node; `None` until self has been
    /// resolved, or while the bound node is removed from the registry.
    pub me: Option<NodeEntry>,
    /// Copy of every tracked entry, unordered.
    pub nodes: Vec<NodeEntry>,
    /// Registry version at the instant of the copy.
    pub version: u64,
}
