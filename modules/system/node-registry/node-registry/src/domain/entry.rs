//! Normalization of raw watch records into tracked node entries.
//!
//! A raw record is partial and occasionally malformed: the subnet string may
//! be empty or unparsable, and the address list may carry zero or several
//! internal candidates. Normalization resolves all of that into a stable
//! [`NodeEntry`] and reports whether anything observable changed, so the
//! registry can decide whether to advance its version.

use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use node_registry_sdk::{AddressType, NodeEntry, NodeRecord};
use tracing::warn;

use super::error::AttributeError;

/// Applies a raw record to an entry, returning whether any attribute changed.
///
/// Malformed or missing input clears the corresponding attribute instead of
/// leaving a stale value behind; the node stays tracked either way.
pub(crate) fn absorb(entry: &mut NodeEntry, record: &NodeRecord) -> bool {
    let subnet_changed = absorb_pod_cidr(entry, record);
    let address_changed = absorb_address(entry, record);
    subnet_changed || address_changed
}

fn absorb_pod_cidr(entry: &mut NodeEntry, record: &NodeRecord) -> bool {
    let raw = record.pod_cidr.as_str();
    if raw.is_empty() {
        warn!(node = %record.name, "node has no pod CIDR assigned");
        return entry.pod_cidr.take().is_some();
    }

    match IpNet::from_str(raw) {
        Ok(net) => {
            // Host bits are not part of the network identity.
            let net = net.trunc();
            if entry.pod_cidr == Some(net) {
                false
            } else {
                entry.pod_cidr = Some(net);
                true
            }
        }
        Err(source) => {
            let err = AttributeError::InvalidPodCidr {
                cidr: raw.to_owned(),
                source,
            };
            warn!(node = %record.name, error = %err, "clearing pod CIDR");
            entry.pod_cidr.take().is_some()
        }
    }
}

fn absorb_address(entry: &mut NodeEntry, record: &NodeRecord) -> bool {
    let Some(candidate) = select_internal_address(record) else {
        return entry.address.take().is_some();
    };

    match IpAddr::from_str(candidate) {
        Ok(address) => {
            if entry.address == Some(address) {
                false
            } else {
                entry.address = Some(address);
                true
            }
        }
        Err(source) => {
            let err = AttributeError::InvalidAddress {
                address: candidate.to_owned(),
                source,
            };
            warn!(node = %record.name, error = %err, "clearing node address");
            entry.address.take().is_some()
        }
    }
}

/// Picks the internal-address candidate for a record.
///
/// With several internal addresses the candidate strings are sorted
/// lexicographically and the first is taken, so the choice is arbitrary but
/// stable across runs.
fn select_internal_address(record: &NodeRecord) -> Option<&str> {
    let mut candidates: Vec<&str> = record
        .addresses
        .iter()
        .filter(|a| a.address_type == AddressType::Internal)
        .map(|a| a.address.as_str())
        .collect();

    if candidates.is_empty() {
        warn!(node = %record.name, "node reports no internal address");
        return None;
    }
    if candidates.len() > 1 {
        warn!(
            node = %record.name,
            count = candidates.len(),
            "multiple internal addresses, choosing the lexicographically first"
        );
        candidates.sort_unstable();
    }
    Some(candidates[0])
}
