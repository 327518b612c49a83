//! Domain error types for the node registry module.

use thiserror::Error;

/// Ways an incoming attribute value can fail interpretation.
///
/// These never propagate to callers: normalization clears the offending
/// attribute, logs the error at warning level, and keeps the node tracked.
#[derive(Debug, Error)]
pub enum AttributeError {
    /// The subnet assignment string is not a valid network prefix.
    #[error("invalid pod CIDR {cidr:?}: {source}")]
    InvalidPodCidr {
        cidr: String,
        #[source]
        source: ipnet::AddrParseError,
    },

    /// The selected internal address is not a valid IP address.
    #[error("invalid internal address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_error_display_names_the_raw_value() {
        let err = AttributeError::InvalidPodCidr {
            cidr: "not-a-cidr".to_owned(),
            source: ipnet::IpNet::from_str("not-a-cidr").unwrap_err(),
        };
        assert!(err.to_string().contains("not-a-cidr"));

        let err = AttributeError::InvalidAddress {
            address: "10.0.0".to_owned(),
            source: std::net::IpAddr::from_str("10.0.0").unwrap_err(),
        };
        assert!(err.to_string().contains("10.0.0"));
    }
}
