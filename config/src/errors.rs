// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Type for configuration / merge failures
//! Any result returned by the normalization, validation or merge methods in this
//! crate is a `ConfigError`. None of these are fatal to the process: they abort
//! the conversion of the current set of fragments and get surfaced to the
//! authors of those fragments as a conversion result.

use std::fmt::Display;
use std::net::Ipv4Addr;
use thiserror::Error;

/// A single attribute on which two definitions of the same neighbor disagree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMismatch {
    pub field: &'static str,
    pub left: String,
    pub right: String,
}
impl FieldMismatch {
    pub(crate) fn new(field: &'static str, left: impl Display, right: impl Display) -> Self {
        Self {
            field,
            left: left.to_string(),
            right: right.to_string(),
        }
    }
}
impl Display for FieldMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "multiple {} values specified ({} != {})",
            self.field, self.left, self.right
        )
    }
}

fn join_mismatches(mismatches: &[FieldMismatch]) -> String {
    mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The reasons why we may reject a set of fragments
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    // Normalization
    #[error("Invalid address '{0}'")]
    InvalidAddress(String),
    #[error("Invalid prefix '{0}'")]
    InvalidPrefix(String),
    #[error("Invalid router id '{0}': must be an IPv4 address")]
    InvalidRouterId(String),
    #[error("Invalid community '{0}'")]
    InvalidCommunity(String),
    #[error("Expected one or two addresses, got {0}")]
    BadAddressCount(usize),
    #[error("Addresses {0} and {1} belong to the same IP family")]
    SameFamilyAddresses(String, String),
    #[error("Invalid prefix length bounds for {prefix}: ge {ge:?} le {le:?}")]
    InvalidPrefixLength {
        prefix: String,
        ge: Option<u8>,
        le: Option<u8>,
    },
    #[error("Prefix {prefix} with local preference {local_pref} is not advertised to neighbor {neighbor}")]
    LocalPrefNotAdvertised {
        neighbor: String,
        prefix: String,
        local_pref: u32,
    },
    #[error("Prefix {prefix} with community {community} is not advertised to neighbor {neighbor}")]
    CommunityNotAdvertised {
        neighbor: String,
        prefix: String,
        community: String,
    },
    #[error("Neighbor {neighbor} refers to non-existent BFD profile '{profile}'")]
    UnknownBfdProfile { neighbor: String, profile: String },

    // Merge
    #[error("Different ASNs ({asn1} != {asn2}) specified for the same vrf '{vrf}'")]
    VrfAsnMismatch { vrf: String, asn1: u32, asn2: u32 },
    #[error("Different router ids ({id1} != {id2}) specified for the same vrf '{vrf}'")]
    RouterIdMismatch {
        vrf: String,
        id1: Ipv4Addr,
        id2: Ipv4Addr,
    },
    #[error("Incompatible definitions of neighbor {neighbor} in vrf '{vrf}': {}", join_mismatches(.mismatches))]
    IncompatibleNeighbor {
        neighbor: String,
        vrf: String,
        mismatches: Vec<FieldMismatch>,
    },
    #[error("Multiple local prefs ({pref1} != {pref2}) specified for prefix {prefix}")]
    LocalPrefMismatch {
        prefix: String,
        pref1: u32,
        pref2: u32,
    },

    // Context
    #[error("Fragment '{name}': {err}")]
    Fragment { name: String, err: Box<ConfigError> },
}

impl ConfigError {
    /// Annotate an error with the name of the fragment it originates from
    #[must_use]
    pub fn in_fragment(self, name: &str) -> Self {
        ConfigError::Fragment {
            name: name.to_owned(),
            err: Box::new(self),
        }
    }
}

/// Result-like type for configurations
pub type ConfigResult<T = ()> = Result<T, ConfigError>;

#[must_use]
pub fn stringify<T>(conf_result: &ConfigResult<T>) -> String {
    match conf_result {
        Ok(_) => "Ok".to_string(),
        Err(e) => format!("FAILED: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbor_mismatch_lists_every_field() {
        let err = ConfigError::IncompatibleNeighbor {
            neighbor: "192.168.1.2".to_string(),
            vrf: "red".to_string(),
            mismatches: vec![
                FieldMismatch::new("port", 179, 180),
                FieldMismatch::new("password", "a", "b"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("192.168.1.2"));
        assert!(msg.contains("'red'"));
        assert!(msg.contains("multiple port values specified (179 != 180)"));
        assert!(msg.contains("multiple password values specified (a != b)"));
    }

    #[test]
    fn test_stringify() {
        let ok: ConfigResult = Ok(());
        assert_eq!(stringify(&ok), "Ok");
        let err: ConfigResult = Err(ConfigError::VrfAsnMismatch {
            vrf: String::new(),
            asn1: 65001,
            asn2: 65002,
        });
        assert!(stringify(&err).starts_with("FAILED: Different ASNs (65001 != 65002)"));
    }
}
