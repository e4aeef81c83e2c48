// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! IP family classification of addresses and prefixes

use crate::errors::{ConfigError, ConfigResult};
use ipnet::IpNet;
use serde::Serialize;
use std::fmt::Display;
use std::net::IpAddr;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpFamily {
    #[default]
    Ipv4,
    Ipv6,
    DualStack,
}

impl IpFamily {
    #[must_use]
    pub fn for_address(address: &IpAddr) -> Self {
        match address {
            IpAddr::V4(_) => IpFamily::Ipv4,
            IpAddr::V6(_) => IpFamily::Ipv6,
        }
    }

    /// Classify a set of addresses: a single address is of its own family, two addresses are
    /// dual-stack if (and only if) they belong to distinct families.
    pub fn for_addresses(addresses: &[&str]) -> ConfigResult<Self> {
        let parsed = addresses
            .iter()
            .map(|a| {
                a.parse::<IpAddr>()
                    .map_err(|_| ConfigError::InvalidAddress((*a).to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match parsed.as_slice() {
            [single] => Ok(Self::for_address(single)),
            [a, b] => {
                if Self::for_address(a) == Self::for_address(b) {
                    Err(ConfigError::SameFamilyAddresses(
                        a.to_string(),
                        b.to_string(),
                    ))
                } else {
                    Ok(IpFamily::DualStack)
                }
            }
            other => Err(ConfigError::BadAddressCount(other.len())),
        }
    }

    /// Parse a CIDR and classify it. A malformed CIDR is an error.
    pub fn for_prefix(prefix: &str) -> ConfigResult<(IpNet, Self)> {
        let net = prefix
            .trim()
            .parse::<IpNet>()
            .map_err(|_| ConfigError::InvalidPrefix(prefix.to_owned()))?;
        let family = match net {
            IpNet::V4(_) => IpFamily::Ipv4,
            IpNet::V6(_) => IpFamily::Ipv6,
        };
        Ok((net, family))
    }

    /// Length of the addresses of this family
    #[must_use]
    pub fn max_prefix_len(&self) -> u8 {
        match self {
            IpFamily::Ipv4 => 32,
            IpFamily::Ipv6 | IpFamily::DualStack => 128,
        }
    }

    /// Tell if a session of this family is meant to carry routes of the `other` family
    #[must_use]
    pub fn covers(&self, other: IpFamily) -> bool {
        *self == other || *self == IpFamily::DualStack
    }
}

impl Display for IpFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpFamily::Ipv4 => write!(f, "ipv4"),
            IpFamily::Ipv6 => write!(f, "ipv6"),
            IpFamily::DualStack => write!(f, "dual"),
        }
    }
}
