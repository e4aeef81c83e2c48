// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! External configuration model: BGP configuration fragments

use serde::{Deserialize, Serialize};

/// Whether a neighbor policy is an explicit list or covers everything
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowMode {
    #[default]
    Filtered,
    All,
}

/// Prefixes allowed to be advertised to a neighbor
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllowedOutPrefixes {
    pub prefixes: Vec<String>,
    pub mode: AllowMode,
}

/// A set of advertised prefixes that get a local preference attached
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalPrefPrefixes {
    pub prefixes: Vec<String>,
    pub local_pref: u32,
}

/// A set of advertised prefixes that get a (regular or large) community attached
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommunityPrefixes {
    pub prefixes: Vec<String>,
    pub community: String,
}

/// Outgoing policy of a neighbor
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Advertise {
    pub allowed: AllowedOutPrefixes,
    pub prefixes_with_local_pref: Vec<LocalPrefPrefixes>,
    pub prefixes_with_community: Vec<CommunityPrefixes>,
}

/// A prefix accepted from a neighbor, optionally matching more specifics
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrefixSelector {
    pub prefix: String,
    pub ge: Option<u8>,
    pub le: Option<u8>,
}

/// Prefixes allowed to be received from a neighbor
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllowedInPrefixes {
    pub prefixes: Vec<PrefixSelector>,
    pub mode: AllowMode,
}

/// Incoming policy of a neighbor
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Receive {
    pub allowed: AllowedInPrefixes,
}

/// A BGP neighbor as authored. Times are in seconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NeighborSpec {
    pub asn: u32,
    /// The single peer address. It decides whether the neighbor is IPv4 or IPv6: a neighbor
    /// described this way is never dual-stack.
    pub address: String,
    pub source_address: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub hold_time: Option<u64>,
    pub keepalive_time: Option<u64>,
    pub connect_time: Option<u64>,
    pub ebgp_multi_hop: bool,
    pub bfd_profile: Option<String>,
    #[serde(rename = "disableMP")]
    pub disable_mp: bool,
    pub to_advertise: Advertise,
    pub to_receive: Receive,
}

/// A VRF to import routes from
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSpec {
    pub vrf: String,
}

/// A BGP router instance as authored
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouterSpec {
    pub asn: u32,
    pub id: Option<String>,
    pub vrf: Option<String>,
    pub neighbors: Vec<NeighborSpec>,
    pub prefixes: Vec<String>,
    pub imports: Vec<ImportSpec>,
}

/// A BFD profile as authored. Intervals are in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BfdProfileSpec {
    pub name: String,
    pub receive_interval: Option<u32>,
    pub transmit_interval: Option<u32>,
    pub detect_multiplier: Option<u32>,
    pub echo_interval: Option<u32>,
    pub echo_mode: bool,
    pub passive_mode: bool,
    pub minimum_ttl: Option<u32>,
}

/// Raw configuration to be appended verbatim to the generated configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawConfig {
    pub priority: i32,
    pub config: String,
}

/// One externally authored unit of desired BGP configuration
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fragment {
    pub name: String,
    pub routers: Vec<RouterSpec>,
    pub bfd_profiles: Vec<BfdProfileSpec>,
    pub raw: Option<RawConfig>,
}

impl Fragment {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn add_router(mut self, router: RouterSpec) -> Self {
        self.routers.push(router);
        self
    }
    #[must_use]
    pub fn add_bfd_profile(mut self, profile: BfdProfileSpec) -> Self {
        self.bfd_profiles.push(profile);
        self
    }
    #[must_use]
    pub fn set_raw(mut self, priority: i32, config: &str) -> Self {
        self.raw = Some(RawConfig {
            priority,
            config: config.to_owned(),
        });
        self
    }
}
impl RouterSpec {
    #[must_use]
    pub fn new(asn: u32) -> Self {
        Self {
            asn,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn set_vrf(mut self, vrf: &str) -> Self {
        self.vrf = Some(vrf.to_owned());
        self
    }
    #[must_use]
    pub fn set_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_owned());
        self
    }
    #[must_use]
    pub fn add_neighbor(mut self, neighbor: NeighborSpec) -> Self {
        self.neighbors.push(neighbor);
        self
    }
    #[must_use]
    pub fn add_prefixes(mut self, prefixes: &[&str]) -> Self {
        self.prefixes.extend(prefixes.iter().map(|p| (*p).to_owned()));
        self
    }
    #[must_use]
    pub fn add_import(mut self, vrf: &str) -> Self {
        self.imports.push(ImportSpec {
            vrf: vrf.to_owned(),
        });
        self
    }
}
impl NeighborSpec {
    #[must_use]
    pub fn new(asn: u32, address: &str) -> Self {
        Self {
            asn,
            address: address.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn advertise_all(mut self) -> Self {
        self.to_advertise.allowed.mode = AllowMode::All;
        self
    }
    #[must_use]
    pub fn advertise(mut self, prefixes: &[&str]) -> Self {
        self.to_advertise
            .allowed
            .prefixes
            .extend(prefixes.iter().map(|p| (*p).to_owned()));
        self
    }
    #[must_use]
    pub fn advertise_with_local_pref(mut self, prefixes: &[&str], local_pref: u32) -> Self {
        self.to_advertise
            .prefixes_with_local_pref
            .push(LocalPrefPrefixes {
                prefixes: prefixes.iter().map(|p| (*p).to_owned()).collect(),
                local_pref,
            });
        self
    }
    #[must_use]
    pub fn advertise_with_community(mut self, prefixes: &[&str], community: &str) -> Self {
        self.to_advertise
            .prefixes_with_community
            .push(CommunityPrefixes {
                prefixes: prefixes.iter().map(|p| (*p).to_owned()).collect(),
                community: community.to_owned(),
            });
        self
    }
    #[must_use]
    pub fn receive_all(mut self) -> Self {
        self.to_receive.allowed.mode = AllowMode::All;
        self
    }
    #[must_use]
    pub fn receive(mut self, prefix: &str, ge: Option<u8>, le: Option<u8>) -> Self {
        self.to_receive.allowed.prefixes.push(PrefixSelector {
            prefix: prefix.to_owned(),
            ge,
            le,
        });
        self
    }
}
