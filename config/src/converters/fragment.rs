// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Conversion of external [`Fragment`]s into the canonical model. Conversion is pure: it
//! validates and classifies what was authored and produces a partial [`Config`] that the
//! merge logic can fold with others.

use std::collections::{BTreeMap, BTreeSet};
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult};
use crate::external::{
    AllowMode, BfdProfileSpec, Fragment, NeighborSpec, PrefixSelector, RouterSpec,
};
use crate::internal::{
    AllowedIn, AllowedOut, BfdProfile, Community, Config, IncomingFilter, IpFamily, LogLevel,
    NeighborConfig, OutgoingFilter, RouterConfig,
};

/// Parameters that apply to the conversion of every fragment
#[derive(Clone, Debug, Default)]
pub struct ConversionParams {
    pub hostname: String,
    pub loglevel: LogLevel,
    /// Prefixes that must never be accepted from any neighbor
    pub always_block: Vec<String>,
}
impl ConversionParams {
    #[must_use]
    pub fn new(hostname: &str, loglevel: LogLevel) -> Self {
        Self {
            hostname: hostname.to_owned(),
            loglevel,
            always_block: vec![],
        }
    }
    #[must_use]
    pub fn set_always_block(mut self, prefixes: &[&str]) -> Self {
        self.always_block = prefixes.iter().map(|p| (*p).to_owned()).collect();
        self
    }
}

/// Parse a CIDR, returning its canonical textual form and family. Host bits are cleared,
/// so that `192.0.2.1/24` and `192.0.2.0/24` name the same network.
fn canonical_prefix(prefix: &str) -> ConfigResult<(String, IpFamily)> {
    let (net, family) = IpFamily::for_prefix(prefix)?;
    Ok((net.trunc().to_string(), family))
}

/// Build the filters that deny the always-blocked prefixes and all of their more specifics
pub fn blocked_filters(prefixes: &[String]) -> ConfigResult<Vec<IncomingFilter>> {
    let mut filters = BTreeMap::new();
    for prefix in prefixes {
        let (prefix, family) = canonical_prefix(prefix)?;
        let filter = IncomingFilter::new(&prefix, family, None, Some(family.max_prefix_len()));
        filters.insert(filter.key(), filter);
    }
    Ok(filters.into_values().collect())
}

impl From<&BfdProfileSpec> for BfdProfile {
    fn from(spec: &BfdProfileSpec) -> Self {
        BfdProfile {
            name: spec.name.clone(),
            receive_interval: spec.receive_interval,
            transmit_interval: spec.transmit_interval,
            detect_multiplier: spec.detect_multiplier,
            echo_interval: spec.echo_interval,
            echo_mode: spec.echo_mode,
            passive_mode: spec.passive_mode,
            minimum_ttl: spec.minimum_ttl,
        }
    }
}

fn convert_selector(selector: &PrefixSelector) -> ConfigResult<IncomingFilter> {
    let (net, family) = IpFamily::for_prefix(&selector.prefix)?;
    let len = net.prefix_len();
    let bad_bounds = || ConfigError::InvalidPrefixLength {
        prefix: selector.prefix.clone(),
        ge: selector.ge,
        le: selector.le,
    };
    if let Some(ge) = selector.ge
        && (ge <= len || ge > family.max_prefix_len())
    {
        return Err(bad_bounds());
    }
    if let Some(le) = selector.le
        && (le < len || le > family.max_prefix_len())
    {
        return Err(bad_bounds());
    }
    if let (Some(ge), Some(le)) = (selector.ge, selector.le)
        && ge > le
    {
        return Err(bad_bounds());
    }
    Ok(IncomingFilter::new(
        &net.trunc().to_string(),
        family,
        selector.ge,
        selector.le,
    ))
}

fn convert_incoming(spec: &NeighborSpec) -> ConfigResult<AllowedIn> {
    if spec.to_receive.allowed.mode == AllowMode::All {
        return Ok(AllowedIn::accept_all());
    }
    let mut v4 = BTreeMap::new();
    let mut v6 = BTreeMap::new();
    for selector in &spec.to_receive.allowed.prefixes {
        let filter = convert_selector(selector)?;
        match filter.family {
            IpFamily::Ipv4 => v4.insert(filter.key(), filter),
            _ => v6.insert(filter.key(), filter),
        };
    }
    Ok(AllowedIn {
        all: false,
        prefixes_v4: v4.into_values().collect(),
        prefixes_v6: v6.into_values().collect(),
    })
}

fn convert_outgoing(
    spec: &NeighborSpec,
    neighbor: &str,
    router: &RouterConfig,
) -> ConfigResult<AllowedOut> {
    let mut advertised: BTreeMap<String, OutgoingFilter> = BTreeMap::new();

    /* advertise-all means all the prefixes the router originates */
    if spec.to_advertise.allowed.mode == AllowMode::All {
        for (prefixes, family) in [
            (&router.ipv4_prefixes, IpFamily::Ipv4),
            (&router.ipv6_prefixes, IpFamily::Ipv6),
        ] {
            for prefix in prefixes {
                advertised.insert(prefix.clone(), OutgoingFilter::new(prefix, family));
            }
        }
    }
    for prefix in &spec.to_advertise.allowed.prefixes {
        let (prefix, family) = canonical_prefix(prefix)?;
        advertised
            .entry(prefix.clone())
            .or_insert_with(|| OutgoingFilter::new(&prefix, family));
    }

    /* local preferences: only on advertised prefixes, one per prefix */
    for lp in &spec.to_advertise.prefixes_with_local_pref {
        for prefix in &lp.prefixes {
            let (prefix, _) = canonical_prefix(prefix)?;
            let Some(filter) = advertised.get_mut(&prefix) else {
                return Err(ConfigError::LocalPrefNotAdvertised {
                    neighbor: neighbor.to_owned(),
                    prefix,
                    local_pref: lp.local_pref,
                });
            };
            if filter.local_pref != 0 && lp.local_pref != 0 && filter.local_pref != lp.local_pref {
                return Err(ConfigError::LocalPrefMismatch {
                    prefix,
                    pref1: filter.local_pref,
                    pref2: lp.local_pref,
                });
            }
            if lp.local_pref != 0 {
                filter.local_pref = lp.local_pref;
            }
        }
    }

    /* communities: only on advertised prefixes */
    for cp in &spec.to_advertise.prefixes_with_community {
        let community = Community::from_str(&cp.community)?;
        for prefix in &cp.prefixes {
            let (prefix, _) = canonical_prefix(prefix)?;
            let Some(filter) = advertised.get_mut(&prefix) else {
                return Err(ConfigError::CommunityNotAdvertised {
                    neighbor: neighbor.to_owned(),
                    prefix,
                    community: community.to_string(),
                });
            };
            filter.add_community(community.clone());
        }
    }

    let (v4, v6): (Vec<_>, Vec<_>) = advertised
        .into_values()
        .partition(|f| f.family == IpFamily::Ipv4);
    Ok(AllowedOut {
        prefixes_v4: v4,
        prefixes_v6: v6,
    })
}

fn parse_address(address: &str) -> ConfigResult<IpAddr> {
    address
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidAddress(address.to_owned()))
}

/// Convert a neighbor in the context of the router it is declared in
pub fn convert_neighbor(
    spec: &NeighborSpec,
    router: &RouterConfig,
    blocked: &[IncomingFilter],
) -> ConfigResult<NeighborConfig> {
    let addr = parse_address(&spec.address)?;
    let mut neigh = NeighborConfig::new(spec.asn, addr, &router.vrf);
    neigh.family = IpFamily::for_addresses(&[spec.address.trim()])?;

    if let Some(src) = spec.source_address.as_deref().filter(|s| !s.is_empty()) {
        neigh.src_addr = Some(parse_address(src)?);
    }
    neigh.port = spec.port;
    neigh.hold_time = spec.hold_time.map(Duration::from_secs);
    neigh.keepalive_time = spec.keepalive_time.map(Duration::from_secs);
    neigh.connect_time = spec.connect_time.map(Duration::from_secs);
    neigh.password = spec.password.clone().filter(|p| !p.is_empty());
    neigh.bfd_profile = spec.bfd_profile.clone().filter(|p| !p.is_empty());
    neigh.ebgp_multihop = spec.ebgp_multi_hop;
    neigh.disable_mp = spec.disable_mp;
    neigh.outgoing = convert_outgoing(spec, &neigh.name, router)?;
    neigh.incoming = convert_incoming(spec)?;
    neigh.always_block = blocked.to_vec();
    neigh.clean_defaults();
    Ok(neigh)
}

/// Convert a router, with its neighbors
pub fn convert_router(spec: &RouterSpec, blocked: &[IncomingFilter]) -> ConfigResult<RouterConfig> {
    let vrf = spec.vrf.clone().unwrap_or_default();
    let mut router = RouterConfig::new(spec.asn, &vrf);

    if let Some(id) = spec.id.as_deref().filter(|id| !id.is_empty()) {
        let router_id = Ipv4Addr::from_str(id.trim())
            .map_err(|_| ConfigError::InvalidRouterId(id.to_owned()))?;
        router.router_id = Some(router_id);
    }

    let mut v4 = BTreeSet::new();
    let mut v6 = BTreeSet::new();
    for prefix in &spec.prefixes {
        match canonical_prefix(prefix)? {
            (p, IpFamily::Ipv4) => v4.insert(p),
            (p, _) => v6.insert(p),
        };
    }
    router.ipv4_prefixes = v4.into_iter().collect();
    router.ipv6_prefixes = v6.into_iter().collect();
    router.import_vrfs = spec
        .imports
        .iter()
        .filter(|i| !i.vrf.is_empty())
        .map(|i| i.vrf.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    for n in &spec.neighbors {
        let neigh = convert_neighbor(n, &router, blocked)?;
        router.add_neighbor(neigh);
    }
    Ok(router)
}

/// Convert a fragment into a partial [`Config`]. Host name, log level and raw configuration
/// are not part of the result: they are set once the fragments have been merged.
pub fn convert_fragment(fragment: &Fragment, params: &ConversionParams) -> ConfigResult<Config> {
    debug!("Converting fragment '{}'...", fragment.name);
    let convert = || -> ConfigResult<Config> {
        let blocked = blocked_filters(&params.always_block)?;
        let mut config = Config::new();
        for router in &fragment.routers {
            config.routers.push(convert_router(router, &blocked)?);
        }
        config.bfd_profiles = fragment.bfd_profiles.iter().map(BfdProfile::from).collect();
        Ok(config)
    };
    convert().map_err(|e| e.in_fragment(&fragment.name))
}
