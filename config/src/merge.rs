// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Merge engine: folds the partial configs obtained from fragments into a single [`Config`].
//! Merging is stateless and deterministic: every collection is rebuilt from ordered maps
//! keyed by its merge key, so equivalent inputs yield equal configs regardless of their order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

use crate::errors::{ConfigError, ConfigResult, FieldMismatch};
use crate::internal::routing::bgp::{
    DEFAULT_BGP_PORT, DEFAULT_CONNECT_TIME, DEFAULT_HOLD_TIME, DEFAULT_KEEPALIVE_TIME,
};
use crate::internal::{
    AllowedIn, AllowedOut, BfdProfile, Config, IncomingFilter, NeighborConfig, OutgoingFilter,
    RouterConfig,
};

const REDACTED: &str = "<retracted>";

fn show<T: Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "<unset>".to_string(), ToString::to_string)
}

fn show_secs(value: Duration) -> String {
    format!("{}s", value.as_secs())
}

/// Check that two definitions of the same neighbor agree on every scalar attribute, once
/// defaults are normalized. All the disagreements are reported at once.
fn neighbors_are_compatible(n1: &NeighborConfig, n2: &NeighborConfig) -> ConfigResult {
    let mut mismatches = vec![];

    if n1.addr != n2.addr {
        mismatches.push(FieldMismatch::new("address", n1.addr, n2.addr));
    }
    if n1.vrf != n2.vrf {
        mismatches.push(FieldMismatch::new("vrf", &n1.vrf, &n2.vrf));
    }
    if n1.asn != n2.asn {
        mismatches.push(FieldMismatch::new("asn", n1.asn, n2.asn));
    }
    let (p1, p2) = (
        n1.port.unwrap_or(DEFAULT_BGP_PORT),
        n2.port.unwrap_or(DEFAULT_BGP_PORT),
    );
    if p1 != p2 {
        mismatches.push(FieldMismatch::new("port", p1, p2));
    }
    if n1.src_addr != n2.src_addr {
        mismatches.push(FieldMismatch::new(
            "source address",
            show(n1.src_addr.as_ref()),
            show(n2.src_addr.as_ref()),
        ));
    }
    if n1.password != n2.password {
        let redact = |p: Option<&String>| p.map_or("<unset>", |_| REDACTED);
        mismatches.push(FieldMismatch::new(
            "password",
            redact(n1.password.as_ref()),
            redact(n2.password.as_ref()),
        ));
    }
    if n1.bfd_profile != n2.bfd_profile {
        mismatches.push(FieldMismatch::new(
            "bfd profile",
            show(n1.bfd_profile.as_ref()),
            show(n2.bfd_profile.as_ref()),
        ));
    }
    if n1.ebgp_multihop != n2.ebgp_multihop {
        mismatches.push(FieldMismatch::new(
            "ebgp-multihop",
            n1.ebgp_multihop,
            n2.ebgp_multihop,
        ));
    }
    if n1.disable_mp != n2.disable_mp {
        mismatches.push(FieldMismatch::new("disable-mp", n1.disable_mp, n2.disable_mp));
    }

    let timers = [
        ("hold-time", n1.hold_time, n2.hold_time, DEFAULT_HOLD_TIME),
        (
            "keepalive-time",
            n1.keepalive_time,
            n2.keepalive_time,
            DEFAULT_KEEPALIVE_TIME,
        ),
        (
            "connect-time",
            n1.connect_time,
            n2.connect_time,
            DEFAULT_CONNECT_TIME,
        ),
    ];
    for (field, t1, t2, default) in timers {
        let (t1, t2) = (t1.unwrap_or(default), t2.unwrap_or(default));
        if t1 != t2 {
            mismatches.push(FieldMismatch::new(field, show_secs(t1), show_secs(t2)));
        }
    }

    if mismatches.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::IncompatibleNeighbor {
            neighbor: n1.addr.to_string(),
            vrf: n1.vrf.clone(),
            mismatches,
        })
    }
}

fn merge_outgoing_family(
    left: &[OutgoingFilter],
    right: &[OutgoingFilter],
) -> ConfigResult<Vec<OutgoingFilter>> {
    let mut merged: BTreeMap<String, OutgoingFilter> = BTreeMap::new();
    for filter in left.iter().chain(right.iter()) {
        let Some(current) = merged.get_mut(&filter.prefix) else {
            merged.insert(filter.prefix.clone(), filter.clone());
            continue;
        };
        if current.local_pref != 0
            && filter.local_pref != 0
            && current.local_pref != filter.local_pref
        {
            return Err(ConfigError::LocalPrefMismatch {
                prefix: filter.prefix.clone(),
                pref1: current.local_pref,
                pref2: filter.local_pref,
            });
        }
        if current.local_pref == 0 {
            current.local_pref = filter.local_pref;
        }
        current
            .communities
            .extend(filter.communities.iter().cloned());
        current
            .large_communities
            .extend(filter.large_communities.iter().cloned());
    }
    Ok(merged.into_values().collect())
}

/// Merge two egress policies. Local preferences may not conflict, communities union.
pub fn merge_allowed_out(left: &AllowedOut, right: &AllowedOut) -> ConfigResult<AllowedOut> {
    Ok(AllowedOut {
        prefixes_v4: merge_outgoing_family(&left.prefixes_v4, &right.prefixes_v4)?,
        prefixes_v6: merge_outgoing_family(&left.prefixes_v6, &right.prefixes_v6)?,
    })
}

fn merge_incoming_filters(left: &[IncomingFilter], right: &[IncomingFilter]) -> Vec<IncomingFilter> {
    left.iter()
        .chain(right.iter())
        .map(|f| (f.key(), f.clone()))
        .collect::<BTreeMap<_, _>>()
        .into_values()
        .collect()
}

/// Merge two ingress policies. Accepting all absorbs any explicit list.
#[must_use]
pub fn merge_allowed_in(left: &AllowedIn, right: &AllowedIn) -> AllowedIn {
    if left.all || right.all {
        return AllowedIn::accept_all();
    }
    AllowedIn {
        all: false,
        prefixes_v4: merge_incoming_filters(&left.prefixes_v4, &right.prefixes_v4),
        prefixes_v6: merge_incoming_filters(&left.prefixes_v6, &right.prefixes_v6),
    }
}

fn clean_neighbor_defaults(neigh: &mut NeighborConfig) {
    neigh.clean_defaults();
}

/// Merge a neighbor into another definition of it
fn merge_neighbor(into: &mut NeighborConfig, other: &NeighborConfig) -> ConfigResult {
    neighbors_are_compatible(into, other)?;
    into.outgoing = merge_allowed_out(&into.outgoing, &other.outgoing)?;
    into.incoming = merge_allowed_in(&into.incoming, &other.incoming);
    into.always_block = merge_incoming_filters(&into.always_block, &other.always_block);
    clean_neighbor_defaults(into);
    Ok(())
}

/// Merge neighbor lists, keyed by peer address. Neighbors defined more than once within a
/// single list are merged too.
fn merge_neighbors(
    left: &[NeighborConfig],
    right: &[NeighborConfig],
) -> ConfigResult<Vec<NeighborConfig>> {
    let mut merged: BTreeMap<String, NeighborConfig> = BTreeMap::new();
    for neigh in left.iter().chain(right.iter()) {
        if let Some(current) = merged.get_mut(&neigh.key()) {
            debug!(
                "Merging definitions of neighbor {} in vrf '{}'",
                neigh.name, neigh.vrf
            );
            merge_neighbor(current, neigh)?;
        } else {
            let mut seed = neigh.clone();
            clean_neighbor_defaults(&mut seed);
            merged.insert(neigh.key(), seed);
        }
    }
    Ok(merged.into_values().collect())
}

/// Check that two routers for the same vrf can be merged, and resolve the router id
fn routers_are_compatible(
    r1: &RouterConfig,
    r2: &RouterConfig,
) -> ConfigResult<Option<Ipv4Addr>> {
    if r1.asn != r2.asn {
        return Err(ConfigError::VrfAsnMismatch {
            vrf: r1.vrf.clone(),
            asn1: r1.asn,
            asn2: r2.asn,
        });
    }
    match (r1.router_id, r2.router_id) {
        (Some(id1), Some(id2)) if id1 != id2 => Err(ConfigError::RouterIdMismatch {
            vrf: r1.vrf.clone(),
            id1,
            id2,
        }),
        (id1, id2) => Ok(id1.or(id2)),
    }
}

fn union(left: &[String], right: &[String]) -> Vec<String> {
    left.iter()
        .chain(right.iter())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Merge two routers of the same vrf
pub fn merge_routers(r1: &RouterConfig, r2: &RouterConfig) -> ConfigResult<RouterConfig> {
    let router_id = routers_are_compatible(r1, r2)?;
    Ok(RouterConfig {
        asn: r1.asn,
        router_id,
        vrf: r1.vrf.clone(),
        neighbors: merge_neighbors(&r1.neighbors, &r2.neighbors)?,
        ipv4_prefixes: union(&r1.ipv4_prefixes, &r2.ipv4_prefixes),
        ipv6_prefixes: union(&r1.ipv6_prefixes, &r2.ipv6_prefixes),
        import_vrfs: union(&r1.import_vrfs, &r2.import_vrfs),
    })
}

/// Bring a router that has no peer to merge with to its canonical form
fn canonical_router(router: &RouterConfig) -> ConfigResult<RouterConfig> {
    let mut canonical = router.clone();
    canonical.neighbors = merge_neighbors(&router.neighbors, &[])?;
    canonical.ipv4_prefixes = union(&router.ipv4_prefixes, &[]);
    canonical.ipv6_prefixes = union(&router.ipv6_prefixes, &[]);
    canonical.import_vrfs = union(&router.import_vrfs, &[]);
    Ok(canonical)
}

/// Merge a sequence of configs into one. Routers are merged per vrf and sorted by vrf,
/// BFD profiles are deduplicated by name (the last definition of a name is kept). Host name,
/// log level and extra configuration are those of the first config that sets them.
pub fn merge_configs(configs: impl IntoIterator<Item = Config>) -> ConfigResult<Config> {
    let mut merged = Config::new();
    let mut routers: BTreeMap<String, RouterConfig> = BTreeMap::new();
    let mut profiles: BTreeMap<String, BfdProfile> = BTreeMap::new();
    let mut loglevel = None;

    for config in configs {
        if merged.hostname.is_empty() {
            merged.hostname = config.hostname;
        }
        if merged.extra_config.is_empty() {
            merged.extra_config = config.extra_config;
        }
        loglevel.get_or_insert(config.loglevel);

        for router in &config.routers {
            let next = match routers.get(&router.vrf) {
                Some(current) => merge_routers(current, router)?,
                None => canonical_router(router)?,
            };
            routers.insert(router.vrf.clone(), next);
        }
        for profile in config.bfd_profiles {
            profiles.insert(profile.name.clone(), profile);
        }
    }

    merged.loglevel = loglevel.unwrap_or_default();
    merged.routers = routers.into_values().collect();
    merged.bfd_profiles = profiles.into_values().collect();
    Ok(merged)
}

/// Check that the BFD profiles that neighbors refer to exist
pub fn check_bfd_profiles(config: &Config) -> ConfigResult {
    for neigh in config.neighbors() {
        if let Some(profile) = &neigh.bfd_profile {
            if config.get_bfd_profile(profile).is_none() {
                return Err(ConfigError::UnknownBfdProfile {
                    neighbor: neigh.name.clone(),
                    profile: profile.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::{Community, IpFamily};
    use pretty_assertions::assert_eq;
    use std::net::IpAddr;
    use std::str::FromStr;

    fn addr(a: &str) -> IpAddr {
        IpAddr::from_str(a).expect("Bad address")
    }

    fn filter(prefix: &str, local_pref: u32, communities: &[&str]) -> OutgoingFilter {
        let mut f = OutgoingFilter::new(prefix, IpFamily::Ipv4).set_local_pref(local_pref);
        for c in communities {
            f.add_community(Community::from_str(c).expect("Bad community"));
        }
        f
    }

    fn neighbor_with_out(filters: Vec<OutgoingFilter>) -> NeighborConfig {
        NeighborConfig::new(65001, addr("192.168.1.2"), "").set_outgoing(AllowedOut {
            prefixes_v4: filters,
            prefixes_v6: vec![],
        })
    }

    fn config_with(router: RouterConfig) -> Config {
        let mut config = Config::new();
        config.routers.push(router);
        config
    }

    fn sample_a() -> Config {
        let mut router = RouterConfig::new(65000, "").set_router_id(Ipv4Addr::new(10, 0, 0, 1));
        router.ipv4_prefixes = vec!["192.0.2.0/24".to_string()];
        router.add_neighbor(
            neighbor_with_out(vec![filter("192.0.2.0/24", 100, &["10:100"])])
                .set_hold_time(Duration::from_secs(180)),
        );
        router.add_neighbor(NeighborConfig::new(65002, addr("10.0.0.2"), ""));
        let mut config = config_with(router);
        config.bfd_profiles.push(BfdProfile::new("fast"));
        config
    }

    fn sample_b() -> Config {
        let mut router = RouterConfig::new(65000, "");
        router.ipv4_prefixes = vec!["198.51.100.0/24".to_string()];
        router.import_vrfs = vec!["blue".to_string()];
        router.add_neighbor(neighbor_with_out(vec![filter("192.0.2.0/24", 0, &["20:200"])]));
        let mut red = config_with(router);
        red.routers
            .push(RouterConfig::new(65010, "red").set_router_id(Ipv4Addr::new(10, 0, 0, 9)));
        red.bfd_profiles.push(BfdProfile::new("slow"));
        red
    }

    #[test]
    fn test_merge_idempotent() {
        let once = merge_configs([sample_a(), sample_b()]).expect("Should succeed");
        let twice = merge_configs([once.clone(), once.clone()]).expect("Should succeed");
        assert_eq!(once, twice);
        let again = merge_configs([sample_a(), sample_b(), sample_a(), sample_b()])
            .expect("Should succeed");
        assert_eq!(once, again);
        assert_eq!(once.as_json(), again.as_json());
    }

    #[test]
    fn test_merge_commutative() {
        let ab = merge_configs([sample_a(), sample_b()]).expect("Should succeed");
        let ba = merge_configs([sample_b(), sample_a()]).expect("Should succeed");
        assert_eq!(ab, ba);

        /* routers sorted by vrf, neighbors by address */
        assert_eq!(
            ab.routers.iter().map(|r| r.vrf.as_str()).collect::<Vec<_>>(),
            vec!["", "red"]
        );
        let default = ab.get_router("").expect("Missing router");
        assert_eq!(default.router_id, Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(
            default
                .neighbors
                .iter()
                .map(NeighborConfig::key)
                .collect::<Vec<_>>(),
            vec!["10.0.0.2", "192.168.1.2"]
        );
        assert_eq!(default.ipv4_prefixes, vec!["192.0.2.0/24", "198.51.100.0/24"]);
        assert_eq!(default.import_vrfs, vec!["blue"]);
        assert_eq!(
            ab.bfd_profiles.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            vec!["fast", "slow"]
        );
    }

    #[test]
    fn test_merge_asn_conflict() {
        let c1 = config_with(RouterConfig::new(65001, "red"));
        let c2 = config_with(RouterConfig::new(65002, "red"));
        let err = merge_configs([c1, c2]).expect_err("Should fail");
        let msg = err.to_string();
        assert!(msg.contains("65001"), "{msg}");
        assert!(msg.contains("65002"), "{msg}");
        assert!(msg.contains("red"), "{msg}");
    }

    #[test]
    fn test_merge_router_id() {
        let c1 = config_with(RouterConfig::new(65001, "").set_router_id(Ipv4Addr::new(1, 1, 1, 1)));
        let c2 = config_with(RouterConfig::new(65001, "").set_router_id(Ipv4Addr::new(2, 2, 2, 2)));
        assert_eq!(
            merge_configs([c1.clone(), c2]),
            Err(ConfigError::RouterIdMismatch {
                vrf: String::new(),
                id1: Ipv4Addr::new(1, 1, 1, 1),
                id2: Ipv4Addr::new(2, 2, 2, 2)
            })
        );
        let c3 = config_with(RouterConfig::new(65001, ""));
        let merged = merge_configs([c3, c1]).expect("Should succeed");
        assert_eq!(merged.routers[0].router_id, Some(Ipv4Addr::new(1, 1, 1, 1)));
    }

    #[test]
    fn test_merge_default_normalization() {
        let n1 = NeighborConfig::new(65001, addr("192.168.1.2"), "");
        let n2 = NeighborConfig::new(65001, addr("192.168.1.2"), "")
            .set_hold_time(Duration::from_secs(180))
            .set_port(179);
        let merged = merge_neighbors(&[n1], &[n2]).expect("Should succeed");
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].hold_time, None);
        assert_eq!(merged[0].port, None);
    }

    #[test]
    fn test_merge_neighbor_mismatch() {
        let n1 = NeighborConfig::new(65001, addr("192.168.1.2"), "red")
            .set_password("secret1")
            .set_keepalive_time(Duration::from_secs(30));
        let n2 = NeighborConfig::new(65003, addr("192.168.1.2"), "red").set_password("secret2");
        let err = merge_neighbors(&[n1], &[n2]).expect_err("Should fail");
        let fields = match &err {
            ConfigError::IncompatibleNeighbor {
                neighbor,
                vrf,
                mismatches,
            } if neighbor == "192.168.1.2" && vrf == "red" => {
                mismatches.iter().map(|m| m.field).collect::<Vec<_>>()
            }
            _ => vec![],
        };
        assert_eq!(fields, vec!["asn", "password", "keepalive-time"]);
        let msg = err.to_string();
        assert!(!msg.contains("secret"), "{msg}");
        assert!(msg.contains("multiple keepalive-time values specified (30s != 60s)"));
    }

    #[test]
    fn test_merge_local_pref_conflict() {
        let n1 = neighbor_with_out(vec![filter("192.0.2.0/24", 100, &[])]);
        let n2 = neighbor_with_out(vec![filter("192.0.2.0/24", 150, &[])]);
        let err = merge_neighbors(&[n1], &[n2]).expect_err("Should fail");
        assert_eq!(
            err,
            ConfigError::LocalPrefMismatch {
                prefix: "192.0.2.0/24".to_string(),
                pref1: 100,
                pref2: 150
            }
        );
        let msg = err.to_string();
        assert!(msg.contains("192.0.2.0/24") && msg.contains("100") && msg.contains("150"));
    }

    #[test]
    fn test_merge_community_union() {
        let n1 = neighbor_with_out(vec![filter("192.0.2.0/24", 0, &["10:108", "10:100"])]);
        let n2 = neighbor_with_out(vec![filter("192.0.2.0/24", 200, &["20:200"])]);
        let merged = merge_neighbors(&[n1], &[n2]).expect("Should succeed");
        let out = &merged[0].outgoing.prefixes_v4;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].local_pref, 200);
        assert_eq!(
            out[0].communities.iter().map(Community::as_str).collect::<Vec<_>>(),
            vec!["10:100", "10:108", "20:200"]
        );
        assert!(out[0].large_communities.is_empty());
    }

    #[test]
    fn test_merge_accept_all_absorbs() {
        let explicit = AllowedIn {
            all: false,
            prefixes_v4: vec![IncomingFilter::new("10.0.0.0/8", IpFamily::Ipv4, None, Some(24))],
            prefixes_v6: vec![],
        };
        let n1 = NeighborConfig::new(65001, addr("192.168.1.2"), "").set_incoming(explicit.clone());
        let n2 = NeighborConfig::new(65001, addr("192.168.1.2"), "")
            .set_incoming(AllowedIn::accept_all());
        let merged = merge_neighbors(&[n1.clone()], &[n2.clone()]).expect("Should succeed");
        assert_eq!(merged[0].incoming, AllowedIn::accept_all());
        let merged = merge_neighbors(&[n2], &[n1.clone()]).expect("Should succeed");
        assert_eq!(merged[0].incoming, AllowedIn::accept_all());

        /* duplicate filters collapse */
        let merged = merge_neighbors(&[n1.clone()], &[n1]).expect("Should succeed");
        assert_eq!(merged[0].incoming, explicit);
    }

    #[test]
    fn test_check_bfd_profiles() {
        let mut router = RouterConfig::new(65000, "");
        router.add_neighbor(
            NeighborConfig::new(65001, addr("192.168.1.2"), "").set_bfd_profile("fast"),
        );
        let mut config = config_with(router);
        assert_eq!(
            check_bfd_profiles(&config),
            Err(ConfigError::UnknownBfdProfile {
                neighbor: "65001@192.168.1.2".to_string(),
                profile: "fast".to_string()
            })
        );
        config.bfd_profiles.push(BfdProfile::new("fast"));
        assert_eq!(check_bfd_profiles(&config), Ok(()));
    }
}
