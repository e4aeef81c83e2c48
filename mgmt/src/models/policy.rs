// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Derivation of the FRR policy objects that implement the incoming and outgoing policies
//! of every neighbor in a canonical config.
//!
//! For each neighbor, the export route map first tags routes (communities, local preference)
//! and then permits those in the advertised prefix list. The import route map first denies
//! the always-blocked prefixes and then permits what the neighbor is allowed to send us.

use config::internal::{Community, Config, IncomingFilter, IpFamily, NeighborConfig};
use std::collections::BTreeMap;
use tracing::debug;

use crate::frr::reload::FrrErr;
use crate::frr::renderer::builder::Counter;
use crate::models::namegen::NeighborPolicyNames;
use crate::models::prefixlist::{PrefixList, PrefixListEntry, PrefixListTable};
use crate::models::routemap::{
    MatchingPolicy, OnMatch, RouteMap, RouteMapEntry, RouteMapMatch, RouteMapSetAction,
    RouteMapTable,
};

const FAMILIES: [IpFamily; 2] = [IpFamily::Ipv4, IpFamily::Ipv6];

/// The prefix lists and route maps of a config
#[derive(Clone, Debug, Default)]
pub struct Policies {
    pub plists: PrefixListTable,
    pub rmaps: RouteMapTable,
}

fn match_plist(family: IpFamily, name: &str) -> RouteMapMatch {
    match family {
        IpFamily::Ipv4 => RouteMapMatch::Ipv4AddressPrefixList(name.to_owned()),
        IpFamily::Ipv6 | IpFamily::DualStack => {
            RouteMapMatch::Ipv6AddressPrefixList(name.to_owned())
        }
    }
}

/// Build a prefix list permitting the given prefixes. An empty list denies everything.
fn permit_list<'a>(
    name: &str,
    family: IpFamily,
    prefixes: impl IntoIterator<Item = &'a str>,
    counter: &mut Counter,
) -> Result<PrefixList, FrrErr> {
    let mut plist = PrefixList::new(name, family.into());
    for prefix in prefixes {
        plist.add_entry(counter.next(name), PrefixListEntry::permit(prefix))?;
    }
    if plist.is_empty() {
        plist.add_entry(counter.next(name), PrefixListEntry::deny_any())?;
    }
    Ok(plist)
}

fn filter_list(
    name: &str,
    family: IpFamily,
    filters: &[&IncomingFilter],
    counter: &mut Counter,
) -> Result<PrefixList, FrrErr> {
    let mut plist = PrefixList::new(name, family.into());
    for f in filters {
        let mut entry = PrefixListEntry::permit(&f.prefix);
        entry.ge = f.ge;
        entry.le = f.le;
        plist.add_entry(counter.next(name), entry)?;
    }
    if plist.is_empty() {
        plist.add_entry(counter.next(name), PrefixListEntry::deny_any())?;
    }
    Ok(plist)
}

fn build_export_policy(
    neigh: &NeighborConfig,
    counter: &mut Counter,
    policies: &mut Policies,
) -> Result<(), FrrErr> {
    let mut rmap = RouteMap::new(&neigh.export_rmap());

    for family in FAMILIES {
        let filters = neigh.outgoing.family(family);

        /* routes to tag with communities */
        let mut by_community: BTreeMap<&Community, Vec<&str>> = BTreeMap::new();
        for f in filters {
            for community in f.communities.iter().chain(f.large_communities.iter()) {
                by_community
                    .entry(community)
                    .or_default()
                    .push(f.prefix.as_str());
            }
        }
        for (community, prefixes) in by_community {
            let name = neigh.community_plist(community, family);
            policies
                .plists
                .add_prefix_list(permit_list(&name, family, prefixes, counter)?);
            let value = vec![community.value().to_owned()];
            let action = if community.is_large() {
                RouteMapSetAction::LargeCommunity(value, true)
            } else {
                RouteMapSetAction::Community(value, true)
            };
            let entry = RouteMapEntry::new(MatchingPolicy::Permit)
                .add_match(match_plist(family, &name))
                .add_action(action)
                .set_on_match(OnMatch::Next);
            rmap.add_entry(counter.next(&rmap.name), entry)?;
        }

        /* routes to set a local preference on */
        let mut by_local_pref: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
        for f in filters.iter().filter(|f| f.local_pref != 0) {
            by_local_pref
                .entry(f.local_pref)
                .or_default()
                .push(f.prefix.as_str());
        }
        for (local_pref, prefixes) in by_local_pref {
            let name = neigh.local_pref_plist(local_pref, family);
            policies
                .plists
                .add_prefix_list(permit_list(&name, family, prefixes, counter)?);
            let entry = RouteMapEntry::new(MatchingPolicy::Permit)
                .add_match(match_plist(family, &name))
                .add_action(RouteMapSetAction::LocalPreference(local_pref))
                .set_on_match(OnMatch::Next);
            rmap.add_entry(counter.next(&rmap.name), entry)?;
        }

        /* routes allowed out */
        let name = neigh.allowed_out_plist(family);
        let prefixes = filters.iter().map(|f| f.prefix.as_str());
        policies
            .plists
            .add_prefix_list(permit_list(&name, family, prefixes, counter)?);
        let entry =
            RouteMapEntry::new(MatchingPolicy::Permit).add_match(match_plist(family, &name));
        rmap.add_entry(counter.next(&rmap.name), entry)?;
    }

    policies.rmaps.add_route_map(rmap);
    Ok(())
}

fn build_import_policy(
    neigh: &NeighborConfig,
    counter: &mut Counter,
    policies: &mut Policies,
) -> Result<(), FrrErr> {
    let mut rmap = RouteMap::new(&neigh.import_rmap());

    /* always-blocked prefixes go first */
    for family in FAMILIES {
        let blocked: Vec<_> = neigh
            .always_block
            .iter()
            .filter(|f| f.family == family)
            .collect();
        if blocked.is_empty() {
            continue;
        }
        let name = neigh.blocked_plist(family);
        policies
            .plists
            .add_prefix_list(filter_list(&name, family, &blocked, counter)?);
        let entry = RouteMapEntry::new(MatchingPolicy::Deny).add_match(match_plist(family, &name));
        rmap.add_entry(counter.next(&rmap.name), entry)?;
    }

    if neigh.incoming.all {
        rmap.add_entry(
            counter.next(&rmap.name),
            RouteMapEntry::new(MatchingPolicy::Permit),
        )?;
    } else {
        for family in FAMILIES {
            let name = neigh.allowed_in_plist(family);
            let filters: Vec<_> = neigh.incoming.family(family).iter().collect();
            policies
                .plists
                .add_prefix_list(filter_list(&name, family, &filters, counter)?);
            let entry =
                RouteMapEntry::new(MatchingPolicy::Permit).add_match(match_plist(family, &name));
            rmap.add_entry(counter.next(&rmap.name), entry)?;
        }
    }

    policies.rmaps.add_route_map(rmap);
    Ok(())
}

/// Derive the prefix lists and route maps for all the neighbors of a config
pub fn build_policies(config: &Config, counter: &mut Counter) -> Result<Policies, FrrErr> {
    let mut policies = Policies::default();
    for neigh in config.neighbors() {
        debug!("Building policies for neighbor {} vrf '{}'", neigh.name, neigh.vrf);
        build_export_policy(neigh, counter, &mut policies)?;
        build_import_policy(neigh, counter, &mut policies)?;
    }
    Ok(policies)
}
