// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! FRR policy objects: route maps

use std::collections::BTreeMap;
use tracing::error;

use crate::frr::reload::FrrErr;

#[derive(Clone, Copy, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum MatchingPolicy {
    Deny,
    Permit,
}

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum RouteMapMatch {
    Ipv4AddressPrefixList(String),
    Ipv6AddressPrefixList(String),
}

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum RouteMapSetAction {
    LocalPreference(u32),
    /// Regular communities, and whether they add to those of the route
    Community(Vec<String>, bool),
    LargeCommunity(Vec<String>, bool),
}

/// What to do after an entry matched. By default, evaluation stops at the first match.
#[derive(Clone, Copy, Debug, Default, Ord, PartialOrd, Eq, PartialEq)]
pub enum OnMatch {
    #[default]
    Exit,
    Next,
}

#[derive(Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub struct RouteMapEntry {
    pub policy: MatchingPolicy,
    pub matches: Vec<RouteMapMatch>,
    pub actions: Vec<RouteMapSetAction>,
    pub on_match: OnMatch,
}

#[derive(Clone, Debug)]
pub struct RouteMap {
    pub name: String,
    pub entries: BTreeMap<u32, RouteMapEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct RouteMapTable(BTreeMap<String, RouteMap>);

/* Impl basic ops */
impl RouteMapEntry {
    #[must_use]
    pub fn new(policy: MatchingPolicy) -> Self {
        Self {
            policy,
            matches: vec![],
            actions: vec![],
            on_match: OnMatch::Exit,
        }
    }
    #[must_use]
    pub fn add_match(mut self, m: RouteMapMatch) -> Self {
        self.matches.push(m);
        self
    }
    #[must_use]
    pub fn add_action(mut self, action: RouteMapSetAction) -> Self {
        self.actions.push(action);
        self
    }
    #[must_use]
    pub fn set_on_match(mut self, on_match: OnMatch) -> Self {
        self.on_match = on_match;
        self
    }
}
impl RouteMap {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            entries: BTreeMap::new(),
        }
    }
    pub fn add_entry(&mut self, seq: u32, entry: RouteMapEntry) -> Result<(), FrrErr> {
        if self.entries.contains_key(&seq) {
            let msg = format!("Duplicate route-map seq {} in route map {}", seq, self.name);
            error!("{msg}");
            return Err(FrrErr::Render(msg));
        }
        self.entries.insert(seq, entry);
        Ok(())
    }
}
impl RouteMapTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_route_map(&mut self, rmap: RouteMap) {
        self.0.insert(rmap.name.clone(), rmap);
    }
    pub fn get(&self, name: &str) -> Option<&RouteMap> {
        self.0.get(name)
    }
    pub fn values(&self) -> impl Iterator<Item = &RouteMap> {
        self.0.values()
    }
}
