// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: route maps

use crate::frr::renderer::builder::{ConfigBuilder, MARKER, Render};
use crate::models::routemap::{
    MatchingPolicy, OnMatch, RouteMap, RouteMapEntry, RouteMapMatch, RouteMapSetAction,
    RouteMapTable,
};
use std::fmt::Display;

/* Impl Display */
impl Display for MatchingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchingPolicy::Deny => write!(f, "deny"),
            MatchingPolicy::Permit => write!(f, "permit"),
        }
    }
}

fn communities(keyword: &str, values: &[String], additive: bool) -> String {
    let mut out = keyword.to_string();
    for c in values {
        out += " ";
        out += c;
    }
    if additive {
        out += " additive";
    }
    out
}

/* Impl Render */
impl Render for RouteMapSetAction {
    type Context = ();
    type Output = String;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut statement = match self {
            RouteMapSetAction::LocalPreference(lp) => format!("local-preference {lp}"),
            RouteMapSetAction::Community(comms, additive) => {
                communities("community", comms, *additive)
            }
            RouteMapSetAction::LargeCommunity(comms, additive) => {
                communities("large-community", comms, *additive)
            }
        };
        statement.insert_str(0, " set ");
        statement
    }
}
impl Render for RouteMapMatch {
    type Context = ();
    type Output = String;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut statement = match self {
            RouteMapMatch::Ipv4AddressPrefixList(preflistname) => {
                format!("ip address prefix-list {preflistname}")
            }
            RouteMapMatch::Ipv6AddressPrefixList(preflistname) => {
                format!("ipv6 address prefix-list {preflistname}")
            }
        };
        statement.insert_str(0, " match ");
        statement
    }
}
impl Render for RouteMapEntry {
    type Context = (String, u32); /* u32 is sequence number */
    type Output = ConfigBuilder;
    fn render(&self, ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        config += format!("{} {} {}", ctx.0, self.policy, ctx.1);
        self.matches.iter().for_each(|m| config += m.render(&()));
        self.actions.iter().for_each(|a| config += a.render(&()));
        if self.on_match == OnMatch::Next {
            config += " on-match next";
        }
        config += "exit";
        config += MARKER;
        config
    }
}
impl Render for RouteMap {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        let render_prefix = format!("route-map {}", self.name);
        self.entries
            .iter()
            .for_each(|(seq, e)| config += e.render(&(render_prefix.clone(), *seq)));
        config
    }
}
impl Render for RouteMapTable {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _ctx: &Self::Context) -> Self::Output {
        let mut config = ConfigBuilder::new();
        self.values().for_each(|rmap| config += rmap.render(&()));
        config
    }
}
