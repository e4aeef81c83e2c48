// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: BGP routers, neighbors and their policies

use crate::internal::family::IpFamily;
use crate::internal::routing::community::Community;
use serde::Serialize;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/* Protocol defaults. A value equal to its default is equivalent to an unset value. */
pub const DEFAULT_BGP_PORT: u16 = 179;
pub const DEFAULT_HOLD_TIME: Duration = Duration::from_secs(180);
pub const DEFAULT_KEEPALIVE_TIME: Duration = Duration::from_secs(60);
pub const DEFAULT_CONNECT_TIME: Duration = Duration::from_secs(60);

/// A prefix advertised to a neighbor, possibly tagged
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OutgoingFilter {
    pub prefix: String,
    pub family: IpFamily,
    /// 0 means no local preference is set
    pub local_pref: u32,
    /// An empty set means no communities are attached
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub communities: BTreeSet<Community>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub large_communities: BTreeSet<Community>,
}

/// A prefix accepted from a neighbor. `ge` is the least specific length to match,
/// `le` the most specific one.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IncomingFilter {
    pub prefix: String,
    pub family: IpFamily,
    pub ge: Option<u8>,
    pub le: Option<u8>,
}

/// Egress policy of a neighbor, per IP family, sorted by prefix
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AllowedOut {
    pub prefixes_v4: Vec<OutgoingFilter>,
    pub prefixes_v6: Vec<OutgoingFilter>,
}

/// Ingress policy of a neighbor. If `all` is set, the explicit lists are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AllowedIn {
    pub all: bool,
    pub prefixes_v4: Vec<IncomingFilter>,
    pub prefixes_v6: Vec<IncomingFilter>,
}

/// A BGP neighbor. Unset optional values mean the daemon default.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NeighborConfig {
    pub name: String,
    pub asn: u32,
    pub addr: IpAddr,
    pub vrf: String,
    pub family: IpFamily,
    pub src_addr: Option<IpAddr>,
    pub port: Option<u16>,
    pub hold_time: Option<Duration>,
    pub keepalive_time: Option<Duration>,
    pub connect_time: Option<Duration>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub bfd_profile: Option<String>,
    pub ebgp_multihop: bool,
    pub disable_mp: bool,
    pub outgoing: AllowedOut,
    pub incoming: AllowedIn,
    pub always_block: Vec<IncomingFilter>,
}

/// A BGP router instance, one per vrf. The default vrf is the empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouterConfig {
    pub asn: u32,
    pub router_id: Option<Ipv4Addr>,
    pub vrf: String,
    pub neighbors: Vec<NeighborConfig>,
    pub ipv4_prefixes: Vec<String>,
    pub ipv6_prefixes: Vec<String>,
    pub import_vrfs: Vec<String>,
}

/* ===== impls ===== */
impl OutgoingFilter {
    #[must_use]
    pub fn new(prefix: &str, family: IpFamily) -> Self {
        Self {
            prefix: prefix.to_owned(),
            family,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn set_local_pref(mut self, local_pref: u32) -> Self {
        self.local_pref = local_pref;
        self
    }
    /// Attach a community, regular or large
    pub fn add_community(&mut self, community: Community) {
        if community.is_large() {
            self.large_communities.insert(community);
        } else {
            self.communities.insert(community);
        }
    }
}

impl IncomingFilter {
    #[must_use]
    pub fn new(prefix: &str, family: IpFamily, ge: Option<u8>, le: Option<u8>) -> Self {
        Self {
            prefix: prefix.to_owned(),
            family,
            ge,
            le,
        }
    }
    /// The identity of a filter within a family
    #[must_use]
    pub fn key(&self) -> (String, Option<u8>, Option<u8>) {
        (self.prefix.clone(), self.ge, self.le)
    }
}

impl AllowedOut {
    pub fn iter(&self) -> impl Iterator<Item = &OutgoingFilter> {
        self.prefixes_v4.iter().chain(self.prefixes_v6.iter())
    }
    #[must_use]
    pub fn family(&self, family: IpFamily) -> &[OutgoingFilter] {
        match family {
            IpFamily::Ipv4 => &self.prefixes_v4,
            IpFamily::Ipv6 | IpFamily::DualStack => &self.prefixes_v6,
        }
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prefixes_v4.is_empty() && self.prefixes_v6.is_empty()
    }
}

impl AllowedIn {
    #[must_use]
    pub fn accept_all() -> Self {
        Self {
            all: true,
            ..Default::default()
        }
    }
    #[must_use]
    pub fn family(&self, family: IpFamily) -> &[IncomingFilter] {
        match family {
            IpFamily::Ipv4 => &self.prefixes_v4,
            IpFamily::Ipv6 | IpFamily::DualStack => &self.prefixes_v6,
        }
    }
}

impl NeighborConfig {
    #[must_use]
    pub fn new(asn: u32, addr: IpAddr, vrf: &str) -> Self {
        Self {
            name: Self::display_name(asn, &addr),
            asn,
            addr,
            vrf: vrf.to_owned(),
            family: IpFamily::for_address(&addr),
            src_addr: None,
            port: None,
            hold_time: None,
            keepalive_time: None,
            connect_time: None,
            password: None,
            bfd_profile: None,
            ebgp_multihop: false,
            disable_mp: false,
            outgoing: AllowedOut::default(),
            incoming: AllowedIn::default(),
            always_block: vec![],
        }
    }
    /// Name of a neighbor, for diagnostics
    #[must_use]
    pub fn display_name(asn: u32, addr: &IpAddr) -> String {
        format!("{asn}@{addr}")
    }
    /// The key that identifies a neighbor within a router
    #[must_use]
    pub fn key(&self) -> String {
        self.addr.to_string()
    }
    /// Identifier of this neighbor across all vrfs. This is the stem of the names of all the
    /// policy objects generated for it.
    #[must_use]
    pub fn id(&self) -> String {
        if self.vrf.is_empty() {
            self.addr.to_string()
        } else {
            format!("{}-{}", self.addr, self.vrf)
        }
    }

    #[must_use]
    pub fn set_src_addr(mut self, addr: IpAddr) -> Self {
        self.src_addr = Some(addr);
        self
    }
    #[must_use]
    pub fn set_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }
    #[must_use]
    pub fn set_hold_time(mut self, time: Duration) -> Self {
        self.hold_time = Some(time);
        self
    }
    #[must_use]
    pub fn set_keepalive_time(mut self, time: Duration) -> Self {
        self.keepalive_time = Some(time);
        self
    }
    #[must_use]
    pub fn set_connect_time(mut self, time: Duration) -> Self {
        self.connect_time = Some(time);
        self
    }
    #[must_use]
    pub fn set_password(mut self, password: &str) -> Self {
        self.password = Some(password.to_owned());
        self
    }
    #[must_use]
    pub fn set_bfd_profile(mut self, profile: &str) -> Self {
        self.bfd_profile = Some(profile.to_owned());
        self
    }
    #[must_use]
    pub fn set_ebgp_multihop(mut self, value: bool) -> Self {
        self.ebgp_multihop = value;
        self
    }
    #[must_use]
    pub fn set_disable_mp(mut self, value: bool) -> Self {
        self.disable_mp = value;
        self
    }
    #[must_use]
    pub fn set_outgoing(mut self, outgoing: AllowedOut) -> Self {
        self.outgoing = outgoing;
        self
    }
    #[must_use]
    pub fn set_incoming(mut self, incoming: AllowedIn) -> Self {
        self.incoming = incoming;
        self
    }

    /// Clear the values that equal their protocol default, so that
    /// "unset" and "explicitly the default" have a single representation.
    pub fn clean_defaults(&mut self) {
        self.port = self.port.filter(|p| *p != DEFAULT_BGP_PORT);
        self.hold_time = self.hold_time.filter(|t| *t != DEFAULT_HOLD_TIME);
        self.keepalive_time = self.keepalive_time.filter(|t| *t != DEFAULT_KEEPALIVE_TIME);
        self.connect_time = self.connect_time.filter(|t| *t != DEFAULT_CONNECT_TIME);
    }

    /// The effective keepalive and hold times, if any of them deviates from the default
    #[must_use]
    pub fn timers(&self) -> Option<(Duration, Duration)> {
        if self.hold_time.is_none() && self.keepalive_time.is_none() {
            return None;
        }
        Some((
            self.keepalive_time.unwrap_or(DEFAULT_KEEPALIVE_TIME),
            self.hold_time.unwrap_or(DEFAULT_HOLD_TIME),
        ))
    }
}

impl RouterConfig {
    #[must_use]
    pub fn new(asn: u32, vrf: &str) -> Self {
        Self {
            asn,
            vrf: vrf.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn set_router_id(mut self, router_id: Ipv4Addr) -> Self {
        self.router_id = Some(router_id);
        self
    }
    pub fn add_neighbor(&mut self, neigh: NeighborConfig) {
        self.neighbors.push(neigh);
    }
    pub fn get_neighbor(&self, addr: &IpAddr) -> Option<&NeighborConfig> {
        self.neighbors.iter().find(|n| n.addr == *addr)
    }
    /// The locally originated prefixes of a family
    #[must_use]
    pub fn prefixes(&self, family: IpFamily) -> &[String] {
        match family {
            IpFamily::Ipv4 => &self.ipv4_prefixes,
            IpFamily::Ipv6 | IpFamily::DualStack => &self.ipv6_prefixes,
        }
    }
}
