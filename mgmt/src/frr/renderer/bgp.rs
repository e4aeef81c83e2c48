// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: BGP

use crate::frr::renderer::builder::{ConfigBuilder, MARKER, Render};
use crate::models::namegen::NeighborPolicyNames;
use config::internal::{IpFamily, NeighborConfig, RouterConfig};

/// Address families rendered for every router
const AFS: [(IpFamily, &str); 2] = [(IpFamily::Ipv4, "ipv4"), (IpFamily::Ipv6, "ipv6")];

/// Tell if a neighbor is activated in some address family. Unless multiprotocol is disabled,
/// neighbors are activated in all families.
fn is_activated(neigh: &NeighborConfig, af: IpFamily) -> bool {
    !neigh.disable_mp || neigh.family.covers(af)
}

/// IPv6 eBGP single-hop sessions need the connected check disabled, as their link-local
/// next-hops are not seen as connected in some default-route setups.
fn needs_disable_connected_check(neigh: &NeighborConfig, local_asn: u32) -> bool {
    neigh.family == IpFamily::Ipv6 && neigh.asn != local_asn && !neigh.ebgp_multihop
}

/* utils to render BGP neighbor configs */
fn bgp_neigh_options(neigh: &NeighborConfig, local_asn: u32) -> ConfigBuilder {
    let mut cfg = ConfigBuilder::new();
    let prefix = format!(" neighbor {}", neigh.addr);

    cfg += format!("{prefix} remote-as {}", neigh.asn);
    if neigh.ebgp_multihop {
        cfg += format!("{prefix} ebgp-multihop");
    }
    if let Some(port) = neigh.port {
        cfg += format!("{prefix} port {port}");
    }
    if let Some((keepalive, hold)) = neigh.timers() {
        cfg += format!(
            "{prefix} timers {} {}",
            keepalive.as_secs(),
            hold.as_secs()
        );
    }
    if let Some(connect) = neigh.connect_time {
        cfg += format!("{prefix} timers connect {}", connect.as_secs());
    }
    if let Some(password) = &neigh.password {
        cfg += format!("{prefix} password {password}");
    }
    if let Some(src) = &neigh.src_addr {
        cfg += format!("{prefix} update-source {src}");
    }
    if let Some(profile) = &neigh.bfd_profile {
        cfg += format!("{prefix} bfd profile {profile}");
    }
    if needs_disable_connected_check(neigh, local_asn) {
        cfg += format!("{prefix} disable-connected-check");
    }
    cfg
}

fn bgp_neigh_af(neigh: &NeighborConfig) -> ConfigBuilder {
    let mut cfg = ConfigBuilder::new();
    let prefix = format!("  neighbor {}", neigh.addr);
    cfg += format!("{prefix} activate");
    cfg += format!("{prefix} route-map {} in", neigh.import_rmap());
    cfg += format!("{prefix} route-map {} out", neigh.export_rmap());
    cfg
}

fn bgp_af(router: &RouterConfig, af: IpFamily, name: &str) -> ConfigBuilder {
    let mut cfg = ConfigBuilder::new();
    let neighbors: Vec<_> = router
        .neighbors
        .iter()
        .filter(|n| is_activated(n, af))
        .collect();
    let networks = router.prefixes(af);
    if neighbors.is_empty() && networks.is_empty() && router.import_vrfs.is_empty() {
        return cfg;
    }

    cfg += format!(" address-family {name} unicast");
    neighbors.iter().for_each(|n| cfg += bgp_neigh_af(n));
    networks
        .iter()
        .for_each(|prefix| cfg += format!("  network {prefix}"));
    router
        .import_vrfs
        .iter()
        .for_each(|vrf| cfg += format!("  import vrf {vrf}"));
    cfg += " exit-address-family";
    cfg += " !";
    cfg
}

impl Render for RouterConfig {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();

        /* bgp instance */
        if self.vrf.is_empty() {
            cfg += format!("router bgp {}", self.asn);
        } else {
            cfg += format!("router bgp {} vrf {}", self.asn, self.vrf);
        }
        cfg += " no bgp ebgp-requires-policy";
        cfg += " no bgp network import-check";
        cfg += " no bgp default ipv4-unicast";
        if let Some(router_id) = self.router_id {
            cfg += format!(" bgp router-id {router_id}");
        }
        cfg += " !";

        /* neighbors */
        for neigh in &self.neighbors {
            cfg += bgp_neigh_options(neigh, self.asn);
            cfg += " !";
        }

        /* address families */
        for (af, name) in AFS {
            cfg += bgp_af(self, af, name);
        }

        cfg += "exit";
        cfg += MARKER;
        cfg
    }
}

impl Render for Vec<RouterConfig> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        self.iter().for_each(|router| cfg += router.render(&()));
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;
    use std::time::Duration;

    fn addr(a: &str) -> IpAddr {
        IpAddr::from_str(a).expect("Bad address")
    }

    #[test]
    fn test_bgp_render() {
        let mut router = RouterConfig::new(65000, "red").set_router_id(Ipv4Addr::new(10, 0, 0, 1));
        router.ipv4_prefixes = vec!["192.0.2.0/24".to_string()];
        router.import_vrfs = vec!["blue".to_string()];
        router.add_neighbor(
            NeighborConfig::new(65001, addr("192.168.1.2"), "red")
                .set_port(1179)
                .set_hold_time(Duration::from_secs(90))
                .set_connect_time(Duration::from_secs(10))
                .set_password("secret")
                .set_src_addr(addr("192.168.1.1"))
                .set_bfd_profile("fast")
                .set_ebgp_multihop(true),
        );
        router.add_neighbor(
            NeighborConfig::new(65002, addr("2001:db8::2"), "red").set_disable_mp(true),
        );

        let expected = "\
router bgp 65000 vrf red
 no bgp ebgp-requires-policy
 no bgp network import-check
 no bgp default ipv4-unicast
 bgp router-id 10.0.0.1
 !
 neighbor 192.168.1.2 remote-as 65001
 neighbor 192.168.1.2 ebgp-multihop
 neighbor 192.168.1.2 port 1179
 neighbor 192.168.1.2 timers 60 90
 neighbor 192.168.1.2 timers connect 10
 neighbor 192.168.1.2 password secret
 neighbor 192.168.1.2 update-source 192.168.1.1
 neighbor 192.168.1.2 bfd profile fast
 !
 neighbor 2001:db8::2 remote-as 65002
 neighbor 2001:db8::2 disable-connected-check
 !
 address-family ipv4 unicast
  neighbor 192.168.1.2 activate
  neighbor 192.168.1.2 route-map 192.168.1.2-red-in in
  neighbor 192.168.1.2 route-map 192.168.1.2-red-out out
  network 192.0.2.0/24
  import vrf blue
 exit-address-family
 !
 address-family ipv6 unicast
  neighbor 192.168.1.2 activate
  neighbor 192.168.1.2 route-map 192.168.1.2-red-in in
  neighbor 192.168.1.2 route-map 192.168.1.2-red-out out
  neighbor 2001:db8::2 activate
  neighbor 2001:db8::2 route-map 2001:db8::2-red-in in
  neighbor 2001:db8::2 route-map 2001:db8::2-red-out out
  import vrf blue
 exit-address-family
 !
exit
!
";
        assert_eq!(router.render(&()).to_string(), expected);
    }

    #[test]
    fn test_connected_check() {
        let ebgp_v6 = NeighborConfig::new(65001, addr("2001:db8::2"), "");
        assert!(needs_disable_connected_check(&ebgp_v6, 65000));
        assert!(!needs_disable_connected_check(&ebgp_v6, 65001));
        let multihop = ebgp_v6.clone().set_ebgp_multihop(true);
        assert!(!needs_disable_connected_check(&multihop, 65000));
        let ebgp_v4 = NeighborConfig::new(65001, addr("192.168.1.2"), "");
        assert!(!needs_disable_connected_check(&ebgp_v4, 65000));
    }

    #[test]
    fn test_activation() {
        let v4 = NeighborConfig::new(65001, addr("192.168.1.2"), "");
        assert!(is_activated(&v4, IpFamily::Ipv6));
        let v4 = v4.set_disable_mp(true);
        assert!(is_activated(&v4, IpFamily::Ipv4));
        assert!(!is_activated(&v4, IpFamily::Ipv6));
    }
}
