// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Names of the policy objects generated for a neighbor. Names are a pure function of the
//! neighbor identity (address and vrf), the IP family and, where relevant, the community or
//! local preference they implement. Hence, objects of distinct neighbors or families never
//! collide and the same config always yields the same names.

use config::internal::{Community, IpFamily, NeighborConfig};

/// Family tag used in the names of objects
fn fam(family: IpFamily) -> &'static str {
    match family {
        IpFamily::Ipv4 => "ipv4",
        IpFamily::Ipv6 | IpFamily::DualStack => "ipv6",
    }
}

////////////////////////////////////////////////////////////////////////////
/// Convenience trait to generate the names of the policy objects of a neighbor.
/// Only implemented for `NeighborConfig`.
////////////////////////////////////////////////////////////////////////////
pub(crate) trait NeighborPolicyNames {
    fn allowed_out_plist(&self, family: IpFamily) -> String;
    fn allowed_in_plist(&self, family: IpFamily) -> String;
    fn blocked_plist(&self, family: IpFamily) -> String;
    fn community_plist(&self, community: &Community, family: IpFamily) -> String;
    fn local_pref_plist(&self, local_pref: u32, family: IpFamily) -> String;
    fn import_rmap(&self) -> String;
    fn export_rmap(&self) -> String;
}

impl NeighborPolicyNames for NeighborConfig {
    fn allowed_out_plist(&self, family: IpFamily) -> String {
        format!("{}-pl-{}", self.id(), fam(family))
    }
    fn allowed_in_plist(&self, family: IpFamily) -> String {
        format!("{}-inpl-{}", self.id(), fam(family))
    }
    fn blocked_plist(&self, family: IpFamily) -> String {
        format!("{}-blocked-{}", self.id(), fam(family))
    }
    fn community_plist(&self, community: &Community, family: IpFamily) -> String {
        format!(
            "{}-{}-{}-community-prefixes",
            self.id(),
            community,
            fam(family)
        )
    }
    fn local_pref_plist(&self, local_pref: u32, family: IpFamily) -> String {
        format!(
            "{}-{}-{}-localpref-prefixes",
            self.id(),
            local_pref,
            fam(family)
        )
    }
    fn import_rmap(&self) -> String {
        format!("{}-in", self.id())
    }
    fn export_rmap(&self) -> String {
        format!("{}-out", self.id())
    }
}
