// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: prefix list

use crate::frr::renderer::builder::{ConfigBuilder, MARKER, Render};
use crate::models::prefixlist::{
    IpVer, PrefixList, PrefixListAction, PrefixListEntry, PrefixListPrefix, PrefixListTable,
};
use std::fmt::Display;

/* Impl Display */
impl Display for PrefixListPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixListPrefix::Any => write!(f, "any"),
            PrefixListPrefix::Prefix(prefix) => write!(f, "{prefix}"),
        }
    }
}
impl Display for PrefixListAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixListAction::Deny => write!(f, "deny"),
            PrefixListAction::Permit => write!(f, "permit"),
        }
    }
}
impl Display for IpVer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpVer::V4 => write!(f, "ip"),
            IpVer::V6 => write!(f, "ipv6"),
        }
    }
}

/* Impl Render */
impl Render for PrefixListEntry {
    type Context = (String, u32); /* u32 is sequence number */
    type Output = String;
    fn render(&self, ctx: &Self::Context) -> String {
        let mut out = format!("{} seq {} {} {}", ctx.0, ctx.1, self.action, self.prefix);
        if let Some(ge) = self.ge {
            out += format!(" ge {ge}").as_str();
        }
        if let Some(le) = self.le {
            out += format!(" le {le}").as_str();
        }
        out
    }
}
impl Render for PrefixList {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut config = ConfigBuilder::new();
        let pfx = format!("{} prefix-list {}", self.ipver, self.name);
        self.entries
            .iter()
            .for_each(|(seq, e)| config += e.render(&(pfx.clone(), *seq)));
        config
    }
}
impl Render for PrefixListTable {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> ConfigBuilder {
        let mut cfg = ConfigBuilder::new();
        self.values().for_each(|plist| cfg += plist.render(&()));
        if !cfg.is_empty() {
            cfg += MARKER;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_list_render() {
        let mut plist = PrefixList::new("192.168.1.2-inpl-ipv4", IpVer::V4);
        let mut entry = PrefixListEntry::permit("10.0.0.0/8");
        entry.ge = Some(16);
        entry.le = Some(24);
        plist.add_entry(5, entry).expect("Should succeed");
        plist
            .add_entry(10, PrefixListEntry::permit("192.0.2.0/24"))
            .expect("Should succeed");

        let mut v6 = PrefixList::new("192.168.1.2-inpl-ipv6", IpVer::V6);
        v6.add_entry(5, PrefixListEntry::deny_any())
            .expect("Should succeed");

        let mut table = PrefixListTable::new();
        table.add_prefix_list(v6);
        table.add_prefix_list(plist);
        let expected = "\
ip prefix-list 192.168.1.2-inpl-ipv4 seq 5 permit 10.0.0.0/8 ge 16 le 24
ip prefix-list 192.168.1.2-inpl-ipv4 seq 10 permit 192.0.2.0/24
ipv6 prefix-list 192.168.1.2-inpl-ipv6 seq 5 deny any
!
";
        assert_eq!(table.render(&()).to_string(), expected);
    }
}
