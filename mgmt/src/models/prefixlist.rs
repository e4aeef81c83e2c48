// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! FRR policy objects: prefix lists

use config::internal::IpFamily;
use std::collections::BTreeMap;
use tracing::error;

use crate::frr::reload::FrrErr;

#[derive(Clone, Copy, Debug, Ord, Eq, PartialOrd, PartialEq)]
pub enum PrefixListAction {
    Deny,
    Permit,
}

#[derive(Clone, Debug, Ord, Eq, PartialOrd, PartialEq)]
pub enum PrefixListPrefix {
    Prefix(String),
    Any,
}

#[derive(Clone, Debug, Ord, Eq, PartialOrd, PartialEq)]
pub struct PrefixListEntry {
    pub action: PrefixListAction,
    pub prefix: PrefixListPrefix,
    pub ge: Option<u8>,
    pub le: Option<u8>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IpVer {
    #[default]
    V4,
    V6,
}
impl From<IpFamily> for IpVer {
    fn from(family: IpFamily) -> Self {
        match family {
            IpFamily::Ipv4 => IpVer::V4,
            IpFamily::Ipv6 | IpFamily::DualStack => IpVer::V6,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PrefixList {
    pub name: String,
    pub ipver: IpVer,
    pub entries: BTreeMap<u32, PrefixListEntry>,
}

#[derive(Clone, Debug, Default)]
pub struct PrefixListTable(BTreeMap<String, PrefixList>);

/* Impl basic ops */
impl PrefixList {
    #[must_use]
    pub fn new(name: &str, ipver: IpVer) -> Self {
        Self {
            name: name.to_owned(),
            ipver,
            entries: BTreeMap::new(),
        }
    }
    pub fn add_entry(&mut self, seq: u32, entry: PrefixListEntry) -> Result<(), FrrErr> {
        if !entry.is_version_compatible(self.ipver) {
            let msg = format!(
                "attempted to insert entry with incompatible version in prefix list {}",
                self.name
            );
            error!("{msg}");
            return Err(FrrErr::Render(msg));
        }
        if self.entries.contains_key(&seq) {
            let msg = format!(
                "Duplicate prefix list seq {} in prefix list {}",
                seq, self.name
            );
            error!("{msg}");
            return Err(FrrErr::Render(msg));
        }
        self.entries.insert(seq, entry);
        Ok(())
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
impl PrefixListEntry {
    #[must_use]
    pub fn new(
        action: PrefixListAction,
        prefix: PrefixListPrefix,
        ge: Option<u8>,
        le: Option<u8>,
    ) -> Self {
        Self {
            action,
            prefix,
            ge,
            le,
        }
    }
    #[must_use]
    pub fn permit(prefix: &str) -> Self {
        Self::new(
            PrefixListAction::Permit,
            PrefixListPrefix::Prefix(prefix.to_owned()),
            None,
            None,
        )
    }
    #[must_use]
    pub fn deny_any() -> Self {
        Self::new(PrefixListAction::Deny, PrefixListPrefix::Any, None, None)
    }
    /// Tell if a `PrefixListEntry` can be added to a `PrefixList` depending on
    /// the prefix it contains (ipv4 of ipv6) and the `PrefixList` `IpVer` value
    #[must_use]
    pub fn is_version_compatible(&self, ipver: IpVer) -> bool {
        match &self.prefix {
            PrefixListPrefix::Prefix(prefix) => match ipver {
                IpVer::V4 => !prefix.contains(':'),
                IpVer::V6 => prefix.contains(':'),
            },
            PrefixListPrefix::Any => true,
        }
    }
}
impl PrefixListTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    pub fn add_prefix_list(&mut self, plist: PrefixList) {
        self.0.insert(plist.name.clone(), plist);
    }
    pub fn get(&self, name: &str) -> Option<&PrefixList> {
        self.0.get(name)
    }
    pub fn values(&self) -> impl Iterator<Item = &PrefixList> {
        self.0.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_list_rejects_bad_entries() {
        let mut plist = PrefixList::new("peer-pl-ipv4", IpVer::V4);
        plist
            .add_entry(5, PrefixListEntry::permit("192.0.2.0/24"))
            .expect("Should succeed");
        assert!(plist.add_entry(5, PrefixListEntry::deny_any()).is_err());
        assert!(
            plist
                .add_entry(10, PrefixListEntry::permit("2001:db8::/64"))
                .is_err()
        );
        plist
            .add_entry(10, PrefixListEntry::deny_any())
            .expect("Should succeed");
        assert_eq!(plist.entries.len(), 2);
    }
}
