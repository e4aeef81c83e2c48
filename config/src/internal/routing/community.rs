// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: BGP communities

use crate::errors::ConfigError;
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

const LARGE_PREFIX: &str = "large:";

/// Well-known communities, accepted by name
const WELL_KNOWN: [&str; 7] = [
    "no-export",
    "no-advertise",
    "no-peer",
    "local-AS",
    "blackhole",
    "graceful-shutdown",
    "accept-own",
];

/// A validated BGP community, kept in its canonical textual form:
/// `AA:NN` or a well-known name for regular communities, `large:A:B:C` for large ones.
/// Communities compare and sort by that text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Community(String);

impl Community {
    #[must_use]
    pub fn is_large(&self) -> bool {
        self.0.starts_with(LARGE_PREFIX)
    }
    /// The community value as the daemon expects it in `set (large-)community`
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.strip_prefix(LARGE_PREFIX).unwrap_or(&self.0)
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn parse_fields<T: FromStr>(value: &str, expected: usize) -> Option<Vec<T>> {
    let fields: Vec<T> = value
        .split(':')
        .map(|f| f.parse::<T>().ok())
        .collect::<Option<Vec<_>>>()?;
    (fields.len() == expected).then_some(fields)
}

impl FromStr for Community {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ConfigError::InvalidCommunity(s.to_owned());
        if let Some(large) = s.strip_prefix(LARGE_PREFIX) {
            let fields = parse_fields::<u32>(large, 3).ok_or_else(invalid)?;
            return Ok(Self(format!(
                "{LARGE_PREFIX}{}:{}:{}",
                fields[0], fields[1], fields[2]
            )));
        }
        if let Some(name) = WELL_KNOWN.iter().find(|n| n.eq_ignore_ascii_case(s)) {
            return Ok(Self((*name).to_owned()));
        }
        let fields = parse_fields::<u16>(s, 2).ok_or_else(invalid)?;
        Ok(Self(format!("{}:{}", fields[0], fields[1])))
    }
}

impl Display for Community {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_community_parse() {
        let c = Community::from_str("10:100").expect("Should succeed");
        assert!(!c.is_large());
        assert_eq!(c.value(), "10:100");

        let c = Community::from_str("large:123:456:789").expect("Should succeed");
        assert!(c.is_large());
        assert_eq!(c.value(), "123:456:789");
        assert_eq!(c.to_string(), "large:123:456:789");

        let c = Community::from_str("NO-EXPORT").expect("Should succeed");
        assert_eq!(c.as_str(), "no-export");

        /* leading zeroes are normalized away */
        let c = Community::from_str("010:0100").expect("Should succeed");
        assert_eq!(c.as_str(), "10:100");
    }

    #[test]
    fn test_community_parse_errors() {
        for bad in ["", "10", "10:", "70000:1", "1:2:3", "large:1:2", "large:1:2:x"] {
            assert_eq!(
                Community::from_str(bad),
                Err(ConfigError::InvalidCommunity(bad.to_string())),
                "'{bad}' should be rejected"
            );
        }
    }
}
