// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Internal (canonical) configuration model.
//! Any set of fragments gets normalized and merged into a single [`Config`], which is the
//! only thing that gets rendered and pushed to the routing daemon. A [`Config`] is a plain
//! value: all of its collections are kept sorted so that two logically equivalent configs
//! compare equal and render identically.

pub mod family;
pub mod routing;

use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;

pub use family::IpFamily;
pub use routing::bfd::BfdProfile;
pub use routing::bgp::{
    AllowedIn, AllowedOut, IncomingFilter, NeighborConfig, OutgoingFilter, RouterConfig,
};
pub use routing::community::Community;

/// Verbosity of the agent, which is also the verbosity we ask the routing daemon to log with
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    All,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    None,
}
impl LogLevel {
    /// The daemon's name for this level
    #[must_use]
    pub fn frr_level(&self) -> &'static str {
        match self {
            LogLevel::All | LogLevel::Debug => "debugging",
            LogLevel::Info => "informational",
            LogLevel::Warn => "warnings",
            LogLevel::Error => "errors",
            LogLevel::None => "emergencies",
        }
    }
    /// Tell if the daemon should have its debugs turned on
    #[must_use]
    pub fn is_debug(&self) -> bool {
        matches!(self, LogLevel::All | LogLevel::Debug)
    }
}
impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(LogLevel::All),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "none" => Ok(LogLevel::None),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}
impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogLevel::All => "all",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::None => "none",
        };
        write!(f, "{s}")
    }
}

/// The canonical configuration: the merge of all fragments, ready to be rendered
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Config {
    pub hostname: String,
    pub loglevel: LogLevel,
    pub routers: Vec<RouterConfig>,
    pub bfd_profiles: Vec<BfdProfile>,
    pub extra_config: String,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn set_hostname(mut self, hostname: &str) -> Self {
        self.hostname = hostname.to_owned();
        self
    }
    #[must_use]
    pub fn set_loglevel(mut self, loglevel: LogLevel) -> Self {
        self.loglevel = loglevel;
        self
    }
    /// Look up the router of some vrf. The default vrf is the empty string.
    #[must_use]
    pub fn get_router(&self, vrf: &str) -> Option<&RouterConfig> {
        self.routers.iter().find(|r| r.vrf == vrf)
    }
    #[must_use]
    pub fn get_bfd_profile(&self, name: &str) -> Option<&BfdProfile> {
        self.bfd_profiles.iter().find(|p| p.name == name)
    }
    pub fn neighbors(&self) -> impl Iterator<Item = &NeighborConfig> {
        self.routers.iter().flat_map(|r| r.neighbors.iter())
    }
    /// Dump this config as JSON, for troubleshooting
    #[must_use]
    pub fn as_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loglevel_mapping() {
        assert_eq!(LogLevel::from_str("DEBUG"), Ok(LogLevel::Debug));
        assert_eq!(LogLevel::Debug.frr_level(), "debugging");
        assert_eq!(LogLevel::Warn.frr_level(), "warnings");
        assert_eq!(LogLevel::None.frr_level(), "emergencies");
        assert!(LogLevel::All.is_debug());
        assert!(!LogLevel::Info.is_debug());
        assert!(LogLevel::from_str("verbose").is_err());
        assert_eq!(LogLevel::default().to_string(), "info");
    }
}
