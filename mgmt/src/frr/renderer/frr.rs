// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Config renderer: frr global settings

use crate::frr::renderer::builder::{ConfigBuilder, MARKER, Render};
use config::internal::{Config, LogLevel};

pub const FRR_LOG_FILE: &str = "/etc/frr/frr.log";

/// The header of the config: profile, host name and logging
pub(crate) struct FrrGlobals<'a> {
    pub hostname: &'a str,
    pub loglevel: LogLevel,
}
impl<'a> From<&'a Config> for FrrGlobals<'a> {
    fn from(config: &'a Config) -> Self {
        Self {
            hostname: &config.hostname,
            loglevel: config.loglevel,
        }
    }
}

fn render_debugs() -> ConfigBuilder {
    let mut cfg = ConfigBuilder::new();
    cfg += "debug zebra events";
    cfg += "debug zebra nht";
    cfg += "debug bgp neighbor-events";
    cfg += "debug bgp updates";
    cfg += "debug bgp nht";
    cfg += "debug bfd peer";
    cfg
}

/* impl Render */
impl Render for FrrGlobals<'_> {
    type Context = ();
    type Output = ConfigBuilder;
    fn render(&self, _: &Self::Context) -> Self::Output {
        let mut cfg = ConfigBuilder::new();
        cfg += "frr defaults traditional";
        if !self.hostname.is_empty() {
            cfg += format!("hostname {}", self.hostname);
        }
        cfg += format!("log file {FRR_LOG_FILE} {}", self.loglevel.frr_level());
        cfg += "log timestamp precision 3";
        if self.loglevel.is_debug() {
            cfg += render_debugs();
        }
        cfg += "ip nht resolve-via-default";
        cfg += "ipv6 nht resolve-via-default";
        cfg += MARKER;
        cfg
    }
}
