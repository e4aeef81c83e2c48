// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! FRR config renderer. Rendering is deterministic: the same [`Config`] always yields the
//! same text.

pub mod bfd;
pub mod bgp;
pub mod builder;
pub mod frr;
pub mod prefixlist;
pub mod routemap;

use crate::frr::reload::FrrErr;
use crate::frr::renderer::builder::{ConfigBuilder, Counter, MARKER, Render};
use crate::frr::renderer::frr::FrrGlobals;
use crate::models::policy::build_policies;
use config::Config;
use tracing::debug;

/// Render a [`Config`] as an FRR config file
pub fn render_config(config: &Config) -> Result<String, FrrErr> {
    let mut counter = Counter::new();
    let policies = build_policies(config, &mut counter)?;

    let mut cfg = ConfigBuilder::new();

    /* global settings */
    cfg += FrrGlobals::from(config).render(&());

    /* bfd profiles */
    cfg += config.bfd_profiles.render(&());

    /* bgp instances */
    cfg += config.routers.render(&());

    /* prefix lists */
    cfg += policies.plists.render(&());

    /* route maps */
    cfg += policies.rmaps.render(&());

    /* raw configuration goes last */
    if !config.extra_config.is_empty() {
        cfg += config.extra_config.clone();
        cfg += MARKER;
    }

    let rendered = cfg.to_string();
    debug!("FRR configuration is:\n{rendered}");
    Ok(rendered)
}
