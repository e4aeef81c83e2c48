// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Builds the canonical [`Config`] out of the full current set of fragments

use tracing::{debug, info};

use crate::converters::{ConversionParams, convert_fragment};
use crate::errors::ConfigResult;
use crate::external::Fragment;
use crate::internal::Config;
use crate::merge::{check_bfd_profiles, merge_configs};

/// Concatenate the raw configuration snippets of the fragments, by ascending priority and then
/// by fragment name.
fn build_extra_config(fragments: &[Fragment]) -> String {
    let mut raws: Vec<_> = fragments
        .iter()
        .filter_map(|f| f.raw.as_ref().map(|raw| (raw.priority, f.name.as_str(), raw)))
        .filter(|(_, _, raw)| !raw.config.is_empty())
        .collect();
    raws.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    raws.iter()
        .map(|(_, _, raw)| raw.config.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Normalize and merge a set of fragments into a [`Config`]. The resulting config is a pure
/// function of the set of fragments and parameters: the order of the fragments is irrelevant.
pub fn build_config(fragments: &[Fragment], params: &ConversionParams) -> ConfigResult<Config> {
    debug!("Building config out of {} fragments...", fragments.len());
    let partials = fragments
        .iter()
        .map(|f| convert_fragment(f, params))
        .collect::<ConfigResult<Vec<_>>>()?;

    let mut config = merge_configs(partials)?;
    check_bfd_profiles(&config)?;

    config.extra_config = build_extra_config(fragments);
    config.hostname.clone_from(&params.hostname);
    config.loglevel = params.loglevel;

    info!(
        "Built config with {} routers and {} BFD profiles",
        config.routers.len(),
        config.bfd_profiles.len()
    );
    debug!("Resulting config:\n{}", config.as_json());
    Ok(config)
}
