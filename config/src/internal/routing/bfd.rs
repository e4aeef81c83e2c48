// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration model: BFD profiles

use serde::Serialize;

/// A named bundle of BFD parameters. Unset values mean the daemon default.
/// Intervals are in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BfdProfile {
    pub name: String,
    pub receive_interval: Option<u32>,
    pub transmit_interval: Option<u32>,
    pub detect_multiplier: Option<u32>,
    pub echo_interval: Option<u32>,
    pub echo_mode: bool,
    pub passive_mode: bool,
    pub minimum_ttl: Option<u32>,
}

impl BfdProfile {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn set_receive_interval(mut self, value: u32) -> Self {
        self.receive_interval = Some(value);
        self
    }
    #[must_use]
    pub fn set_transmit_interval(mut self, value: u32) -> Self {
        self.transmit_interval = Some(value);
        self
    }
    #[must_use]
    pub fn set_detect_multiplier(mut self, value: u32) -> Self {
        self.detect_multiplier = Some(value);
        self
    }
    #[must_use]
    pub fn set_echo_interval(mut self, value: u32) -> Self {
        self.echo_interval = Some(value);
        self
    }
    #[must_use]
    pub fn set_echo_mode(mut self, value: bool) -> Self {
        self.echo_mode = value;
        self
    }
    #[must_use]
    pub fn set_passive_mode(mut self, value: bool) -> Self {
        self.passive_mode = value;
        self
    }
    #[must_use]
    pub fn set_minimum_ttl(mut self, value: u32) -> Self {
        self.minimum_ttl = Some(value);
        self
    }
}
