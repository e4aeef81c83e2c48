// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! FRR drivers: the logic to drive FRR.
//! The configuration is rendered as a full FRR config file that an external reloader
//! picks up when signalled.

pub mod reload;
pub mod renderer;
