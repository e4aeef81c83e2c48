// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Canonical routing configuration model

pub mod bfd;
pub mod bgp;
pub mod community;
