// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Converters from the external (authored) model to the internal (canonical) one

#![allow(clippy::collapsible_if)]

mod fragment;

pub use fragment::*;
