// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! External configuration model. This is the model in which desired state is authored:
//! a set of independently written [`Fragment`]s, possibly overlapping, which get normalized
//! and merged into a single internal [`crate::internal::Config`].

pub mod fragment;

pub use fragment::*; // re-export
