// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Policy objects (prefix lists and route maps) that implement the neighbor policies of a
//! canonical config in FRR, and the logic to derive them.

pub mod namegen;
pub mod policy;
pub mod prefixlist;
pub mod routemap;
