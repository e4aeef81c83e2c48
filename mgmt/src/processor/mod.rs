// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration processor.
//! Fragments are turned into configs that a scheduler applies to FRR, while the status that
//! FRR reports is fed back to the scheduler.

pub mod debouncer;
pub mod launch;
pub mod proc;
pub mod status;
