// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! BGP configuration agent management module: rendering of the canonical configuration for FRR,
//! debounced application with retries, and feedback from the FRR reloader status.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

/* Frr drivers */
pub mod frr;

/* Policy objects generated for FRR */
pub mod models;

/* Configuration processor */
pub mod processor;
