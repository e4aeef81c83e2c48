// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configuration models for the BGP configuration agent. The external model is the model of the
//! configuration fragments, as authored. The internal model is the canonical configuration that
//! the agent renders and pushes to the routing daemon. For the full set of current fragments,
//! the agent converts each fragment into a partial internal configuration and merges them all
//! into a single [`Config`], rejecting any set of fragments that contradict each other.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod confbuild;
pub mod converters;
pub mod errors;
pub mod external;
pub mod internal;
pub mod merge;

pub use confbuild::build_config; // re-export
pub use converters::ConversionParams; // re-export
pub use errors::{ConfigError, ConfigResult, stringify}; // re-export
pub use external::Fragment; // re-export
pub use internal::{Config, LogLevel}; // re-export
