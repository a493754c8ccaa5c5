// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # flatmap-observability
//!
//! Logging infrastructure shared by the flatmap crates, with per-crate debug
//! flag support.
//!
//! ## Features
//! - `file-logging`: JSON log files in timestamped run folders with retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known flatmap crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "flatmap",
    "flatmap-config",
    "flatmap-observability",
    "flatmap-pathways",
];
