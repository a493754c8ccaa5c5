// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-flatmap-pathways` to raise one crate to
//! debug level, and `--debug-all`.

use std::collections::BTreeSet;
use std::env;

use crate::KNOWN_CRATES;

/// Crates whose logs are raised to debug level
///
/// # Example
/// ```rust
/// use flatmap_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-flatmap-pathways".to_string()]);
/// assert!(flags.is_enabled("flatmap-pathways"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse `--debug-{crate-name}` and `--debug-all` arguments
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Flags for an explicit list of crate names, as found in configuration
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut flags = CrateDebugFlags::default();
        for name in names {
            if name == "all" {
                flags.enable_all();
            } else {
                flags.enable(name);
            }
        }
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        let crate_name = crate_name.trim();
        if !crate_name.is_empty() {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enabled_crates.insert(crate_name.to_string());
        }
    }

    /// Add every crate enabled in `other`
    pub fn merge(&mut self, other: &CrateDebugFlags) {
        self.enabled_crates
            .extend(other.enabled_crates.iter().cloned());
    }

    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn enabled_crates(&self) -> Vec<&String> {
        self.enabled_crates.iter().collect()
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives: each enabled crate at debug, everything else
    /// at `base_level`
    ///
    /// Tracing targets are module paths, so `flatmap-pathways` becomes
    /// `flatmap_pathways=debug`.
    pub fn to_filter_string(&self, base_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(base_level.to_lowercase());
        filters.join(",")
    }
}

/// Debug flags from the command line and the `FLATMAP_DEBUG` environment
/// variable (comma-separated crate names, or `all`)
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(env_var) = env::var("FLATMAP_DEBUG") {
        flags.merge(&CrateDebugFlags::from_names(env_var.split(',')));
    }
    flags
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  FLATMAP_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  FLATMAP_DEBUG=all                               Enable debug for all crates

Examples:
  --debug-flatmap-pathways
  FLATMAP_DEBUG=flatmap-pathways,flatmap-config
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-flatmap-pathways".to_string()]);
        assert!(flags.is_enabled("flatmap-pathways"));
        assert!(!flags.is_enabled("flatmap-config"));
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_from_names_skips_blanks() {
        let flags = CrateDebugFlags::from_names(" flatmap-config , ,flatmap".split(','));
        assert_eq!(flags.enabled_crates(), vec!["flatmap", "flatmap-config"]);
    }

    #[test]
    fn test_filter_string() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-flatmap-pathways".to_string()]);
        assert_eq!(flags.to_filter_string("WARN"), "flatmap_pathways=debug,warn");
        assert_eq!(CrateDebugFlags::default().to_filter_string("info"), "info");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-flatmap-pathways".to_string()]);
        assert_eq!(flags.log_level("flatmap-pathways"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("flatmap-config"), tracing::Level::INFO);
    }

    #[test]
    fn test_help_lists_crates() {
        assert!(debug_flags_help().contains("flatmap-pathways"));
    }
}
