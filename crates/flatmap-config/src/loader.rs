// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Configuration is resolved in three tiers, later tiers winning:
//! 1. TOML file
//! 2. Environment variables
//! 3. CLI arguments

use crate::validation::validate_config;
use crate::{ConfigError, ConfigResult, FlatmapConfig, CONFIG_FILE_NAME};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Find the flatmap configuration file
///
/// Search order:
/// 1. `FLATMAP_CONFIG_PATH` environment variable
/// 2. Current working directory
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("FLATMAP_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by FLATMAP_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            let Some(parent) = current.parent() else {
                break;
            };
            search_paths.push(parent.join(CONFIG_FILE_NAME));
            current = parent;
        }
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "Configuration file '{}' not found in any of these locations:\n{}\n\nSet FLATMAP_CONFIG_PATH environment variable to specify custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load, override and validate the configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found, contains invalid TOML, carries an
/// unparsable override, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<FlatmapConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: FlatmapConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    validate_config(&config)?;
    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `FLATMAP_SYSTEMS_ENABLED` -> `pathways.systems_enabled_by_default`
/// - `FLATMAP_CENTRELINE_STYLE` -> `pathways.centreline_style`
/// - `FLATMAP_LOG_LEVEL` -> `logging.level`
pub fn apply_environment_overrides(config: &mut FlatmapConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("FLATMAP_SYSTEMS_ENABLED") {
        config.pathways.systems_enabled_by_default = parse_flag("FLATMAP_SYSTEMS_ENABLED", &value)?;
    }
    if let Ok(value) = env::var("FLATMAP_CENTRELINE_STYLE") {
        config.pathways.centreline_style = parse_flag("FLATMAP_CENTRELINE_STYLE", &value)?;
    }
    if let Ok(value) = env::var("FLATMAP_LOG_LEVEL") {
        config.logging.level = value;
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// Recognised keys: `systems_enabled`, `centreline_style`, `log_level`.
pub fn apply_cli_overrides(
    config: &mut FlatmapConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("systems_enabled") {
        config.pathways.systems_enabled_by_default = parse_flag("systems_enabled", value)?;
    }
    if let Some(value) = cli_args.get("centreline_style") {
        config.pathways.centreline_style = parse_flag("centreline_style", value)?;
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}

fn parse_flag(name: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(format!(
            "{} must be a boolean, got '{}'",
            name, value
        ))),
    }
}
