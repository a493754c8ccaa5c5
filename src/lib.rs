// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Flatmap
//!
//! Connectivity pathway visibility for anatomical flatmaps.
//!
//! This crate re-exports the workspace members and wires configuration into
//! the pathways engine.
//!
//! ## Feature Flags
//!
//! - **`config`** (default): TOML configuration with environment and CLI overrides
//! - **`observability`** (default): console logging with per-crate debug flags
//! - **`file-logging`**: JSON log files in timestamped run folders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use flatmap::prelude::*;
//!
//! let config = flatmap::config::load_config(None, None)?;
//! let metadata = MapMetadata::from_file(std::path::Path::new("map/metadata.json"))?;
//! let mut pathways = metadata.into_pathways(&pathways_options(&config), RecordingRenderer::new());
//!
//! for system in pathways.systems() {
//!     pathways.enable_system(&system.id, true);
//! }
//! # Ok::<(), flatmap::FlatmapError>(())
//! ```

use std::path::Path;

use tracing::info;

pub use flatmap_pathways as pathways;

#[cfg(feature = "config")]
pub use flatmap_config as config;

#[cfg(feature = "observability")]
pub use flatmap_observability as observability;

use flatmap_pathways::{
    Annotations, FeatureRenderer, FlatmapPathways, PathwaysData, PathwaysError, PathwaysOptions,
};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Errors surfaced while loading a map or its configuration
#[derive(Debug, thiserror::Error)]
pub enum FlatmapError {
    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] flatmap_config::ConfigError),

    #[error(transparent)]
    Pathways(#[from] PathwaysError),

    #[error("Invalid map metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "observability")]
    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

pub type FlatmapResult<T> = Result<T, FlatmapError>;

/// The two documents of a map build that drive pathways
///
/// Map metadata carries them as the `pathways` and `annotations` members of
/// one JSON object; either may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapMetadata {
    pub pathways: PathwaysData,
    pub annotations: Annotations,
}

impl MapMetadata {
    pub fn from_json(json: &str) -> FlatmapResult<Self> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let mut take = |key: &str| {
            document
                .get_mut(key)
                .map(serde_json::Value::take)
                .unwrap_or(serde_json::Value::Null)
        };
        let pathways = match take("pathways") {
            serde_json::Value::Null => PathwaysData::default(),
            value => serde_json::from_value(value)?,
        };
        let annotations = match take("annotations") {
            serde_json::Value::Null => Annotations::default(),
            value => serde_json::from_value(value)?,
        };
        Ok(Self {
            pathways,
            annotations,
        })
    }

    pub fn from_file(path: &Path) -> FlatmapResult<Self> {
        let content = std::fs::read_to_string(path).map_err(PathwaysError::from)?;
        let metadata = Self::from_json(&content)?;
        info!(
            "Loaded map metadata from {}: {} paths, {} annotated features",
            path.display(),
            metadata.pathways.paths.len(),
            metadata.annotations.len()
        );
        Ok(metadata)
    }

    /// Build the pathways state of this map
    pub fn into_pathways<R: FeatureRenderer>(
        self,
        options: &PathwaysOptions,
        renderer: R,
    ) -> FlatmapPathways<R> {
        FlatmapPathways::new(&self.pathways, &self.annotations, options, renderer)
    }
}

/// Pathways construction options from the loaded configuration
#[cfg(feature = "config")]
pub fn pathways_options(config: &flatmap_config::FlatmapConfig) -> PathwaysOptions {
    PathwaysOptions {
        systems_enabled_by_default: config.pathways.systems_enabled_by_default,
        centreline_style: config.pathways.centreline_style,
    }
}

/// Console logging from the configured level, configured debug crates, and
/// the command line and `FLATMAP_DEBUG` debug flags
#[cfg(all(feature = "config", feature = "observability"))]
pub fn init_console_logging(config: &flatmap_config::FlatmapConfig) -> FlatmapResult<()> {
    use flatmap_observability::{parse_debug_flags, CrateDebugFlags, LoggingConfig};

    let mut flags = parse_debug_flags();
    flags.merge(&CrateDebugFlags::from_names(
        config.logging.debug_crates.iter().map(String::as_str),
    ));
    flatmap_observability::init_console_logging(
        &flags,
        &LoggingConfig::with_level(config.logging.level.clone()),
    )
    .map_err(|e| FlatmapError::Logging(format!("{:#}", e)))
}

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::{FlatmapError, FlatmapResult, MapMetadata};
    pub use flatmap_pathways::{
        Annotations, CentrelineDetails, FeatureId, FeatureRenderer, FlatmapPathways, MapFeature,
        PathChange, PathId, PathTypeInfo, PathwaysData, PathwaysOptions, RecordingRenderer,
        SystemSummary, WatcherId,
    };

    #[cfg(feature = "config")]
    pub use crate::pathways_options;
    #[cfg(feature = "config")]
    pub use flatmap_config::{load_config, FlatmapConfig};

    #[cfg(feature = "observability")]
    pub use flatmap_observability::{parse_debug_flags, CrateDebugFlags};
}
