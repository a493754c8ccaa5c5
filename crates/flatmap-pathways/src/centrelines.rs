// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Nerve centreline controls
//!
//! Centreline views are mutually exclusive, so no counting is kept here:
//! each request goes straight to the renderer with the caller's `force`.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::path_manager::PathManager;
use crate::renderer::FeatureRenderer;
use crate::types::{CentrelineId, FeatureSet, PathChange, PathId};

/// Id of the pseudo-centreline grouping paths with no associated nerve
pub const NO_NERVES_ID: &str = "no-nerves";

/// Label of the [`NO_NERVES_ID`] entry
pub const NO_NERVES_LABEL: &str = "No associated nerves";

/// One entry of the centreline selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CentrelineDetails {
    pub id: CentrelineId,
    pub label: String,
}

#[derive(Debug, Clone, Default)]
pub struct CentrelineController {
    details: Vec<CentrelineDetails>,
    enabled: BTreeSet<CentrelineId>,
}

impl CentrelineController {
    pub fn new(paths: &PathManager) -> Self {
        let mut details: Vec<CentrelineDetails> = paths
            .registry()
            .centrelines()
            .into_iter()
            .map(|(id, label)| CentrelineDetails { id, label })
            .collect();
        details.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));
        details.insert(
            0,
            CentrelineDetails {
                id: NO_NERVES_ID.to_string(),
                label: NO_NERVES_LABEL.to_string(),
            },
        );
        debug!("{} nerve centrelines", details.len() - 1);
        Self {
            details,
            enabled: BTreeSet::new(),
        }
    }

    /// The sentinel entry followed by real centrelines sorted by label
    pub fn nerve_centreline_details(&self) -> &[CentrelineDetails] {
        &self.details
    }

    pub fn is_known(&self, centreline_id: &str) -> bool {
        self.details.iter().any(|d| d.id == centreline_id)
    }

    /// Centrelines whose paths were last enabled
    pub fn enabled_centrelines(&self) -> &BTreeSet<CentrelineId> {
        &self.enabled
    }

    /// Show or hide the paths that follow a centreline, with the
    /// centreline's own lines. Unknown ids are ignored.
    pub fn enable_paths_by_centreline(
        &mut self,
        centreline_id: &str,
        enable: bool,
        force: bool,
        paths: &PathManager,
        renderer: &mut dyn FeatureRenderer,
    ) -> bool {
        let registry = paths.registry();
        let (path_ids, own_lines): (Vec<&PathId>, Option<&FeatureSet>) =
            if centreline_id == NO_NERVES_ID {
                (registry.uncentred_paths().iter().collect(), None)
            } else if self.is_known(centreline_id) {
                (
                    registry
                        .centreline_paths(centreline_id)
                        .map(|ids| ids.iter().collect())
                        .unwrap_or_default(),
                    registry.centreline_lines(centreline_id),
                )
            } else {
                trace!("Ignoring unknown centreline {}", centreline_id);
                return false;
            };

        let mut feature_ids = registry.paths_feature_ids(path_ids.iter().copied());
        if let Some(lines) = own_lines {
            feature_ids.extend(lines.iter().copied());
        }
        debug!(
            "{} centreline {}: {} paths, {} features",
            if enable { "Enabling" } else { "Disabling" },
            centreline_id,
            path_ids.len(),
            feature_ids.len()
        );
        for feature_id in feature_ids {
            renderer.enable_feature(feature_id, enable, force);
        }

        if enable {
            self.enabled.insert(centreline_id.to_string());
        } else {
            self.enabled.remove(centreline_id);
        }
        paths.notify_watchers(&PathChange::Centreline {
            id: centreline_id.to_string(),
            enabled: enable,
        });
        true
    }
}
