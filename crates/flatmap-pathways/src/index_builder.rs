// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
IndexBuilder - inverts the sparse pathway description into lookup tables.

Runs once per loaded map. Every reverse index is produced by inversion:
for each forward `(key, values)` entry the key is inserted into a set keyed
by each value, so duplicate pairs collapse and missing optional fields
simply contribute nothing.

Path type assignment happens here and only here:

1. Known types, in `PATH_TYPES` order. A path listed under two known types
   keeps the first.
2. Unrecognised `type-paths` keys (sorted), folded into `"other"`.
3. The descriptor's own `type` for paths no bucket mentions, defaulting to
   `"other"`.
*/

use ahash::AHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::hash::Hash;
use tracing::{debug, trace};

use crate::data::{Annotations, PathwaysData};
use crate::options::PathwaysOptions;
use crate::path_types::{is_known_path_type, PATH_TYPES};
use crate::types::{CentrelineId, FeatureId, FeatureSet, ModelId, PathId, PathType};

/// Per-path record, created once from the input data
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Path {
    pub id: PathId,
    pub path_type: PathType,
    /// Source type folded into `"other"` because it is not a known type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unrecognised_type: Option<String>,
    pub lines: Vec<FeatureId>,
    pub nodes: Vec<FeatureId>,
    pub nerves: Vec<FeatureId>,
    pub centrelines: Vec<CentrelineId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity_model: Option<ModelId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_model: Option<ModelId>,
}

impl Path {
    /// Full visual footprint: lines, nodes and nerves
    pub fn feature_ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.lines
            .iter()
            .chain(self.nodes.iter())
            .chain(self.nerves.iter())
            .copied()
    }
}

/// Lookup tables derived from the pathway description
///
/// Never mutated after [`IndexBuilder::build`] returns.
#[derive(Debug, Clone, Default)]
pub struct PathIndices {
    pub(crate) paths: AHashMap<PathId, Path>,
    pub(crate) type_paths: AHashMap<PathType, Vec<PathId>>,
    pub(crate) unrecognised_types: BTreeMap<String, Vec<PathId>>,
    pub(crate) line_paths: AHashMap<FeatureId, BTreeSet<PathId>>,
    pub(crate) node_paths: AHashMap<FeatureId, BTreeSet<PathId>>,
    pub(crate) nerve_paths: AHashMap<FeatureId, BTreeSet<PathId>>,
    pub(crate) centreline_paths: AHashMap<CentrelineId, BTreeSet<PathId>>,
    pub(crate) centreline_lines: AHashMap<CentrelineId, FeatureSet>,
    pub(crate) centreline_labels: BTreeMap<CentrelineId, String>,
    pub(crate) uncentred_paths: BTreeSet<PathId>,
    pub(crate) connectivity_model_paths: AHashMap<ModelId, Vec<PathId>>,
    pub(crate) path_model_paths: AHashMap<ModelId, Vec<PathId>>,
    pub(crate) path_connectivity_model: AHashMap<PathId, ModelId>,
    pub(crate) path_path_model: AHashMap<PathId, ModelId>,
}

/// Builds [`PathIndices`] from map-build metadata
pub struct IndexBuilder<'a> {
    data: &'a PathwaysData,
    annotations: &'a Annotations,
    options: &'a PathwaysOptions,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(
        data: &'a PathwaysData,
        annotations: &'a Annotations,
        options: &'a PathwaysOptions,
    ) -> Self {
        Self {
            data,
            annotations,
            options,
        }
    }

    pub fn build(&self) -> PathIndices {
        let mut indices = PathIndices::default();
        let mut assigned = self.assign_path_types(&mut indices.unrecognised_types);

        // Connectivity models, visited in id order so the owner of a path
        // listed by two models is deterministic (the last one wins)
        let mut model_ids: Vec<&ModelId> = self.data.models.keys().collect();
        model_ids.sort();
        for model_id in model_ids {
            for path_id in &self.data.models[model_id].paths {
                if !self.data.paths.contains_key(path_id) {
                    trace!("Connectivity model {} lists unknown path {}", model_id, path_id);
                    continue;
                }
                indices
                    .connectivity_model_paths
                    .entry(model_id.clone())
                    .or_default()
                    .push(path_id.clone());
                indices
                    .path_connectivity_model
                    .insert(path_id.clone(), model_id.clone());
            }
        }

        for (path_id, descriptor) in &self.data.paths {
            let (path_type, unrecognised_type) = assigned
                .remove(path_id)
                .unwrap_or_else(|| (PathType::other(), None));
            if let Some(model_id) = &descriptor.models {
                indices
                    .path_model_paths
                    .entry(model_id.clone())
                    .or_default()
                    .push(path_id.clone());
                indices
                    .path_path_model
                    .insert(path_id.clone(), model_id.clone());
            }
            indices
                .type_paths
                .entry(path_type.clone())
                .or_default()
                .push(path_id.clone());
            let path = Path {
                id: path_id.clone(),
                path_type,
                unrecognised_type,
                lines: descriptor.lines.clone(),
                nodes: descriptor.nodes.clone(),
                nerves: descriptor.nerves.clone(),
                centrelines: descriptor.centrelines.clone(),
                connectivity_model: indices.path_connectivity_model.get(path_id).cloned(),
                path_model: descriptor.models.clone(),
            };
            indices.paths.insert(path_id.clone(), path);
        }

        indices.line_paths = invert(indices.paths.values().map(|p| (&p.id, p.lines.iter().copied())));
        indices.nerve_paths = invert(indices.paths.values().map(|p| (&p.id, p.nerves.iter().copied())));
        indices.node_paths = invert(indices.paths.values().map(|p| (&p.id, p.nodes.iter().copied())));
        for (node_id, path_ids) in &self.data.node_paths {
            for path_id in path_ids {
                if indices.paths.contains_key(path_id) {
                    indices
                        .node_paths
                        .entry(*node_id)
                        .or_default()
                        .insert(path_id.clone());
                }
            }
        }
        indices.centreline_paths = invert(
            indices
                .paths
                .values()
                .map(|p| (&p.id, p.centrelines.iter().cloned())),
        );
        indices.uncentred_paths = indices
            .paths
            .values()
            .filter(|p| p.centrelines.is_empty() && !p.path_type.is_centreline())
            .map(|p| p.id.clone())
            .collect();

        for ids in indices
            .type_paths
            .values_mut()
            .chain(indices.unrecognised_types.values_mut())
            .chain(indices.connectivity_model_paths.values_mut())
            .chain(indices.path_model_paths.values_mut())
        {
            ids.sort();
            ids.dedup();
        }

        self.collect_centrelines(&mut indices);

        debug!(
            "Built pathway indices: {} paths, {} types, {} centrelines, {} connectivity models",
            indices.paths.len(),
            indices.type_paths.len(),
            indices.centreline_paths.len(),
            indices.connectivity_model_paths.len()
        );
        indices
    }

    fn assign_path_types(
        &self,
        unrecognised: &mut BTreeMap<String, Vec<PathId>>,
    ) -> AHashMap<PathId, (PathType, Option<String>)> {
        let mut assigned: AHashMap<PathId, (PathType, Option<String>)> = AHashMap::new();

        for template in PATH_TYPES {
            let Some(path_ids) = self.data.type_paths.get(template.kind) else {
                continue;
            };
            for path_id in path_ids {
                if self.data.paths.contains_key(path_id) {
                    assigned
                        .entry(path_id.clone())
                        .or_insert_with(|| (PathType::new(template.kind), None));
                }
            }
        }

        let mut unknown_types: Vec<&String> = self
            .data
            .type_paths
            .keys()
            .filter(|kind| !is_known_path_type(kind))
            .collect();
        unknown_types.sort();
        for kind in unknown_types {
            for path_id in &self.data.type_paths[kind] {
                if self.data.paths.contains_key(path_id) && !assigned.contains_key(path_id) {
                    debug!("Path {} has unrecognised type {}, using \"other\"", path_id, kind);
                    assigned.insert(path_id.clone(), (PathType::other(), Some(kind.clone())));
                    unrecognised
                        .entry(kind.clone())
                        .or_default()
                        .push(path_id.clone());
                }
            }
        }

        for (path_id, descriptor) in &self.data.paths {
            if assigned.contains_key(path_id) {
                continue;
            }
            let entry = match descriptor.path_type.as_deref() {
                Some(kind) if is_known_path_type(kind) => (PathType::new(kind), None),
                Some(kind) => {
                    unrecognised
                        .entry(kind.to_string())
                        .or_default()
                        .push(path_id.clone());
                    (PathType::other(), Some(kind.to_string()))
                }
                None => (PathType::other(), None),
            };
            assigned.insert(path_id.clone(), entry);
        }

        assigned
    }

    /// Collect labels and own geometry of nerve centrelines
    ///
    /// A centreline path's line annotation names the centreline (`models`)
    /// and its label. It is recorded when the map is drawn in centreline
    /// style or when some path already references that centreline.
    fn collect_centrelines(&self, indices: &mut PathIndices) {
        let Some(centreline_path_ids) = indices.type_paths.get(&PathType::centreline()) else {
            return;
        };
        for path_id in centreline_path_ids {
            let path = &indices.paths[path_id];
            for &line_id in &path.lines {
                let (centreline_id, label) = match self.annotations.get(line_id) {
                    Some(annotation) => (
                        annotation.models.clone().unwrap_or_else(|| path_id.clone()),
                        annotation.label.clone().or_else(|| annotation.name.clone()),
                    ),
                    None => (path_id.clone(), None),
                };
                if !self.options.centreline_style
                    && !indices.centreline_paths.contains_key(&centreline_id)
                {
                    continue;
                }
                let label = label.unwrap_or_else(|| centreline_id.clone());
                indices
                    .centreline_labels
                    .entry(centreline_id.clone())
                    .or_insert(label);
                indices
                    .centreline_lines
                    .entry(centreline_id)
                    .or_default()
                    .insert(line_id);
            }
        }
    }
}

/// Invert a forward `key -> values` mapping into `value -> {keys}`
fn invert<'k, V, I>(forward: impl IntoIterator<Item = (&'k PathId, I)>) -> AHashMap<V, BTreeSet<PathId>>
where
    V: Eq + Hash,
    I: IntoIterator<Item = V>,
{
    let mut reverse: AHashMap<V, BTreeSet<PathId>> = AHashMap::new();
    for (key, values) in forward {
        for value in values {
            reverse.entry(value).or_default().insert(key.clone());
        }
    }
    reverse
}
