// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
PathRegistry - read-only lookups over the built pathway indices.

Every feature query expands the matching paths to their full footprint
(lines, nodes and nerves): toggling one line of a path toggles the whole
path. Results are ordered sets, so a feature shared by several paths is
reported once.
*/

use std::collections::BTreeSet;

use crate::data::Properties;
use crate::index_builder::{Path, PathIndices};
use crate::types::{CentrelineId, FeatureId, FeatureSet, ModelId, PathId, PathType};

/// Owns the per-path records and reverse indices of one map
#[derive(Debug, Clone, Default)]
pub struct PathRegistry {
    indices: PathIndices,
}

impl PathRegistry {
    pub fn new(indices: PathIndices) -> Self {
        Self { indices }
    }

    pub fn path(&self, path_id: &str) -> Option<&Path> {
        self.indices.paths.get(path_id)
    }

    /// All path ids, sorted
    pub fn path_ids(&self) -> Vec<&PathId> {
        let mut ids: Vec<&PathId> = self.indices.paths.keys().collect();
        ids.sort();
        ids
    }

    pub fn path_count(&self) -> usize {
        self.indices.paths.len()
    }

    /// Every feature referenced by any path
    pub fn all_feature_ids(&self) -> FeatureSet {
        self.indices
            .paths
            .values()
            .flat_map(|path| path.feature_ids())
            .collect()
    }

    /// Footprint of the given paths; unknown path ids contribute nothing
    pub fn paths_feature_ids<'a, I>(&self, path_ids: I) -> FeatureSet
    where
        I: IntoIterator<Item = &'a PathId>,
    {
        let mut feature_ids = FeatureSet::new();
        for path_id in path_ids {
            if let Some(path) = self.indices.paths.get(path_id) {
                feature_ids.extend(path.feature_ids());
            }
        }
        feature_ids
    }

    /// Footprint of every path that uses any of the given lines
    pub fn line_feature_ids<I>(&self, line_ids: I) -> FeatureSet
    where
        I: IntoIterator<Item = FeatureId>,
    {
        let mut path_ids: BTreeSet<&PathId> = BTreeSet::new();
        for line_id in line_ids {
            if let Some(paths) = self.indices.line_paths.get(&line_id) {
                path_ids.extend(paths.iter());
            }
        }
        self.paths_feature_ids(path_ids)
    }

    /// Footprint of every path that runs through the given nerve
    pub fn nerve_feature_ids(&self, nerve_id: FeatureId) -> FeatureSet {
        match self.indices.nerve_paths.get(&nerve_id) {
            Some(paths) => self.paths_feature_ids(paths),
            None => FeatureSet::new(),
        }
    }

    /// Footprint of every path that touches the given node
    pub fn path_feature_ids(&self, node_id: FeatureId) -> FeatureSet {
        match self.indices.node_paths.get(&node_id) {
            Some(paths) => self.paths_feature_ids(paths),
            None => FeatureSet::new(),
        }
    }

    pub fn connectivity_model_feature_ids(&self, model_id: &str) -> FeatureSet {
        match self.indices.connectivity_model_paths.get(model_id) {
            Some(paths) => self.paths_feature_ids(paths),
            None => FeatureSet::new(),
        }
    }

    pub fn path_model_feature_ids(&self, model_id: &str) -> FeatureSet {
        match self.indices.path_model_paths.get(model_id) {
            Some(paths) => self.paths_feature_ids(paths),
            None => FeatureSet::new(),
        }
    }

    /// Path models reachable from the paths that touch a node
    pub fn node_path_models(&self, node_id: FeatureId) -> BTreeSet<ModelId> {
        let Some(paths) = self.indices.node_paths.get(&node_id) else {
            return BTreeSet::new();
        };
        paths
            .iter()
            .filter_map(|path_id| self.indices.path_path_model.get(path_id))
            .cloned()
            .collect()
    }

    /// Nodes reachable from the paths of a path model
    pub fn path_model_nodes(&self, model_id: &str) -> FeatureSet {
        let Some(paths) = self.indices.path_model_paths.get(model_id) else {
            return FeatureSet::new();
        };
        paths
            .iter()
            .filter_map(|path_id| self.indices.paths.get(path_id))
            .flat_map(|path| path.nodes.iter().copied())
            .collect()
    }

    /// Augment a line's display properties with its path's models
    ///
    /// Adds `connectivity` (connectivity-model id) and `models` (path-model
    /// id) from the path owning the line. When several paths share the line
    /// the lowest path id is used.
    pub fn path_properties(&self, feature_id: FeatureId, properties: &Properties) -> Properties {
        let mut augmented = properties.clone();
        let owner = self
            .indices
            .line_paths
            .get(&feature_id)
            .and_then(|paths| paths.iter().next());
        if let Some(path_id) = owner {
            if let Some(model_id) = self.indices.path_connectivity_model.get(path_id) {
                augmented.insert("connectivity".to_string(), model_id.clone().into());
            }
            if let Some(model_id) = self.indices.path_path_model.get(path_id) {
                augmented.insert("models".to_string(), model_id.clone().into());
            }
        }
        augmented
    }

    /// Paths of a canonical type, sorted; empty for unknown types
    pub fn type_paths(&self, path_type: &str) -> &[PathId] {
        self.indices
            .type_paths
            .get(&PathType::new(path_type))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Unrecognised source types folded into `"other"`
    pub fn unrecognised_types(&self) -> impl Iterator<Item = (&String, &[PathId])> {
        self.indices
            .unrecognised_types
            .iter()
            .map(|(kind, paths)| (kind, paths.as_slice()))
    }

    pub fn is_unrecognised_type(&self, kind: &str) -> bool {
        self.indices.unrecognised_types.contains_key(kind)
    }

    pub fn unrecognised_type_paths(&self, kind: &str) -> &[PathId] {
        self.indices
            .unrecognised_types
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn line_paths(&self, line_id: FeatureId) -> Option<&BTreeSet<PathId>> {
        self.indices.line_paths.get(&line_id)
    }

    pub fn node_paths(&self, node_id: FeatureId) -> Option<&BTreeSet<PathId>> {
        self.indices.node_paths.get(&node_id)
    }

    pub fn nerve_paths(&self, nerve_id: FeatureId) -> Option<&BTreeSet<PathId>> {
        self.indices.nerve_paths.get(&nerve_id)
    }

    pub fn centreline_paths(&self, centreline_id: &str) -> Option<&BTreeSet<PathId>> {
        self.indices.centreline_paths.get(centreline_id)
    }

    /// Line features drawing the centreline itself
    pub fn centreline_lines(&self, centreline_id: &str) -> Option<&FeatureSet> {
        self.indices.centreline_lines.get(centreline_id)
    }

    /// Every known centreline id with its label (the id when none was collected)
    pub fn centrelines(&self) -> Vec<(CentrelineId, String)> {
        let mut ids: BTreeSet<&CentrelineId> = self.indices.centreline_paths.keys().collect();
        ids.extend(self.indices.centreline_labels.keys());
        ids.into_iter()
            .map(|id| {
                let label = self
                    .indices
                    .centreline_labels
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| id.clone());
                (id.clone(), label)
            })
            .collect()
    }

    /// Non-centreline paths that reference no centreline
    pub fn uncentred_paths(&self) -> &BTreeSet<PathId> {
        &self.indices.uncentred_paths
    }

    pub fn path_connectivity_model(&self, path_id: &str) -> Option<&ModelId> {
        self.indices.path_connectivity_model.get(path_id)
    }

    pub fn path_model(&self, path_id: &str) -> Option<&ModelId> {
        self.indices.path_path_model.get(path_id)
    }

    pub fn connectivity_model_paths(&self, model_id: &str) -> &[PathId] {
        self.indices
            .connectivity_model_paths
            .get(model_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn path_model_paths(&self, model_id: &str) -> &[PathId] {
        self.indices
            .path_model_paths
            .get(model_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Annotations, ConnectivityModel, PathDescriptor, PathwaysData};
    use crate::index_builder::IndexBuilder;
    use crate::options::PathwaysOptions;
    use serde_json::json;

    fn registry() -> PathRegistry {
        let mut data = PathwaysData::default();
        data.paths.insert(
            "P1".into(),
            PathDescriptor {
                lines: vec![10, 11],
                nodes: vec![20],
                models: Some("ilxtr:neuron-a".into()),
                ..Default::default()
            },
        );
        data.paths.insert(
            "P2".into(),
            PathDescriptor {
                lines: vec![12],
                nodes: vec![20, 21],
                nerves: vec![30],
                models: Some("ilxtr:neuron-b".into()),
                ..Default::default()
            },
        );
        data.paths.insert(
            "P3".into(),
            PathDescriptor {
                lines: vec![13],
                nodes: vec![22],
                ..Default::default()
            },
        );
        data.models.insert(
            "keast:1".into(),
            ConnectivityModel {
                paths: vec!["P1".into(), "P3".into()],
            },
        );
        let indices =
            IndexBuilder::new(&data, &Annotations::new(), &PathwaysOptions::default()).build();
        PathRegistry::new(indices)
    }

    fn set(ids: &[FeatureId]) -> FeatureSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_line_expands_to_whole_path() {
        let registry = registry();
        assert_eq!(registry.line_feature_ids([10]), set(&[10, 11, 20]));
    }

    #[test]
    fn test_node_expands_to_every_touching_path() {
        let registry = registry();
        assert_eq!(registry.path_feature_ids(20), set(&[10, 11, 12, 20, 21, 30]));
        assert_eq!(registry.nerve_feature_ids(30), set(&[12, 20, 21, 30]));
        assert!(registry.path_feature_ids(999).is_empty());
    }

    #[test]
    fn test_all_feature_ids() {
        let registry = registry();
        assert_eq!(
            registry.all_feature_ids(),
            set(&[10, 11, 12, 13, 20, 21, 22, 30])
        );
    }

    #[test]
    fn test_model_lookups() {
        let registry = registry();
        assert_eq!(
            registry.connectivity_model_feature_ids("keast:1"),
            set(&[10, 11, 13, 20, 22])
        );
        assert_eq!(registry.path_model_feature_ids("ilxtr:neuron-b"), set(&[12, 20, 21, 30]));
        assert!(registry.connectivity_model_feature_ids("unknown").is_empty());

        let models: Vec<ModelId> = registry.node_path_models(20).into_iter().collect();
        assert_eq!(models, vec!["ilxtr:neuron-a", "ilxtr:neuron-b"]);
        assert_eq!(registry.path_model_nodes("ilxtr:neuron-b"), set(&[20, 21]));
    }

    #[test]
    fn test_path_properties() {
        let registry = registry();
        let properties = json!({"label": "L1"}).as_object().cloned().unwrap();

        let augmented = registry.path_properties(10, &properties);
        assert_eq!(augmented["label"], "L1");
        assert_eq!(augmented["connectivity"], "keast:1");
        assert_eq!(augmented["models"], "ilxtr:neuron-a");

        let augmented = registry.path_properties(12, &properties);
        assert!(!augmented.contains_key("connectivity"));
        assert_eq!(augmented["models"], "ilxtr:neuron-b");

        assert_eq!(registry.path_properties(999, &properties), properties);
    }
}
