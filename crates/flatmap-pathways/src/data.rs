// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Map-build metadata consumed once at construction
//!
//! Every collection is optional in the source documents; missing fields
//! decode as empty so building proceeds with reduced functionality.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

use crate::types::{CentrelineId, FeatureId, ModelId, PathId, PathwaysResult};

/// Free-form display properties of a rendered feature
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// One connectivity path as described by the map build
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathDescriptor {
    /// Source path type, used when the path is absent from `type-paths`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub path_type: Option<String>,

    #[serde(default)]
    pub lines: Vec<FeatureId>,

    #[serde(default)]
    pub nodes: Vec<FeatureId>,

    #[serde(default)]
    pub nerves: Vec<FeatureId>,

    #[serde(default)]
    pub centrelines: Vec<CentrelineId>,

    /// Path-model id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelId>,
}

/// Connectivity model membership
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectivityModel {
    #[serde(default)]
    pub paths: Vec<PathId>,
}

/// The `pathways` section of the map metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathwaysData {
    #[serde(default)]
    pub paths: HashMap<PathId, PathDescriptor>,

    #[serde(rename = "node-paths", default)]
    pub node_paths: HashMap<FeatureId, Vec<PathId>>,

    #[serde(rename = "type-paths", default)]
    pub type_paths: HashMap<String, Vec<PathId>>,

    #[serde(default)]
    pub models: HashMap<ModelId, ConnectivityModel>,
}

impl PathwaysData {
    pub fn from_json(json: &str) -> PathwaysResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> PathwaysResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_file(path: &Path) -> PathwaysResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Per-feature annotation record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureAnnotation {
    #[serde(rename = "fc-class", default, skip_serializing_if = "Option::is_none")]
    pub fc_class: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,

    #[serde(default)]
    pub children: Vec<FeatureId>,

    #[serde(rename = "path-ids", default)]
    pub path_ids: Vec<PathId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Remaining display properties, passed through untouched
    #[serde(flatten)]
    pub properties: Properties,
}

impl FeatureAnnotation {
    /// Whether this record carries the given `fc-class`
    pub fn has_class(&self, fc_class: &str) -> bool {
        self.fc_class.as_deref() == Some(fc_class)
    }
}

/// Annotation records keyed by feature id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Annotations {
    records: HashMap<FeatureId, FeatureAnnotation>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> PathwaysResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> PathwaysResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn insert(&mut self, feature_id: FeatureId, annotation: FeatureAnnotation) {
        self.records.insert(feature_id, annotation);
    }

    pub fn get(&self, feature_id: FeatureId) -> Option<&FeatureAnnotation> {
        self.records.get(&feature_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in ascending feature id order
    pub fn iter_sorted(&self) -> impl Iterator<Item = (FeatureId, &FeatureAnnotation)> {
        let mut ids: Vec<FeatureId> = self.records.keys().copied().collect();
        ids.sort_unstable();
        ids.into_iter().map(move |id| (id, &self.records[&id]))
    }
}

impl FromIterator<(FeatureId, FeatureAnnotation)> for Annotations {
    fn from_iter<I: IntoIterator<Item = (FeatureId, FeatureAnnotation)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_collections_decode_empty() {
        let data = PathwaysData::from_json(r#"{"paths": {"p1": {}}}"#).unwrap();
        let path = &data.paths["p1"];
        assert!(path.lines.is_empty());
        assert!(path.centrelines.is_empty());
        assert!(path.models.is_none());
        assert!(data.node_paths.is_empty());
        assert!(data.type_paths.is_empty());
        assert!(data.models.is_empty());
    }

    #[test]
    fn test_string_feature_keys_decode_as_numbers() {
        let value = json!({
            "paths": {"p1": {"lines": [10, 11], "nodes": [20]}},
            "node-paths": {"20": ["p1"]},
            "type-paths": {"cns": ["p1"]},
            "models": {"keast:1": {"paths": ["p1"]}}
        });
        let data = PathwaysData::from_json(&value.to_string()).unwrap();
        assert_eq!(data.node_paths[&20], vec!["p1".to_string()]);
        assert_eq!(data.models["keast:1"].paths, vec!["p1".to_string()]);
    }

    #[test]
    fn test_annotation_keeps_extra_properties() {
        let value = json!({
            "7": {
                "fc-class": "fc-class:System",
                "name": "Nervous system",
                "colour": "#FF0",
                "children": [8, 9],
                "path-ids": ["p1"],
                "kind": "scaffold"
            }
        });
        let annotations = Annotations::from_json(&value.to_string()).unwrap();
        let record = annotations.get(7).unwrap();
        assert!(record.has_class("fc-class:System"));
        assert_eq!(record.children, vec![8, 9]);
        assert_eq!(record.path_ids, vec!["p1".to_string()]);
        assert_eq!(record.properties["kind"], "scaffold");
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        assert!(PathwaysData::from_json("[1, 2]").is_err());
    }
}
