// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Core identifier and error types for the pathways engine.
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Numeric id of an externally rendered line or node
pub type FeatureId = u32;

/// Connectivity path identifier
pub type PathId = String;

/// Normalised system identifier (display name with whitespace replaced)
pub type SystemId = String;

/// Anatomical model id of a nerve centreline
pub type CentrelineId = String;

/// Connectivity-model or path-model ontology identifier
pub type ModelId = String;

/// Deduplicated, ordered set of feature ids
pub type FeatureSet = BTreeSet<FeatureId>;

/// Canonical path type (`"cns"`, `"symp-pre"`, `"other"`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathType(String);

impl PathType {
    /// Bucket for paths whose source type is not recognised
    pub const OTHER: &'static str = "other";

    /// Nerve centreline paths, controlled separately from ordinary types
    pub const CENTRELINE: &'static str = "centreline";

    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn other() -> Self {
        Self::new(Self::OTHER)
    }

    pub fn centreline() -> Self {
        Self::new(Self::CENTRELINE)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_other(&self) -> bool {
        self.0 == Self::OTHER
    }

    pub fn is_centreline(&self) -> bool {
        self.0 == Self::CENTRELINE
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PathType {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// Result type for pathways operations
pub type PathwaysResult<T> = Result<T, PathwaysError>;

/// Errors that can occur while decoding pathway documents
///
/// Operations on built indices never fail; unknown identifiers are no-ops.
#[derive(Debug, thiserror::Error)]
pub enum PathwaysError {
    #[error("Failed to read pathways document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pathways JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Description of an aggregate state change passed to watchers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PathChange {
    /// Paths of a centreline (or the "no associated nerves" sentinel) toggled
    Centreline { id: CentrelineId, enabled: bool },
    /// Paths owned by a system toggled
    System { id: SystemId, enabled: bool },
    /// A whole path type toggled
    PathType { path_type: PathType, enabled: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_type_constants() {
        assert!(PathType::other().is_other());
        assert!(PathType::centreline().is_centreline());
        assert!(!PathType::from("cns").is_other());
        assert_eq!(PathType::from("symp-pre").to_string(), "symp-pre");
    }

    #[test]
    fn test_path_change_serializes_with_kind_tag() {
        let change = PathChange::System {
            id: "Nervous_system".to_string(),
            enabled: true,
        };
        let value = serde_json::to_value(&change).unwrap();
        assert_eq!(value["kind"], "system");
        assert_eq!(value["id"], "Nervous_system");
    }
}
