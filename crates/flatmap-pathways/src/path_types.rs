// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Known path types and their default presentation

use serde::Serialize;

use crate::types::PathType;

/// Static description of a known path type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathTypeTemplate {
    pub kind: &'static str,
    pub label: &'static str,
    pub colour: &'static str,
    pub dashed: bool,
    /// Enabled when the map is first loaded
    pub enabled: bool,
}

const fn template(kind: &'static str, label: &'static str, colour: &'static str) -> PathTypeTemplate {
    PathTypeTemplate {
        kind,
        label,
        colour,
        dashed: false,
        enabled: true,
    }
}

/// Known path types, in presentation order
pub const PATH_TYPES: &[PathTypeTemplate] = &[
    template("cns", "CNS", "#9B1FC1"),
    template("intracardiac", "Local circuit neuron", "#F19E38"),
    template("para-pre", "Parasympathetic pre-ganglionic", "#3F8F4A"),
    PathTypeTemplate {
        dashed: true,
        ..template("para-post", "Parasympathetic post-ganglionic", "#3F8F4A")
    },
    template("sensory", "Sensory (afferent) neuron", "#2A62F6"),
    template("motor", "Somatic lower motor", "#98561D"),
    template("somatic", "Somatic lower motor", "#98561D"),
    template("symp-pre", "Sympathetic pre-ganglionic", "#EA3423"),
    PathTypeTemplate {
        dashed: true,
        ..template("symp-post", "Sympathetic post-ganglionic", "#EA3423")
    },
    template(PathType::OTHER, "Other neuron type", "#888"),
    PathTypeTemplate {
        enabled: false,
        ..template("arterial", "Arterial blood vessel", "#F00")
    },
    PathTypeTemplate {
        enabled: false,
        ..template("venous", "Venous blood vessel", "#2F6EBA")
    },
    PathTypeTemplate {
        enabled: false,
        ..template(PathType::CENTRELINE, "Nerve centrelines", "#CCC")
    },
    PathTypeTemplate {
        enabled: false,
        ..template("error", "Paths with errors or warnings", "#FF0")
    },
];

/// Look up a known path type
pub fn path_type_template(kind: &str) -> Option<&'static PathTypeTemplate> {
    PATH_TYPES.iter().find(|t| t.kind == kind)
}

pub fn is_known_path_type(kind: &str) -> bool {
    path_type_template(kind).is_some()
}

/// A path type present on the map, with its current enabled flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathTypeInfo {
    #[serde(rename = "type")]
    pub path_type: PathType,
    pub label: String,
    pub colour: String,
    pub dashed: bool,
    pub enabled: bool,
}

impl PathTypeInfo {
    pub(crate) fn from_template(template: &PathTypeTemplate, enabled: bool) -> Self {
        Self {
            path_type: PathType::new(template.kind),
            label: template.label.to_string(),
            colour: template.colour.to_string(),
            dashed: template.dashed,
            enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert!(is_known_path_type("symp-post"));
        assert!(path_type_template("symp-post").unwrap().dashed);
        assert!(!is_known_path_type("lymphatic"));
    }

    #[test]
    fn test_defaults() {
        assert!(path_type_template(PathType::OTHER).unwrap().enabled);
        assert!(!path_type_template(PathType::CENTRELINE).unwrap().enabled);
        assert!(!path_type_template("arterial").unwrap().enabled);
    }
}
