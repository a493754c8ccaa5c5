// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
SystemController - anatomical systems and their enable state machine.

Systems are discovered from `fc-class:System` annotations. Several features
may carry the same system name; they merge into one system whose id is the
name with whitespace replaced by `_`.

Each system is `disabled` (initially) or `enabled`. Enabling a system:

1. structurally toggles each of its own features, and applies reference
   counted propagation to each child feature (organs) so a child shared by
   two systems stays visible until both are off;
2. toggles its paths through [`PathManager::enable_paths_by_system`];
3. records the new state.

Requests for the state a system is already in do nothing.
*/

use ahash::AHashMap;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, trace};

use crate::data::Annotations;
use crate::path_manager::PathManager;
use crate::ref_count::RefCounter;
use crate::renderer::{FeatureRenderer, MapFeature};
use crate::types::{FeatureId, ModelId, PathChange, PathId, SystemId};

pub const SYSTEM_CLASS: &str = "fc-class:System";
pub const ORGAN_CLASS: &str = "fc-class:Organ";
pub const FTU_CLASS: &str = "fc-class:Ftu";

/// Display-only description of an organ or functional tissue unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelId>,
    /// Nested FTUs
    pub ftus: Vec<ComponentDescriptor>,
}

/// An anatomical system
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct System {
    pub id: SystemId,
    pub name: String,
    pub colour: Option<String>,
    pub enabled: bool,
    /// Features annotated as this system
    pub feature_ids: Vec<FeatureId>,
    pub path_ids: BTreeSet<PathId>,
    pub organs: Vec<ComponentDescriptor>,
}

/// Summary of a system for presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemSummary {
    pub id: SystemId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    pub enabled: bool,
    pub organs: Vec<ComponentDescriptor>,
}

/// Normalise a system display name into its id
pub fn system_id(name: &str) -> SystemId {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SystemController {
    systems: BTreeMap<SystemId, System>,
    features: AHashMap<FeatureId, MapFeature>,
    enabled_children: RefCounter<FeatureId>,
}

impl SystemController {
    /// Discover systems and put them in their initial state
    ///
    /// Every child feature and every system path is force-disabled first.
    /// With `enabled_by_default` each system is then enabled through
    /// [`SystemController::enable`].
    pub fn new(
        annotations: &Annotations,
        paths: &mut PathManager,
        renderer: &mut dyn FeatureRenderer,
        enabled_by_default: bool,
    ) -> Self {
        let mut controller = Self::default();
        // Organs already listed per system, across same-named features
        let mut listed_organs: AHashMap<SystemId, BTreeSet<FeatureId>> = AHashMap::new();

        for (feature_id, annotation) in annotations.iter_sorted() {
            if !annotation.has_class(SYSTEM_CLASS) {
                continue;
            }
            let Some(name) = annotation.name.as_ref().or(annotation.label.as_ref()) else {
                debug!("System feature {} has no name; ignored", feature_id);
                continue;
            };
            let id = system_id(name);
            let visited = listed_organs.entry(id.clone()).or_default();
            let organs =
                collect_components(annotations, &annotation.children, ORGAN_CLASS, visited);
            match controller.systems.get_mut(&id) {
                Some(system) => {
                    system.feature_ids.push(feature_id);
                    system.path_ids.extend(annotation.path_ids.iter().cloned());
                    system.organs.extend(organs);
                }
                None => {
                    let system = System {
                        id: id.clone(),
                        name: name.clone(),
                        colour: annotation.colour.clone(),
                        enabled: false,
                        feature_ids: vec![feature_id],
                        path_ids: annotation.path_ids.iter().cloned().collect(),
                        organs,
                    };
                    controller.systems.insert(id, system);
                }
            }
            controller.features.insert(
                feature_id,
                MapFeature {
                    id: feature_id,
                    children: annotation.children.clone(),
                },
            );
            for &child_id in &annotation.children {
                controller.enabled_children.track(child_id);
                renderer.enable_feature_with_children(child_id, false, true);
            }
        }

        for system in controller.systems.values() {
            paths.enable_paths_by_system(system, false, true, renderer);
        }

        if enabled_by_default {
            let ids: Vec<SystemId> = controller.systems.keys().cloned().collect();
            for id in ids {
                controller.enable(&id, true, paths, renderer);
            }
        }

        info!(
            "Loaded {} systems ({} enabled)",
            controller.systems.len(),
            controller.systems.values().filter(|s| s.enabled).count()
        );
        controller
    }

    /// Move a system to the requested state
    ///
    /// Returns false, doing nothing, for unknown ids or when the system is
    /// already in that state.
    pub fn enable(
        &mut self,
        system_id: &str,
        enable: bool,
        paths: &mut PathManager,
        renderer: &mut dyn FeatureRenderer,
    ) -> bool {
        let Some(system) = self.systems.get_mut(system_id) else {
            trace!("Ignoring unknown system {}", system_id);
            return false;
        };
        if system.enabled == enable {
            return false;
        }
        debug!("{} system {}", if enable { "Enabling" } else { "Disabling" }, system_id);

        for feature_id in &system.feature_ids {
            let Some(feature) = self.features.get(feature_id) else {
                continue;
            };
            renderer.enable_map_feature(feature, enable);
            for &child_id in &feature.children {
                if self.enabled_children.update(child_id, enable, false).is_change() {
                    renderer.enable_feature_with_children(child_id, enable, false);
                }
            }
        }
        if !paths.enable_paths_by_system(system, enable, false, renderer) {
            // No path changed state, so nothing has told watchers yet
            paths.notify_watchers(&PathChange::System {
                id: system.id.clone(),
                enabled: enable,
            });
        }
        system.enabled = enable;
        true
    }

    pub fn system(&self, system_id: &str) -> Option<&System> {
        self.systems.get(system_id)
    }

    pub fn system_enabled(&self, system_id: &str) -> bool {
        self.systems.get(system_id).map_or(false, |s| s.enabled)
    }

    /// Number of enabled systems currently showing a child feature
    pub fn enabled_child_count(&self, feature_id: FeatureId) -> u32 {
        self.enabled_children.count(&feature_id)
    }

    pub fn system_ids(&self) -> impl Iterator<Item = &SystemId> {
        self.systems.keys()
    }

    /// All systems, sorted by name
    pub fn systems(&self) -> Vec<SystemSummary> {
        let mut summaries: Vec<SystemSummary> = self
            .systems
            .values()
            .map(|system| SystemSummary {
                id: system.id.clone(),
                name: system.name.clone(),
                colour: system.colour.clone(),
                enabled: system.enabled,
                organs: system.organs.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
        summaries
    }
}

/// Build the display tree of a feature's children of class `fc_class`;
/// their own children are collected as FTUs
fn collect_components(
    annotations: &Annotations,
    child_ids: &[FeatureId],
    fc_class: &str,
    visited: &mut BTreeSet<FeatureId>,
) -> Vec<ComponentDescriptor> {
    let mut components = Vec::new();
    for &child_id in child_ids {
        let Some(annotation) = annotations.get(child_id) else {
            continue;
        };
        if !annotation.has_class(fc_class) || !visited.insert(child_id) {
            continue;
        }
        components.push(ComponentDescriptor {
            label: annotation.label.clone(),
            models: annotation.models.clone(),
            ftus: collect_components(annotations, &annotation.children, FTU_CLASS, visited),
        });
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FeatureAnnotation, PathDescriptor, PathwaysData};
    use crate::index_builder::IndexBuilder;
    use crate::options::PathwaysOptions;
    use crate::registry::PathRegistry;
    use crate::renderer::{RecordingRenderer, RendererCall};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn annotation(fc_class: &str, name: &str, children: &[FeatureId]) -> FeatureAnnotation {
        FeatureAnnotation {
            fc_class: Some(fc_class.to_string()),
            name: Some(name.to_string()),
            label: Some(name.to_string()),
            children: children.to_vec(),
            ..Default::default()
        }
    }

    fn fixture() -> (Annotations, PathManager) {
        let mut annotations = Annotations::new();
        let mut cardio = annotation(SYSTEM_CLASS, "Cardiovascular system", &[10, 30]);
        cardio.path_ids = vec!["P1".into()];
        cardio.colour = Some("#F00".into());
        annotations.insert(1, cardio);
        let mut nervous = annotation(SYSTEM_CLASS, "Nervous system", &[30]);
        nervous.path_ids = vec!["P1".into()];
        annotations.insert(2, nervous);
        let mut heart = annotation(ORGAN_CLASS, "Heart", &[11]);
        heart.models = Some("UBERON:0000948".into());
        annotations.insert(10, heart);
        annotations.insert(11, annotation(FTU_CLASS, "Sinoatrial node", &[]));
        annotations.insert(30, annotation(ORGAN_CLASS, "Vagus", &[]));

        let mut data = PathwaysData::default();
        data.paths.insert(
            "P1".into(),
            PathDescriptor {
                lines: vec![100],
                ..Default::default()
            },
        );
        let indices =
            IndexBuilder::new(&data, &annotations, &PathwaysOptions::default()).build();
        (annotations, PathManager::new(PathRegistry::new(indices)))
    }

    #[test]
    fn test_system_id_normalisation() {
        assert_eq!(system_id("Nervous system"), "Nervous_system");
        assert_eq!(system_id("a\tb c"), "a_b_c");
    }

    #[test]
    fn test_construction_force_disables() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);

        assert!(renderer.calls().contains(&RendererCall::FeatureWithChildren {
            id: 10,
            enable: false,
            force: true
        }));
        assert_eq!(renderer.feature_calls(100, false), 2);
        assert!(!controller.system_enabled("Cardiovascular_system"));
    }

    #[test]
    fn test_organ_tree() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);

        let systems = controller.systems();
        assert_eq!(systems[0].name, "Cardiovascular system");
        assert_eq!(systems[0].colour.as_deref(), Some("#F00"));
        let heart = &systems[0].organs[0];
        assert_eq!(heart.label.as_deref(), Some("Heart"));
        assert_eq!(heart.models.as_deref(), Some("UBERON:0000948"));
        assert_eq!(heart.ftus[0].label.as_deref(), Some("Sinoatrial node"));
        assert_eq!(systems[0].organs.len(), 2);
    }

    #[test]
    fn test_shared_child_reference_counted() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let mut controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);
        renderer.clear();

        controller.enable("Cardiovascular_system", true, &mut paths, &mut renderer);
        controller.enable("Nervous_system", true, &mut paths, &mut renderer);
        assert_eq!(controller.enabled_child_count(30), 2);
        let cascades = |renderer: &RecordingRenderer, enable: bool| {
            renderer
                .calls()
                .iter()
                .filter(|c| matches!(c, RendererCall::FeatureWithChildren { id: 30, enable: e, .. } if *e == enable))
                .count()
        };
        assert_eq!(cascades(&renderer, true), 1);

        controller.enable("Cardiovascular_system", false, &mut paths, &mut renderer);
        assert_eq!(cascades(&renderer, false), 0);
        controller.enable("Nervous_system", false, &mut paths, &mut renderer);
        assert_eq!(cascades(&renderer, false), 1);
        assert_eq!(controller.enabled_child_count(30), 0);
    }

    #[test]
    fn test_enable_is_idempotent() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let mut controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);
        renderer.clear();

        assert!(controller.enable("Nervous_system", true, &mut paths, &mut renderer));
        let first = renderer.take();
        assert!(!controller.enable("Nervous_system", true, &mut paths, &mut renderer));
        assert!(renderer.calls().is_empty());
        assert!(first.contains(&RendererCall::MapFeature { id: 2, enable: true }));
        assert!(!controller.enable("Unknown", true, &mut paths, &mut renderer));
    }

    #[test]
    fn test_same_named_systems_merge_organs() {
        let mut annotations = Annotations::new();
        annotations.insert(1, annotation(SYSTEM_CLASS, "Sys A", &[10]));
        annotations.insert(2, annotation(SYSTEM_CLASS, "Sys A", &[20, 10]));
        annotations.insert(10, annotation(ORGAN_CLASS, "Heart", &[]));
        annotations.insert(20, annotation(ORGAN_CLASS, "Lung", &[]));
        let (_, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let mut controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);

        let systems = controller.systems();
        assert_eq!(systems.len(), 1);
        let labels: Vec<&str> = systems[0]
            .organs
            .iter()
            .filter_map(|organ| organ.label.as_deref())
            .collect();
        assert_eq!(labels, vec!["Heart", "Lung"]);

        renderer.clear();
        assert!(controller.enable("Sys_A", true, &mut paths, &mut renderer));
        assert!(renderer.calls().contains(&RendererCall::FeatureWithChildren {
            id: 20,
            enable: true,
            force: false
        }));
    }

    #[test]
    fn test_system_without_paths_notifies_watchers() {
        let mut annotations = Annotations::new();
        annotations.insert(1, annotation(SYSTEM_CLASS, "Sys A", &[10]));
        annotations.insert(10, annotation(ORGAN_CLASS, "Heart", &[]));
        let (_, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let mut controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        paths.add_watcher(move |change: &PathChange| sink.lock().push(change.clone()));

        assert!(controller.enable("Sys_A", true, &mut paths, &mut renderer));
        assert!(!controller.enable("Sys_A", true, &mut paths, &mut renderer));
        assert!(controller.enable("Sys_A", false, &mut paths, &mut renderer));
        assert_eq!(
            *seen.lock(),
            vec![
                PathChange::System {
                    id: "Sys_A".into(),
                    enabled: true
                },
                PathChange::System {
                    id: "Sys_A".into(),
                    enabled: false
                }
            ]
        );
    }

    #[test]
    fn test_shared_paths_notify_once_per_system_change() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let mut controller = SystemController::new(&annotations, &mut paths, &mut renderer, false);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        paths.add_watcher(move |change: &PathChange| sink.lock().push(change.clone()));

        controller.enable("Cardiovascular_system", true, &mut paths, &mut renderer);
        // P1 is already on, yet the second system still changes state
        controller.enable("Nervous_system", true, &mut paths, &mut renderer);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_enabled_by_default() {
        let (annotations, mut paths) = fixture();
        let mut renderer = RecordingRenderer::new();
        let controller = SystemController::new(&annotations, &mut paths, &mut renderer, true);
        assert!(controller.system_enabled("Cardiovascular_system"));
        assert!(controller.system_enabled("Nervous_system"));
        assert_eq!(paths.system_membership_count("P1"), 2);
        assert_eq!(renderer.feature_calls(100, true), 1);
    }
}
