// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
PathManager - path-level enable state on top of the registry.

Holds the two pieces of mutable path state:

- the type-level enabled flag of every known type, plus one flag per
  unrecognised source type folded into `"other"` (these start disabled);
- the system membership count of every path, i.e. how many enabled systems
  currently want the path shown.

System toggles go through reference counting: a path's footprint is sent
to the renderer only when its first owning system turns on or its last one
turns off. The footprints of all transitioning paths are merged before
dispatch, so a feature shared by several of them is sent once.
*/

use ahash::AHashMap;
use tracing::{debug, info, trace};

use crate::index_builder::Path;
use crate::path_types::{path_type_template, PathTypeInfo, PATH_TYPES};
use crate::ref_count::{RefCounter, Transition};
use crate::registry::PathRegistry;
use crate::renderer::FeatureRenderer;
use crate::systems::System;
use crate::types::{FeatureSet, PathChange, PathId, PathType};
use crate::watchers::{WatcherHub, WatcherId};

pub struct PathManager {
    registry: PathRegistry,
    type_enabled: AHashMap<String, bool>,
    system_membership: RefCounter<PathId>,
    watchers: WatcherHub<PathChange>,
}

impl PathManager {
    pub fn new(registry: PathRegistry) -> Self {
        let mut type_enabled = AHashMap::new();
        for template in PATH_TYPES {
            type_enabled.insert(template.kind.to_string(), template.enabled);
        }
        for (kind, _) in registry.unrecognised_types() {
            type_enabled.insert(kind.clone(), false);
        }
        let mut system_membership = RefCounter::new();
        for path_id in registry.path_ids() {
            system_membership.track(path_id.clone());
        }
        Self {
            registry,
            type_enabled,
            system_membership,
            watchers: WatcherHub::new(),
        }
    }

    pub fn registry(&self) -> &PathRegistry {
        &self.registry
    }

    /// Force-disable every path whose type starts disabled
    pub fn apply_initial_state(&self, renderer: &mut dyn FeatureRenderer) {
        let mut feature_ids = FeatureSet::new();
        for template in PATH_TYPES.iter().filter(|t| !t.enabled) {
            feature_ids.extend(self.registry.paths_feature_ids(self.registry.type_paths(template.kind)));
        }
        for (kind, path_ids) in self.registry.unrecognised_types() {
            debug!("Paths of unrecognised type {} start disabled", kind);
            feature_ids.extend(self.registry.paths_feature_ids(path_ids));
        }
        for feature_id in feature_ids {
            renderer.enable_feature(feature_id, false, true);
        }
    }

    /// Whether a type flag (known or unrecognised source type) is on
    pub fn path_type_enabled(&self, kind: &str) -> bool {
        self.type_enabled.get(kind).copied().unwrap_or(false)
    }

    /// Whether a path's type currently allows it to be shown
    pub fn path_enabled_by_type(&self, path: &Path) -> bool {
        self.path_type_enabled(path.path_type.as_str())
            && path
                .unrecognised_type
                .as_deref()
                .map_or(true, |kind| self.path_type_enabled(kind))
    }

    /// Types with at least one member path, in presentation order
    ///
    /// `"centreline"` is never listed; see [`PathManager::have_centrelines`].
    /// `"other"` reports enabled only when every type folded into it is.
    pub fn path_types(&self) -> Vec<PathTypeInfo> {
        PATH_TYPES
            .iter()
            .filter(|t| t.kind != PathType::CENTRELINE)
            .filter(|t| !self.registry.type_paths(t.kind).is_empty())
            .map(|t| {
                let mut enabled = self.path_type_enabled(t.kind);
                if t.kind == PathType::OTHER {
                    enabled = enabled
                        && self
                            .registry
                            .unrecognised_types()
                            .all(|(kind, _)| self.path_type_enabled(kind));
                }
                PathTypeInfo::from_template(t, enabled)
            })
            .collect()
    }

    pub fn have_centrelines(&self) -> bool {
        !self.registry.type_paths(PathType::CENTRELINE).is_empty()
    }

    pub fn centrelines_enabled(&self) -> bool {
        self.path_type_enabled(PathType::CENTRELINE)
    }

    /// Show or hide every path of a type
    ///
    /// `kind` is a known type or an unrecognised source type; toggling
    /// `"other"` also toggles every type folded into it. Returns whether the
    /// renderer was called.
    pub fn enable_path_type(
        &mut self,
        kind: &str,
        enable: bool,
        force: bool,
        renderer: &mut dyn FeatureRenderer,
    ) -> bool {
        let mut kinds = Vec::new();
        let mut path_ids: Vec<&PathId> = Vec::new();
        if path_type_template(kind).is_some() {
            kinds.push(kind.to_string());
            path_ids.extend(self.registry.type_paths(kind));
            if kind == PathType::OTHER {
                for (unrecognised, _) in self.registry.unrecognised_types() {
                    kinds.push(unrecognised.clone());
                }
            }
        } else if self.registry.is_unrecognised_type(kind) {
            kinds.push(kind.to_string());
            path_ids.extend(self.registry.unrecognised_type_paths(kind));
        } else {
            trace!("Ignoring unknown path type {}", kind);
            return false;
        }

        if !force && kinds.iter().all(|k| self.path_type_enabled(k) == enable) {
            return false;
        }
        debug!("{} path type {}", if enable { "Enabling" } else { "Disabling" }, kind);

        let feature_ids = self.registry.paths_feature_ids(path_ids);
        for feature_id in &feature_ids {
            renderer.enable_feature(*feature_id, enable, force);
        }
        for k in kinds {
            self.type_enabled.insert(k, enable);
        }
        self.watchers.notify(&PathChange::PathType {
            path_type: PathType::new(kind),
            enabled: enable,
        });
        true
    }

    /// Reference-counted toggle of a system's paths
    ///
    /// Paths whose type is disabled still have their count updated but are
    /// not sent to the renderer. Returns whether any path transitioned.
    pub fn enable_paths_by_system(
        &mut self,
        system: &System,
        enable: bool,
        force: bool,
        renderer: &mut dyn FeatureRenderer,
    ) -> bool {
        let mut transitioning: Vec<&PathId> = Vec::new();
        for path_id in &system.path_ids {
            let Some(path) = self.registry.path(path_id) else {
                trace!("System {} lists unknown path {}", system.id, path_id);
                continue;
            };
            let transition = self.system_membership.update(path_id.clone(), enable, force);
            if transition == Transition::Unchanged {
                continue;
            }
            if self.path_enabled_by_type(path) {
                transitioning.push(path_id);
            }
        }
        if transitioning.is_empty() {
            return false;
        }

        let feature_ids = self.registry.paths_feature_ids(transitioning.iter().copied());
        trace!(
            "System {}: {} paths, {} features -> {}",
            system.id,
            transitioning.len(),
            feature_ids.len(),
            enable
        );
        for feature_id in feature_ids {
            renderer.enable_feature(feature_id, enable, force);
        }
        self.watchers.notify(&PathChange::System {
            id: system.id.clone(),
            enabled: enable,
        });
        true
    }

    pub fn system_membership_count(&self, path_id: &str) -> u32 {
        self.system_membership.count(path_id)
    }

    pub fn add_watcher<F>(&self, callback: F) -> WatcherId
    where
        F: Fn(&PathChange) + Send + Sync + 'static,
    {
        self.watchers.add_watcher(callback)
    }

    pub fn remove_watcher(&self, id: WatcherId) -> bool {
        self.watchers.remove_watcher(id)
    }

    pub fn notify_watchers(&self, changes: &PathChange) {
        self.watchers.notify(changes);
    }

    pub(crate) fn log_summary(&self) {
        info!(
            "Path manager ready: {} paths, {} visible types, centrelines: {}",
            self.registry.path_count(),
            self.path_types().len(),
            self.have_centrelines()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Annotations, PathDescriptor, PathwaysData};
    use crate::index_builder::IndexBuilder;
    use crate::options::PathwaysOptions;
    use crate::renderer::RecordingRenderer;
    use std::collections::BTreeSet;

    fn manager() -> PathManager {
        let mut data = PathwaysData::default();
        let lines = [("P1", 10), ("P2", 11), ("P3", 12), ("P4", 13)];
        for (id, line) in lines {
            data.paths.insert(
                id.into(),
                PathDescriptor {
                    lines: vec![line],
                    ..Default::default()
                },
            );
        }
        data.type_paths.insert("cns".into(), vec!["P1".into(), "P2".into()]);
        data.type_paths.insert("arterial".into(), vec!["P3".into()]);
        data.type_paths.insert("lymphatic".into(), vec!["P4".into()]);
        let indices =
            IndexBuilder::new(&data, &Annotations::new(), &PathwaysOptions::default()).build();
        PathManager::new(PathRegistry::new(indices))
    }

    fn system(id: &str, paths: &[&str]) -> System {
        System {
            id: id.to_string(),
            name: id.to_string(),
            colour: None,
            enabled: false,
            feature_ids: Vec::new(),
            path_ids: paths.iter().map(|p| p.to_string()).collect::<BTreeSet<_>>(),
            organs: Vec::new(),
        }
    }

    #[test]
    fn test_initial_state_disables_default_off_types() {
        let manager = manager();
        let mut renderer = RecordingRenderer::new();
        manager.apply_initial_state(&mut renderer);
        assert_eq!(renderer.enabled_features(false), vec![12, 13]);
    }

    #[test]
    fn test_unrecognised_type_folds_into_other_disabled() {
        let manager = manager();
        let types: Vec<(String, bool)> = manager
            .path_types()
            .into_iter()
            .map(|t| (t.path_type.to_string(), t.enabled))
            .collect();
        assert_eq!(
            types,
            vec![
                ("cns".to_string(), true),
                ("other".to_string(), false),
                ("arterial".to_string(), false)
            ]
        );
        assert!(!manager.path_type_enabled("lymphatic"));
    }

    #[test]
    fn test_enable_other_enables_folded_types() {
        let mut manager = manager();
        let mut renderer = RecordingRenderer::new();
        assert!(manager.enable_path_type("other", true, false, &mut renderer));
        assert!(manager.path_type_enabled("lymphatic"));
        assert_eq!(renderer.enabled_features(true), vec![13]);
        assert!(!manager.enable_path_type("other", true, false, &mut renderer));
        assert!(!manager.enable_path_type("no-such-type", true, false, &mut renderer));
    }

    #[test]
    fn test_disabled_type_suppresses_dispatch_but_counts() {
        let mut manager = manager();
        let mut renderer = RecordingRenderer::new();
        let sys = system("Sys", &["P1", "P3"]);
        assert!(manager.enable_paths_by_system(&sys, true, false, &mut renderer));
        assert_eq!(renderer.enabled_features(true), vec![10]);
        assert_eq!(manager.system_membership_count("P3"), 1);
    }

    #[test]
    fn test_unknown_paths_are_ignored() {
        let mut manager = manager();
        let mut renderer = RecordingRenderer::new();
        let sys = system("Sys", &["ghost"]);
        assert!(!manager.enable_paths_by_system(&sys, true, false, &mut renderer));
        assert!(renderer.calls().is_empty());
    }
}
