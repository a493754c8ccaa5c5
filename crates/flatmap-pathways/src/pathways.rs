// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-map pathways facade.

`FlatmapPathways` owns every piece of pathway state for one loaded map
together with the renderer it drives. Nothing is shared between instances.

Construction runs in a fixed order:

1. build the indices;
2. force-disable paths whose type starts disabled;
3. collect the centreline selector;
4. discover systems, force-disabling their children and paths, then enable
   them all when systems are enabled by default.
*/

use tracing::{debug, info};

use crate::centrelines::{CentrelineController, CentrelineDetails};
use crate::data::{Annotations, PathwaysData, Properties};
use crate::index_builder::{IndexBuilder, Path};
use crate::options::PathwaysOptions;
use crate::path_manager::PathManager;
use crate::path_types::PathTypeInfo;
use crate::registry::PathRegistry;
use crate::renderer::FeatureRenderer;
use crate::systems::{System, SystemController, SystemSummary};
use crate::types::{FeatureId, FeatureSet, ModelId, PathChange, PathType};
use crate::watchers::WatcherId;

pub struct FlatmapPathways<R: FeatureRenderer> {
    paths: PathManager,
    centrelines: CentrelineController,
    systems: SystemController,
    renderer: R,
}

impl<R: FeatureRenderer> FlatmapPathways<R> {
    pub fn new(
        data: &PathwaysData,
        annotations: &Annotations,
        options: &PathwaysOptions,
        mut renderer: R,
    ) -> Self {
        let indices = IndexBuilder::new(data, annotations, options).build();
        let mut paths = PathManager::new(PathRegistry::new(indices));
        paths.apply_initial_state(&mut renderer);

        let centrelines = CentrelineController::new(&paths);
        let systems = SystemController::new(
            annotations,
            &mut paths,
            &mut renderer,
            options.systems_enabled_by_default,
        );
        paths.log_summary();
        info!(
            "Flatmap pathways ready: {} systems, {} centrelines",
            systems.system_ids().count(),
            centrelines.nerve_centreline_details().len() - 1
        );

        Self {
            paths,
            centrelines,
            systems,
            renderer,
        }
    }

    pub fn registry(&self) -> &PathRegistry {
        self.paths.registry()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    // Registry lookups

    pub fn path(&self, path_id: &str) -> Option<&Path> {
        self.registry().path(path_id)
    }

    pub fn all_feature_ids(&self) -> FeatureSet {
        self.registry().all_feature_ids()
    }

    pub fn line_feature_ids<I>(&self, line_ids: I) -> FeatureSet
    where
        I: IntoIterator<Item = FeatureId>,
    {
        self.registry().line_feature_ids(line_ids)
    }

    pub fn nerve_feature_ids(&self, nerve_id: FeatureId) -> FeatureSet {
        self.registry().nerve_feature_ids(nerve_id)
    }

    pub fn path_feature_ids(&self, node_id: FeatureId) -> FeatureSet {
        self.registry().path_feature_ids(node_id)
    }

    pub fn connectivity_model_feature_ids(&self, model_id: &str) -> FeatureSet {
        self.registry().connectivity_model_feature_ids(model_id)
    }

    pub fn path_model_feature_ids(&self, model_id: &str) -> FeatureSet {
        self.registry().path_model_feature_ids(model_id)
    }

    pub fn node_path_models(&self, node_id: FeatureId) -> std::collections::BTreeSet<ModelId> {
        self.registry().node_path_models(node_id)
    }

    pub fn path_model_nodes(&self, model_id: &str) -> FeatureSet {
        self.registry().path_model_nodes(model_id)
    }

    pub fn path_properties(&self, feature_id: FeatureId, properties: &Properties) -> Properties {
        self.registry().path_properties(feature_id, properties)
    }

    // Path types

    pub fn path_types(&self) -> Vec<PathTypeInfo> {
        self.paths.path_types()
    }

    pub fn path_type_enabled(&self, path_type: &str) -> bool {
        self.paths.path_type_enabled(path_type)
    }

    pub fn enable_path_type(&mut self, path_type: &str, enable: bool, force: bool) -> bool {
        self.paths
            .enable_path_type(path_type, enable, force, &mut self.renderer)
    }

    // Centrelines

    pub fn have_centrelines(&self) -> bool {
        self.paths.have_centrelines()
    }

    pub fn centrelines_enabled(&self) -> bool {
        self.paths.centrelines_enabled()
    }

    /// Master toggle for the centreline geometry
    pub fn enable_centrelines(&mut self, enable: bool, force: bool) -> bool {
        self.paths
            .enable_path_type(PathType::CENTRELINE, enable, force, &mut self.renderer)
    }

    pub fn nerve_centreline_details(&self) -> &[CentrelineDetails] {
        self.centrelines.nerve_centreline_details()
    }

    pub fn enable_paths_by_centreline(
        &mut self,
        centreline_id: &str,
        enable: bool,
        force: bool,
    ) -> bool {
        self.centrelines.enable_paths_by_centreline(
            centreline_id,
            enable,
            force,
            &self.paths,
            &mut self.renderer,
        )
    }

    // Systems

    pub fn systems(&self) -> Vec<SystemSummary> {
        self.systems.systems()
    }

    pub fn system(&self, system_id: &str) -> Option<&System> {
        self.systems.system(system_id)
    }

    pub fn system_enabled(&self, system_id: &str) -> bool {
        self.systems.system_enabled(system_id)
    }

    pub fn enable_system(&mut self, system_id: &str, enable: bool) -> bool {
        self.systems
            .enable(system_id, enable, &mut self.paths, &mut self.renderer)
    }

    /// Reference-counted path toggle for a system, without changing the
    /// system's own state
    pub fn enable_paths_by_system(&mut self, system_id: &str, enable: bool, force: bool) -> bool {
        let Some(system) = self.systems.system(system_id) else {
            debug!("Ignoring paths of unknown system {}", system_id);
            return false;
        };
        self.paths
            .enable_paths_by_system(system, enable, force, &mut self.renderer)
    }

    pub fn system_membership_count(&self, path_id: &str) -> u32 {
        self.paths.system_membership_count(path_id)
    }

    // Watchers

    pub fn add_watcher<F>(&self, callback: F) -> WatcherId
    where
        F: Fn(&PathChange) + Send + Sync + 'static,
    {
        self.paths.add_watcher(callback)
    }

    pub fn remove_watcher(&self, id: WatcherId) -> bool {
        self.paths.remove_watcher(id)
    }
}
