// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Renderer-agnostic feature visibility interface
//!
//! The pathways engine never touches geometry or paint styles. Renderers
//! implement `FeatureRenderer` to receive the visibility transitions the
//! engine decides on.

use serde::Serialize;

use crate::types::FeatureId;

/// A rendered feature whose record is already resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapFeature {
    pub id: FeatureId,
    pub children: Vec<FeatureId>,
}

/// External renderer collaborator
pub trait FeatureRenderer {
    /// Set one feature's visibility; `force` bypasses the renderer's own state
    fn enable_feature(&mut self, feature_id: FeatureId, enable: bool, force: bool);

    /// Set a container feature's visibility, cascading to its descendants
    fn enable_feature_with_children(&mut self, feature_id: FeatureId, enable: bool, force: bool);

    /// Structural toggle of a resolved feature
    fn enable_map_feature(&mut self, feature: &MapFeature, enable: bool);
}

impl<T: FeatureRenderer + ?Sized> FeatureRenderer for &mut T {
    fn enable_feature(&mut self, feature_id: FeatureId, enable: bool, force: bool) {
        (**self).enable_feature(feature_id, enable, force)
    }

    fn enable_feature_with_children(&mut self, feature_id: FeatureId, enable: bool, force: bool) {
        (**self).enable_feature_with_children(feature_id, enable, force)
    }

    fn enable_map_feature(&mut self, feature: &MapFeature, enable: bool) {
        (**self).enable_map_feature(feature, enable)
    }
}

/// One call received by a [`RecordingRenderer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererCall {
    Feature {
        id: FeatureId,
        enable: bool,
        force: bool,
    },
    FeatureWithChildren {
        id: FeatureId,
        enable: bool,
        force: bool,
    },
    MapFeature {
        id: FeatureId,
        enable: bool,
    },
}

impl RendererCall {
    pub fn feature_id(&self) -> FeatureId {
        match *self {
            RendererCall::Feature { id, .. }
            | RendererCall::FeatureWithChildren { id, .. }
            | RendererCall::MapFeature { id, .. } => id,
        }
    }
}

/// Renderer that records every call, for tests and headless use
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    calls: Vec<RendererCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[RendererCall] {
        &self.calls
    }

    /// Drop recorded calls, returning them
    pub fn take(&mut self) -> Vec<RendererCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Number of `enable_feature` calls for `feature_id` with the given state
    pub fn feature_calls(&self, feature_id: FeatureId, enable: bool) -> usize {
        self.calls
            .iter()
            .filter(|call| {
                matches!(call, RendererCall::Feature { id, enable: e, .. } if *id == feature_id && *e == enable)
            })
            .count()
    }

    /// Features passed to `enable_feature` with the given state, in call order
    pub fn enabled_features(&self, enable: bool) -> Vec<FeatureId> {
        self.calls
            .iter()
            .filter_map(|call| match *call {
                RendererCall::Feature { id, enable: e, .. } if e == enable => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl FeatureRenderer for RecordingRenderer {
    fn enable_feature(&mut self, feature_id: FeatureId, enable: bool, force: bool) {
        self.calls.push(RendererCall::Feature {
            id: feature_id,
            enable,
            force,
        });
    }

    fn enable_feature_with_children(&mut self, feature_id: FeatureId, enable: bool, force: bool) {
        self.calls.push(RendererCall::FeatureWithChildren {
            id: feature_id,
            enable,
            force,
        });
    }

    fn enable_map_feature(&mut self, feature: &MapFeature, enable: bool) {
        self.calls.push(RendererCall::MapFeature {
            id: feature.id,
            enable,
        });
    }
}
