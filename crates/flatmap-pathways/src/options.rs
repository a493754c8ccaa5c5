// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Construction options for a loaded map

use serde::{Deserialize, Serialize};

/// Options applied when building the pathways state of one map
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PathwaysOptions {
    /// Enable every system as soon as the map is loaded
    pub systems_enabled_by_default: bool,

    /// The map is rendered in centreline style; collect every centreline
    /// label even when no path references the centreline
    pub centreline_style: bool,
}
