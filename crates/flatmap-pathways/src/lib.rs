// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
# Flatmap Pathways

Connectivity pathway engine for anatomical flatmaps.

Given map-build metadata (paths, their line, node and nerve features,
type and model tables, per-feature annotations) this crate decides which
rendered features must change visibility when a user toggles a path type,
a nerve centreline or an anatomical system. It never touches geometry:
all visual changes go through the [`FeatureRenderer`] trait.

## Architecture

- [`IndexBuilder`] turns the input documents into immutable reverse indices
- [`PathRegistry`] answers footprint and model queries over those indices
- [`RefCounter`] is the reference-counting primitive behind overlapping
  ownership: a feature only changes when its first owner turns on or its
  last owner turns off
- [`CentrelineController`] and [`SystemController`] implement the
  grouping controls
- [`WatcherHub`] notifies subscribers of aggregate changes
- [`FlatmapPathways`] owns all of the above for one map

## Example

```rust,no_run
use flatmap_pathways::{
    Annotations, FlatmapPathways, PathwaysData, PathwaysOptions, RecordingRenderer,
};

let data = PathwaysData::from_json(r#"{"paths": {"P1": {"lines": [10]}}}"#)?;
let mut pathways = FlatmapPathways::new(
    &data,
    &Annotations::new(),
    &PathwaysOptions::default(),
    RecordingRenderer::new(),
);
pathways.enable_path_type("other", false, false);
# Ok::<(), flatmap_pathways::PathwaysError>(())
```

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

pub mod centrelines;
pub mod data;
pub mod index_builder;
pub mod options;
pub mod path_manager;
pub mod path_types;
pub mod pathways;
pub mod ref_count;
pub mod registry;
pub mod renderer;
pub mod systems;
pub mod types;
pub mod watchers;

pub use centrelines::{CentrelineController, CentrelineDetails, NO_NERVES_ID, NO_NERVES_LABEL};
pub use data::{
    Annotations, ConnectivityModel, FeatureAnnotation, PathDescriptor, PathwaysData, Properties,
};
pub use index_builder::{IndexBuilder, Path, PathIndices};
pub use options::PathwaysOptions;
pub use path_manager::PathManager;
pub use path_types::{path_type_template, PathTypeInfo, PathTypeTemplate, PATH_TYPES};
pub use pathways::FlatmapPathways;
pub use ref_count::{RefCounter, Transition};
pub use registry::PathRegistry;
pub use renderer::{FeatureRenderer, MapFeature, RecordingRenderer, RendererCall};
pub use systems::{ComponentDescriptor, System, SystemController, SystemSummary};
pub use types::{
    CentrelineId, FeatureId, FeatureSet, ModelId, PathChange, PathId, PathType, PathwaysError,
    PathwaysResult, SystemId,
};
pub use watchers::{WatcherHub, WatcherId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
