// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview Scene: the shared state behind a set of synchronized slice
//! views.
//!
//! A [`Scene`] owns everything its views have in common: the registry of
//! World↔View transforms, the registry of [`Layer`] content, the linkage
//! table, the broadcast hub, the marker store, and the global cursor.
//! Views are registered with [`Scene::insert_view`] and mutated through
//! scene operations; the scene keeps each view's derived transforms and
//! intersection records current and propagates changes to linked siblings
//! without feedback.
//!
//! Nothing here is process-global. Two scenes in one process are fully
//! independent, which is also what makes the propagation semantics easy to
//! test.
//!
//! ## Minimal example
//!
//! ```rust
//! use nalgebra::Point3;
//! use sliceview_scene::Scene;
//! use sliceview_view::Axis;
//!
//! let mut scene = Scene::new();
//! let sagittal = scene.insert_view(Axis::X);
//! let axial = scene.insert_view(Axis::Z);
//! scene.reshape(sagittal, 256, 256)?;
//! scene.reshape(axial, 256, 256)?;
//!
//! // Linked views share center and zoom.
//! scene.set_linked(sagittal, true)?;
//! scene.set_linked(axial, true)?;
//! scene.set_center(axial, Point3::new(4.0, 8.0, -2.0))?;
//!
//! let follower = scene.view(sagittal).unwrap();
//! assert_eq!(follower.state().center(), Point3::new(4.0, 8.0, -2.0));
//! # Ok::<(), sliceview_scene::SceneError>(())
//! ```

mod error;
mod ids;
mod input;
mod layer;
mod scene;
mod view;

pub use error::SceneError;
pub use ids::{LayerId, TransformId, ViewId};
pub use input::{InputState, Modifiers, PointerButton, ToolMode};
pub use layer::Layer;
pub use scene::Scene;
pub use view::{InfoSet, View};
