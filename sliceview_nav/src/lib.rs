// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview Nav: pointer and keyboard navigation for slice-view scenes.
//!
//! The [`NavigationController`] turns decoded input events (window
//! coordinates plus button and modifier state, delivered by the host) into
//! scene operations: panning, dollying, and zooming a view in navigate
//! mode, dragging and rotating sibling cutting planes in plane-drag mode,
//! and driving the shared cursor and markers in marker mode. One
//! controller serves one window host; its drag state is the only thing it
//! owns, everything else lives in the [`Scene`](sliceview_scene::Scene).
//!
//! The input vocabulary ([`InputState`], [`PointerButton`], [`Modifiers`],
//! [`ToolMode`]) is defined by `sliceview_scene` (layers consume it too)
//! and re-exported here for convenience.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use sliceview_nav::{InputState, Modifiers, NavigationController, PointerButton, ToolMode};
//! use sliceview_scene::Scene;
//! use sliceview_view::Axis;
//!
//! let mut scene = Scene::new();
//! let view = scene.insert_view(Axis::Z);
//! scene.reshape(view, 256, 256)?;
//!
//! // A control-click recenters the view on the click and doubles the zoom.
//! let mut nav = NavigationController::new();
//! let input = InputState {
//!     button: Some(PointerButton::Primary),
//!     modifiers: Modifiers::CONTROL,
//! };
//! nav.pointer_down(&mut scene, view, Point::new(64.0, 128.0), &input, ToolMode::Navigate)?;
//! nav.pointer_up(&mut scene, view, Point::new(64.0, 128.0), &input, ToolMode::Navigate)?;
//!
//! let state = scene.view(view).unwrap().state();
//! assert_eq!(state.center().x, -64.0);
//! assert_eq!(state.zoom(), 2.0);
//! # Ok::<(), sliceview_scene::SceneError>(())
//! ```

mod controller;

pub use controller::{NavKey, NavigationController};
pub use sliceview_scene::{InputState, Modifiers, PointerButton, ToolMode};
