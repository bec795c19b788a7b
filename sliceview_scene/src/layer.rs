// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;

use nalgebra::Point3;
use sliceview_view::ViewState;

use crate::ids::ViewId;
use crate::input::{InputState, ToolMode};

/// Content rendered into slice views.
///
/// Layers own the pixels: the scene hands them a zeroed frame buffer and
/// the view parameters, and they rasterize themselves. The scene never
/// samples or filters their data. All methods have inert defaults so a
/// layer only implements what it cares about.
pub trait Layer: Debug {
    /// The view width in pixels, pushed on every reshape.
    fn set_width(&mut self, width: u32) {
        let _ = width;
    }

    /// The view height in pixels, pushed on every reshape.
    fn set_height(&mut self, height: u32) {
        let _ = height;
    }

    /// Whether the layer changed and wants its views redrawn. Polled
    /// after tool forwarding.
    fn want_redisplay(&self) -> bool {
        false
    }

    /// Called once the pending redisplay has been requested.
    fn redisplay_posted(&mut self) {}

    /// How far one keyboard step moves the view along each world axis.
    /// The level-0 layer of a view supplies its increments.
    fn preferred_in_plane_increments(&self) -> [f64; 3] {
        [1.0; 3]
    }

    /// Label/value pairs describing this layer's content at a world
    /// point, for the hover and cursor readouts.
    fn info_at(&self, world: &Point3<f64>) -> Vec<(String, String)> {
        let _ = world;
        Vec::new()
    }

    /// A tool event at a world point, forwarded from the view's input
    /// handling.
    fn handle_tool(
        &mut self,
        world: &Point3<f64>,
        state: &ViewState,
        view: ViewId,
        tool: ToolMode,
        input: &InputState,
    ) {
        let _ = (world, state, view, tool, input);
    }

    /// Rasterizes this layer into an RGBA frame buffer of
    /// `width × height` pixels.
    fn composite(&mut self, buffer: &mut [u8], width: u32, height: u32, state: &ViewState) {
        let _ = (buffer, width, height, state);
    }
}
