// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Vec2};
use nalgebra::{Point3, Vector3};
use sliceview_scene::{
    InfoSet, InputState, Modifiers, PointerButton, Scene, SceneError, ToolMode, ViewId,
};
use sliceview_space::Affine3;
use sliceview_view::{Axis, ViewState};

/// How far one drag of the full window width or height rotates a dragged
/// plane, in radians. Slightly over a full turn, so an edge-to-edge drag
/// always passes through every orientation.
const PLANE_ROTATION_SWEEP: f64 = 6.3;

/// Vertical drag units per doubling step of the zoom drag.
const ZOOM_DRAG_SCALE: f64 = 10.0;

/// Keyboard step distance when control is held, in window units. Set
/// outright, not applied as a factor.
const CONTROL_STEP: f64 = 10.0;

/// A decoded navigation key. The host maps its raw key names onto these
/// before calling in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    /// Pan one step left.
    MoveLeft,
    /// Pan one step right.
    MoveRight,
    /// Pan one step up.
    MoveUp,
    /// Pan one step down.
    MoveDown,
    /// Step the slice into the world along the principal axis.
    MoveIn,
    /// Step the slice out of the world along the principal axis.
    MoveOut,
    /// Double the zoom factor.
    ZoomIn,
    /// Halve the zoom factor.
    ZoomOut,
}

/// A window-space delta mapped onto world axes for a view's principal
/// axis: `lr` and `ud` are the in-plane directions, `io` is along the
/// axis itself.
fn window_delta(axis: Axis, lr: f64, ud: f64, io: f64) -> Vector3<f64> {
    match axis {
        Axis::X => Vector3::new(io, lr, ud),
        Axis::Y => Vector3::new(lr, io, ud),
        Axis::Z => Vector3::new(lr, ud, io),
    }
}

/// Drives one view's pointer and keyboard interaction against a scene.
///
/// The controller is per-window-host state: the pointer position at the
/// last event, the zoom-normalized delta accumulated since button-down,
/// and the values captured when the drag started. Drags always apply the
/// whole accumulated delta to the captured values rather than stepping
/// the live ones, so a drag is exact no matter how events were coalesced.
#[derive(Clone, Debug)]
pub struct NavigationController {
    last_window: Point,
    accumulated: Vec2,
    drag_center: Point3<f64>,
    drag_zoom: f64,
    drag_normal: Vector3<f64>,
    /// The sibling view whose plane a plane drag is moving.
    target: Option<ViewId>,
}

impl NavigationController {
    /// Creates a controller with no drag in progress.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last_window: Point::ZERO,
            accumulated: Vec2::ZERO,
            drag_center: Point3::origin(),
            drag_zoom: 1.0,
            drag_normal: Vector3::z(),
            target: None,
        }
    }

    /// A button went down over `view` at window position `window`.
    ///
    /// Captures the drag baseline. In plane-drag mode this also picks the
    /// drag target: the visible sibling whose cached intersection segment
    /// passes closest to the click's world point, with its center and
    /// normal captured in place of the view's own.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        view: ViewId,
        window: Point,
        input: &InputState,
        tool: ToolMode,
    ) -> Result<(), SceneError> {
        let record = scene.view(view).ok_or(SceneError::ViewNotFound(view))?;
        self.last_window = window;
        self.accumulated = Vec2::ZERO;
        self.drag_center = record.state().center();
        self.drag_zoom = record.state().zoom();
        self.drag_normal = record.state().plane_normal();
        self.target = None;

        let world = scene.window_to_world(view, window)?;

        if tool == ToolMode::PlaneDrag {
            self.pick_plane_target(scene, view, &world);
        }

        if !input.control_chord() {
            scene.forward_tool_to_layers(view, &world, tool, input)?;
        }
        Ok(())
    }

    fn pick_plane_target(&mut self, scene: &Scene, view: ViewId, world: &Point3<f64>) {
        let Some(record) = scene.view(view) else {
            return;
        };
        let mut best: Option<(ViewId, f64)> = None;
        for sibling in scene.views() {
            if sibling.id() == view || !sibling.is_visible_in_frame() {
                continue;
            }
            let Some(segment) = record.intersection_with(sibling.id()) else {
                continue;
            };
            let distance = segment.distance_to(world);
            // <= so that among equidistant planes the most recently
            // registered wins, matching the fan-out order.
            if best.is_none_or(|(_, held)| distance <= held) {
                best = Some((sibling.id(), distance));
            }
        }
        if let Some((target, _)) = best
            && let Some(picked) = scene.view(target)
        {
            self.drag_center = picked.state().center();
            self.drag_normal = picked.state().plane_normal();
            self.target = Some(target);
        }
    }

    /// The pointer moved to `window` with `input` held.
    pub fn pointer_moved(
        &mut self,
        scene: &mut Scene,
        view: ViewId,
        window: Point,
        input: &InputState,
        tool: ToolMode,
    ) -> Result<(), SceneError> {
        let record = scene.view(view).ok_or(SceneError::ViewNotFound(view))?;
        let state = *record.state();

        // Accumulate from the drag start, normalized by zoom so a drag
        // covers the same world distance at any magnification. The sign
        // convention (last − current) makes the content follow the
        // pointer when the delta is applied to the center.
        self.accumulated += Vec2::new(
            (self.last_window.x - window.x) / state.zoom(),
            (self.last_window.y - window.y) / state.zoom(),
        );
        self.last_window = window;

        let world = scene.window_to_world(view, window)?;
        scene.rebuild_info(view, &world, InfoSet::Mouse)?;

        let mut lr = self.accumulated.x;
        if state.mirrors_x() {
            lr = -lr;
        }
        let ud = self.accumulated.y;

        // Control and shift chords belong to the recenter click and the
        // layer tools; a drag with either held must not navigate.
        let chord_held = input
            .modifiers
            .intersects(Modifiers::CONTROL | Modifiers::SHIFT);

        match (tool, if chord_held { None } else { input.button }) {
            (ToolMode::Navigate, Some(PointerButton::Primary)) => {
                let delta = window_delta(state.in_plane(), lr, ud, 0.0);
                let center = scene.translate_in_window_space(view, &self.drag_center, &delta)?;
                scene.set_center(view, center)?;
            }
            (ToolMode::Navigate, Some(PointerButton::Middle)) => {
                let delta = window_delta(state.in_plane(), 0.0, 0.0, ud);
                let center = scene.translate_in_window_space(view, &self.drag_center, &delta)?;
                scene.set_center(view, center)?;
            }
            (ToolMode::Navigate | ToolMode::PlaneDrag, Some(PointerButton::Secondary)) => {
                scene.set_zoom(view, self.drag_zoom + self.accumulated.y / ZOOM_DRAG_SCALE)?;
            }
            (ToolMode::PlaneDrag, Some(PointerButton::Primary)) => {
                if let Some(target) = self.target {
                    let delta = window_delta(state.in_plane(), -lr, -ud, 0.0);
                    let center =
                        scene.translate_in_window_space(view, &self.drag_center, &delta)?;
                    if let Err(error) = scene.set_center(target, center) {
                        log::warn!("plane drag could not move {target}: {error}");
                    }
                }
            }
            (ToolMode::PlaneDrag, Some(PointerButton::Middle)) => {
                if let Some(target) = self.target {
                    self.rotate_target(scene, &state, target);
                }
            }
            _ => {}
        }

        if !input.control_chord() {
            scene.forward_tool_to_layers(view, &world, tool, input)?;
        }
        Ok(())
    }

    /// Rotates the drag target's captured normal about this view's own
    /// normal, by the larger window-relative drag fraction scaled to a
    /// full sweep.
    fn rotate_target(&self, scene: &mut Scene, state: &ViewState, target: ViewId) {
        let width = f64::from(state.buffer_width().max(1));
        let height = f64::from(state.buffer_height().max(1));
        let across = self.accumulated.x / width;
        let down = self.accumulated.y / height;
        let fraction = if across.abs() > down.abs() { across } else { down };

        let rotation = Affine3::rotation_about(
            Point3::origin(),
            state.plane_normal(),
            fraction * PLANE_ROTATION_SWEEP,
        );
        let normal = rotation.transform_vector(&self.drag_normal);
        // The rotation can push the normal past the skew limit; the drag
        // simply stops there until it swings back.
        if let Err(error) = scene.set_plane_normal(target, normal) {
            log::debug!("plane rotation for {target} held at the limit: {error}");
        }
    }

    /// A button came up over `view` at window position `window`.
    pub fn pointer_up(
        &mut self,
        scene: &mut Scene,
        view: ViewId,
        window: Point,
        input: &InputState,
        tool: ToolMode,
    ) -> Result<(), SceneError> {
        let world = scene.window_to_world(view, window)?;

        if input.control_chord() {
            // Control-click: recenter on the click, button 1 zooms in and
            // button 3 out. The recenter goes through the broadcasting
            // setter so linked siblings follow; the zoom step is this
            // pane's own and stays quiet.
            scene.set_center(view, world)?;
            let zoom = scene
                .view(view)
                .ok_or(SceneError::ViewNotFound(view))?
                .state()
                .zoom();
            match input.button {
                Some(PointerButton::Primary) => scene.set_zoom_quietly(view, zoom * 2.0)?,
                Some(PointerButton::Secondary) => scene.set_zoom_quietly(view, zoom / 2.0)?,
                _ => {}
            }
            self.target = None;
            return Ok(());
        }

        match tool {
            ToolMode::Marker => match input.button {
                Some(PointerButton::Primary) => scene.set_cursor(world)?,
                Some(PointerButton::Middle) => scene.place_marker(world)?,
                Some(PointerButton::Secondary) => scene.hide_nearest_marker(world)?,
                None => {}
            },
            ToolMode::PlaneDrag => {
                if input.button == Some(PointerButton::Secondary)
                    && let Some(target) = self.target
                    && let Err(error) = scene.reset_plane_normal(target)
                {
                    log::warn!("plane reset for {target} failed: {error}");
                }
                self.target = None;
            }
            ToolMode::Navigate | ToolMode::Inactive => {}
        }

        scene.forward_tool_to_layers(view, &world, tool, input)?;
        Ok(())
    }

    /// A decoded navigation key went down with the pointer at `window`.
    ///
    /// Pans step one window unit (the in/out step uses the view's
    /// per-axis increments instead); holding control sets the step to a
    /// fixed long stride. Zoom keys double or halve, onto the usual
    /// floor.
    pub fn key_down(
        &mut self,
        scene: &mut Scene,
        view: ViewId,
        window: Point,
        key: NavKey,
        input: &InputState,
    ) -> Result<(), SceneError> {
        let record = scene.view(view).ok_or(SceneError::ViewNotFound(view))?;
        let state = *record.state();
        let increments = record.increments();

        let step = |base: f64| {
            if input.modifiers.contains(Modifiers::CONTROL) {
                CONTROL_STEP
            } else {
                base
            }
        };

        match key {
            NavKey::ZoomIn => scene.set_zoom(view, state.zoom() * 2.0)?,
            NavKey::ZoomOut => scene.set_zoom(view, state.zoom() / 2.0)?,
            _ => {
                // Left/right signs are per-axis: an X view pans the
                // opposite way from the planar views, and the flip
                // mirror does not apply to key steps.
                let key_lr = |sign: f64| {
                    if state.in_plane() == Axis::X {
                        -sign * step(1.0)
                    } else {
                        sign * step(1.0)
                    }
                };
                let (mut lr, mut ud, mut io) = (0.0, 0.0, 0.0);
                match key {
                    NavKey::MoveLeft => lr = key_lr(1.0),
                    NavKey::MoveRight => lr = key_lr(-1.0),
                    NavKey::MoveUp => ud = -step(1.0),
                    NavKey::MoveDown => ud = step(1.0),
                    NavKey::MoveIn => io = step(increments[state.in_plane().index()]),
                    NavKey::MoveOut => io = -step(increments[state.in_plane().index()]),
                    NavKey::ZoomIn | NavKey::ZoomOut => {}
                }
                let delta = window_delta(state.in_plane(), lr, ud, io);
                let center =
                    scene.translate_in_window_space(view, &state.center(), &delta)?;
                scene.set_center(view, center)?;
            }
        }

        let world = scene.window_to_world(view, window)?;
        scene.rebuild_info(view, &world, InfoSet::Mouse)?;
        Ok(())
    }
}

impl Default for NavigationController {
    fn default() -> Self {
        Self::new()
    }
}
