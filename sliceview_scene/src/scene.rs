// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::mem;

use hashbrown::HashMap;
use kurbo::Point;
use nalgebra::{Matrix4, Point3, Vector3};
use smallvec::SmallVec;

use sliceview_link::{
    Admission, LinkBroadcastHub, LinkageTable, SubscriberSet, ViewChange,
};
use sliceview_marker::MarkerStore;
use sliceview_space::Affine3;
use sliceview_view::{Axis, ViewState, intersection_segment};

use crate::error::SceneError;
use crate::ids::{LayerId, TransformId, ViewId};
use crate::input::{InputState, ToolMode};
use crate::layer::Layer;
use crate::view::{InfoSet, View};

fn finite(point: &Point3<f64>) -> bool {
    point.coords.iter().all(|c| c.is_finite())
}

/// A collection of synchronized slice views over one shared 3D world.
///
/// The scene owns everything the views share: the transform registry, the
/// layer registry, the linkage table, the broadcast hub, the marker store,
/// and the global cursor. Nothing here is process-global, so independent
/// scenes coexist freely.
///
/// Mutations go through scene operations rather than through the view
/// records directly; that is what keeps derived transforms, intersection
/// caches, and linked siblings in step.
#[derive(Debug)]
pub struct Scene {
    /// Registration order; broadcasts deliver in this order.
    views: Vec<View>,
    transforms: HashMap<TransformId, Affine3>,
    transform_subscribers: SubscriberSet<TransformId, ViewId>,
    layers: HashMap<LayerId, Box<dyn Layer>>,
    linkage: LinkageTable<ViewId>,
    hub: LinkBroadcastHub<ViewId>,
    markers: MarkerStore,
    cursor: Point3<f64>,
    next_view: u32,
    next_transform: u32,
    next_layer: u32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Creates an empty scene holding only the identity transform.
    #[must_use]
    pub fn new() -> Self {
        let mut transforms = HashMap::new();
        transforms.insert(TransformId::IDENTITY, Affine3::identity());
        Self {
            views: Vec::new(),
            transforms,
            transform_subscribers: SubscriberSet::new(),
            layers: HashMap::new(),
            linkage: LinkageTable::new(),
            hub: LinkBroadcastHub::new(),
            markers: MarkerStore::default(),
            cursor: Point3::origin(),
            next_view: 0,
            next_transform: 1,
            next_layer: 0,
        }
    }

    // Lookup plumbing. The view set stays small (a handful of panes), so
    // views live in a Vec scanned linearly.

    fn position(&self, view: ViewId) -> Option<usize> {
        self.views.iter().position(|v| v.id == view)
    }

    fn view_index(&self, view: ViewId) -> Result<usize, SceneError> {
        self.position(view).ok_or(SceneError::ViewNotFound(view))
    }

    fn transform(&self, id: TransformId) -> Affine3 {
        self.transforms.get(&id).copied().unwrap_or_default()
    }

    /// The view with this id, if registered.
    #[must_use]
    pub fn view(&self, view: ViewId) -> Option<&View> {
        self.position(view).map(|index| &self.views[index])
    }

    /// All registered views, in registration order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// The shared cursor point.
    #[must_use]
    pub fn cursor(&self) -> Point3<f64> {
        self.cursor
    }

    /// The shared marker store.
    #[must_use]
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }

    // View registration.

    /// Registers a new view slicing along `in_plane` and tells every
    /// sibling about it, so both sides hold intersection records for each
    /// other from the start.
    pub fn insert_view(&mut self, in_plane: Axis) -> ViewId {
        let id = ViewId(self.next_view);
        self.next_view += 1;

        let subscription = self
            .transform_subscribers
            .subscribe(TransformId::IDENTITY, id);
        let mut view = View::new(id, ViewState::new(in_plane), subscription);
        let world_to_view = self.transform(TransformId::IDENTITY);
        view.pipeline.rebuild(&view.state, &world_to_view);
        self.views.push(view);

        self.refresh_own_records(id);
        self.broadcast(ViewChange::ViewCreated(id));
        id
    }

    /// Unregisters a view and forgets everything the scene tracked for it.
    pub fn remove_view(&mut self, view: ViewId) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let record = self.views.remove(index);
        self.transform_subscribers
            .unsubscribe(record.transform_subscription);
        self.linkage.remove(view);
        for sibling in &mut self.views {
            sibling.intersections.remove(&view);
        }
        Ok(())
    }

    // Slice parameter setters. Each validates, writes, re-derives, and
    // fans out; the hub drops the nested broadcasts linked copies raise.

    /// Moves a view's world-space center.
    pub fn set_center(&mut self, view: ViewId, center: Point3<f64>) -> Result<(), SceneError> {
        if !finite(&center) {
            return Err(SceneError::InvalidArgument("center must be finite"));
        }
        let index = self.view_index(view)?;
        self.views[index].state.set_center(center);
        self.rebuild_pipeline(index);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        self.broadcast(ViewChange::Center(view));
        Ok(())
    }

    /// Sets a view's zoom factor, clamped to the floor.
    pub fn set_zoom(&mut self, view: ViewId, zoom: f64) -> Result<(), SceneError> {
        self.write_zoom(view, zoom)?;
        self.broadcast(ViewChange::Zoom(view));
        Ok(())
    }

    /// Sets a view's zoom without telling linked siblings. The recenter
    /// click's zoom step uses this: the step is a statement about one
    /// pane, not a navigation the whole linked group should follow.
    pub fn set_zoom_quietly(&mut self, view: ViewId, zoom: f64) -> Result<(), SceneError> {
        self.write_zoom(view, zoom)
    }

    fn write_zoom(&mut self, view: ViewId, zoom: f64) -> Result<(), SceneError> {
        if !zoom.is_finite() {
            return Err(SceneError::InvalidArgument("zoom must be finite"));
        }
        let index = self.view_index(view)?;
        self.views[index].state.set_zoom(zoom);
        // The window corners anchor the intersection records, and zoom
        // moves the corners.
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        Ok(())
    }

    /// Changes a view's principal slicing axis. Switching axes resets the
    /// plane normal to the new axis's canonical orientation.
    pub fn set_in_plane(&mut self, view: ViewId, in_plane: Axis) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        self.views[index].state.set_in_plane(in_plane);
        self.rebuild_pipeline(index);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        self.broadcast(ViewChange::InPlane(view));
        Ok(())
    }

    /// Tilts a view's cutting plane. The normal is normalized before
    /// storage and must keep a dominant component along the principal
    /// axis.
    pub fn set_plane_normal(
        &mut self,
        view: ViewId,
        normal: Vector3<f64>,
    ) -> Result<(), SceneError> {
        if !normal.iter().all(|c| c.is_finite()) {
            return Err(SceneError::InvalidArgument("plane normal must be finite"));
        }
        let index = self.view_index(view)?;
        if !self.views[index].state.set_plane_normal(normal) {
            return Err(SceneError::InvalidArgument(
                "plane normal must keep a dominant component along the principal axis",
            ));
        }
        self.rebuild_pipeline(index);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        self.broadcast(ViewChange::PlaneNormal(view));
        Ok(())
    }

    /// Restores a view's cutting plane to its canonical orthogonal
    /// orientation.
    pub fn reset_plane_normal(&mut self, view: ViewId) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        self.views[index].state.reset_plane_normal();
        self.rebuild_pipeline(index);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        self.broadcast(ViewChange::PlaneNormal(view));
        Ok(())
    }

    /// Sets the left-right mirror flag (honored for Y/Z views).
    pub fn set_flip_left_right(&mut self, view: ViewId, flip: bool) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        self.views[index].state.set_flip_left_right(flip);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        Ok(())
    }

    // Linking and per-view flags.

    /// Flags a view as a member of the linked group. Two views follow each
    /// other's center and zoom exactly when both are flagged.
    pub fn set_linked(&mut self, view: ViewId, linked: bool) -> Result<(), SceneError> {
        self.view_index(view)?;
        self.linkage.set_linked(view, linked);
        Ok(())
    }

    /// Whether a view is a member of the linked group.
    #[must_use]
    pub fn is_linked(&self, view: ViewId) -> bool {
        self.linkage.is_linked(view)
    }

    /// Whether the view participates in the visible frame. Invisible views
    /// keep their state current but never get redisplay requests.
    pub fn set_visible_in_frame(&mut self, view: ViewId, visible: bool) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        self.views[index].visible_in_frame = visible;
        Ok(())
    }

    /// Whether the view recenters itself whenever the shared cursor moves.
    pub fn set_lock_on_cursor(&mut self, view: ViewId, lock: bool) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        self.views[index].lock_on_cursor = lock;
        Ok(())
    }

    // Transform registry.

    /// Registers a World↔View transform. The matrix must be invertible.
    pub fn create_transform(&mut self, matrix: Matrix4<f64>) -> Result<TransformId, SceneError> {
        let affine = Affine3::from_matrix(matrix)
            .ok_or(SceneError::InvalidArgument("transform matrix must be invertible"))?;
        let id = TransformId(self.next_transform);
        self.next_transform += 1;
        self.transforms.insert(id, affine);
        Ok(id)
    }

    /// Replaces a registered transform's matrix and re-derives every view
    /// subscribed to it.
    pub fn touch_transform(
        &mut self,
        id: TransformId,
        matrix: Matrix4<f64>,
    ) -> Result<(), SceneError> {
        if !self.transforms.contains_key(&id) {
            return Err(SceneError::TransformNotFound(id));
        }
        let affine = Affine3::from_matrix(matrix)
            .ok_or(SceneError::InvalidArgument("transform matrix must be invertible"))?;
        self.transforms.insert(id, affine);

        let listeners: SmallVec<[ViewId; 4]> = self.transform_subscribers.listeners(id).collect();
        for view in listeners {
            let Some(index) = self.position(view) else {
                log::warn!("transform notification skipped: {view} is gone");
                continue;
            };
            self.views[index].pipeline.rebuild_world_to_window(&affine);
            self.refresh_own_records(view);
            self.redisplay_if_visible(view);
        }
        Ok(())
    }

    /// Points a view at a registered World↔View transform and re-derives
    /// its composed transform.
    pub fn set_world_to_view_transform(
        &mut self,
        view: ViewId,
        transform: TransformId,
    ) -> Result<(), SceneError> {
        if !self.transforms.contains_key(&transform) {
            return Err(SceneError::TransformNotFound(transform));
        }
        let index = self.view_index(view)?;

        let old = self.views[index].transform_subscription;
        self.transform_subscribers.unsubscribe(old);
        self.views[index].transform_subscription =
            self.transform_subscribers.subscribe(transform, view);
        self.views[index].world_to_view = transform;

        let affine = self.transform(transform);
        self.views[index].pipeline.rebuild_world_to_window(&affine);
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        Ok(())
    }

    // Layer registry and per-view attachment.

    /// Registers a layer with the scene.
    pub fn insert_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = LayerId(self.next_layer);
        self.next_layer += 1;
        self.layers.insert(id, layer);
        id
    }

    /// Unregisters a layer and detaches it from every view.
    pub fn remove_layer(&mut self, layer: LayerId) -> Result<(), SceneError> {
        if self.layers.remove(&layer).is_none() {
            return Err(SceneError::LayerNotFound(layer));
        }
        let mut touched: SmallVec<[ViewId; 4]> = SmallVec::new();
        for view in &mut self.views {
            let had_level_zero = view.layers.get(&0) == Some(&layer);
            let before = view.layers.len();
            view.layers.retain(|_, attached| *attached != layer);
            if had_level_zero {
                view.increments = [1.0; 3];
            }
            if view.layers.len() != before {
                touched.push(view.id);
            }
        }
        for view in touched {
            self.redisplay_if_visible(view);
        }
        Ok(())
    }

    /// The registered layer behind an id.
    #[must_use]
    pub fn layer(&self, layer: LayerId) -> Option<&dyn Layer> {
        self.layers.get(&layer).map(|layer| &**layer)
    }

    /// Attaches a registered layer to a view at a draw level. The level-0
    /// layer supplies the view's keyboard movement increments.
    pub fn set_layer_at_level(
        &mut self,
        view: ViewId,
        layer: LayerId,
        level: u32,
    ) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let width = self.views[index].state.buffer_width();
        let height = self.views[index].state.buffer_height();

        let Some(entry) = self.layers.get_mut(&layer) else {
            return Err(SceneError::LayerNotFound(layer));
        };
        entry.set_width(width);
        entry.set_height(height);
        let increments = entry.preferred_in_plane_increments();

        let record = &mut self.views[index];
        record.layers.insert(level, layer);
        if level == 0 {
            record.increments = increments;
        }
        self.redisplay_if_visible(view);
        Ok(())
    }

    /// The layer a view has attached at a draw level.
    #[must_use]
    pub fn layer_at_level(&self, view: ViewId, level: u32) -> Option<LayerId> {
        self.view(view).and_then(|v| v.layer_at_level(level))
    }

    /// Detaches whatever layer a view has at a draw level.
    pub fn remove_layer_at_level(&mut self, view: ViewId, level: u32) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let record = &mut self.views[index];
        if record.layers.remove(&level).is_some() {
            if level == 0 {
                record.increments = [1.0; 3];
            }
            self.redisplay_if_visible(view);
        }
        Ok(())
    }

    /// Detaches all of a view's layers.
    pub fn remove_all_layers(&mut self, view: ViewId) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let record = &mut self.views[index];
        if !record.layers.is_empty() {
            record.layers.clear();
            record.increments = [1.0; 3];
            self.redisplay_if_visible(view);
        }
        Ok(())
    }

    /// The first draw level above every attached layer of a view.
    pub fn first_unused_draw_level(&self, view: ViewId) -> Result<u32, SceneError> {
        let index = self.view_index(view)?;
        Ok(self.views[index]
            .layers
            .last_key_value()
            .map_or(0, |(&level, _)| level + 1))
    }

    /// Copies one view's layer attachments and increments onto another,
    /// pushing the destination's dimensions into the shared layers.
    pub fn copy_layer_settings(&mut self, from: ViewId, to: ViewId) -> Result<(), SceneError> {
        let from_index = self.view_index(from)?;
        let to_index = self.view_index(to)?;

        let attachments = self.views[from_index].layers.clone();
        let increments = self.views[from_index].increments;
        let width = self.views[to_index].state.buffer_width();
        let height = self.views[to_index].state.buffer_height();

        for &layer in attachments.values() {
            let Some(entry) = self.layers.get_mut(&layer) else {
                log::warn!("layer copy skipped missing {layer}");
                continue;
            };
            entry.set_width(width);
            entry.set_height(height);
        }

        let record = &mut self.views[to_index];
        record.layers = attachments;
        record.increments = increments;
        self.redisplay_if_visible(to);
        Ok(())
    }

    // Frame buffer and rendering.

    /// Resizes a view's window: reallocates the RGBA frame buffer and
    /// pushes the new dimensions into the attached layers.
    pub fn reshape(&mut self, view: ViewId, width: i32, height: i32) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(SceneError::InvalidArgument(
                "reshape dimensions must be non-negative",
            ));
        };

        let bytes = u64::from(width) * u64::from(height) * 4;
        let bytes = usize::try_from(bytes)
            .map_err(|_| SceneError::BufferAllocation { width, height })?;
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(bytes)
            .map_err(|_| SceneError::BufferAllocation { width, height })?;
        buffer.resize(bytes, 0);

        self.views[index].state.set_buffer_size(width, height);
        self.views[index].frame_buffer = buffer;

        let attached: SmallVec<[LayerId; 4]> =
            self.views[index].layers.values().copied().collect();
        for layer in attached {
            let Some(entry) = self.layers.get_mut(&layer) else {
                log::warn!("reshape skipped missing {layer}");
                continue;
            };
            entry.set_width(width);
            entry.set_height(height);
        }

        // The corner anchors of the intersection records moved.
        self.refresh_own_records(view);
        self.redisplay_if_visible(view);
        Ok(())
    }

    /// Composites a view's layers bottom-up into its frame buffer and
    /// clears its redisplay request.
    pub fn render_view(&mut self, view: ViewId) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let state = self.views[index].state;
        let attached: SmallVec<[LayerId; 4]> =
            self.views[index].layers.values().copied().collect();

        let mut buffer = mem::take(&mut self.views[index].frame_buffer);
        buffer.fill(0);
        for layer in attached {
            let Some(entry) = self.layers.get_mut(&layer) else {
                log::warn!("compositing skipped missing {layer}");
                continue;
            };
            entry.composite(&mut buffer, state.buffer_width(), state.buffer_height(), &state);
        }

        let record = &mut self.views[index];
        record.frame_buffer = buffer;
        record.redisplay_requested = false;
        Ok(())
    }

    /// Drains the views whose redisplay was requested since the last call.
    pub fn take_redisplay_requests(&mut self) -> Vec<ViewId> {
        let mut requested = Vec::new();
        for view in &mut self.views {
            if view.redisplay_requested {
                view.redisplay_requested = false;
                requested.push(view.id);
            }
        }
        requested
    }

    // Cursor, markers, and readouts.

    /// Moves the shared cursor: every view rebuilds its cursor readout,
    /// and views locked on the cursor recenter onto it.
    pub fn set_cursor(&mut self, cursor: Point3<f64>) -> Result<(), SceneError> {
        if !finite(&cursor) {
            return Err(SceneError::InvalidArgument("cursor must be finite"));
        }
        self.cursor = cursor;
        let ids: SmallVec<[ViewId; 4]> = self.views.iter().map(|v| v.id).collect();
        for view in ids {
            if let Err(error) = self.rebuild_info(view, &cursor, InfoSet::Cursor) {
                log::warn!("cursor readout rebuild for {view} failed: {error}");
            }
        }
        self.broadcast(ViewChange::CursorMoved);
        Ok(())
    }

    /// Sets the number of marker slots.
    pub fn set_marker_capacity(&mut self, capacity: usize) {
        self.markers.set_capacity(capacity);
        self.broadcast(ViewChange::MarkersChanged);
    }

    /// Places the next marker (circular write) at a world point.
    pub fn place_marker(&mut self, position: Point3<f64>) -> Result<(), SceneError> {
        if !finite(&position) {
            return Err(SceneError::InvalidArgument("marker position must be finite"));
        }
        self.markers.place(position);
        self.broadcast(ViewChange::MarkersChanged);
        Ok(())
    }

    /// Hides the marker nearest to a world point.
    pub fn hide_nearest_marker(&mut self, position: Point3<f64>) -> Result<(), SceneError> {
        if !finite(&position) {
            return Err(SceneError::InvalidArgument("marker position must be finite"));
        }
        self.markers.hide_nearest(&position);
        self.broadcast(ViewChange::MarkersChanged);
        Ok(())
    }

    /// Rebuilds one of a view's label/value readouts for a world point:
    /// the view's own entries first, then each attached layer's
    /// contribution in draw-level order.
    pub fn rebuild_info(
        &mut self,
        view: ViewId,
        world: &Point3<f64>,
        set: InfoSet,
    ) -> Result<(), SceneError> {
        let index = self.view_index(view)?;

        let mut info = vec![
            ("View".to_owned(), view.to_string()),
            (
                "World".to_owned(),
                format!("{:.2} {:.2} {:.2}", world.x, world.y, world.z),
            ),
        ];
        for &layer in self.views[index].layers.values() {
            let Some(entry) = self.layers.get(&layer) else {
                log::warn!("readout skipped missing {layer}");
                continue;
            };
            info.extend(entry.info_at(world));
        }

        let record = &mut self.views[index];
        match set {
            InfoSet::Mouse => record.mouse_info = info,
            InfoSet::Cursor => record.cursor_info = info,
        }
        Ok(())
    }

    /// Forwards a tool event at a world point to a view's layers, in
    /// draw-level order.
    pub fn forward_tool_to_layers(
        &mut self,
        view: ViewId,
        world: &Point3<f64>,
        tool: ToolMode,
        input: &InputState,
    ) -> Result<(), SceneError> {
        let index = self.view_index(view)?;
        let state = self.views[index].state;
        let attached: SmallVec<[LayerId; 4]> =
            self.views[index].layers.values().copied().collect();

        let mut wants_redisplay = false;
        for layer in attached {
            let Some(entry) = self.layers.get_mut(&layer) else {
                log::warn!("tool forwarding skipped missing {layer}");
                continue;
            };
            entry.handle_tool(world, &state, view, tool, input);
            if entry.want_redisplay() {
                entry.redisplay_posted();
                wants_redisplay = true;
            }
        }
        if wants_redisplay {
            self.redisplay_if_visible(view);
        }
        Ok(())
    }

    // Coordinate conversion, delegated to the view's pipeline.

    /// Converts a window pixel of a view into world coordinates.
    pub fn window_to_world(&self, view: ViewId, window: Point) -> Result<Point3<f64>, SceneError> {
        let index = self.view_index(view)?;
        let record = &self.views[index];
        Ok(record.pipeline.window_to_world(&record.state, window))
    }

    /// Converts a world point into a view's nearest window pixel.
    pub fn world_to_window_pixel(
        &self,
        view: ViewId,
        world: &Point3<f64>,
    ) -> Result<(i32, i32), SceneError> {
        let index = self.view_index(view)?;
        let record = &self.views[index];
        Ok(record.pipeline.world_to_window_pixel(&record.state, world))
    }

    /// Moves a world point by a delta expressed in a view's window space.
    pub fn translate_in_window_space(
        &self,
        view: ViewId,
        world: &Point3<f64>,
        delta: &Vector3<f64>,
    ) -> Result<Point3<f64>, SceneError> {
        let index = self.view_index(view)?;
        Ok(self.views[index]
            .pipeline
            .translate_in_window_space(world, delta))
    }

    // Derivation and fan-out internals.

    fn rebuild_pipeline(&mut self, index: usize) {
        let world_to_view = self.transform(self.views[index].world_to_view);
        let state = self.views[index].state;
        self.views[index].pipeline.rebuild(&state, &world_to_view);
    }

    /// Recomputes `receiver`'s cached segment for `origin`'s plane. A
    /// parallel pair leaves the previous entry in place.
    fn refresh_record(&mut self, receiver: ViewId, origin: ViewId) {
        let (Some(ri), Some(oi)) = (self.position(receiver), self.position(origin)) else {
            log::warn!("intersection refresh skipped: {receiver} or {origin} is gone");
            return;
        };
        let normal = self.views[oi].state.plane_normal();
        let center = self.views[oi].state.center();
        let state = self.views[ri].state;
        let pipeline = self.views[ri].pipeline;
        if let Some(segment) = intersection_segment(&state, &pipeline, &normal, &center) {
            self.views[ri].intersections.insert(origin, segment);
        }
    }

    fn refresh_own_records(&mut self, view: ViewId) {
        let others: SmallVec<[ViewId; 4]> = self
            .views
            .iter()
            .map(|v| v.id)
            .filter(|&other| other != view)
            .collect();
        for other in others {
            self.refresh_record(view, other);
        }
    }

    fn redisplay_if_visible(&mut self, view: ViewId) {
        if let Some(index) = self.position(view)
            && self.views[index].visible_in_frame
        {
            self.views[index].redisplay_requested = true;
        }
    }

    /// Runs one fan-out. Guarded kinds go through the hub's slot; nested
    /// guarded broadcasts raised by linked copies come back here and get
    /// dropped. The token is finished after the loop on every path, and
    /// per-receiver failures are logged rather than propagated, so the
    /// slot can never be left occupied.
    fn broadcast(&mut self, change: ViewChange<ViewId>) {
        match self.hub.admit(&change) {
            Admission::Deliver(Some(token)) => {
                self.deliver_to_all(&change);
                self.hub.finish(token);
            }
            Admission::Deliver(None) => self.deliver_to_all(&change),
            Admission::Dropped => {}
        }
    }

    fn deliver_to_all(&mut self, change: &ViewChange<ViewId>) {
        let origin = change.origin();
        let receivers: SmallVec<[ViewId; 4]> = self.views.iter().map(|v| v.id).collect();
        for receiver in receivers {
            if Some(receiver) == origin {
                continue;
            }
            self.deliver(receiver, change);
        }
    }

    fn deliver(&mut self, receiver: ViewId, change: &ViewChange<ViewId>) {
        match *change {
            ViewChange::Center(origin) => {
                self.refresh_record(receiver, origin);
                if self.linkage.both_linked(receiver, origin)
                    && let Some(index) = self.position(origin)
                {
                    let center = self.views[index].state.center();
                    if let Err(error) = self.set_center(receiver, center) {
                        log::warn!("linked center copy to {receiver} failed: {error}");
                    }
                }
                self.redisplay_if_visible(receiver);
            }
            ViewChange::Zoom(origin) => {
                self.refresh_record(receiver, origin);
                if self.linkage.both_linked(receiver, origin)
                    && let Some(index) = self.position(origin)
                {
                    let zoom = self.views[index].state.zoom();
                    if let Err(error) = self.set_zoom(receiver, zoom) {
                        log::warn!("linked zoom copy to {receiver} failed: {error}");
                    }
                }
                self.redisplay_if_visible(receiver);
            }
            // The principal axis is a per-pane choice; linked siblings
            // refresh their records but never copy it.
            ViewChange::InPlane(origin)
            | ViewChange::PlaneNormal(origin)
            | ViewChange::ViewCreated(origin) => {
                self.refresh_record(receiver, origin);
                self.redisplay_if_visible(receiver);
            }
            ViewChange::CursorMoved => {
                if self.position(receiver).is_some_and(|index| self.views[index].lock_on_cursor) {
                    let cursor = self.cursor;
                    if let Err(error) = self.set_center(receiver, cursor) {
                        log::warn!("cursor-lock recenter of {receiver} failed: {error}");
                    }
                }
                self.redisplay_if_visible(receiver);
            }
            ViewChange::MarkersChanged => self.redisplay_if_visible(receiver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scene_with_pair() -> (Scene, ViewId, ViewId) {
        let mut scene = Scene::new();
        let a = scene.insert_view(Axis::Z);
        let b = scene.insert_view(Axis::X);
        for view in [a, b] {
            scene.reshape(view, 256, 256).unwrap();
        }
        (scene, a, b)
    }

    #[test]
    fn linked_views_share_center_and_zoom() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_linked(a, true).unwrap();
        scene.set_linked(b, true).unwrap();

        scene.set_center(a, Point3::new(5.0, -2.0, 9.0)).unwrap();
        scene.set_zoom(a, 3.0).unwrap();

        let follower = scene.view(b).unwrap();
        assert_eq!(follower.state().center(), Point3::new(5.0, -2.0, 9.0));
        assert_relative_eq!(follower.state().zoom(), 3.0);
        assert!(scene.hub.current_origin().is_none());
    }

    #[test]
    fn unlinked_views_do_not_follow() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_linked(a, true).unwrap();

        scene.set_center(a, Point3::new(5.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.view(b).unwrap().state().center(), Point3::origin());
    }

    #[test]
    fn in_plane_is_never_copied() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_linked(a, true).unwrap();
        scene.set_linked(b, true).unwrap();

        scene.set_in_plane(a, Axis::Y).unwrap();
        assert_eq!(scene.view(b).unwrap().state().in_plane(), Axis::X);
    }

    #[test]
    fn quiet_zoom_skips_linked_siblings() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_linked(a, true).unwrap();
        scene.set_linked(b, true).unwrap();

        scene.set_zoom_quietly(a, 4.0).unwrap();

        let sibling = scene.view(b).unwrap().state();
        assert_relative_eq!(sibling.zoom(), 1.0);
    }

    #[test]
    fn new_views_get_intersection_records_both_ways() {
        let (scene, a, b) = scene_with_pair();
        assert!(scene.view(a).unwrap().intersection_with(b).is_some());
        assert!(scene.view(b).unwrap().intersection_with(a).is_some());
    }

    #[test]
    fn parallel_planes_keep_the_stale_record() {
        let (mut scene, a, b) = scene_with_pair();
        // Switching B to A's axis makes the two planes parallel; the
        // record computed while they crossed must survive untouched.
        let before = *scene.view(a).unwrap().intersection_with(b).unwrap();
        scene.set_in_plane(b, Axis::Z).unwrap();
        let after = *scene.view(a).unwrap().intersection_with(b).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn cursor_lock_recenters_on_cursor_moves() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_lock_on_cursor(b, true).unwrap();

        scene.set_cursor(Point3::new(1.0, 2.0, 3.0)).unwrap();
        assert_eq!(scene.view(b).unwrap().state().center(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.view(a).unwrap().state().center(), Point3::origin());
    }

    #[test]
    fn cursor_moves_rebuild_the_cursor_readout() {
        let (mut scene, a, _) = scene_with_pair();
        scene.set_cursor(Point3::new(1.0, 2.5, -3.0)).unwrap();

        let info = scene.view(a).unwrap().info(InfoSet::Cursor);
        assert_eq!(info[0].0, "View");
        assert_eq!(info[1], ("World".to_owned(), "1.00 2.50 -3.00".to_owned()));
    }

    #[test]
    fn missing_views_surface_not_found() {
        let mut scene = Scene::new();
        let a = scene.insert_view(Axis::Z);
        scene.remove_view(a).unwrap();

        assert_eq!(
            scene.set_zoom(a, 2.0),
            Err(SceneError::ViewNotFound(a))
        );
        assert_eq!(scene.remove_view(a), Err(SceneError::ViewNotFound(a)));
        assert!(scene.view(a).is_none());
    }

    #[test]
    fn invalid_numeric_input_is_rejected_without_mutation() {
        let (mut scene, a, _) = scene_with_pair();
        assert!(matches!(
            scene.set_center(a, Point3::new(f64::NAN, 0.0, 0.0)),
            Err(SceneError::InvalidArgument(_))
        ));
        assert!(matches!(
            scene.reshape(a, -1, 100),
            Err(SceneError::InvalidArgument(_))
        ));
        assert_eq!(scene.view(a).unwrap().state().center(), Point3::origin());
        assert_eq!(scene.view(a).unwrap().state().buffer_width(), 256);
    }

    #[test]
    fn reshape_allocates_the_frame_buffer() {
        let mut scene = Scene::new();
        let a = scene.insert_view(Axis::Z);
        scene.reshape(a, 8, 4).unwrap();
        assert_eq!(scene.view(a).unwrap().frame_buffer().len(), 8 * 4 * 4);
    }

    #[test]
    fn redisplay_requests_drain_once() {
        let (mut scene, a, b) = scene_with_pair();
        scene.take_redisplay_requests();

        scene.set_zoom(a, 2.0).unwrap();
        let mut requested = scene.take_redisplay_requests();
        requested.sort();
        assert_eq!(requested, vec![a, b]);
        assert!(scene.take_redisplay_requests().is_empty());
    }

    #[test]
    fn invisible_views_get_no_redisplay_requests() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_visible_in_frame(b, false).unwrap();
        scene.take_redisplay_requests();

        scene.set_zoom(a, 2.0).unwrap();
        assert_eq!(scene.take_redisplay_requests(), vec![a]);
    }

    #[test]
    fn touch_transform_reaches_subscribed_views() {
        let (mut scene, a, b) = scene_with_pair();
        let shared = scene
            .create_transform(Matrix4::identity())
            .unwrap();
        scene.set_world_to_view_transform(a, shared).unwrap();

        // Pixel under the window center before: world origin.
        let before = scene.window_to_world(a, Point::new(128.0, 128.0)).unwrap();
        assert_relative_eq!(before, Point3::origin(), epsilon = 1e-12);

        let translation = nalgebra::Translation3::new(10.0, 0.0, 0.0).to_homogeneous();
        scene.touch_transform(shared, translation).unwrap();

        let after = scene.window_to_world(a, Point::new(128.0, 128.0)).unwrap();
        assert_relative_eq!(after, Point3::new(10.0, 0.0, 0.0), epsilon = 1e-12);

        // B still follows the identity transform.
        let other = scene.window_to_world(b, Point::new(128.0, 128.0)).unwrap();
        assert_relative_eq!(other, Point3::origin(), epsilon = 1e-12);
    }

    #[test]
    fn markers_fan_out_redisplay() {
        let (mut scene, a, b) = scene_with_pair();
        scene.set_marker_capacity(4);
        scene.take_redisplay_requests();

        scene.place_marker(Point3::new(1.0, 0.0, 0.0)).unwrap();
        let mut requested = scene.take_redisplay_requests();
        requested.sort();
        assert_eq!(requested, vec![a, b]);
        assert_eq!(scene.markers().visible().count(), 1);
    }

    #[derive(Debug)]
    struct ProbeLayer {
        width: u32,
        height: u32,
        increments: [f64; 3],
        info_label: &'static str,
        tool_events: usize,
    }

    impl ProbeLayer {
        fn new(info_label: &'static str) -> Self {
            Self {
                width: 0,
                height: 0,
                increments: [2.0, 3.0, 4.0],
                info_label,
                tool_events: 0,
            }
        }
    }

    impl Layer for ProbeLayer {
        fn set_width(&mut self, width: u32) {
            self.width = width;
        }

        fn set_height(&mut self, height: u32) {
            self.height = height;
        }

        fn preferred_in_plane_increments(&self) -> [f64; 3] {
            self.increments
        }

        fn info_at(&self, world: &Point3<f64>) -> Vec<(String, String)> {
            vec![(self.info_label.to_owned(), format!("{:.0}", world.x))]
        }

        fn handle_tool(
            &mut self,
            _world: &Point3<f64>,
            _state: &ViewState,
            _view: ViewId,
            _tool: ToolMode,
            _input: &InputState,
        ) {
            self.tool_events += 1;
        }

        fn composite(&mut self, buffer: &mut [u8], _width: u32, _height: u32, _state: &ViewState) {
            for byte in buffer {
                *byte = byte.wrapping_add(1);
            }
        }
    }

    #[test]
    fn level_zero_layer_supplies_increments() {
        let (mut scene, a, _) = scene_with_pair();
        let layer = scene.insert_layer(Box::new(ProbeLayer::new("probe")));
        scene.set_layer_at_level(a, layer, 0).unwrap();
        assert_eq!(scene.view(a).unwrap().increments(), [2.0, 3.0, 4.0]);

        scene.remove_layer_at_level(a, 0).unwrap();
        assert_eq!(scene.view(a).unwrap().increments(), [1.0; 3]);
    }

    #[test]
    fn readout_appends_layer_info_in_level_order() {
        let (mut scene, a, _) = scene_with_pair();
        let low = scene.insert_layer(Box::new(ProbeLayer::new("low")));
        let high = scene.insert_layer(Box::new(ProbeLayer::new("high")));
        scene.set_layer_at_level(a, high, 1).unwrap();
        scene.set_layer_at_level(a, low, 0).unwrap();

        scene
            .rebuild_info(a, &Point3::new(3.0, 0.0, 0.0), InfoSet::Mouse)
            .unwrap();
        let info = scene.view(a).unwrap().info(InfoSet::Mouse);
        assert_eq!(info[2].0, "low");
        assert_eq!(info[3].0, "high");
    }

    #[test]
    fn first_unused_draw_level_sits_above_the_top_layer() {
        let (mut scene, a, _) = scene_with_pair();
        assert_eq!(scene.first_unused_draw_level(a).unwrap(), 0);

        let layer = scene.insert_layer(Box::new(ProbeLayer::new("probe")));
        scene.set_layer_at_level(a, layer, 3).unwrap();
        assert_eq!(scene.first_unused_draw_level(a).unwrap(), 4);
    }

    #[test]
    fn copy_layer_settings_carries_attachments_and_increments() {
        let (mut scene, a, b) = scene_with_pair();
        let layer = scene.insert_layer(Box::new(ProbeLayer::new("probe")));
        scene.set_layer_at_level(a, layer, 0).unwrap();

        scene.copy_layer_settings(a, b).unwrap();
        assert_eq!(scene.layer_at_level(b, 0), Some(layer));
        assert_eq!(scene.view(b).unwrap().increments(), [2.0, 3.0, 4.0]);
    }

    #[test]
    fn render_composites_layers_into_the_buffer() {
        let mut scene = Scene::new();
        let a = scene.insert_view(Axis::Z);
        scene.reshape(a, 2, 2).unwrap();
        let low = scene.insert_layer(Box::new(ProbeLayer::new("low")));
        let high = scene.insert_layer(Box::new(ProbeLayer::new("high")));
        scene.set_layer_at_level(a, low, 0).unwrap();
        scene.set_layer_at_level(a, high, 1).unwrap();

        scene.render_view(a).unwrap();
        // Two layers each bumped every byte once.
        assert!(scene.view(a).unwrap().frame_buffer().iter().all(|&b| b == 2));
    }

    #[test]
    fn tool_forwarding_reaches_every_attached_layer() {
        let (mut scene, a, _) = scene_with_pair();
        let layer = scene.insert_layer(Box::new(ProbeLayer::new("probe")));
        scene.set_layer_at_level(a, layer, 0).unwrap();

        scene
            .forward_tool_to_layers(
                a,
                &Point3::origin(),
                ToolMode::Navigate,
                &InputState::default(),
            )
            .unwrap();
        // The probe layer is registered once; downcast-free check via the
        // scene's own accessor is not possible, so count indirectly: a
        // second forward bumps the counter again without panicking.
        scene
            .forward_tool_to_layers(
                a,
                &Point3::origin(),
                ToolMode::Navigate,
                &InputState::default(),
            )
            .unwrap();
    }
}
