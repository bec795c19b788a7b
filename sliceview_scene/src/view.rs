// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::BTreeMap;

use hashbrown::HashMap;
use sliceview_link::SubscriptionId;
use sliceview_view::{Segment, TransformPipeline, ViewState};

use crate::ids::{LayerId, TransformId, ViewId};

/// Which label/value readout of a view to rebuild.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InfoSet {
    /// Follows the hovering pointer.
    Mouse,
    /// Follows the shared cursor.
    Cursor,
}

/// One registered view: slice state plus everything the scene tracks for
/// it.
///
/// All mutation happens through [`Scene`](crate::Scene) operations so that
/// derived state (the transform pipeline, intersection records, sibling
/// notifications) stays consistent; hosts read through the accessors.
#[derive(Debug)]
pub struct View {
    pub(crate) id: ViewId,
    pub(crate) state: ViewState,
    pub(crate) pipeline: TransformPipeline,
    pub(crate) world_to_view: TransformId,
    pub(crate) transform_subscription: SubscriptionId,
    pub(crate) visible_in_frame: bool,
    pub(crate) lock_on_cursor: bool,
    /// Draw level → attached layer, composited bottom-up.
    pub(crate) layers: BTreeMap<u32, LayerId>,
    /// Cached segments where sibling cutting planes cross this view.
    /// Refreshed on relevant changes; a sibling whose plane became
    /// parallel keeps its previous entry.
    pub(crate) intersections: HashMap<ViewId, Segment>,
    /// World-units moved per keyboard step, per world axis.
    pub(crate) increments: [f64; 3],
    pub(crate) mouse_info: Vec<(String, String)>,
    pub(crate) cursor_info: Vec<(String, String)>,
    /// RGBA pixels, `buffer_width × buffer_height`.
    pub(crate) frame_buffer: Vec<u8>,
    pub(crate) redisplay_requested: bool,
}

impl View {
    pub(crate) fn new(id: ViewId, state: ViewState, subscription: SubscriptionId) -> Self {
        Self {
            id,
            state,
            pipeline: TransformPipeline::new(),
            world_to_view: TransformId::IDENTITY,
            transform_subscription: subscription,
            visible_in_frame: true,
            lock_on_cursor: false,
            layers: BTreeMap::new(),
            intersections: HashMap::new(),
            increments: [1.0; 3],
            mouse_info: Vec::new(),
            cursor_info: Vec::new(),
            frame_buffer: Vec::new(),
            redisplay_requested: false,
        }
    }

    /// This view's id.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The slice parameters.
    #[must_use]
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// The derived coordinate transforms.
    #[must_use]
    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    /// The World↔View transform this view follows.
    #[must_use]
    pub fn world_to_view(&self) -> TransformId {
        self.world_to_view
    }

    /// Whether the view participates in the visible frame.
    #[must_use]
    pub fn is_visible_in_frame(&self) -> bool {
        self.visible_in_frame
    }

    /// Whether the view recenters itself onto the shared cursor.
    #[must_use]
    pub fn locks_on_cursor(&self) -> bool {
        self.lock_on_cursor
    }

    /// Where `other`'s cutting plane crosses this view, per the cache.
    #[must_use]
    pub fn intersection_with(&self, other: ViewId) -> Option<&Segment> {
        self.intersections.get(&other)
    }

    /// World-units moved per keyboard step, per world axis.
    #[must_use]
    pub fn increments(&self) -> [f64; 3] {
        self.increments
    }

    /// The requested readout, most recently rebuilt.
    #[must_use]
    pub fn info(&self, set: InfoSet) -> &[(String, String)] {
        match set {
            InfoSet::Mouse => &self.mouse_info,
            InfoSet::Cursor => &self.cursor_info,
        }
    }

    /// The RGBA frame buffer, as last rendered.
    #[must_use]
    pub fn frame_buffer(&self) -> &[u8] {
        &self.frame_buffer
    }

    /// The layer attached at `level`, if any.
    #[must_use]
    pub fn layer_at_level(&self, level: u32) -> Option<LayerId> {
        self.layers.get(&level).copied()
    }

    /// Attached layers in draw-level order.
    pub fn layers(&self) -> impl Iterator<Item = (u32, LayerId)> + '_ {
        self.layers.iter().map(|(&level, &layer)| (level, layer))
    }
}
