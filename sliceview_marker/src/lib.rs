// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sliceview Marker: a shared store of world-space annotation points.
//!
//! Every slice view of a scene draws the same markers, so the store is a
//! scene-level collaborator rather than per-view state. It holds a fixed
//! number of slots written through a circular cursor: placing a marker
//! past the last slot wraps around and overwrites the oldest one. Hiding a
//! marker keeps its slot (the cursor does not move), and shrinking the
//! capacity hides the slots beyond the new limit without erasing them, so
//! growing the capacity again brings their data back.
//!
//! ```rust
//! use nalgebra::Point3;
//! use sliceview_marker::MarkerStore;
//!
//! let mut store = MarkerStore::new(2);
//! store.place(Point3::new(1.0, 0.0, 0.0));
//! store.place(Point3::new(2.0, 0.0, 0.0));
//! // The third placement wraps around and overwrites the first.
//! store.place(Point3::new(3.0, 0.0, 0.0));
//!
//! let visible: Vec<_> = store.visible().map(|m| m.position().x).collect();
//! assert_eq!(visible, vec![3.0, 2.0]);
//! ```

use nalgebra::Point3;

/// One marker slot: a world-space position and its visibility.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    position: Point3<f64>,
    visible: bool,
}

impl Marker {
    /// The marker's world-space position.
    #[must_use]
    pub fn position(&self) -> Point3<f64> {
        self.position
    }

    /// Whether the marker is currently shown.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl Default for Marker {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            visible: false,
        }
    }
}

/// A circular store of world-space markers shared by all views of a scene.
#[derive(Clone, Debug, Default)]
pub struct MarkerStore {
    // High-water storage: never shrinks, so capacity round trips keep
    // marker data.
    slots: Vec<Marker>,
    capacity: usize,
    cursor: usize,
}

impl MarkerStore {
    /// Creates a store with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Marker::default(); capacity],
            capacity,
            cursor: 0,
        }
    }

    /// The number of active slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the number of active slots.
    ///
    /// Slots at index ≥ `capacity` are hidden but keep their data; growing
    /// the capacity back exposes them for reuse (they stay hidden until
    /// rewritten). The write cursor is reset to 0 when it falls outside
    /// the new range.
    pub fn set_capacity(&mut self, capacity: usize) {
        if capacity > self.slots.len() {
            self.slots.resize(capacity, Marker::default());
        }
        for slot in &mut self.slots[capacity..] {
            slot.visible = false;
        }
        self.capacity = capacity;
        if self.cursor >= capacity {
            self.cursor = 0;
        }
    }

    /// Writes a visible marker at the cursor and advances it, wrapping at
    /// the capacity. Does nothing when the capacity is 0.
    pub fn place(&mut self, position: Point3<f64>) {
        if self.capacity == 0 {
            return;
        }
        if self.cursor >= self.capacity {
            self.cursor = 0;
        }
        self.slots[self.cursor] = Marker {
            position,
            visible: true,
        };
        self.cursor += 1;
    }

    /// Hides the slot whose position is Euclidean-nearest to `point`.
    ///
    /// Every active slot is a candidate, hidden ones included; slots never
    /// written sit at the origin and can therefore win. Does nothing when
    /// the capacity is 0.
    pub fn hide_nearest(&mut self, point: &Point3<f64>) {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, slot) in self.slots[..self.capacity].iter().enumerate() {
            let distance = (slot.position - point).norm_squared();
            if nearest.is_none_or(|(_, best)| distance < best) {
                nearest = Some((index, distance));
            }
        }
        if let Some((index, _)) = nearest {
            self.slots[index].visible = false;
        }
    }

    /// The slot at `index`, if it is active.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.slots[..self.capacity].get(index)
    }

    /// The visible markers, in slot order.
    pub fn visible(&self) -> impl Iterator<Item = &Marker> {
        self.slots[..self.capacity].iter().filter(|m| m.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64) -> Point3<f64> {
        Point3::new(x, 0.0, 0.0)
    }

    #[test]
    fn placement_wraps_around() {
        let mut store = MarkerStore::new(2);
        store.place(p(1.0));
        store.place(p(2.0));
        store.place(p(3.0));

        assert_eq!(store.get(0).map(Marker::position), Some(p(3.0)));
        assert_eq!(store.get(1).map(Marker::position), Some(p(2.0)));
    }

    #[test]
    fn zero_capacity_is_inert() {
        let mut store = MarkerStore::new(0);
        store.place(p(1.0));
        store.hide_nearest(&p(1.0));
        assert_eq!(store.capacity(), 0);
        assert!(store.get(0).is_none());
        assert_eq!(store.visible().count(), 0);
    }

    #[test]
    fn hide_nearest_picks_the_closest_slot() {
        let mut store = MarkerStore::new(3);
        store.place(p(10.0));
        store.place(p(20.0));
        store.place(p(30.0));

        store.hide_nearest(&p(19.0));
        let visible: Vec<_> = store.visible().map(|m| m.position().x).collect();
        assert_eq!(visible, vec![10.0, 30.0]);
    }

    #[test]
    fn unwritten_slots_compete_at_the_origin() {
        let mut store = MarkerStore::new(2);
        store.place(p(100.0));
        // The unwritten second slot sits at the origin and is nearer to
        // the probe, so the visible marker survives.
        store.hide_nearest(&p(1.0));
        assert_eq!(store.visible().count(), 1);
        assert_eq!(store.get(0).map(Marker::position), Some(p(100.0)));
    }

    #[test]
    fn shrinking_hides_but_retains() {
        let mut store = MarkerStore::new(3);
        store.place(p(1.0));
        store.place(p(2.0));
        store.place(p(3.0));

        store.set_capacity(1);
        assert_eq!(store.visible().map(|m| m.position().x).collect::<Vec<_>>(), vec![1.0]);
        assert!(store.get(1).is_none());

        // Growing back exposes the retained slots, still hidden.
        store.set_capacity(3);
        assert_eq!(store.get(2).map(Marker::position), Some(p(3.0)));
        assert!(!store.get(2).is_some_and(Marker::is_visible));
        assert_eq!(store.visible().count(), 1);
    }

    #[test]
    fn cursor_resets_after_shrink() {
        let mut store = MarkerStore::new(3);
        store.place(p(1.0));
        store.place(p(2.0));
        store.place(p(3.0));

        store.set_capacity(2);
        store.place(p(4.0));
        assert_eq!(store.get(0).map(Marker::position), Some(p(4.0)));
        assert_eq!(store.get(1).map(Marker::position), Some(p(2.0)));
    }
}
