// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// A change notification fanned out across the views of one scene.
///
/// The first three kinds are *guarded*: linked siblings respond to them by
/// mutating themselves, which re-broadcasts, so they pass through the
/// hub's reentrancy slot. Everything else fans out unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewChange<K> {
    /// A view's world-space center moved. Guarded.
    Center(K),
    /// A view's zoom level changed. Guarded.
    Zoom(K),
    /// A view's principal slicing axis changed. Guarded.
    InPlane(K),
    /// A view's cutting-plane normal changed. Siblings refresh their
    /// intersection handles but never copy the normal, so no guard is
    /// needed.
    PlaneNormal(K),
    /// A view joined the scene; siblings compute intersection handles for
    /// it.
    ViewCreated(K),
    /// The shared cursor point moved.
    CursorMoved,
    /// The shared marker store changed.
    MarkersChanged,
}

impl<K: Copy> ViewChange<K> {
    /// The view this change originated from, when there is one.
    #[must_use]
    pub fn origin(&self) -> Option<K> {
        match *self {
            Self::Center(k)
            | Self::Zoom(k)
            | Self::InPlane(k)
            | Self::PlaneNormal(k)
            | Self::ViewCreated(k) => Some(k),
            Self::CursorMoved | Self::MarkersChanged => None,
        }
    }

    /// Whether this kind passes through the reentrancy guard.
    #[must_use]
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::Center(_) | Self::Zoom(_) | Self::InPlane(_))
    }
}

/// Proof that a guarded broadcast is in flight.
///
/// The token is not `Copy` and carries no public constructor, so exactly
/// one [`LinkBroadcastHub::finish`] per admitted broadcast is possible.
/// The caller must finish it on every exit path of its delivery loop.
#[derive(Debug)]
pub struct BroadcastToken<K> {
    origin: K,
}

impl<K: Copy> BroadcastToken<K> {
    /// The view that started the broadcast.
    #[must_use]
    pub fn origin(&self) -> K {
        self.origin
    }
}

/// The hub's decision about a broadcast.
#[derive(Debug)]
pub enum Admission<K> {
    /// Deliver to listeners. Guarded kinds carry the token to finish
    /// afterwards; unguarded kinds carry `None`.
    Deliver(Option<BroadcastToken<K>>),
    /// A guarded broadcast arrived while another was in flight: do not
    /// fan out. This is what breaks mutual-link feedback.
    Dropped,
}

/// Admission control for linked-view broadcasts.
///
/// A single slot holds the id of the view whose guarded broadcast is
/// currently fanning out. The slot is a cutoff for synchronous recursion
/// within one call stack, not a lock; there is no queueing or deferral.
#[derive(Clone, Debug)]
pub struct LinkBroadcastHub<K> {
    current: Option<K>,
}

impl<K> Default for LinkBroadcastHub<K> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<K: Copy + PartialEq> LinkBroadcastHub<K> {
    /// Creates a hub with the slot free.
    #[must_use]
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Decides whether `change` may fan out.
    pub fn admit(&mut self, change: &ViewChange<K>) -> Admission<K> {
        let origin = match *change {
            ViewChange::Center(k) | ViewChange::Zoom(k) | ViewChange::InPlane(k) => k,
            _ => return Admission::Deliver(None),
        };
        if self.current.is_some() {
            return Admission::Dropped;
        }
        self.current = Some(origin);
        Admission::Deliver(Some(BroadcastToken { origin }))
    }

    /// Releases the slot at the end of a guarded fan-out.
    pub fn finish(&mut self, token: BroadcastToken<K>) {
        debug_assert!(
            self.current == Some(token.origin),
            "finished token does not match the broadcast in flight"
        );
        self.current = None;
    }

    /// The origin of the guarded broadcast currently in flight, if any.
    #[must_use]
    pub fn current_origin(&self) -> Option<K> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unguarded_changes_always_deliver() {
        let mut hub = LinkBroadcastHub::new();
        let token = match hub.admit(&ViewChange::Center(7_u32)) {
            Admission::Deliver(Some(token)) => token,
            other => panic!("expected a guarded delivery, got {other:?}"),
        };

        // While the guarded broadcast is in flight, unguarded kinds still
        // pass.
        assert!(matches!(
            hub.admit(&ViewChange::PlaneNormal(9)),
            Admission::Deliver(None)
        ));
        assert!(matches!(
            hub.admit(&ViewChange::CursorMoved),
            Admission::Deliver(None)
        ));

        hub.finish(token);
    }

    #[test]
    fn nested_guarded_broadcast_is_dropped() {
        let mut hub = LinkBroadcastHub::new();
        let token = match hub.admit(&ViewChange::Zoom(1_u32)) {
            Admission::Deliver(Some(token)) => token,
            other => panic!("expected a guarded delivery, got {other:?}"),
        };
        assert_eq!(hub.current_origin(), Some(1));

        assert!(matches!(hub.admit(&ViewChange::Zoom(2)), Admission::Dropped));
        assert!(matches!(
            hub.admit(&ViewChange::Center(1)),
            Admission::Dropped
        ));

        hub.finish(token);
        assert_eq!(hub.current_origin(), None);

        // After finishing, guarded broadcasts are admitted again.
        assert!(matches!(
            hub.admit(&ViewChange::Center(2)),
            Admission::Deliver(Some(_))
        ));
    }

    #[test]
    fn token_reports_its_origin() {
        let mut hub = LinkBroadcastHub::new();
        let Admission::Deliver(Some(token)) = hub.admit(&ViewChange::InPlane(42_u32)) else {
            panic!("expected a guarded delivery");
        };
        assert_eq!(token.origin(), 42);
        hub.finish(token);
    }
}
