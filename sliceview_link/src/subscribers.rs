// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

/// Handle for removing a subscription from a [`SubscriberSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A registry of listeners keyed by subject id.
///
/// Subjects here are ids of shared resources (a world transform, say) and
/// listeners are ids of the views watching them. The set stores plain
/// values, not callbacks, so the owner stays free to mutate itself while
/// iterating over a snapshot of the listeners.
///
/// Listeners for one subject are kept in registration order. Most subjects
/// have one or two listeners, so they live inline.
#[derive(Clone, Debug)]
pub struct SubscriberSet<S, L> {
    by_subject: HashMap<S, SmallVec<[(SubscriptionId, L); 2]>>,
    next: u64,
}

impl<S: Copy + Eq + Hash, L: Copy> SubscriberSet<S, L> {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_subject: HashMap::new(),
            next: 0,
        }
    }

    /// Registers `listener` for changes to `subject`.
    ///
    /// The same listener may be registered more than once; each
    /// registration gets its own id and its own delivery.
    pub fn subscribe(&mut self, subject: S, listener: L) -> SubscriptionId {
        let id = SubscriptionId(self.next);
        self.next += 1;
        self.by_subject
            .entry(subject)
            .or_default()
            .push((id, listener));
        id
    }

    /// Removes one subscription. Returns whether it existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let mut emptied = None;
        let mut found = false;
        for (subject, listeners) in &mut self.by_subject {
            if let Some(index) = listeners.iter().position(|(sid, _)| *sid == id) {
                listeners.remove(index);
                found = true;
                if listeners.is_empty() {
                    emptied = Some(*subject);
                }
                break;
            }
        }
        if let Some(subject) = emptied {
            self.by_subject.remove(&subject);
        }
        found
    }

    /// The listeners registered for `subject`, in registration order.
    pub fn listeners(&self, subject: S) -> impl Iterator<Item = L> + '_ {
        self.by_subject
            .get(&subject)
            .into_iter()
            .flat_map(|listeners| listeners.iter().map(|(_, listener)| *listener))
    }
}

impl<S: Copy + Eq + Hash, L: Copy> Default for SubscriberSet<S, L> {
    fn default() -> Self {
        Self::new()
    }
}
