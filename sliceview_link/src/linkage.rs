// Copyright 2026 the Sliceview Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::hash::Hash;

use hashbrown::HashMap;

/// Per-view membership in the linked group.
///
/// Linking is a single flag per view, not a pairwise relation: two views
/// follow each other exactly when both are flagged. Views the table has
/// never heard of are unlinked.
#[derive(Clone, Debug)]
pub struct LinkageTable<K> {
    linked: HashMap<K, bool>,
}

impl<K> Default for LinkageTable<K> {
    fn default() -> Self {
        Self {
            linked: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> LinkageTable<K> {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            linked: HashMap::new(),
        }
    }

    /// Flags or unflags a view as a member of the linked group.
    pub fn set_linked(&mut self, view: K, linked: bool) {
        self.linked.insert(view, linked);
    }

    /// Whether a view is a member of the linked group.
    #[must_use]
    pub fn is_linked(&self, view: K) -> bool {
        self.linked.get(&view).copied().unwrap_or(false)
    }

    /// Whether two views follow each other.
    #[must_use]
    pub fn both_linked(&self, a: K, b: K) -> bool {
        self.is_linked(a) && self.is_linked(b)
    }

    /// Forgets a view entirely, for when it leaves the scene.
    pub fn remove(&mut self, view: K) {
        self.linked.remove(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_views_are_unlinked() {
        let table = LinkageTable::<u32>::new();
        assert!(!table.is_linked(5));
        assert!(!table.both_linked(5, 6));
    }

    #[test]
    fn both_must_be_flagged() {
        let mut table = LinkageTable::new();
        table.set_linked(1_u32, true);
        assert!(table.is_linked(1));
        assert!(!table.both_linked(1, 2));

        table.set_linked(2, true);
        assert!(table.both_linked(1, 2));
        assert!(table.both_linked(2, 1));

        table.set_linked(1, false);
        assert!(!table.both_linked(1, 2));
    }

    #[test]
    fn removal_resets_membership() {
        let mut table = LinkageTable::new();
        table.set_linked(3_u32, true);
        table.remove(3);
        assert!(!table.is_linked(3));
    }
}
