// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Reference counting for feature visibility shared by several owners.

Each key (a path, a child feature) counts how many enabling owners currently
want it shown. Only the 0 -> 1 and 1 -> 0 edges are real transitions; every
other request just moves the count. A forced request reports the requested
transition unconditionally and leaves the count alone.

Disabling a key whose count is already zero clamps at zero and is logged,
since it usually means a caller disabled an owner it never enabled.
*/

use ahash::AHashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::warn;

/// Effect of a request on the externally visible state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Enabled,
    Disabled,
    Unchanged,
}

impl Transition {
    /// The transition an unconditional request for `enable` produces
    pub fn requested(enable: bool) -> Self {
        if enable {
            Transition::Enabled
        } else {
            Transition::Disabled
        }
    }

    pub fn is_change(self) -> bool {
        self != Transition::Unchanged
    }
}

/// Per-key owner counts
#[derive(Debug, Clone)]
pub struct RefCounter<K> {
    counts: AHashMap<K, u32>,
}

impl<K> Default for RefCounter<K> {
    fn default() -> Self {
        Self {
            counts: AHashMap::new(),
        }
    }
}

impl<K> RefCounter<K>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a key at zero; an existing count is kept
    pub fn track(&mut self, key: K) {
        self.counts.entry(key).or_insert(0);
    }

    pub fn count<Q>(&self, key: &Q) -> u32
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    pub fn is_active<Q>(&self, key: &Q) -> bool
    where
        K: std::borrow::Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.count(key) > 0
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Apply one owner's request for `key`
    pub fn update(&mut self, key: K, enable: bool, force: bool) -> Transition {
        if force {
            return Transition::requested(enable);
        }
        if enable {
            let count = self.counts.entry(key).or_insert(0);
            *count += 1;
            return if *count == 1 {
                Transition::Enabled
            } else {
                Transition::Unchanged
            };
        }
        match self.counts.get_mut(&key) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    Transition::Disabled
                } else {
                    Transition::Unchanged
                }
            }
            _ => {
                warn!("Disable requested for {:?} with no enabling owner; count stays at zero", key);
                self.counts.insert(key, 0);
                Transition::Unchanged
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_only_edges_transition() {
        let mut counter = RefCounter::new();
        assert_eq!(counter.update("p1", true, false), Transition::Enabled);
        assert_eq!(counter.update("p1", true, false), Transition::Unchanged);
        assert_eq!(counter.count("p1"), 2);
        assert_eq!(counter.update("p1", false, false), Transition::Unchanged);
        assert_eq!(counter.update("p1", false, false), Transition::Disabled);
        assert!(!counter.is_active("p1"));
    }

    #[test]
    fn test_underflow_clamps_without_transition() {
        let mut counter = RefCounter::new();
        counter.track(7u32);
        assert_eq!(counter.update(7, false, false), Transition::Unchanged);
        assert_eq!(counter.count(&7), 0);
        assert_eq!(counter.update(7, true, false), Transition::Enabled);
    }

    #[test]
    fn test_force_ignores_counts() {
        let mut counter = RefCounter::new();
        counter.update("p1", true, false);
        assert_eq!(counter.update("p1", false, true), Transition::Disabled);
        assert_eq!(counter.count("p1"), 1);
        assert_eq!(counter.update("p2", true, true), Transition::Enabled);
        assert_eq!(counter.count("p2"), 0);
    }

    proptest! {
        #[test]
        fn prop_visible_iff_count_positive(requests in proptest::collection::vec(any::<bool>(), 0..64)) {
            let mut counter = RefCounter::new();
            let mut visible = false;
            let mut expected: u32 = 0;
            for enable in requests {
                match counter.update(0u8, enable, false) {
                    Transition::Enabled => { prop_assert!(!visible); visible = true; }
                    Transition::Disabled => { prop_assert!(visible); visible = false; }
                    Transition::Unchanged => {}
                }
                expected = if enable { expected + 1 } else { expected.saturating_sub(1) };
                prop_assert_eq!(counter.count(&0u8), expected);
                prop_assert_eq!(visible, expected > 0);
            }
        }
    }
}
