// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Publish/subscribe registry for aggregate state changes
//!
//! Watchers are called synchronously, in registration order. Each
//! notification works on a snapshot of the registry, so a watcher that adds
//! or removes watchers only affects later notifications.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Stable subscription handle; ids increase monotonically and are never reused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatcherId(u64);

impl WatcherId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watcher-{}", self.0)
    }
}

type Callback<C> = Arc<dyn Fn(&C) + Send + Sync>;

struct Subscribers<C> {
    last_id: u64,
    entries: Vec<(WatcherId, Callback<C>)>,
}

/// Registry of change callbacks
pub struct WatcherHub<C> {
    subscribers: Mutex<Subscribers<C>>,
}

impl<C> Default for WatcherHub<C> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Subscribers {
                last_id: 0,
                entries: Vec::new(),
            }),
        }
    }
}

impl<C> fmt::Debug for WatcherHub<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscribers = self.subscribers.lock();
        f.debug_struct("WatcherHub")
            .field("watchers", &subscribers.entries.len())
            .field("last_id", &subscribers.last_id)
            .finish()
    }
}

impl<C> WatcherHub<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_watcher<F>(&self, callback: F) -> WatcherId
    where
        F: Fn(&C) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        subscribers.last_id += 1;
        let id = WatcherId(subscribers.last_id);
        subscribers.entries.push((id, Arc::new(callback)));
        trace!("Added {}", id);
        id
    }

    /// Returns false when the id is not registered
    pub fn remove_watcher(&self, id: WatcherId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.entries.len();
        subscribers.entries.retain(|(watcher_id, _)| *watcher_id != id);
        before != subscribers.entries.len()
    }

    pub fn len(&self) -> usize {
        self.subscribers.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, changes: &C) {
        let snapshot: Vec<Callback<C>> = self
            .subscribers
            .lock()
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in snapshot {
            callback(changes);
        }
    }
}
