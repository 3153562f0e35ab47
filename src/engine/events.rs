//! Lifecycle events — the plugin boundary.
//!
//! Collaborators (lightbox, related-posts, deep-link managers) subscribe to
//! these and may re-enter the mutation API or trigger a refresh from inside
//! a handler. The bus tolerates that without deadlock: delivery is queued,
//! so an event emitted while another is being dispatched is delivered after
//! the current one finishes, and the subscriber list is detached during a
//! dispatch so re-entry can never alias it. Overlapping layout passes are
//! prevented by the engine's reentrancy drop, not by any locking here.

use crate::engine::LayoutInstance;
use crate::model::{Breakpoint, NodeId};
use crate::surface::Surface;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;

/// Notification emitted by a [`LayoutInstance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum LayoutEvent {
    /// Initialization (including the first pass) completed.
    Initialized,
    /// The classified breakpoint differs from the previous cycle.
    /// Emitted only on an actual change, unlike
    /// [`LayoutEvent::LayoutCompleted`] which fires every pass.
    BreakpointChanged {
        /// Breakpoint of the previous cycle.
        from: Breakpoint,
        /// Newly classified breakpoint.
        to: Breakpoint,
        /// Viewport width that produced the change.
        viewport_width: f64,
    },
    /// A placement pass finished.
    LayoutCompleted {
        /// Final container height, trailing gap included.
        container_height: f64,
        /// Column count of the pass.
        column_count: usize,
        /// Breakpoint of the pass.
        breakpoint: Breakpoint,
    },
    /// Items were appended; existing placements were not touched.
    ItemsAdded {
        /// The appended items, in insertion order.
        added: Vec<NodeId>,
        /// Tracked item count after the append.
        total: usize,
    },
    /// Items were detached; the survivors were re-placed from scratch.
    ItemsRemoved {
        /// The detached items.
        removed: Vec<NodeId>,
        /// Tracked item count after the removal.
        total: usize,
    },
    /// Teardown completed.
    Destroyed,
}

/// Handle to a subscription, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Boxed event subscriber. Receives the emitting instance mutably and may
/// re-enter its public API.
pub type EventFn<S> = Box<dyn FnMut(&mut LayoutInstance<S>, &LayoutEvent)>;

/// Queued, reentrancy-tolerant event delivery for one instance.
pub struct EventBus<S: Surface> {
    subscribers: Vec<(SubscriberId, EventFn<S>)>,
    detached_ids: HashSet<SubscriberId>,
    removed: HashSet<SubscriberId>,
    queue: VecDeque<LayoutEvent>,
    dispatching: bool,
    next_id: u64,
}

impl<S: Surface> Default for EventBus<S> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            detached_ids: HashSet::new(),
            removed: HashSet::new(),
            queue: VecDeque::new(),
            dispatching: false,
            next_id: 0,
        }
    }
}

impl<S: Surface> EventBus<S> {
    /// Append a subscriber; returns its removal handle.
    pub fn subscribe(&mut self, callback: EventFn<S>) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, callback));
        id
    }

    /// Remove a subscriber. A subscriber currently detached for delivery is
    /// marked instead and dropped on reattach; an unknown id is a no-op.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        if self.subscribers.len() < before {
            true
        } else {
            if self.detached_ids.contains(&id) {
                self.removed.insert(id);
            }
            false
        }
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Whether nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub(crate) fn enqueue(&mut self, event: LayoutEvent) {
        self.queue.push_back(event);
    }

    /// Claim the dispatch loop. Returns `false` when a dispatch is already
    /// running higher up the stack; the queued event will be drained there.
    pub(crate) fn begin_dispatch(&mut self) -> bool {
        if self.dispatching {
            false
        } else {
            self.dispatching = true;
            true
        }
    }

    pub(crate) fn end_dispatch(&mut self) {
        self.dispatching = false;
    }

    pub(crate) fn next_queued(&mut self) -> Option<LayoutEvent> {
        self.queue.pop_front()
    }

    pub(crate) fn detach(&mut self) -> Vec<(SubscriberId, EventFn<S>)> {
        let taken = std::mem::take(&mut self.subscribers);
        self.detached_ids = taken.iter().map(|(id, _)| *id).collect();
        taken
    }

    pub(crate) fn reattach(&mut self, taken: Vec<(SubscriberId, EventFn<S>)>) {
        self.detached_ids.clear();
        let added_during_dispatch = std::mem::take(&mut self.subscribers);
        let mut restored: Vec<(SubscriberId, EventFn<S>)> = taken
            .into_iter()
            .filter(|(id, _)| !self.removed.remove(id))
            .collect();
        restored.extend(added_during_dispatch);
        self.subscribers = restored;
    }

    pub(crate) fn is_removed(&self, id: SubscriberId) -> bool {
        self.removed.contains(&id)
    }

    /// Drop all subscribers and queued events; used by teardown.
    pub fn clear(&mut self) {
        self.subscribers.clear();
        self.detached_ids.clear();
        self.removed.clear();
        self.queue.clear();
    }
}

impl<S: Surface> fmt::Debug for EventBus<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .field("queued", &self.queue.len())
            .field("dispatching", &self.dispatching)
            .finish()
    }
}
