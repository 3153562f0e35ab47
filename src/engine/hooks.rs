//! Per-instance hook registry.
//!
//! Six named points around init/layout/destroy. Callbacks run in
//! registration order, each completing before the next; a failing callback
//! aborts the remainder of its phase and the triggering operation. The
//! registry is strictly per instance — there is no shared default hook
//! list, so registering on one instance can never leak into another.
//!
//! # Reentrancy
//!
//! While a phase runs, its callback list is detached from the registry and
//! each callback receives `&mut LayoutInstance`, so callbacks may re-enter
//! the public API without aliasing the list they are running from. Hooks
//! registered from inside a callback land in the (empty) live slot and are
//! appended on reattach: they take effect from the next run of that phase.

use crate::engine::LayoutInstance;
use crate::surface::Surface;
use std::collections::HashSet;
use std::fmt;

/// The six pipeline points hooks can attach to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// Before initialization begins.
    BeforeInit,
    /// After initialization (including the first pass) completes.
    AfterInit,
    /// Before a layout pass, inside the reentrancy guard.
    BeforeLayout,
    /// After a layout pass, still inside the reentrancy guard.
    AfterLayout,
    /// Before teardown begins; runs to completion before state is torn down.
    BeforeDestroy,
    /// After teardown completes.
    AfterDestroy,
}

impl HookPoint {
    const COUNT: usize = 6;

    fn slot(self) -> usize {
        match self {
            HookPoint::BeforeInit => 0,
            HookPoint::AfterInit => 1,
            HookPoint::BeforeLayout => 2,
            HookPoint::AfterLayout => 3,
            HookPoint::BeforeDestroy => 4,
            HookPoint::AfterDestroy => 5,
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HookPoint::BeforeInit => "before-init",
            HookPoint::AfterInit => "after-init",
            HookPoint::BeforeLayout => "before-layout",
            HookPoint::AfterLayout => "after-layout",
            HookPoint::BeforeDestroy => "before-destroy",
            HookPoint::AfterDestroy => "after-destroy",
        };
        f.write_str(name)
    }
}

/// Handle to a registered hook, for removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// What a hook callback returns; an `Err` aborts the phase.
pub type HookResult = Result<(), String>;

/// Boxed hook callback. Receives the owning instance mutably and may
/// re-enter its public API.
pub type HookFn<S> = Box<dyn FnMut(&mut LayoutInstance<S>) -> HookResult>;

/// Ordered callback lists for one instance.
pub struct HookRegistry<S: Surface> {
    slots: [Vec<(HookId, HookFn<S>)>; HookPoint::COUNT],
    detached_ids: [HashSet<HookId>; HookPoint::COUNT],
    removed: HashSet<HookId>,
    next_id: u64,
}

impl<S: Surface> Default for HookRegistry<S> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| Vec::new()),
            detached_ids: std::array::from_fn(|_| HashSet::new()),
            removed: HashSet::new(),
            next_id: 0,
        }
    }
}

impl<S: Surface> HookRegistry<S> {
    /// Append a callback at a point; returns its removal handle.
    pub fn register(&mut self, point: HookPoint, callback: HookFn<S>) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.slots[point.slot()].push((id, callback));
        id
    }

    /// Remove a callback. Returns `true` when it was found in the live
    /// list; a callback currently detached for execution at `point` is
    /// marked instead and dropped when its list is reattached (and skipped
    /// if it has not run yet). An id not registered at `point` is a no-op.
    pub fn remove(&mut self, point: HookPoint, id: HookId) -> bool {
        let slot = &mut self.slots[point.slot()];
        let before = slot.len();
        slot.retain(|(existing, _)| *existing != id);
        if slot.len() < before {
            true
        } else {
            if self.detached_ids[point.slot()].contains(&id) {
                self.removed.insert(id);
            }
            false
        }
    }

    /// Number of live callbacks at a point.
    pub fn len(&self, point: HookPoint) -> usize {
        self.slots[point.slot()].len()
    }

    /// Whether a point has no callbacks.
    pub fn is_empty(&self, point: HookPoint) -> bool {
        self.slots[point.slot()].is_empty()
    }

    pub(crate) fn detach(&mut self, point: HookPoint) -> Vec<(HookId, HookFn<S>)> {
        let taken = std::mem::take(&mut self.slots[point.slot()]);
        self.detached_ids[point.slot()] = taken.iter().map(|(id, _)| *id).collect();
        taken
    }

    pub(crate) fn reattach(&mut self, point: HookPoint, taken: Vec<(HookId, HookFn<S>)>) {
        self.detached_ids[point.slot()].clear();
        let added_during_run = std::mem::take(&mut self.slots[point.slot()]);
        let mut restored: Vec<(HookId, HookFn<S>)> = taken
            .into_iter()
            .filter(|(id, _)| !self.removed.remove(id))
            .collect();
        restored.extend(added_during_run);
        self.slots[point.slot()] = restored;
    }

    pub(crate) fn is_removed(&self, id: HookId) -> bool {
        self.removed.contains(&id)
    }

    /// Drop every callback; used by teardown.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        for ids in &mut self.detached_ids {
            ids.clear();
        }
        self.removed.clear();
    }
}

impl<S: Surface> fmt::Debug for HookRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookRegistry")
            .field("counts", &self.slots.each_ref().map(Vec::len))
            .field("next_id", &self.next_id)
            .finish()
    }
}
