//! Debounced resize/media triggers.
//!
//! Resize notifications and per-item media-ready notifications arrive in
//! storms. Instead of ad hoc timers, debouncing is modeled as an explicit
//! cancellable scheduled task: scheduling a new value *supersedes* the
//! pending one (only the last notice within the delay window results in a
//! computation), and cancellation only ever applies to a pending task — an
//! in-progress layout pass cannot be cancelled, only superseded by a later
//! request once it completes.
//!
//! The watcher is host-driven: the host clock feeds `now` into
//! [`ResponsiveWatcher::poll`] from its loop and runs
//! [`refresh`](crate::engine::LayoutInstance::refresh) when a trigger
//! fires. Nothing here spawns threads or sleeps.

use crate::model::NodeId;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// A single-slot cancellable scheduled task.
///
/// Holds at most one pending value; scheduling replaces it and restarts the
/// delay. Generic so tests can drive it with plain markers.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    /// A debouncer with the given delay window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Schedule a value, superseding any pending one. The delay window
    /// restarts from `now`.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value if its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, due)) if *due <= now => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }

    /// Drop the pending value without firing.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Whether a value is waiting for its delay to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value fires, if any.
    pub fn due_at(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, due)| *due)
    }
}

/// Why a refresh is being requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchNotice {
    /// The viewport was resized.
    Resize {
        /// Viewport width reported by the notification.
        viewport_width: f64,
    },
    /// An item's embedded media finished loading and its natural height
    /// may have changed.
    MediaLoaded {
        /// The item whose media resolved.
        item: NodeId,
    },
}

/// Coalesces resize and media-load notices through one debouncer.
///
/// Both notice kinds share the slot: whichever arrives last within the
/// window wins, and either way the host reaction is the same full
/// `refresh`. Breakpoint-change detection is not done here — the engine
/// compares the classified breakpoint per pass and emits the event only on
/// an actual change.
#[derive(Debug, Clone)]
pub struct ResponsiveWatcher {
    debouncer: Debouncer<WatchNotice>,
}

impl ResponsiveWatcher {
    /// A watcher with the given debounce delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
        }
    }

    /// Record a resize notification.
    pub fn notify_resize(&mut self, viewport_width: f64, now: Instant) {
        trace!(viewport_width, "resize notice");
        self.debouncer
            .schedule(WatchNotice::Resize { viewport_width }, now);
    }

    /// Record a media-ready notification for one item.
    pub fn notify_media_loaded(&mut self, item: NodeId, now: Instant) {
        trace!(item = %item, "media-loaded notice");
        self.debouncer.schedule(WatchNotice::MediaLoaded { item }, now);
    }

    /// Fire the coalesced notice once the delay window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<WatchNotice> {
        let fired = self.debouncer.poll(now);
        if let Some(notice) = &fired {
            debug!(?notice, "debounced trigger fired");
        }
        fired
    }

    /// Whether a notice is waiting out its window.
    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}
