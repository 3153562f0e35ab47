//! The layout instance: lifecycle, hook pipeline, mutation API.
//!
//! One [`LayoutInstance`] owns one container, one merged option set, and
//! one mutable layout state; it is the exclusive owner of its tracked item
//! list and column-height vector. Collaborators mutate tracked state only
//! through the public operations here, never directly.
//!
//! # Concurrency model
//!
//! Single-threaded and cooperative. Hook callbacks and event subscribers
//! are the interleaving points: each may re-enter the public API. The sole
//! mutual-exclusion mechanism is the per-instance `layout_in_progress`
//! flag — a `layout()` arriving while a pass runs is dropped (not queued,
//! not retried). Callers that need guaranteed execution call again after
//! the pass resolves, signalled by [`LayoutEvent::LayoutCompleted`].

pub mod dimensions;
pub mod events;
pub mod hooks;
pub mod placement;

pub use events::{EventFn, LayoutEvent, SubscriberId};
pub use hooks::{HookFn, HookId, HookPoint, HookResult};

use crate::config::LayoutOptions;
use crate::model::{
    Breakpoint, Diagnostic, Dimensions, HookError, LayoutError, NodeId, Placement, Thresholds,
};
use crate::style;
use crate::surface::Surface;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

/// Lifecycle phase of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LifecyclePhase {
    /// Constructed, `init` not yet run.
    Uninitialized,
    /// Inside `init`.
    Initializing,
    /// Initialized and idle.
    Ready,
    /// Transient: inside a layout pass.
    LayingOut,
    /// Inside `destroy`.
    Destroying,
    /// Torn down; all operations fail.
    Destroyed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecyclePhase::Uninitialized => "uninitialized",
            LifecyclePhase::Initializing => "initializing",
            LifecyclePhase::Ready => "ready",
            LifecyclePhase::LayingOut => "laying-out",
            LifecyclePhase::Destroying => "destroying",
            LifecyclePhase::Destroyed => "destroyed",
        };
        f.write_str(name)
    }
}

/// One tracked item and its current placement, as exposed in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemState {
    /// The item's surface handle.
    pub id: NodeId,
    /// Geometry assigned by the last pass that covered this item, if any.
    pub placement: Option<Placement>,
}

/// Read-only snapshot of an instance's state.
///
/// A detached copy: holding one across further operations observes nothing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    /// The owned container.
    pub container: NodeId,
    /// Current lifecycle phase.
    pub phase: LifecyclePhase,
    /// Breakpoint of the last pass, if any pass ran.
    pub breakpoint: Option<Breakpoint>,
    /// Usable container width of the last pass.
    pub container_width: f64,
    /// Column width of the last pass.
    pub column_width: f64,
    /// Container height after the last pass.
    pub container_height: f64,
    /// Accumulated column heights; length equals the pass's column count.
    pub column_heights: Vec<f64>,
    /// Whether a pass is executing right now.
    pub layout_in_progress: bool,
    /// Tracked items in insertion order with their placements.
    pub items: Vec<ItemState>,
    /// Diagnostics from option merging plus the last pass.
    pub diagnostics: Vec<Diagnostic>,
}

struct PassSummary {
    previous_breakpoint: Option<Breakpoint>,
    breakpoint: Breakpoint,
    viewport_width: f64,
    container_height: f64,
    column_count: usize,
}

/// Responsive column-balancing layout over one container.
pub struct LayoutInstance<S: Surface> {
    surface: S,
    container: NodeId,
    options: LayoutOptions,
    thresholds: Thresholds,
    config_diagnostics: Vec<Diagnostic>,
    phase: LifecyclePhase,
    layout_in_progress: bool,
    items: Vec<NodeId>,
    placements: Vec<Option<Placement>>,
    column_heights: Vec<f64>,
    container_width: f64,
    column_width: f64,
    container_height: f64,
    current_breakpoint: Option<Breakpoint>,
    last_dims: Option<Dimensions>,
    pass_diagnostics: Vec<Diagnostic>,
    hooks: hooks::HookRegistry<S>,
    events: events::EventBus<S>,
}

impl<S: Surface> fmt::Debug for LayoutInstance<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutInstance")
            .field("container", &self.container)
            .field("phase", &self.phase)
            .field("items", &self.items.len())
            .field("breakpoint", &self.current_breakpoint)
            .finish()
    }
}

impl<S: Surface> LayoutInstance<S> {
    /// Construct an instance over a container. Does not touch the surface;
    /// call [`init`](Self::init) to discover items and run the first pass.
    pub fn new(surface: S, container: NodeId, options: LayoutOptions) -> Self {
        let mut config_diagnostics = Vec::new();
        let thresholds = Thresholds::merged(&options.thresholds, &mut config_diagnostics);
        Self {
            surface,
            container,
            options,
            thresholds,
            config_diagnostics,
            phase: LifecyclePhase::Uninitialized,
            layout_in_progress: false,
            items: Vec::new(),
            placements: Vec::new(),
            column_heights: Vec::new(),
            container_width: 0.0,
            column_width: 0.0,
            container_height: 0.0,
            current_breakpoint: None,
            last_dims: None,
            pass_diagnostics: Vec::new(),
            hooks: hooks::HookRegistry::default(),
            events: events::EventBus::default(),
        }
    }

    // ===== Public operations =====

    /// Initialize: run before-init hooks, discover items, run the first
    /// pass, run after-init hooks, emit [`LayoutEvent::Initialized`] and
    /// [`LayoutEvent::LayoutCompleted`].
    ///
    /// A missing container is fatal to this instance only; sibling
    /// instances are unaffected. An empty item set is valid and logged as
    /// informational.
    pub fn init(&mut self) -> Result<(), LayoutError> {
        self.reject_destroyed("init")?;
        self.phase = LifecyclePhase::Initializing;
        if let Err(err) = self.run_hooks(HookPoint::BeforeInit) {
            self.phase = LifecyclePhase::Uninitialized;
            return Err(err.into());
        }

        if self.surface.usable_width(self.container).is_none() {
            self.phase = LifecyclePhase::Uninitialized;
            return Err(LayoutError::MissingContainer(self.container));
        }

        self.items = self
            .surface
            .items_of(self.container, &self.options.item_selector);
        self.placements = vec![None; self.items.len()];
        if self.items.is_empty() {
            info!(container = %self.container, "no items matched the selector; laying out empty");
        }

        self.layout_in_progress = true;
        let pass = self.perform_pass();
        self.layout_in_progress = false;
        let summary = match pass {
            Ok(summary) => summary,
            Err(err) => {
                self.phase = LifecyclePhase::Uninitialized;
                return Err(err);
            }
        };

        self.phase = LifecyclePhase::Ready;
        self.run_hooks(HookPoint::AfterInit)?;
        self.emit(LayoutEvent::Initialized);
        self.emit(LayoutEvent::LayoutCompleted {
            container_height: summary.container_height,
            column_count: summary.column_count,
            breakpoint: summary.breakpoint,
        });
        Ok(())
    }

    /// Run one full layout pass.
    ///
    /// Returns `Ok(false)` when a pass is already in progress: the request
    /// is dropped by design, not queued. Otherwise runs before-layout
    /// hooks, the pass, after-layout hooks, then emits
    /// [`LayoutEvent::BreakpointChanged`] (only on an actual change) and
    /// [`LayoutEvent::LayoutCompleted`].
    pub fn layout(&mut self) -> Result<bool, LayoutError> {
        self.reject_destroyed("layout")?;
        self.reject_uninitialized("layout")?;
        if self.layout_in_progress {
            debug!(container = %self.container, "layout request dropped: pass in progress");
            return Ok(false);
        }

        self.layout_in_progress = true;
        self.phase = LifecyclePhase::LayingOut;

        if let Err(err) = self.run_hooks(HookPoint::BeforeLayout) {
            self.finish_pass();
            return Err(err.into());
        }
        let summary = match self.perform_pass() {
            Ok(summary) => summary,
            Err(err) => {
                self.finish_pass();
                return Err(err);
            }
        };
        let after = self.run_hooks(HookPoint::AfterLayout);
        self.finish_pass();
        after?;

        if let Some(previous) = summary.previous_breakpoint {
            if previous != summary.breakpoint {
                info!(
                    from = %previous,
                    to = %summary.breakpoint,
                    viewport_width = summary.viewport_width,
                    "breakpoint changed"
                );
                self.emit(LayoutEvent::BreakpointChanged {
                    from: previous,
                    to: summary.breakpoint,
                    viewport_width: summary.viewport_width,
                });
            }
        }
        self.emit(LayoutEvent::LayoutCompleted {
            container_height: summary.container_height,
            column_count: summary.column_count,
            breakpoint: summary.breakpoint,
        });
        Ok(true)
    }

    /// Re-read the tracked item list from the surface, then run a full
    /// pass. The entry point for resize and media-load triggers.
    pub fn refresh(&mut self) -> Result<bool, LayoutError> {
        self.reject_destroyed("refresh")?;
        self.reject_uninitialized("refresh")?;
        self.items = self
            .surface
            .items_of(self.container, &self.options.item_selector);
        self.placements = vec![None; self.items.len()];
        self.layout()
    }

    /// Append items and place only them against the current column heights.
    ///
    /// Existing placements are deliberately untouched — appending never
    /// reflows what is already on screen, the asymmetric counterpart of
    /// [`remove_items`](Self::remove_items). Falls back to a full pass when
    /// no dimension pass has run yet. Emits [`LayoutEvent::ItemsAdded`].
    pub fn add_items(&mut self, new_items: &[NodeId]) -> Result<(), LayoutError> {
        self.reject_destroyed("add_items")?;
        self.reject_uninitialized("add_items")?;
        if new_items.is_empty() {
            return Ok(());
        }

        match self.last_dims {
            Some(dims) => {
                self.items.extend_from_slice(new_items);
                let placed = placement::place_into(
                    &mut self.surface,
                    new_items,
                    &dims,
                    &mut self.column_heights,
                );
                self.placements
                    .extend(placed.into_iter().map(|(_, p)| Some(p)));
                self.container_height = placement::max_height(&self.column_heights);
                self.surface
                    .set_container_height(self.container, self.container_height);
            }
            None => {
                self.items.extend_from_slice(new_items);
                self.placements = vec![None; self.items.len()];
                self.layout()?;
            }
        }

        self.emit(LayoutEvent::ItemsAdded {
            added: new_items.to_vec(),
            total: self.items.len(),
        });
        Ok(())
    }

    /// Detach items from the tracked list and the visual tree, then run a
    /// full pass re-placing every survivor from scratch. Emits
    /// [`LayoutEvent::ItemsRemoved`].
    pub fn remove_items(&mut self, to_remove: &[NodeId]) -> Result<(), LayoutError> {
        self.reject_destroyed("remove_items")?;
        self.reject_uninitialized("remove_items")?;

        let removed: Vec<NodeId> = self
            .items
            .iter()
            .copied()
            .filter(|id| to_remove.contains(id))
            .collect();
        if removed.is_empty() {
            return Ok(());
        }
        for &id in &removed {
            self.surface.detach(id);
        }
        let mut index = 0;
        let placements = &mut self.placements;
        self.items.retain(|id| {
            let keep = !removed.contains(id);
            if !keep {
                placements.remove(index);
            } else {
                index += 1;
            }
            keep
        });

        self.layout()?;
        self.emit(LayoutEvent::ItemsRemoved {
            removed,
            total: self.items.len(),
        });
        Ok(())
    }

    /// Tear down: run before-destroy hooks to completion, clear tracked
    /// state, run after-destroy hooks, emit [`LayoutEvent::Destroyed`],
    /// drop all registrations.
    ///
    /// A before-destroy hook failure aborts the teardown; the instance
    /// stays usable. Calling from inside a running pass (a layout hook) is
    /// rejected with [`LayoutError::LayoutInProgress`] — once `Destroyed`
    /// is reached it must be terminal, and the surrounding pass would
    /// otherwise keep mutating the torn-down state.
    pub fn destroy(&mut self) -> Result<(), LayoutError> {
        self.reject_destroyed("destroy")?;
        if self.layout_in_progress {
            warn!(container = %self.container, "destroy rejected: pass in progress");
            return Err(LayoutError::LayoutInProgress {
                operation: "destroy",
            });
        }
        let resume = self.phase;
        self.phase = LifecyclePhase::Destroying;
        if let Err(err) = self.run_hooks(HookPoint::BeforeDestroy) {
            self.phase = resume;
            return Err(err.into());
        }

        self.items.clear();
        self.placements.clear();
        self.column_heights.clear();
        self.current_breakpoint = None;
        self.last_dims = None;
        self.phase = LifecyclePhase::Destroyed;

        let after = self.run_hooks(HookPoint::AfterDestroy);
        if let Err(err) = after {
            self.hooks.clear();
            self.events.clear();
            return Err(err.into());
        }
        self.emit(LayoutEvent::Destroyed);
        self.hooks.clear();
        self.events.clear();
        info!(container = %self.container, "layout instance destroyed");
        Ok(())
    }

    /// Read-only snapshot of the current state.
    pub fn state(&self) -> StateSnapshot {
        let mut diagnostics = self.config_diagnostics.clone();
        diagnostics.extend(self.pass_diagnostics.iter().cloned());
        StateSnapshot {
            container: self.container,
            phase: self.phase,
            breakpoint: self.current_breakpoint,
            container_width: self.container_width,
            column_width: self.column_width,
            container_height: self.container_height,
            column_heights: self.column_heights.clone(),
            layout_in_progress: self.layout_in_progress,
            items: self
                .items
                .iter()
                .zip(&self.placements)
                .map(|(id, placement)| ItemState {
                    id: *id,
                    placement: *placement,
                })
                .collect(),
            diagnostics,
        }
    }

    /// Register a hook callback; runs in registration order at its point.
    pub fn add_hook(
        &mut self,
        point: HookPoint,
        callback: impl FnMut(&mut LayoutInstance<S>) -> HookResult + 'static,
    ) -> HookId {
        self.hooks.register(point, Box::new(callback))
    }

    /// Remove a previously registered hook.
    pub fn remove_hook(&mut self, point: HookPoint, id: HookId) -> bool {
        self.hooks.remove(point, id)
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&mut LayoutInstance<S>, &LayoutEvent) + 'static,
    ) -> SubscriberId {
        self.events.subscribe(Box::new(callback))
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    // ===== Accessors =====

    /// The owned container handle.
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// The merged, immutable option set.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// The normalized breakpoint thresholds.
    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Breakpoint of the last pass, if any.
    pub fn breakpoint(&self) -> Option<Breakpoint> {
        self.current_breakpoint
    }

    /// Whether a pass is executing right now.
    pub fn is_layout_in_progress(&self) -> bool {
        self.layout_in_progress
    }

    /// Shared access to the surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the surface, e.g. to feed resize or media state
    /// from the host between passes.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    // ===== Internals =====

    fn reject_destroyed(&self, operation: &'static str) -> Result<(), LayoutError> {
        if self.phase == LifecyclePhase::Destroyed {
            return Err(LayoutError::Destroyed { operation });
        }
        Ok(())
    }

    fn reject_uninitialized(&self, operation: &'static str) -> Result<(), LayoutError> {
        match self.phase {
            LifecyclePhase::Uninitialized | LifecyclePhase::Initializing => {
                Err(LayoutError::Uninitialized { operation })
            }
            _ => Ok(()),
        }
    }

    fn finish_pass(&mut self) {
        self.layout_in_progress = false;
        self.phase = LifecyclePhase::Ready;
    }

    /// The dimension + placement pass. State is reset and recomputed from
    /// scratch; nothing from the previous pass is adjusted in place.
    fn perform_pass(&mut self) -> Result<PassSummary, LayoutError> {
        let usable_width = self
            .surface
            .usable_width(self.container)
            .ok_or(LayoutError::MissingContainer(self.container))?;
        let viewport_width = self.surface.viewport_width();
        let breakpoint = Breakpoint::classify(viewport_width, &self.thresholds);

        let resolved = style::resolve(
            &self.surface,
            self.container,
            breakpoint,
            &self.options.defaults,
        );
        let dims = dimensions::compute(&resolved, breakpoint, self.items.len(), usable_width);

        let items = self.items.clone();
        let result = placement::place_all(&mut self.surface, &items, &dims);
        self.surface
            .set_container_height(self.container, result.container_height);

        let previous_breakpoint = self.current_breakpoint;
        self.current_breakpoint = Some(breakpoint);
        self.container_width = usable_width;
        self.column_width = dims.column_width;
        self.column_heights = result.column_heights;
        self.container_height = result.container_height;
        self.placements = result
            .placements
            .into_iter()
            .map(|(_, placement)| Some(placement))
            .collect();
        self.last_dims = Some(dims);
        self.pass_diagnostics = resolved.diagnostics;

        debug!(
            container = %self.container,
            breakpoint = %breakpoint,
            columns = dims.column_count,
            container_height = self.container_height,
            items = self.items.len(),
            "pass complete"
        );

        Ok(PassSummary {
            previous_breakpoint,
            breakpoint,
            viewport_width,
            container_height: self.container_height,
            column_count: dims.column_count,
        })
    }

    fn run_hooks(&mut self, point: HookPoint) -> Result<(), HookError> {
        let mut taken = self.hooks.detach(point);
        let mut failure = None;
        for (index, entry) in taken.iter_mut().enumerate() {
            let (id, callback) = entry;
            if self.hooks.is_removed(*id) {
                continue;
            }
            if let Err(message) = callback(self) {
                failure = Some(HookError {
                    point,
                    index,
                    message,
                });
                break;
            }
        }
        self.hooks.reattach(point, taken);
        match failure {
            Some(err) => {
                warn!(point = %point, index = err.index, "hook failed; phase aborted");
                Err(err)
            }
            None => Ok(()),
        }
    }

    fn emit(&mut self, event: LayoutEvent) {
        self.events.enqueue(event);
        if !self.events.begin_dispatch() {
            // A dispatch higher up the stack will drain the queue.
            return;
        }
        while let Some(current) = self.events.next_queued() {
            let mut taken = self.events.detach();
            for entry in taken.iter_mut() {
                let (id, callback) = entry;
                if self.events.is_removed(*id) {
                    continue;
                }
                callback(self, &current);
            }
            self.events.reattach(taken);
        }
        self.events.end_dispatch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MockSurface, Natural};

    fn instance_with_items(heights: &[f64]) -> LayoutInstance<MockSurface> {
        let mut surface = MockSurface::new(1200.0);
        let container = surface.add_container(1000.0);
        for &height in heights {
            surface.add_item(container, Natural::Fixed(height));
        }
        LayoutInstance::new(surface, container, LayoutOptions::default())
    }

    #[test]
    fn init_runs_first_pass_and_reaches_ready() {
        let mut instance = instance_with_items(&[100.0, 80.0, 60.0, 40.0, 20.0]);
        instance.init().expect("init succeeds");
        assert_eq!(instance.phase(), LifecyclePhase::Ready);
        let snapshot = instance.state();
        assert_eq!(snapshot.items.len(), 5);
        assert!(snapshot.items.iter().all(|item| item.placement.is_some()));
        assert_eq!(snapshot.breakpoint, Some(Breakpoint::Desktop));
        assert!(!snapshot.layout_in_progress);
    }

    #[test]
    fn init_with_missing_container_fails_structurally() {
        let surface = MockSurface::new(1200.0);
        let mut instance =
            LayoutInstance::new(surface, NodeId::new(99), LayoutOptions::default());
        let err = instance.init().expect_err("missing container");
        assert!(matches!(err, LayoutError::MissingContainer(_)));
        assert_eq!(instance.phase(), LifecyclePhase::Uninitialized);
    }

    #[test]
    fn empty_container_initializes_without_error() {
        let mut instance = instance_with_items(&[]);
        instance.init().expect("empty is valid");
        let snapshot = instance.state();
        assert!(snapshot.items.is_empty());
        assert_eq!(snapshot.column_heights.len(), 1);
    }

    #[test]
    fn layout_before_init_is_rejected() {
        let mut instance = instance_with_items(&[100.0]);
        let err = instance.layout().expect_err("not initialized");
        assert!(matches!(err, LayoutError::Uninitialized { .. }));
    }

    #[test]
    fn operations_after_destroy_are_rejected() {
        let mut instance = instance_with_items(&[100.0]);
        instance.init().expect("init");
        instance.destroy().expect("destroy");
        assert_eq!(instance.phase(), LifecyclePhase::Destroyed);
        assert!(matches!(
            instance.layout(),
            Err(LayoutError::Destroyed { operation: "layout" })
        ));
        assert!(matches!(
            instance.destroy(),
            Err(LayoutError::Destroyed { .. })
        ));
    }

    #[test]
    fn container_height_is_written_to_the_surface() {
        let mut instance = instance_with_items(&[100.0, 100.0]);
        instance.init().expect("init");
        let container = instance.container();
        let expected = instance.state().container_height;
        assert_eq!(instance.surface().container_height(container), Some(expected));
        assert!(expected > 0.0);
    }

    #[test]
    fn column_heights_invariant_holds_after_every_pass() {
        let mut instance = instance_with_items(&[50.0, 60.0, 70.0, 80.0, 90.0]);
        instance.init().expect("init");
        let snapshot = instance.state();
        assert!(!snapshot.column_heights.is_empty());
        assert!(snapshot.column_heights.len() <= snapshot.items.len());

        instance.surface_mut().set_viewport_width(700.0);
        instance.refresh().expect("refresh");
        let snapshot = instance.state();
        assert!(!snapshot.column_heights.is_empty());
        assert!(snapshot.column_heights.len() <= snapshot.items.len());
    }

    #[test]
    fn threshold_clamp_diagnostics_surface_in_snapshot() {
        let mut surface = MockSurface::new(1200.0);
        let container = surface.add_container(1000.0);
        surface.add_item(container, Natural::Fixed(50.0));
        let options = LayoutOptions::merged(crate::config::PartialOptions {
            thresholds: Some(crate::model::ThresholdOverrides {
                mobile_portrait_max: Some(900.0),
                ..Default::default()
            }),
            ..Default::default()
        });
        let mut instance = LayoutInstance::new(surface, container, options);
        instance.init().expect("init");
        assert!(instance
            .state()
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::ThresholdClamped { .. })));
    }

    #[test]
    fn add_items_before_init_is_rejected() {
        let mut instance = instance_with_items(&[100.0]);
        let err = instance
            .add_items(&[NodeId::new(5)])
            .expect_err("not initialized");
        assert!(matches!(err, LayoutError::Uninitialized { .. }));
    }

    #[test]
    fn remove_of_untracked_items_is_a_no_op() {
        let mut instance = instance_with_items(&[100.0, 80.0]);
        instance.init().expect("init");
        let before = instance.state();
        instance
            .remove_items(&[NodeId::new(999)])
            .expect("no-op remove");
        assert_eq!(instance.state().items.len(), before.items.len());
    }
}
