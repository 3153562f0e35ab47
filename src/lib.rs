//! colonnade — responsive column-balancing (masonry) layout engine.
//!
//! Arranges variable-height items into balanced columns: breakpoint-driven
//! sizing resolution, column-count/width computation, greedy
//! shortest-column placement, and the lifecycle/hook scaffolding that makes
//! placement re-entrant-safe and extensible.
//!
//! The engine is host-agnostic: measurement and style reads go through the
//! injected [`surface::Surface`] capability, so the same code lays out a
//! real document or the deterministic [`surface::MockSurface`]. Data flows
//! one direction — viewport/config → dimensions → placement → container
//! height and per-item geometry → lifecycle events consumed by
//! collaborators.

pub mod config;
pub mod discover;
pub mod engine;
pub mod logging;
pub mod model;
pub mod style;
pub mod surface;
pub mod watch;

pub use config::{LayoutOptions, PartialOptions};
pub use engine::{
    HookId, HookPoint, HookResult, LayoutEvent, LayoutInstance, LifecyclePhase, StateSnapshot,
    SubscriberId,
};
pub use model::{Breakpoint, Diagnostic, LayoutError, NodeId, Placement};
pub use surface::Surface;
pub use watch::{Debouncer, ResponsiveWatcher, WatchNotice};
