//! Core domain types for the layout engine.
//!
//! Everything in this module is pure data: breakpoints, node handles,
//! geometry, diagnostics, and the error taxonomy. Nothing here touches a
//! surface or performs measurement.

pub mod breakpoint;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod node;

pub use breakpoint::{Breakpoint, ThresholdOverrides, Thresholds};
pub use diagnostics::Diagnostic;
pub use error::{HookError, LayoutError};
pub use geometry::{Dimensions, Placement};
pub use node::NodeId;
