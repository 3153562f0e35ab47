//! Placement geometry and per-pass dimension results.

use crate::model::Breakpoint;
use serde::{Deserialize, Serialize};

/// Geometry assigned to one tracked item by the placement engine.
///
/// Height is deliberately absent: it is measured input, read from the
/// surface after the width is committed, never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Horizontal offset from the container's left edge, in pixels.
    pub x: f64,
    /// Vertical offset from the container's top edge, in pixels.
    pub y: f64,
    /// Assigned width in pixels (the column width of the pass).
    pub width: f64,
}

/// Output of one dimension pass.
///
/// Always recomputed from scratch: container width, item count, and
/// breakpoint can all change between calls, so nothing here is ever
/// adjusted incrementally or kept from a stale copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dimensions {
    /// Number of columns; in `[1, max(1, item_count)]`.
    pub column_count: usize,
    /// Width of each column in pixels (even division of the usable width).
    pub column_width: f64,
    /// Horizontal gap between columns, in pixels.
    pub gap_x: f64,
    /// Vertical gap between stacked items, in pixels.
    pub gap_y: f64,
    /// Breakpoint the pass was computed for.
    pub breakpoint: Breakpoint,
}
