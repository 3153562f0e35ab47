//! Greedy shortest-column placement.
//!
//! A streaming bin-packer, not an optimal solve: items are placed in stable
//! insertion order, each into the currently shortest column. The critical
//! ordering lives here — an item's width is committed through the surface's
//! measurement boundary *before* its height is read, because height is a
//! function of width for wrapping content.

use crate::model::{Dimensions, NodeId, Placement};
use crate::surface::Surface;
use tracing::trace;

/// Result of placing a batch of items.
#[derive(Debug, Clone, PartialEq)]
pub struct PassResult {
    /// One placement per input item, in input order.
    pub placements: Vec<(NodeId, Placement)>,
    /// Accumulated column heights after the batch.
    pub column_heights: Vec<f64>,
    /// Container height: the maximum column height. The gap after the
    /// tallest column's last item is included — acceptable slack, not
    /// trimmed.
    pub container_height: f64,
}

/// Place items into columns, accumulating onto `column_heights`.
///
/// For a full pass the caller hands in zeroed heights; for an append-only
/// pass (`add_items`) it hands in the current heights so new items stack
/// under the existing ones without reflowing them.
///
/// Per item, in order:
/// 1. pick the column with minimum accumulated height (ties go to the
///    lowest index),
/// 2. position at `(column * (column_width + gap_x), column_height)`,
/// 3. assign the column width,
/// 4. force the measurement boundary, read the natural height, and
///    accumulate `height + gap_y`.
///
/// A zero measured height (unloaded media) still participates in spacing;
/// it is permitted input, not an error.
pub fn place_into<S: Surface>(
    surface: &mut S,
    items: &[NodeId],
    dims: &Dimensions,
    column_heights: &mut Vec<f64>,
) -> Vec<(NodeId, Placement)> {
    debug_assert_eq!(column_heights.len(), dims.column_count);
    let mut placements = Vec::with_capacity(items.len());

    for &item in items {
        let column = shortest_column(column_heights);
        let x = column as f64 * (dims.column_width + dims.gap_x);
        let y = column_heights[column];

        surface.set_item_position(item, x, y);
        surface.set_item_width(item, dims.column_width);
        // Width must be live before the height is read.
        surface.commit();
        let height = surface.measure_height(item);
        column_heights[column] += height + dims.gap_y;

        trace!(item = %item, column, x, y, height, "placed item");
        placements.push((
            item,
            Placement {
                x,
                y,
                width: dims.column_width,
            },
        ));
    }

    placements
}

/// Run a full pass: zeroed columns, every item re-placed from scratch.
pub fn place_all<S: Surface>(surface: &mut S, items: &[NodeId], dims: &Dimensions) -> PassResult {
    let mut column_heights = vec![0.0; dims.column_count];
    let placements = place_into(surface, items, dims, &mut column_heights);
    let container_height = max_height(&column_heights);
    PassResult {
        placements,
        column_heights,
        container_height,
    }
}

/// Index of the column with minimum height; ties break to the lowest index.
pub fn shortest_column(column_heights: &[f64]) -> usize {
    let mut best = 0;
    for (index, height) in column_heights.iter().enumerate().skip(1) {
        if *height < column_heights[best] {
            best = index;
        }
    }
    best
}

/// Container height for a set of column heights.
pub fn max_height(column_heights: &[f64]) -> f64 {
    column_heights.iter().copied().fold(0.0, f64::max)
}
