//! Dimension calculation: column count and column width for one pass.

use crate::model::{Breakpoint, Dimensions};
use crate::style::{ResolvedStyle, SizingMode};
use tracing::debug;

/// Compute column count and width from resolved style values.
///
/// Recomputed from scratch on every call — container width, item count and
/// breakpoint can all change between calls, so there is no incremental
/// adjustment path.
///
/// Minimum-width mode fits as many columns of at least the configured width
/// as possible: `floor((usable + gap_x) / (min_width + gap_x))`. Fixed-count
/// mode takes the configured count directly. Either way the count is
/// clamped to `[1, item_count]` — an empty column is disallowed, so there
/// are never more columns than items (with zero items the clamp floor of 1
/// applies). Column width is then the even division of the usable width,
/// which in minimum-width mode may exceed the configured minimum.
pub fn compute(
    style: &ResolvedStyle,
    breakpoint: Breakpoint,
    item_count: usize,
    usable_width: f64,
) -> Dimensions {
    let max_columns = item_count.max(1);
    let column_count = match style.mode {
        SizingMode::MinWidth(min_width) => {
            let stride = min_width + style.gap_x;
            let fit = if stride > 0.0 {
                ((usable_width + style.gap_x) / stride).floor() as usize
            } else {
                max_columns
            };
            fit.clamp(1, max_columns)
        }
        SizingMode::FixedCount(count) => count.clamp(1, max_columns),
    };

    let gaps_total = style.gap_x * (column_count - 1) as f64;
    let column_width = (usable_width - gaps_total) / column_count as f64;

    debug!(
        breakpoint = %breakpoint,
        item_count,
        usable_width,
        column_count,
        column_width,
        "computed dimensions"
    );

    Dimensions {
        column_count,
        column_width,
        gap_x: style.gap_x,
        gap_y: style.gap_y,
        breakpoint,
    }
}
