//! Style resolution for the active breakpoint.
//!
//! Reads the cascading sizing/gap parameters off a container and produces
//! concrete pixel values plus the sizing mode for the dimension calculator.
//! Resolution happens synchronously inside every pass and is never cached:
//! relative units are resolved against the reference font sizes *at call
//! time*, and those references can change between breakpoint changes.
//!
//! # Wire format
//!
//! Parameter names are a contract with site authors and collaborators:
//!
//! - `column-min-width` — minimum column width (minimum-width mode)
//! - `columns` — fixed column count (fixed-count mode)
//! - `gap-x` / `gap-y` — horizontal/vertical gaps
//! - `gap` — legacy flat gap, fallback for both axes
//!
//! Each of the first four may carry a breakpoint suffix
//! (`columns-tablet`, `gap-x-mobile-portrait`, ...). Lookup for a
//! breakpoint tries the suffixed name at that breakpoint, then cascades
//! through broader breakpoints up to desktop, then the unsuffixed name.
//!
//! # Cascade asymmetry
//!
//! Fixed counts cascade upward (a count set only at tablet also serves the
//! mobile lookups), but `column-min-width` does *not* cascade below
//! desktop: switching a narrower breakpoint into minimum-width mode
//! requires a suffixed value on that breakpoint. The unsuffixed
//! `column-min-width` and `columns` forms count as desktop-level values.

pub mod units;

use crate::model::{Breakpoint, Diagnostic, NodeId};
use crate::style::units::{Unit, UnitContext};
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Wire-format name: minimum column width.
pub const PARAM_COLUMN_MIN_WIDTH: &str = "column-min-width";
/// Wire-format name: fixed column count.
pub const PARAM_COLUMNS: &str = "columns";
/// Wire-format name: horizontal gap.
pub const PARAM_GAP_X: &str = "gap-x";
/// Wire-format name: vertical gap.
pub const PARAM_GAP_Y: &str = "gap-y";
/// Wire-format name: legacy flat gap, both axes.
pub const PARAM_GAP_LEGACY: &str = "gap";

/// Built-in fallback values, used when the cascade finds nothing.
///
/// Overridable per instance through
/// [`LayoutOptions`](crate::config::LayoutOptions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct DefaultsTable {
    /// Default minimum column width in pixels (desktop mode).
    pub min_column_width: f64,
    /// Default fixed count at `mobile-portrait`.
    pub columns_mobile_portrait: usize,
    /// Default fixed count at `mobile-landscape`.
    pub columns_mobile_landscape: usize,
    /// Default fixed count at `tablet`.
    pub columns_tablet: usize,
    /// Default fixed count at `desktop`, used only when fixed-count mode is
    /// forced there without a value.
    pub columns_desktop: usize,
    /// Default horizontal gap in pixels.
    pub gap_x: f64,
    /// Default vertical gap in pixels.
    pub gap_y: f64,
}

impl Default for DefaultsTable {
    fn default() -> Self {
        Self {
            min_column_width: 300.0,
            columns_mobile_portrait: 1,
            columns_mobile_landscape: 2,
            columns_tablet: 3,
            columns_desktop: 4,
            gap_x: 20.0,
            gap_y: 20.0,
        }
    }
}

impl DefaultsTable {
    /// Default fixed count for a breakpoint.
    pub fn columns_for(&self, breakpoint: Breakpoint) -> usize {
        match breakpoint {
            Breakpoint::MobilePortrait => self.columns_mobile_portrait,
            Breakpoint::MobileLandscape => self.columns_mobile_landscape,
            Breakpoint::Tablet => self.columns_tablet,
            Breakpoint::Desktop => self.columns_desktop,
        }
    }
}

/// How the dimension calculator should derive the column count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SizingMode {
    /// Fit as many columns of at least this width (pixels) as possible.
    MinWidth(f64),
    /// Use this many columns; width follows by even division.
    FixedCount(usize),
}

/// Output of one style resolution, valid for a single pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    /// Breakpoint the resolution was performed for.
    pub breakpoint: Breakpoint,
    /// Sizing mode after conflict resolution.
    pub mode: SizingMode,
    /// Horizontal gap in pixels.
    pub gap_x: f64,
    /// Vertical gap in pixels.
    pub gap_y: f64,
    /// Recoverable problems found during resolution.
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolve sizing/gap parameters for a container at a breakpoint.
///
/// # Conflict policy
///
/// If both `column-min-width` and `columns` are explicitly set for the same
/// breakpoint, minimum-width mode wins and a
/// [`Diagnostic::SizingModeConflict`] is recorded. Deterministic and
/// documented, never "last one wins".
pub fn resolve<S: Surface>(
    surface: &S,
    container: NodeId,
    breakpoint: Breakpoint,
    defaults: &DefaultsTable,
) -> ResolvedStyle {
    let mut diagnostics = Vec::new();
    let ctx = UnitContext {
        root_font_size: surface.root_font_size(),
        element_font_size: surface.font_size(container),
    };

    let direct_min_width = read_direct(surface, container, PARAM_COLUMN_MIN_WIDTH, breakpoint);
    let direct_columns = read_direct(surface, container, PARAM_COLUMNS, breakpoint);
    if direct_min_width.is_some() && direct_columns.is_some() {
        note(
            &mut diagnostics,
            Diagnostic::SizingModeConflict { breakpoint },
        );
    }

    let mode = if let Some((name, raw)) = direct_min_width {
        SizingMode::MinWidth(length_px(&name, &raw, ctx, &mut diagnostics))
    } else if let Some((name, raw)) = read_cascaded(surface, container, PARAM_COLUMNS, breakpoint)
    {
        SizingMode::FixedCount(count(&name, &raw, &mut diagnostics))
    } else if breakpoint == Breakpoint::Desktop {
        SizingMode::MinWidth(defaults.min_column_width)
    } else {
        SizingMode::FixedCount(defaults.columns_for(breakpoint))
    };

    let gap_x = resolve_gap(
        surface,
        container,
        PARAM_GAP_X,
        breakpoint,
        defaults.gap_x,
        ctx,
        &mut diagnostics,
    );
    let gap_y = resolve_gap(
        surface,
        container,
        PARAM_GAP_Y,
        breakpoint,
        defaults.gap_y,
        ctx,
        &mut diagnostics,
    );

    debug!(
        container = %container,
        breakpoint = %breakpoint,
        ?mode,
        gap_x,
        gap_y,
        "resolved style"
    );

    ResolvedStyle {
        breakpoint,
        mode,
        gap_x,
        gap_y,
        diagnostics,
    }
}

/// Value explicitly set *for* this breakpoint: the suffixed form, or the
/// unsuffixed form when the breakpoint is desktop.
fn read_direct<S: Surface>(
    surface: &S,
    container: NodeId,
    base: &str,
    breakpoint: Breakpoint,
) -> Option<(String, String)> {
    let suffixed = format!("{base}-{}", breakpoint.suffix());
    if let Some(raw) = surface.style_value(container, &suffixed) {
        return Some((suffixed, raw));
    }
    if breakpoint == Breakpoint::Desktop {
        if let Some(raw) = surface.style_value(container, base) {
            return Some((base.to_string(), raw));
        }
    }
    None
}

/// Cascaded lookup: suffixed at this breakpoint, then each broader
/// breakpoint up to desktop, then the unsuffixed legacy form.
fn read_cascaded<S: Surface>(
    surface: &S,
    container: NodeId,
    base: &str,
    breakpoint: Breakpoint,
) -> Option<(String, String)> {
    for candidate in breakpoint.cascade() {
        let name = format!("{base}-{}", candidate.suffix());
        if let Some(raw) = surface.style_value(container, &name) {
            return Some((name, raw));
        }
    }
    surface
        .style_value(container, base)
        .map(|raw| (base.to_string(), raw))
}

fn resolve_gap<S: Surface>(
    surface: &S,
    container: NodeId,
    base: &str,
    breakpoint: Breakpoint,
    default: f64,
    ctx: UnitContext,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    if let Some((name, raw)) = read_cascaded(surface, container, base, breakpoint) {
        return length_px(&name, &raw, ctx, diagnostics);
    }
    // Legacy flat `gap` serves both axes.
    if let Some(raw) = surface.style_value(container, PARAM_GAP_LEGACY) {
        return length_px(PARAM_GAP_LEGACY, &raw, ctx, diagnostics);
    }
    default
}

/// Convert a size-like raw value to pixels, raising diagnostics for
/// unitless or unparsable input. Unparsable values become zero.
fn length_px(name: &str, raw: &str, ctx: UnitContext, diagnostics: &mut Vec<Diagnostic>) -> f64 {
    match units::parse(raw) {
        Some(value) => {
            if value.unit == Unit::Unitless {
                note(
                    diagnostics,
                    Diagnostic::UnitlessValue {
                        parameter: name.to_string(),
                        value: value.number,
                    },
                );
            }
            value.to_px(ctx)
        }
        None => {
            note(
                diagnostics,
                Diagnostic::InvalidValue {
                    parameter: name.to_string(),
                    raw: raw.to_string(),
                },
            );
            0.0
        }
    }
}

/// Parse a column count. Counts are naturally unitless, so no diagnostic
/// for bare numbers; anything else is invalid and becomes zero (clamped to
/// one column downstream).
fn count(name: &str, raw: &str, diagnostics: &mut Vec<Diagnostic>) -> usize {
    match raw.trim().parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
            note(
                diagnostics,
                Diagnostic::InvalidValue {
                    parameter: name.to_string(),
                    raw: raw.to_string(),
                },
            );
            0
        }
    }
}

fn note(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    warn!(%diagnostic, "style diagnostic");
    diagnostics.push(diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{MockSurface, Natural};

    fn surface_with_container() -> (MockSurface, NodeId) {
        let mut surface = MockSurface::new(1200.0);
        let container = surface.add_container(1000.0);
        surface.add_item(container, Natural::Fixed(100.0));
        (surface, container)
    }

    #[test]
    fn desktop_defaults_to_min_width_mode() {
        let (surface, container) = surface_with_container();
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::MinWidth(300.0));
        assert_eq!(style.gap_x, 20.0);
        assert_eq!(style.gap_y, 20.0);
        assert!(style.diagnostics.is_empty());
    }

    #[test]
    fn non_desktop_defaults_to_fixed_count() {
        let (surface, container) = surface_with_container();
        let style = resolve(
            &surface,
            container,
            Breakpoint::MobileLandscape,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::FixedCount(2));
    }

    #[test]
    fn tablet_count_cascades_down_to_mobile() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "columns-tablet", "2");
        let style = resolve(
            &surface,
            container,
            Breakpoint::MobilePortrait,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::FixedCount(2));
    }

    #[test]
    fn min_width_does_not_cascade_below_desktop() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "column-min-width", "250px");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Tablet,
            &DefaultsTable::default(),
        );
        // Tablet stays in fixed-count mode; the unsuffixed value is
        // desktop-level.
        assert_eq!(style.mode, SizingMode::FixedCount(3));

        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::MinWidth(250.0));
    }

    #[test]
    fn suffixed_min_width_switches_a_breakpoint_into_min_width_mode() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "column-min-width-tablet", "200px");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Tablet,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::MinWidth(200.0));
    }

    #[test]
    fn conflict_prefers_min_width_and_reports() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "column-min-width", "280px");
        surface.set_style(container, "columns", "5");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.mode, SizingMode::MinWidth(280.0));
        assert!(style.diagnostics.iter().any(|d| matches!(
            d,
            Diagnostic::SizingModeConflict {
                breakpoint: Breakpoint::Desktop
            }
        )));
    }

    #[test]
    fn relative_units_resolve_against_current_references() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "gap-x", "1rem");
        surface.set_style(container, "gap-y", "1em");
        surface.set_font_size(container, 20.0);
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.gap_x, 16.0);
        assert_eq!(style.gap_y, 20.0);

        // Changing the references changes the next resolution; nothing is
        // cached between calls.
        surface.set_root_font_size(10.0);
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.gap_x, 10.0);
    }

    #[test]
    fn legacy_flat_gap_serves_both_axes() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "gap", "12px");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.gap_x, 12.0);
        assert_eq!(style.gap_y, 12.0);
    }

    #[test]
    fn gap_cascade_beats_legacy_flat_gap() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "gap", "12px");
        surface.set_style(container, "gap-x-desktop", "30px");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Tablet,
            &DefaultsTable::default(),
        );
        // gap-x cascades up to the desktop value; gap-y falls through to
        // the legacy flat gap.
        assert_eq!(style.gap_x, 30.0);
        assert_eq!(style.gap_y, 12.0);
    }

    #[test]
    fn unitless_gap_is_accepted_with_diagnostic() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "gap-x", "15");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.gap_x, 15.0);
        assert!(style
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::UnitlessValue { .. })));
    }

    #[test]
    fn unparsable_value_becomes_zero_with_diagnostic() {
        let (mut surface, container) = surface_with_container();
        surface.set_style(container, "gap-y", "wide");
        let style = resolve(
            &surface,
            container,
            Breakpoint::Desktop,
            &DefaultsTable::default(),
        );
        assert_eq!(style.gap_y, 0.0);
        assert!(style
            .diagnostics
            .iter()
            .any(|d| matches!(d, Diagnostic::InvalidValue { .. })));
    }
}
