//! Breakpoint classification.
//!
//! Maps a viewport width to one of four ordinal breakpoints. Classification
//! is a pure function of the width and the threshold table; it performs no
//! surface reads and has no side effects.

use crate::model::diagnostics::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of four ordinal viewport-width classes, lowest to highest.
///
/// The derived `Ord` follows the declaration order, so
/// `MobilePortrait < MobileLandscape < Tablet < Desktop`. Increasing
/// viewport width never yields a lower-ordinal breakpoint (see
/// [`Breakpoint::classify`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Breakpoint {
    /// Narrow phone viewport.
    MobilePortrait,
    /// Wide phone viewport.
    MobileLandscape,
    /// Tablet viewport.
    Tablet,
    /// Desktop viewport; unbounded above.
    Desktop,
}

impl Breakpoint {
    /// All breakpoints in ascending ordinal order.
    pub const ALL: [Breakpoint; 4] = [
        Breakpoint::MobilePortrait,
        Breakpoint::MobileLandscape,
        Breakpoint::Tablet,
        Breakpoint::Desktop,
    ];

    /// The kebab-case name used as a style-parameter suffix
    /// (e.g. `gap-x-mobile-portrait`). Part of the wire format.
    pub fn suffix(self) -> &'static str {
        match self {
            Breakpoint::MobilePortrait => "mobile-portrait",
            Breakpoint::MobileLandscape => "mobile-landscape",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Desktop => "desktop",
        }
    }

    /// This breakpoint followed by every broader one, ending at desktop.
    ///
    /// This is the cascade order used by the style resolver: a value set
    /// only at a broader breakpoint also serves narrower lookups.
    pub fn cascade(self) -> impl Iterator<Item = Breakpoint> {
        Breakpoint::ALL.into_iter().filter(move |bp| *bp >= self)
    }

    /// Classify a viewport width against a threshold table.
    ///
    /// Each threshold is an inclusive upper bound in pixels; widths above
    /// the tablet bound classify as desktop. Monotonic: for a fixed table,
    /// `w1 <= w2` implies `classify(w1) <= classify(w2)`. This holds by
    /// construction because [`Thresholds`] keeps its bounds strictly
    /// ascending.
    pub fn classify(viewport_width: f64, thresholds: &Thresholds) -> Breakpoint {
        if viewport_width <= thresholds.mobile_portrait_max {
            Breakpoint::MobilePortrait
        } else if viewport_width <= thresholds.mobile_landscape_max {
            Breakpoint::MobileLandscape
        } else if viewport_width <= thresholds.tablet_max {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Pixel upper bounds for the three bounded breakpoints.
///
/// Desktop has no upper bound. Bounds are strictly ascending; construction
/// through [`Thresholds::merged`] enforces this by clamping, so a
/// `Thresholds` value in hand is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    /// Inclusive upper bound for `mobile-portrait`.
    pub mobile_portrait_max: f64,
    /// Inclusive upper bound for `mobile-landscape`.
    pub mobile_landscape_max: f64,
    /// Inclusive upper bound for `tablet`; anything above is `desktop`.
    pub tablet_max: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            mobile_portrait_max: 480.0,
            mobile_landscape_max: 640.0,
            tablet_max: 960.0,
        }
    }
}

impl Thresholds {
    /// Merge partial overrides over the defaults and normalize.
    ///
    /// Overriding one bound implicitly moves the neighbouring breakpoint's
    /// lower edge, which falls out of the upper-bound representation. If an
    /// override makes the bounds non-ascending, each bound is clamped to at
    /// least the previous bound plus one and a diagnostic is pushed; the
    /// resolution is deterministic, never "last one wins".
    pub fn merged(overrides: &ThresholdOverrides, diagnostics: &mut Vec<Diagnostic>) -> Self {
        let defaults = Thresholds::default();
        let portrait = overrides
            .mobile_portrait_max
            .unwrap_or(defaults.mobile_portrait_max);
        let landscape = overrides
            .mobile_landscape_max
            .unwrap_or(defaults.mobile_landscape_max);
        let tablet = overrides.tablet_max.unwrap_or(defaults.tablet_max);

        let landscape_min = portrait + 1.0;
        let landscape = if landscape < landscape_min {
            diagnostics.push(Diagnostic::ThresholdClamped {
                breakpoint: Breakpoint::MobileLandscape,
                requested: landscape,
                clamped_to: landscape_min,
            });
            landscape_min
        } else {
            landscape
        };

        let tablet_min = landscape + 1.0;
        let tablet = if tablet < tablet_min {
            diagnostics.push(Diagnostic::ThresholdClamped {
                breakpoint: Breakpoint::Tablet,
                requested: tablet,
                clamped_to: tablet_min,
            });
            tablet_min
        } else {
            tablet
        };

        Self {
            mobile_portrait_max: portrait,
            mobile_landscape_max: landscape,
            tablet_max: tablet,
        }
    }
}

/// Optional per-breakpoint threshold overrides, merged over defaults.
///
/// All fields optional; absent fields keep the built-in bound. Part of
/// [`LayoutOptions`](crate::config::LayoutOptions) and loadable from
/// configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdOverrides {
    /// Replacement upper bound for `mobile-portrait`.
    #[serde(default)]
    pub mobile_portrait_max: Option<f64>,
    /// Replacement upper bound for `mobile-landscape`.
    #[serde(default)]
    pub mobile_landscape_max: Option<f64>,
    /// Replacement upper bound for `tablet`.
    #[serde(default)]
    pub tablet_max: Option<f64>,
}
