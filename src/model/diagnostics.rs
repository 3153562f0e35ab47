//! Diagnostic notices for recoverable configuration and value problems.
//!
//! Diagnostics are never fatal. They are collected on the pass output (and
//! surfaced in state snapshots) so collaborators and site authors can see
//! what was resolved away, and each one is also logged through `tracing`
//! at the point it is raised.

use crate::model::Breakpoint;
use serde::Serialize;
use std::fmt;

/// A recoverable problem found while resolving configuration or styles.
///
/// Each variant corresponds to a deterministic local resolution: the engine
/// reports what it did, it does not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// Both `column-min-width` and `columns` were explicitly set for one
    /// breakpoint. Minimum-width mode wins; the count is ignored.
    SizingModeConflict {
        /// Breakpoint with both sizing modes configured.
        breakpoint: Breakpoint,
    },
    /// A gap/size-like parameter carried a bare number. The value is
    /// accepted as pixels, but the intent is ambiguous.
    UnitlessValue {
        /// Wire-format parameter name as read.
        parameter: String,
        /// The numeric value that was accepted.
        value: f64,
    },
    /// A style value failed to parse. It is treated as zero.
    InvalidValue {
        /// Wire-format parameter name as read.
        parameter: String,
        /// The raw text that failed to parse.
        raw: String,
    },
    /// A custom breakpoint threshold override broke the ascending order of
    /// bounds and was clamped.
    ThresholdClamped {
        /// Breakpoint whose bound was adjusted.
        breakpoint: Breakpoint,
        /// The configured bound.
        requested: f64,
        /// The bound actually used.
        clamped_to: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SizingModeConflict { breakpoint } => write!(
                f,
                "both column-min-width and columns set for {breakpoint}; minimum-width mode wins"
            ),
            Diagnostic::UnitlessValue { parameter, value } => {
                write!(f, "unitless value {value} for {parameter}; assuming pixels")
            }
            Diagnostic::InvalidValue { parameter, raw } => {
                write!(f, "unparsable value {raw:?} for {parameter}; treating as 0")
            }
            Diagnostic::ThresholdClamped {
                breakpoint,
                requested,
                clamped_to,
            } => write!(
                f,
                "threshold override {requested}px for {breakpoint} breaks ascending order; clamped to {clamped_to}px"
            ),
        }
    }
}
