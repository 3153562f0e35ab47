//! Error taxonomy for layout operations.
//!
//! Structured errors via `thiserror`, composing with `?` and `From`. The
//! split mirrors the recovery policy:
//!
//! - *Structural* problems (missing container, operating on a destroyed
//!   instance) and *hook failures* surface to the caller as [`LayoutError`].
//! - *Configuration conflicts* and *invalid style values* are recovered
//!   locally with a deterministic fallback and reported as
//!   [`Diagnostic`](crate::model::Diagnostic) notices, never as errors.
//! - A reentrant layout request is not an error at all: it is dropped by
//!   design and reported through the `Ok(false)` return of
//!   [`layout()`](crate::engine::LayoutInstance::layout).

use crate::engine::hooks::HookPoint;
use crate::model::NodeId;
use thiserror::Error;

/// Failure of a public engine operation.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The container handle does not resolve on the surface.
    ///
    /// Fatal to this instance's initialization only; sibling instances on
    /// the same surface are unaffected.
    #[error("container {0} not found on surface")]
    MissingContainer(NodeId),

    /// An operation other than `init` was invoked before `init` succeeded.
    #[error("`{operation}` called on an uninitialized layout instance")]
    Uninitialized {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// An operation was invoked after `destroy` completed.
    #[error("`{operation}` called on a destroyed layout instance")]
    Destroyed {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// An operation that must not interleave with a pass was invoked from
    /// inside one, e.g. `destroy` from a layout hook. Unlike a reentrant
    /// `layout()`, which is silently dropped, this is reported: silently
    /// skipping a teardown would leave the caller believing the instance
    /// is gone.
    #[error("`{operation}` called while a layout pass is in progress")]
    LayoutInProgress {
        /// Name of the rejected operation.
        operation: &'static str,
    },

    /// A registered hook callback failed, aborting its phase.
    #[error(transparent)]
    Hook(#[from] HookError),
}

/// A hook callback returned an error.
///
/// The remaining callbacks of the phase were skipped and the triggering
/// operation (init/layout/destroy) aborted. Callbacks that had already run
/// are not rolled back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("hook {index} at {point} failed: {message}")]
pub struct HookError {
    /// The pipeline point whose run was aborted.
    pub point: HookPoint,
    /// Zero-based position of the failing callback in registration order.
    pub index: usize,
    /// Message carried by the callback's error.
    pub message: String,
}
