//! Opaque element handles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a container or item element on a [`Surface`](crate::surface::Surface).
///
/// The engine never interprets the inner value; it only passes handles back
/// to the surface that issued them. Handles from one surface are meaningless
/// on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a raw surface-issued value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value, for surfaces that index by it.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
