//! Attribute-based container discovery.
//!
//! The engine never decides *when* discovery runs; the host application
//! calls this at a time of its choosing (the binary does it once at
//! startup) and constructs one instance per returned container.

use crate::model::NodeId;
use crate::surface::Surface;
use tracing::info;

/// Containers bearing `attr` with exactly `value`, in document order.
///
/// Zero matches is a valid outcome, logged as informational — a page
/// without layout containers is not an error.
pub fn discover_containers<S: Surface>(surface: &S, attr: &str, value: &str) -> Vec<NodeId> {
    let matched: Vec<NodeId> = surface
        .containers()
        .into_iter()
        .filter(|container| surface.attribute(*container, attr).as_deref() == Some(value))
        .collect();
    if matched.is_empty() {
        info!(attr, value, "no containers discovered");
    } else {
        info!(attr, value, count = matched.len(), "containers discovered");
    }
    matched
}
