//! The injected measurement/mutation capability the engine lays out against.
//!
//! The original problem is DOM-shaped: item height is a function of item
//! width for wrapping content, so a width must be committed and a
//! render/measurement boundary crossed before the height may be read.
//! Rather than coupling the engine to any particular document model, that
//! boundary is abstracted as the [`Surface`] trait; the engine calls
//! [`Surface::commit`] between the width-commit and height-read steps of
//! every placement. A deterministic test double lives in [`mock`].

pub mod mock;

pub use mock::{MockSurface, Natural, Scene};

use crate::model::NodeId;
use std::cell::RefCell;
use std::rc::Rc;

/// Host document capability: style reads, geometry writes, and the forced
/// measurement boundary.
///
/// All calls are single-threaded; sharing one surface across several
/// instances goes through the blanket `Rc<RefCell<_>>` impl, never through
/// locking.
///
/// # Measurement contract
///
/// [`measure_height`](Surface::measure_height) reflects only *committed*
/// widths. Measuring an item whose width was assigned since the last
/// [`commit`](Surface::commit) returns the stale height — precisely the bug
/// the engine's width-commit-then-measure ordering exists to prevent. An
/// unmeasured element may legitimately report zero height; zero is valid
/// input to placement, not an error.
pub trait Surface {
    /// Current viewport width in pixels. Drives breakpoint classification.
    fn viewport_width(&self) -> f64;

    /// Usable width of a container: outer width minus horizontal padding.
    /// `None` when the handle does not resolve to a container.
    fn usable_width(&self, container: NodeId) -> Option<f64>;

    /// Root font size in pixels, the reference for `rem` values.
    fn root_font_size(&self) -> f64;

    /// Font size of a node in pixels, the reference for `em` values on it.
    fn font_size(&self, node: NodeId) -> f64;

    /// Read a style parameter by wire-format name, raw and unconverted.
    fn style_value(&self, node: NodeId, name: &str) -> Option<String>;

    /// Read a plain attribute, used by container auto-discovery.
    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// All candidate container nodes, in document order.
    fn containers(&self) -> Vec<NodeId>;

    /// Item children of a container matching a selector, in document order.
    /// Document order is the engine's stable insertion order.
    fn items_of(&self, container: NodeId, selector: &str) -> Vec<NodeId>;

    /// Stage an item's width. Takes effect at the next [`commit`](Surface::commit).
    fn set_item_width(&mut self, node: NodeId, width: f64);

    /// Position an item within its container.
    fn set_item_position(&mut self, node: NodeId, x: f64, y: f64);

    /// Set the container's explicit height after a pass.
    fn set_container_height(&mut self, container: NodeId, height: f64);

    /// Force the render/measurement boundary: staged widths become
    /// effective and natural heights are recomputed against them.
    fn commit(&mut self);

    /// Natural height of a node under its last committed width.
    fn measure_height(&self, node: NodeId) -> f64;

    /// Detach a node from the visual tree. Detached nodes stop appearing
    /// in [`items_of`](Surface::items_of).
    fn detach(&mut self, node: NodeId);
}

impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn viewport_width(&self) -> f64 {
        self.borrow().viewport_width()
    }

    fn usable_width(&self, container: NodeId) -> Option<f64> {
        self.borrow().usable_width(container)
    }

    fn root_font_size(&self) -> f64 {
        self.borrow().root_font_size()
    }

    fn font_size(&self, node: NodeId) -> f64 {
        self.borrow().font_size(node)
    }

    fn style_value(&self, node: NodeId, name: &str) -> Option<String> {
        self.borrow().style_value(node, name)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.borrow().attribute(node, name)
    }

    fn containers(&self) -> Vec<NodeId> {
        self.borrow().containers()
    }

    fn items_of(&self, container: NodeId, selector: &str) -> Vec<NodeId> {
        self.borrow().items_of(container, selector)
    }

    fn set_item_width(&mut self, node: NodeId, width: f64) {
        self.borrow_mut().set_item_width(node, width);
    }

    fn set_item_position(&mut self, node: NodeId, x: f64, y: f64) {
        self.borrow_mut().set_item_position(node, x, y);
    }

    fn set_container_height(&mut self, container: NodeId, height: f64) {
        self.borrow_mut().set_container_height(container, height);
    }

    fn commit(&mut self) {
        self.borrow_mut().commit();
    }

    fn measure_height(&self, node: NodeId) -> f64 {
        self.borrow().measure_height(node)
    }

    fn detach(&mut self, node: NodeId) {
        self.borrow_mut().detach(node);
    }
}
