//! Deterministic in-memory surface.
//!
//! Used as the test double for the engine and as the document stand-in for
//! the `colonnade` binary, which loads it from a serialized [`Scene`].
//!
//! Items model wrapping content: a *fluid* item has a fixed content area and
//! reports `area / committed_width` as its natural height, so height really
//! is a function of width and a stale measurement is observable. A *pending*
//! item models media that has not loaded yet and measures zero until
//! [`MockSurface::resolve_media`] is called.

use crate::model::NodeId;
use crate::surface::Surface;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Natural sizing behaviour of a mock item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Natural {
    /// Height independent of width.
    Fixed(f64),
    /// Wrapping content: height is `area / width` under the committed width.
    Fluid {
        /// Content area in square pixels.
        area: f64,
    },
    /// Media not loaded yet; measures zero.
    Pending,
}

#[derive(Debug, Clone)]
enum MockNode {
    Container {
        usable_width: f64,
        font_size: f64,
        styles: BTreeMap<String, String>,
        attributes: BTreeMap<String, String>,
        children: Vec<NodeId>,
        height: Option<f64>,
    },
    Item {
        selector: String,
        font_size: f64,
        natural: Natural,
        staged_width: Option<f64>,
        committed_width: Option<f64>,
        x: f64,
        y: f64,
        detached: bool,
    },
}

/// In-memory [`Surface`] with deterministic measurement.
#[derive(Debug, Clone)]
pub struct MockSurface {
    viewport_width: f64,
    root_font_size: f64,
    nodes: Vec<MockNode>,
    containers: Vec<NodeId>,
    commit_count: u64,
}

impl MockSurface {
    /// Empty surface with the given viewport width and a 16px root font.
    pub fn new(viewport_width: f64) -> Self {
        Self {
            viewport_width,
            root_font_size: 16.0,
            nodes: Vec::new(),
            containers: Vec::new(),
            commit_count: 0,
        }
    }

    /// Build a surface from a serialized scene description.
    pub fn from_scene(scene: &Scene) -> Self {
        let mut surface = Self::new(scene.viewport_width);
        surface.root_font_size = scene.root_font_size;
        for container in &scene.containers {
            let id = surface.add_container(container.usable_width);
            surface.set_font_size(id, container.font_size);
            for (name, value) in &container.styles {
                surface.set_style(id, name, value);
            }
            for (name, value) in &container.attributes {
                surface.set_attribute(id, name, value);
            }
            for item in &container.items {
                let natural = match (item.area, item.height) {
                    (Some(area), _) => Natural::Fluid { area },
                    (None, Some(height)) => Natural::Fixed(height),
                    (None, None) => Natural::Pending,
                };
                surface.add_item_with_selector(id, &item.selector, natural);
            }
        }
        surface
    }

    /// Add a container with the given usable width; returns its handle.
    pub fn add_container(&mut self, usable_width: f64) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(MockNode::Container {
            usable_width,
            font_size: 16.0,
            styles: BTreeMap::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            height: None,
        });
        self.containers.push(id);
        id
    }

    /// Add an item with the default `item` selector.
    pub fn add_item(&mut self, container: NodeId, natural: Natural) -> NodeId {
        self.add_item_with_selector(container, "item", natural)
    }

    /// Add an item matching `selector` under a container, in document order.
    ///
    /// # Panics
    /// Panics when `container` is not a container handle; mock construction
    /// is test scaffolding, not engine input validation.
    pub fn add_item_with_selector(
        &mut self,
        container: NodeId,
        selector: &str,
        natural: Natural,
    ) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(MockNode::Item {
            selector: selector.to_string(),
            font_size: 16.0,
            natural,
            staged_width: None,
            committed_width: None,
            x: 0.0,
            y: 0.0,
            detached: false,
        });
        match &mut self.nodes[container.get() as usize] {
            MockNode::Container { children, .. } => children.push(id),
            MockNode::Item { .. } => panic!("{container} is not a container"),
        }
        id
    }

    /// Set a style parameter by wire-format name.
    pub fn set_style(&mut self, node: NodeId, name: &str, value: &str) {
        if let MockNode::Container { styles, .. } = &mut self.nodes[node.get() as usize] {
            styles.insert(name.to_string(), value.to_string());
        }
    }

    /// Remove a style parameter.
    pub fn clear_style(&mut self, node: NodeId, name: &str) {
        if let MockNode::Container { styles, .. } = &mut self.nodes[node.get() as usize] {
            styles.remove(name);
        }
    }

    /// Set a plain attribute (discovery contract).
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let MockNode::Container { attributes, .. } = &mut self.nodes[node.get() as usize] {
            attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Change the viewport width (host resize).
    pub fn set_viewport_width(&mut self, width: f64) {
        self.viewport_width = width;
    }

    /// Change a container's usable width.
    pub fn set_usable_width(&mut self, container: NodeId, width: f64) {
        if let MockNode::Container { usable_width, .. } = &mut self.nodes[container.get() as usize]
        {
            *usable_width = width;
        }
    }

    /// Change the root font size (reference for `rem`).
    pub fn set_root_font_size(&mut self, size: f64) {
        self.root_font_size = size;
    }

    /// Change a node's font size (reference for `em`).
    pub fn set_font_size(&mut self, node: NodeId, size: f64) {
        match &mut self.nodes[node.get() as usize] {
            MockNode::Container { font_size, .. } | MockNode::Item { font_size, .. } => {
                *font_size = size;
            }
        }
    }

    /// Replace an item's natural size, e.g. when its media finishes loading.
    pub fn resolve_media(&mut self, node: NodeId, natural: Natural) {
        if let MockNode::Item {
            natural: current, ..
        } = &mut self.nodes[node.get() as usize]
        {
            *current = natural;
        }
    }

    /// Number of forced measurement boundaries so far.
    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    /// Last assigned `(x, y)` of an item.
    pub fn item_position(&self, node: NodeId) -> (f64, f64) {
        match &self.nodes[node.get() as usize] {
            MockNode::Item { x, y, .. } => (*x, *y),
            MockNode::Container { .. } => (0.0, 0.0),
        }
    }

    /// Last committed width of an item, if any commit happened.
    pub fn committed_width(&self, node: NodeId) -> Option<f64> {
        match &self.nodes[node.get() as usize] {
            MockNode::Item {
                committed_width, ..
            } => *committed_width,
            MockNode::Container { .. } => None,
        }
    }

    /// Explicit height set on a container by the engine, if any.
    pub fn container_height(&self, container: NodeId) -> Option<f64> {
        match &self.nodes[container.get() as usize] {
            MockNode::Container { height, .. } => *height,
            MockNode::Item { .. } => None,
        }
    }
}

impl Surface for MockSurface {
    fn viewport_width(&self) -> f64 {
        self.viewport_width
    }

    fn usable_width(&self, container: NodeId) -> Option<f64> {
        match self.nodes.get(container.get() as usize)? {
            MockNode::Container { usable_width, .. } => Some(*usable_width),
            MockNode::Item { .. } => None,
        }
    }

    fn root_font_size(&self) -> f64 {
        self.root_font_size
    }

    fn font_size(&self, node: NodeId) -> f64 {
        match self.nodes.get(node.get() as usize) {
            Some(MockNode::Container { font_size, .. }) | Some(MockNode::Item { font_size, .. }) => {
                *font_size
            }
            None => self.root_font_size,
        }
    }

    fn style_value(&self, node: NodeId, name: &str) -> Option<String> {
        match self.nodes.get(node.get() as usize)? {
            MockNode::Container { styles, .. } => styles.get(name).cloned(),
            MockNode::Item { .. } => None,
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        match self.nodes.get(node.get() as usize)? {
            MockNode::Container { attributes, .. } => attributes.get(name).cloned(),
            MockNode::Item { .. } => None,
        }
    }

    fn containers(&self) -> Vec<NodeId> {
        self.containers.clone()
    }

    fn items_of(&self, container: NodeId, selector: &str) -> Vec<NodeId> {
        match self.nodes.get(container.get() as usize) {
            Some(MockNode::Container { children, .. }) => children
                .iter()
                .copied()
                .filter(|child| match &self.nodes[child.get() as usize] {
                    MockNode::Item {
                        selector: s,
                        detached,
                        ..
                    } => !detached && s == selector,
                    MockNode::Container { .. } => false,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    fn set_item_width(&mut self, node: NodeId, width: f64) {
        if let MockNode::Item { staged_width, .. } = &mut self.nodes[node.get() as usize] {
            *staged_width = Some(width);
        }
    }

    fn set_item_position(&mut self, node: NodeId, x: f64, y: f64) {
        if let MockNode::Item {
            x: node_x,
            y: node_y,
            ..
        } = &mut self.nodes[node.get() as usize]
        {
            *node_x = x;
            *node_y = y;
        }
    }

    fn set_container_height(&mut self, container: NodeId, height: f64) {
        if let MockNode::Container {
            height: current, ..
        } = &mut self.nodes[container.get() as usize]
        {
            *current = Some(height);
        }
    }

    fn commit(&mut self) {
        self.commit_count += 1;
        for node in &mut self.nodes {
            if let MockNode::Item {
                staged_width,
                committed_width,
                ..
            } = node
            {
                if let Some(width) = staged_width.take() {
                    *committed_width = Some(width);
                }
            }
        }
    }

    fn measure_height(&self, node: NodeId) -> f64 {
        match self.nodes.get(node.get() as usize) {
            Some(MockNode::Item {
                natural,
                committed_width,
                ..
            }) => match natural {
                Natural::Fixed(height) => *height,
                Natural::Fluid { area } => match committed_width {
                    Some(width) if *width > 0.0 => area / width,
                    _ => 0.0,
                },
                Natural::Pending => 0.0,
            },
            Some(MockNode::Container { height, .. }) => height.unwrap_or(0.0),
            None => 0.0,
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let MockNode::Item { detached, .. } = &mut self.nodes[node.get() as usize] {
            *detached = true;
        }
    }
}

// ===== Scene format =====

/// Serialized description of a mock document, loaded by the binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    /// Viewport width in pixels.
    pub viewport_width: f64,
    /// Root font size in pixels.
    #[serde(default = "default_font_size")]
    pub root_font_size: f64,
    /// Containers in document order.
    #[serde(default)]
    pub containers: Vec<SceneContainer>,
}

/// One container in a [`Scene`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneContainer {
    /// Usable width (outer width minus horizontal padding).
    pub usable_width: f64,
    /// Container font size in pixels.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Style parameters by wire-format name.
    #[serde(default)]
    pub styles: BTreeMap<String, String>,
    /// Plain attributes (discovery contract).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Items in document order.
    #[serde(default)]
    pub items: Vec<SceneItem>,
}

/// One item in a [`SceneContainer`].
///
/// `area` wins over `height` when both are present; with neither, the item
/// is pending media and measures zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneItem {
    /// Selector the item matches, default `item`.
    #[serde(default = "default_selector")]
    pub selector: String,
    /// Fixed natural height in pixels.
    #[serde(default)]
    pub height: Option<f64>,
    /// Fluid content area in square pixels.
    #[serde(default)]
    pub area: Option<f64>,
}

fn default_font_size() -> f64 {
    16.0
}

fn default_selector() -> String {
    "item".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fluid_height_tracks_committed_width_only() {
        let mut surface = MockSurface::new(1000.0);
        let container = surface.add_container(960.0);
        let item = surface.add_item(container, Natural::Fluid { area: 60_000.0 });

        // No commit yet: nothing measurable.
        surface.set_item_width(item, 300.0);
        assert_eq!(surface.measure_height(item), 0.0);

        surface.commit();
        assert!((surface.measure_height(item) - 200.0).abs() < 1e-9);

        // Re-stage a width; the measurement is stale until the next commit.
        surface.set_item_width(item, 600.0);
        assert!((surface.measure_height(item) - 200.0).abs() < 1e-9);
        surface.commit();
        assert!((surface.measure_height(item) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn detached_items_leave_document_order() {
        let mut surface = MockSurface::new(1000.0);
        let container = surface.add_container(960.0);
        let a = surface.add_item(container, Natural::Fixed(100.0));
        let b = surface.add_item(container, Natural::Fixed(100.0));
        assert_eq!(surface.items_of(container, "item"), vec![a, b]);
        surface.detach(a);
        assert_eq!(surface.items_of(container, "item"), vec![b]);
    }

    #[test]
    fn pending_media_measures_zero_until_resolved() {
        let mut surface = MockSurface::new(1000.0);
        let container = surface.add_container(960.0);
        let item = surface.add_item(container, Natural::Pending);
        surface.set_item_width(item, 300.0);
        surface.commit();
        assert_eq!(surface.measure_height(item), 0.0);
        surface.resolve_media(item, Natural::Fixed(240.0));
        assert_eq!(surface.measure_height(item), 240.0);
    }

    #[test]
    fn scene_round_trip_builds_matching_surface() {
        let json = r#"{
            "viewport_width": 1200,
            "containers": [{
                "usable_width": 1000,
                "styles": { "gap-x": "20px" },
                "attributes": { "data-colonnade": "container" },
                "items": [
                    { "height": 120 },
                    { "area": 48000 },
                    {}
                ]
            }]
        }"#;
        let scene: Scene = serde_json::from_str(json).expect("valid scene");
        let surface = MockSurface::from_scene(&scene);
        let containers = surface.containers();
        assert_eq!(containers.len(), 1);
        let items = surface.items_of(containers[0], "item");
        assert_eq!(items.len(), 3);
        assert_eq!(
            surface.style_value(containers[0], "gap-x").as_deref(),
            Some("20px")
        );
        assert_eq!(
            surface.attribute(containers[0], "data-colonnade").as_deref(),
            Some("container")
        );
    }
}
