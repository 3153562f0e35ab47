//! Engine options and configuration merging.
//!
//! [`LayoutOptions`] is immutable after merge: it is assembled once at
//! instance construction by folding partial overrides over the built-in
//! defaults, and never mutated afterwards. The binary's config-file loading
//! (with the defaults → file → environment → CLI precedence chain) lives in
//! [`loader`].

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
    AppConfig, ConfigError, ConfigFile,
};

use crate::model::ThresholdOverrides;
use crate::style::DefaultsTable;
use serde::{Deserialize, Serialize};

/// Options for one layout instance, merged over defaults at construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutOptions {
    /// Selector item children must match to be tracked.
    pub item_selector: String,
    /// Transition duration hint, in milliseconds, passed through to
    /// collaborators that animate. The engine itself never animates.
    pub transition_ms: u64,
    /// Debounce delay for resize/media triggers, in milliseconds.
    pub debounce_ms: u64,
    /// Custom breakpoint threshold overrides.
    pub thresholds: ThresholdOverrides,
    /// Attribute name marking containers for auto-discovery.
    pub discovery_attr: String,
    /// Attribute value marking containers for auto-discovery.
    pub discovery_value: String,
    /// Built-in fallbacks for the style resolver.
    pub defaults: DefaultsTable,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            item_selector: "item".to_string(),
            transition_ms: 300,
            debounce_ms: 100,
            thresholds: ThresholdOverrides::default(),
            discovery_attr: "data-colonnade".to_string(),
            discovery_value: "container".to_string(),
            defaults: DefaultsTable::default(),
        }
    }
}

impl LayoutOptions {
    /// Fold partial overrides over the defaults.
    pub fn merged(partial: PartialOptions) -> Self {
        let defaults = Self::default();
        Self {
            item_selector: partial.item_selector.unwrap_or(defaults.item_selector),
            transition_ms: partial.transition_ms.unwrap_or(defaults.transition_ms),
            debounce_ms: partial.debounce_ms.unwrap_or(defaults.debounce_ms),
            thresholds: partial.thresholds.unwrap_or(defaults.thresholds),
            discovery_attr: partial.discovery_attr.unwrap_or(defaults.discovery_attr),
            discovery_value: partial
                .discovery_value
                .unwrap_or(defaults.discovery_value),
            defaults: partial.defaults.unwrap_or(defaults.defaults),
        }
    }
}

/// Per-instance option overrides; all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialOptions {
    /// Override for [`LayoutOptions::item_selector`].
    #[serde(default)]
    pub item_selector: Option<String>,
    /// Override for [`LayoutOptions::transition_ms`].
    #[serde(default)]
    pub transition_ms: Option<u64>,
    /// Override for [`LayoutOptions::debounce_ms`].
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    /// Override for [`LayoutOptions::thresholds`].
    #[serde(default)]
    pub thresholds: Option<ThresholdOverrides>,
    /// Override for [`LayoutOptions::discovery_attr`].
    #[serde(default)]
    pub discovery_attr: Option<String>,
    /// Override for [`LayoutOptions::discovery_value`].
    #[serde(default)]
    pub discovery_value: Option<String>,
    /// Override for [`LayoutOptions::defaults`].
    #[serde(default)]
    pub defaults: Option<DefaultsTable>,
}
