//! Style value parsing and unit conversion.
//!
//! Pixel values pass through; root-relative (`rem`) and element-relative
//! (`em`) values are resolved against the corresponding reference font size
//! at conversion time. That reference can change between passes, which is
//! why resolved pixel values are never cached across breakpoint changes.

use serde::Serialize;

/// Unit of a parsed style value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Unit {
    /// Absolute pixels.
    Px,
    /// Relative to the root font size.
    Rem,
    /// Relative to the element's own font size.
    Em,
    /// Bare number; ambiguous intent, accepted as pixels with a diagnostic.
    Unitless,
}

/// A numeric style value with its unit, before conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedValue {
    /// The numeric part.
    pub number: f64,
    /// The unit suffix, if any.
    pub unit: Unit,
}

/// Font-size references needed to convert relative units to pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitContext {
    /// Root font size in pixels (`rem` reference).
    pub root_font_size: f64,
    /// Font size of the element the value applies to (`em` reference).
    pub element_font_size: f64,
}

impl ParsedValue {
    /// Convert to pixels against the given references.
    pub fn to_px(self, ctx: UnitContext) -> f64 {
        match self.unit {
            Unit::Px | Unit::Unitless => self.number,
            Unit::Rem => self.number * ctx.root_font_size,
            Unit::Em => self.number * ctx.element_font_size,
        }
    }
}

/// Parse a raw style value into a number and unit.
///
/// Accepts `12px`, `1.5rem`, `0.75em`, and bare numbers like `12`.
/// Whitespace around the value is ignored; anything else is `None`
/// (reported upstream as an invalid-value diagnostic and treated as zero).
pub fn parse(raw: &str) -> Option<ParsedValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (number_part, unit) = if let Some(stripped) = trimmed.strip_suffix("px") {
        (stripped, Unit::Px)
    } else if let Some(stripped) = trimmed.strip_suffix("rem") {
        (stripped, Unit::Rem)
    } else if let Some(stripped) = trimmed.strip_suffix("em") {
        (stripped, Unit::Em)
    } else {
        (trimmed, Unit::Unitless)
    };
    let number: f64 = number_part.trim().parse().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(ParsedValue { number, unit })
}
