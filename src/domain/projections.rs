//! Result shapes produced by the extraction functions
//!
//! Architecture: Value Objects - Each projection is plain data owned by the caller
//! - Built fresh per call, never shared between calls
//! - Serializable so the CLI and other consumers can emit them as JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selector -> color-bearing declarations, as `"property: value"` strings
pub type ColorMap = BTreeMap<String, Vec<String>>;

/// Media condition -> rules declared inside that media query
pub type MediaQueryMap = BTreeMap<String, Vec<MediaRule>>;

/// Animation name -> keyframes and the selectors that use them
pub type AnimationMap = BTreeMap<String, Animation>;

/// Selector -> font-related declarations
pub type FontMap = BTreeMap<String, Vec<FontDeclaration>>;

/// Selector -> value of one property (last occurrence wins)
pub type PropertyMap = BTreeMap<String, String>;

/// Property name -> serialized value
pub type DeclarationMap = BTreeMap<String, String>;

/// A qualified rule found inside a `@media` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRule {
    pub selector: String,
    pub properties: DeclarationMap,
}

/// A `@keyframes` definition together with its users
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    /// Keyframe selector (`from`, `to`, `50%`, ...) -> declarations
    pub keyframes: BTreeMap<String, DeclarationMap>,
    /// Selectors whose `animation`/`animation-name` refers to this animation
    pub used_by: Vec<String>,
}

/// One font-related declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDeclaration {
    pub property: String,
    pub value: String,
}

impl FontDeclaration {
    pub fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self { property: property.into(), value: value.into() }
    }
}
