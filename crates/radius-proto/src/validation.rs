//! RADIUS Attribute Validation Modes
//!
//! Every attribute kind carries three independently toggleable checks:
//!
//! - **strict**: master switch; when off, no violation is raised for the kind
//! - **strict_length**: exact or minimum length enforcement
//! - **strict_value**: enumerated membership and range enforcement
//!
//! A length violation is raised only when both `strict` and `strict_length`
//! are enabled, a value violation only when both `strict` and `strict_value`
//! are enabled. Tolerated violations still decode: the value is read from the
//! bytes that are present.
//!
//! The toggles are static configuration per attribute kind, held in a
//! [`ValidationConfig`] table consulted by the packet decoder.

use crate::attributes::AttributeType;
use serde::Deserialize;
use std::collections::HashMap;

/// Validation toggles for one attribute kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Strictness {
    pub strict: bool,
    pub strict_length: bool,
    pub strict_value: bool,
}

impl Strictness {
    /// All checks enabled (the default)
    pub const STRICT: Strictness = Strictness {
        strict: true,
        strict_length: true,
        strict_value: true,
    };

    /// All checks disabled
    pub const LENIENT: Strictness = Strictness {
        strict: false,
        strict_length: false,
        strict_value: false,
    };

    pub fn enforces_length(&self) -> bool {
        self.strict && self.strict_length
    }

    pub fn enforces_value(&self) -> bool {
        self.strict && self.strict_value
    }
}

impl Default for Strictness {
    fn default() -> Self {
        Strictness::STRICT
    }
}

/// Attribute kind => [`Strictness`] table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationConfig {
    default: Strictness,
    overrides: HashMap<AttributeType, Strictness>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl ValidationConfig {
    /// Every kind fully strict
    pub fn strict() -> Self {
        Self::with_default(Strictness::STRICT)
    }

    /// Every kind fully lenient. Use for compatibility with non-compliant NAS devices.
    pub fn lenient() -> Self {
        Self::with_default(Strictness::LENIENT)
    }

    pub fn with_default(default: Strictness) -> Self {
        ValidationConfig {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Builder-style override for one kind
    pub fn with(mut self, attr_type: AttributeType, strictness: Strictness) -> Self {
        self.set(attr_type, strictness);
        self
    }

    pub fn set(&mut self, attr_type: AttributeType, strictness: Strictness) {
        self.overrides.insert(attr_type, strictness);
    }

    /// Toggles in effect for `attr_type`
    pub fn get(&self, attr_type: AttributeType) -> Strictness {
        self.overrides
            .get(&attr_type)
            .copied()
            .unwrap_or(self.default)
    }
}
