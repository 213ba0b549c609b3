//! Resolved prop descriptions
//!
//! [`PropInfo`] is the value produced for every entry of a props object, and
//! [`PropsMap`] keeps them in declaration order.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Placeholder rendered for a validator; its body is never interpreted.
pub const VALIDATOR_PLACEHOLDER: &str = "...";

/// Description of one declared prop
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PropInfo {
    pub name: String,
    /// Source text of the declared type (`String`, `[String, Number]`, ...)
    pub type_expression: Option<String>,
    pub required: bool,
    /// Source text of the default value (literal, function, call)
    pub default_expression: Option<String>,
    pub has_validator: bool,
}

impl PropInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_expression: impl Into<String>) -> Self {
        self.type_expression = Some(type_expression.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default(mut self, default_expression: impl Into<String>) -> Self {
        self.default_expression = Some(default_expression.into());
        self
    }

    pub fn with_validator(mut self, has_validator: bool) -> Self {
        self.has_validator = has_validator;
        self
    }

    /// Joins the present parts in the fixed order type, required, default,
    /// validator with `", "`. Empty when nothing is known about the prop.
    pub fn display_string(&self) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if let Some(ty) = &self.type_expression {
            parts.push(ty.clone());
        }
        if self.required {
            parts.push("required: true".to_string());
        }
        if let Some(default) = &self.default_expression {
            parts.push(format!("default: {default}"));
        }
        if self.has_validator {
            parts.push(format!("validator: {VALIDATOR_PLACEHOLDER}"));
        }
        parts.join(", ")
    }
}

impl fmt::Display for PropInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_string())
    }
}

/// Props keyed by name in declaration order. Re-inserting a name keeps its
/// first position and takes the latest value, like object-literal merging.
pub type PropsMap = IndexMap<String, PropInfo>;

/// Ordered `(name, display)` pairs, as consumed by renderers.
pub fn display_pairs(props: &PropsMap) -> Vec<(String, String)> {
    props
        .iter()
        .map(|(name, info)| (name.clone(), info.display_string()))
        .collect()
}
