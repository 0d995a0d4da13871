use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::path::Path;

/// A value observed in, or written to, the external environment.
///
/// JSON numbers always deserialize as [`HpValue::Number`]; `Integer` is only
/// produced by hosts with a native integer kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HpValue {
    Null,
    Bool(bool),
    Number(f64),
    Integer(i64),
    String(String),
    Array(Vec<HpValue>),
    Map(BTreeMap<String, HpValue>),
    /// Unsupported host kind (function, symbol, ...), keeps the host type name.
    #[serde(skip)]
    Opaque(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeafType {
    #[serde(rename = "bigint")]
    Integer64,
    #[serde(rename = "number")]
    Number,
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "string")]
    String,
}

impl LeafType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer64 => "bigint",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::String => "string",
        }
    }
}

impl HpValue {
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Map(_))
    }

    /// The single classification step: which leaf category, if any, this value belongs to.
    pub fn leaf_type(&self) -> Option<LeafType> {
        match self {
            Self::Integer(_) => Some(LeafType::Integer64),
            Self::Number(_) => Some(LeafType::Number),
            Self::Bool(_) => Some(LeafType::Boolean),
            Self::String(_) => Some(LeafType::String),
            Self::Null | Self::Array(_) | Self::Map(_) | Self::Opaque(_) => None,
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Integer(_) => "bigint",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Map(_) => "object",
            Self::Opaque(name) => name.as_str(),
        }
    }

    pub fn child(&self, segment: &str) -> Option<&HpValue> {
        match self {
            Self::Map(entries) => entries.get(segment),
            Self::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index)),
            _ => None,
        }
    }

    /// Walks `path` from this value. Any missing step resolves to `None`.
    pub fn resolve(&self, path: &Path) -> Option<&HpValue> {
        let mut current = self;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }
}
