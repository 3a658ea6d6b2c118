//! Free-form attributes attached to cubes and coordinates.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Attribute mapping, ordered by key.
pub type Attributes = BTreeMap<String, AttributeValue>;

/// A UM STASH code: model, section and item numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StashCode {
    pub model: i64,
    pub section: i64,
    pub item: i64,
}

impl StashCode {
    pub fn new(model: i64, section: i64, item: i64) -> Self {
        Self {
            model,
            section,
            item,
        }
    }

    /// Stored form: `[model, section, item]`.
    pub fn to_json(&self) -> Value {
        Value::from(vec![self.model, self.section, self.item])
    }
}

/// `m01s16i203`
impl fmt::Display for StashCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{:02}s{:02}i{:03}", self.model, self.section, self.item)
    }
}

impl FromStr for StashCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let invalid = || format!("'{}' is not a STASH code of the form m01s16i203", s);
        let rest = s.trim().strip_prefix('m').ok_or_else(invalid)?;
        let (model, rest) = rest.split_once('s').ok_or_else(invalid)?;
        let (section, item) = rest.split_once('i').ok_or_else(invalid)?;
        Ok(Self::new(
            model.parse().map_err(|_| invalid())?,
            section.parse().map_err(|_| invalid())?,
            item.parse().map_err(|_| invalid())?,
        ))
    }
}

/// An attribute value: verbatim JSON, or a structured special case.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Json(Value),
    Stash(StashCode),
}

impl AttributeValue {
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Json(value) => value.clone(),
            AttributeValue::Stash(stash) => stash.to_json(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Json(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        AttributeValue::Json(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Json(Value::from(value))
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Json(Value::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Json(Value::from(value))
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Json(Value::from(value))
    }
}

impl From<StashCode> for AttributeValue {
    fn from(value: StashCode) -> Self {
        AttributeValue::Stash(value)
    }
}
