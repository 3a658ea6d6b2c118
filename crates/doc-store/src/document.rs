//! Documents, identifiers, namespaces and filters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// A stored document: a string-keyed mapping at every nesting level.
pub type Document = Map<String, Value>;

/// Field holding the store-assigned document identifier.
pub const ID_FIELD: &str = "_id";

/// Identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Read the identifier recorded in a document, if any.
    ///
    /// Numeric ids are accepted and converted to their decimal form.
    pub fn of(document: &Document) -> Option<Self> {
        match document.get(ID_FIELD)? {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for DocumentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DocumentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A `database.collection` pair addressing one collection of a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Namespace {
    database: String,
    collection: String,
}

impl Namespace {
    /// Create a namespace, rejecting empty names and database names containing '.'.
    pub fn new(database: impl Into<String>, collection: impl Into<String>) -> StoreResult<Self> {
        let database = database.into();
        let collection = collection.into();
        if database.is_empty() || collection.is_empty() || database.contains('.') {
            return Err(StoreError::InvalidNamespace(format!(
                "{}.{}",
                database, collection
            )));
        }
        Ok(Self {
            database,
            collection,
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.database, self.collection)
    }
}

impl FromStr for Namespace {
    type Err = StoreError;

    /// Split at the first '.'; collection names may themselves contain dots.
    fn from_str(s: &str) -> StoreResult<Self> {
        let (database, collection) = s
            .split_once('.')
            .ok_or_else(|| StoreError::InvalidNamespace(s.to_string()))?;
        Self::new(database, collection)
    }
}

impl TryFrom<String> for Namespace {
    type Error = StoreError;

    fn try_from(value: String) -> StoreResult<Self> {
        value.parse()
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.to_string()
    }
}

/// Equality filter over dotted document paths.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    /// A filter matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a condition: the value at `path` must equal `value`.
    pub fn eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((path.into(), value.into()));
        self
    }

    /// Build a filter from a document whose keys are dotted paths.
    pub fn from_document(document: &Document) -> Self {
        Self {
            conditions: document
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Check whether a document satisfies every condition.
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions
            .iter()
            .all(|(path, expected)| lookup_path(document, path) == Some(expected))
    }
}

/// Resolve a dotted path such as `dim_coords.latitude.npoints`.
pub fn lookup_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = document.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_namespace_parse() {
        let ns: Namespace = "metadb.cubes".parse().unwrap();
        assert_eq!(ns.database(), "metadb");
        assert_eq!(ns.collection(), "cubes");
        assert_eq!(ns.to_string(), "metadb.cubes");

        let dotted: Namespace = "metadb.cubes.v2".parse().unwrap();
        assert_eq!(dotted.collection(), "cubes.v2");

        assert!("nodot".parse::<Namespace>().is_err());
        assert!(".cubes".parse::<Namespace>().is_err());
        assert!(Namespace::new("a.b", "c").is_err());
    }

    #[test]
    fn test_namespace_serde_as_string() {
        let ns = Namespace::new("db", "coll").unwrap();
        let value = serde_json::to_value(&ns).unwrap();
        assert_eq!(value, json!("db.coll"));
        let back: Namespace = serde_json::from_value(value).unwrap();
        assert_eq!(back, ns);
    }

    #[test]
    fn test_document_id_of() {
        assert_eq!(
            DocumentId::of(&doc(json!({"_id": "abc"}))),
            Some(DocumentId::from("abc"))
        );
        assert_eq!(
            DocumentId::of(&doc(json!({"_id": 42}))),
            Some(DocumentId::from("42"))
        );
        assert_eq!(DocumentId::of(&doc(json!({"_id": null}))), None);
        assert_eq!(DocumentId::of(&doc(json!({}))), None);
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }

    #[test]
    fn test_filter_matches_nested_paths() {
        let document = doc(json!({
            "standard_name": "air_temperature",
            "dim_coords": {"latitude": {"npoints": 2}},
            "shape": [2, 3]
        }));

        assert!(Filter::all().matches(&document));
        assert!(Filter::all()
            .eq("standard_name", "air_temperature")
            .matches(&document));
        assert!(Filter::all()
            .eq("dim_coords.latitude.npoints", 2)
            .matches(&document));
        assert!(Filter::all().eq("shape.1", 3).matches(&document));
        assert!(!Filter::all()
            .eq("standard_name", "air_temperature")
            .eq("dim_coords.latitude.npoints", 3)
            .matches(&document));
        assert!(!Filter::all().eq("missing.path", 1).matches(&document));
    }
}
