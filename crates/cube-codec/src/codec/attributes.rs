//! Attribute mappings, with a registry of special-case decoders.
//!
//! Most attributes pass through verbatim. A decoder registered under an
//! attribute name (matched case-insensitively) rebuilds a structured value
//! instead; the default registry handles `STASH`.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::codec::{field_path, kind};
use crate::error::{CodecError, Result};
use crate::types::attributes::{AttributeValue, Attributes, StashCode};

/// Rebuild one attribute value; the second argument is its document path.
pub type AttributeDecoder = fn(&Value, &str) -> Result<AttributeValue>;

/// Special-case attribute decoders keyed by lower-cased attribute name.
#[derive(Clone)]
pub struct AttributeDecoders {
    decoders: HashMap<String, AttributeDecoder>,
}

impl AttributeDecoders {
    /// A registry with no special cases.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder, replacing any existing one for the same name.
    pub fn register(&mut self, name: &str, decoder: AttributeDecoder) -> &mut Self {
        self.decoders.insert(name.to_lowercase(), decoder);
        self
    }

    pub fn with(mut self, name: &str, decoder: AttributeDecoder) -> Self {
        self.register(name, decoder);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decoders.contains_key(&name.to_lowercase())
    }

    pub fn decode_value(&self, key: &str, value: &Value, field: &str) -> Result<AttributeValue> {
        match self.decoders.get(&key.to_lowercase()) {
            Some(decoder) => decoder(value, field),
            None => Ok(AttributeValue::Json(value.clone())),
        }
    }

    /// Decode an attribute object.
    pub fn decode(&self, value: &Value, field: &str) -> Result<Attributes> {
        let map = value.as_object().ok_or_else(|| {
            CodecError::type_mismatch(field, format!("an object, found {}", kind(value)))
        })?;
        map.iter()
            .map(|(key, value)| {
                let decoded = self.decode_value(key, value, &field_path(field, key))?;
                Ok::<_, CodecError>((key.clone(), decoded))
            })
            .collect()
    }
}

impl Default for AttributeDecoders {
    fn default() -> Self {
        Self::empty().with("stash", decode_stash)
    }
}

impl fmt::Debug for AttributeDecoders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.decoders.keys().collect();
        names.sort();
        f.debug_struct("AttributeDecoders").field("names", &names).finish()
    }
}

/// Encode attributes as a JSON object.
pub fn encode_attributes(attributes: &Attributes) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect::<Map<String, Value>>(),
    )
}

/// STASH from `[model, section, item]` or `"m01s16i203"`.
pub fn decode_stash(value: &Value, field: &str) -> Result<AttributeValue> {
    let stash = match value {
        Value::Array(items) if items.len() == 3 => {
            let parts = items
                .iter()
                .map(|item| item.as_i64())
                .collect::<Option<Vec<i64>>>()
                .ok_or_else(|| CodecError::invalid_value(field, "STASH parts must be integers"))?;
            StashCode::new(parts[0], parts[1], parts[2])
        }
        Value::String(s) => s
            .parse()
            .map_err(|message: String| CodecError::invalid_value(field, message))?,
        other => {
            return Err(CodecError::invalid_value(
                field,
                format!("expected [model, section, item], found {}", kind(other)),
            ))
        }
    };
    Ok(AttributeValue::Stash(stash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stash_special_case() {
        let decoders = AttributeDecoders::default();
        let attrs = decoders
            .decode(&json!({"STASH": [1, 16, 203], "source": "UKV"}), "attributes")
            .unwrap();
        assert_eq!(attrs["STASH"], AttributeValue::Stash(StashCode::new(1, 16, 203)));
        assert_eq!(attrs["source"], AttributeValue::Json(json!("UKV")));

        let encoded = encode_attributes(&attrs);
        assert_eq!(encoded, json!({"STASH": [1, 16, 203], "source": "UKV"}));
    }

    #[test]
    fn test_bad_stash_names_field() {
        let err = AttributeDecoders::default()
            .decode(&json!({"stash": [1, 2]}), "attributes")
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue { ref field, .. } if field == "attributes.stash"));
    }

    #[test]
    fn test_empty_registry_passes_through() {
        let attrs = AttributeDecoders::empty()
            .decode(&json!({"STASH": [1, 16, 203]}), "attributes")
            .unwrap();
        assert_eq!(attrs["STASH"], AttributeValue::Json(json!([1, 16, 203])));
    }

    #[test]
    fn test_custom_decoder() {
        fn upper(value: &Value, _field: &str) -> Result<AttributeValue> {
            Ok(AttributeValue::Json(json!(value.as_str().unwrap_or_default().to_uppercase())))
        }
        let decoders = AttributeDecoders::default().with("Source", upper);
        assert!(decoders.contains("SOURCE"));
        let attrs = decoders.decode(&json!({"source": "ukv"}), "a").unwrap();
        assert_eq!(attrs["source"], AttributeValue::Json(json!("UKV")));
    }
}
