//! Stored documents and the merge rules applied to them.

use pharmasite_common::{CommonError, DocPath};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// JSON object body of a document
pub type Fields = Map<String, Value>;

/// A document as read from the store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub path: DocPath,
    pub data: Fields,
}

impl Document {
    pub fn new(path: DocPath, data: Fields) -> Self {
        Self { path, data }
    }

    pub fn id(&self) -> &str {
        self.path.id()
    }

    /// Decode into a typed view, with `id` filled from the path
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, CommonError> {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id().to_string()));
        Ok(serde_json::from_value(Value::Object(data))?)
    }

    /// Data plus `id`, the shape handed to clients
    pub fn to_json(&self) -> Value {
        let mut data = self.data.clone();
        data.insert("id".to_string(), Value::String(self.id().to_string()));
        Value::Object(data)
    }
}

/// Serialize a typed value into document fields, dropping any `id` key
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, CommonError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(CommonError::Malformed(format!(
            "expected an object, got {}",
            json_type(&other)
        ))),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Merge `patch` into `target`: nested objects merge key by key, every other
/// value (arrays included) replaces what was there.
pub fn deep_merge(target: &mut Fields, patch: Fields) {
    for (key, incoming) in patch {
        match (target.get_mut(&key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => deep_merge(existing, nested),
            (_, incoming) => {
                target.insert(key, incoming);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_deep_merge_keeps_untouched_keys() {
        let mut target = fields(json!({
            "title": "About",
            "hero": { "title": "Old", "headerImageUrl": "/a.png" },
            "values": [1, 2, 3]
        }));

        deep_merge(
            &mut target,
            fields(json!({ "hero": { "title": "New" }, "values": [9] })),
        );

        assert_eq!(target["title"], "About");
        assert_eq!(target["hero"]["title"], "New");
        assert_eq!(target["hero"]["headerImageUrl"], "/a.png");
        assert_eq!(target["values"], json!([9]));
    }

    #[test]
    fn test_decode_fills_id() {
        let doc = Document::new(
            DocPath::parse("productCategories/abc").unwrap(),
            fields(json!({ "name": "Tablets" })),
        );
        let category: pharmasite_common::ProductCategory = doc.decode().unwrap();
        assert_eq!(category.id, "abc");
        assert_eq!(doc.to_json()["id"], "abc");
    }
}
