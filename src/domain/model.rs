use serde_json::Value;

use crate::domain::errors::ValidationError;

/// Field name to value, in insertion order.
pub type Fields = serde_json::Map<String, Value>;

pub const ID_FIELD: &str = "id";
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Where a model kind's documents live in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub index: String,
    pub doc_type: String,
}

impl Location {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }
}

/// Capabilities the persistence service needs from an entity.
///
/// Implementors own their `data` and `params`; validation rules are their own
/// business. `body` and `id` have defaults that treat `id` as transport
/// metadata rather than document content.
pub trait Model: Send + Sync {
    fn params(&self) -> &Location;

    fn data(&self) -> &Fields;

    fn data_mut(&mut self) -> &mut Fields;

    fn validate(&self) -> Result<(), ValidationError>;

    fn valid(&self) -> bool {
        self.validate().is_ok()
    }

    fn body(&self) -> Fields {
        self.data()
            .iter()
            .filter(|(key, _)| key.as_str() != ID_FIELD)
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// The assigned identifier. Only a non-empty string is an identifier: an
    /// empty string or a non-string value such as `{"id": 42}` counts as
    /// absent, so read, update and delete report a missing identifier for it.
    fn id(&self) -> Option<&str> {
        self.data()
            .get(ID_FIELD)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// Shallow key-wise merge: keys from `source` replace those in `target`,
/// everything else in `target` is kept where it was.
pub fn overlay(target: &mut Fields, source: Fields) {
    for (key, value) in source {
        target.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    struct Plain {
        params: Location,
        data: Fields,
    }

    impl Model for Plain {
        fn params(&self) -> &Location {
            &self.params
        }

        fn data(&self) -> &Fields {
            &self.data
        }

        fn data_mut(&mut self) -> &mut Fields {
            &mut self.data
        }

        fn validate(&self) -> Result<(), ValidationError> {
            if self.data.contains_key("bad") {
                return Err(ValidationError::single("bad", "\"bad\" is not allowed"));
            }
            Ok(())
        }
    }

    fn plain(data: Value) -> Plain {
        Plain {
            params: Location::new("test", "plain"),
            data: fields(data),
        }
    }

    #[test]
    fn test_overlay_overwrites_and_preserves() {
        let mut target = fields(json!({ "firstname": "John", "lastname": "Doe" }));
        overlay(&mut target, fields(json!({ "lastname": "Smith", "age": 40 })));

        assert_eq!(
            Value::Object(target),
            json!({ "firstname": "John", "lastname": "Smith", "age": 40 })
        );
    }

    #[test]
    fn test_overlay_is_shallow() {
        let mut target = fields(json!({ "address": { "city": "Paris", "zip": "75001" } }));
        overlay(&mut target, fields(json!({ "address": { "city": "Lyon" } })));

        assert_eq!(target["address"], json!({ "city": "Lyon" }));
    }

    #[test]
    fn test_overlay_keeps_existing_key_position() {
        let mut target = fields(json!({ "a": 1, "b": 2, "c": 3 }));
        overlay(&mut target, fields(json!({ "d": 4, "a": 10 })));

        let keys: Vec<&str> = target.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_body_excludes_id() {
        let model = plain(json!({ "id": "abc", "firstname": "John" }));
        assert_eq!(Value::Object(model.body()), json!({ "firstname": "John" }));
    }

    #[test]
    fn test_id_absent_or_empty() {
        assert_eq!(plain(json!({})).id(), None);
        assert_eq!(plain(json!({ "id": "" })).id(), None);
        assert_eq!(plain(json!({ "id": "abc" })).id(), Some("abc"));
    }

    #[test]
    fn test_non_string_id_counts_as_absent() {
        assert_eq!(plain(json!({ "id": 42 })).id(), None);
        assert_eq!(plain(json!({ "id": null })).id(), None);
        assert_eq!(plain(json!({ "id": ["abc"] })).id(), None);
    }

    #[test]
    fn test_valid_follows_validate() {
        assert!(plain(json!({ "firstname": "John" })).valid());
        assert!(!plain(json!({ "bad": true })).valid());
    }
}
