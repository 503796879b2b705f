use std::sync::LazyLock;

use serde_json::{json, Value};

use crate::domain::{
    errors::ValidationError,
    model::{Fields, Location, Model, ID_FIELD},
    schema::{FieldRule, Schema},
};

pub const USER_TYPE: &str = "user";

static USER_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new(vec![
        FieldRule::string("id").max(512),
        FieldRule::string("firstname").max(128),
        FieldRule::string("lastname").max(128),
        FieldRule::string("updated_at").max(64),
    ])
});

#[derive(Debug, Clone)]
pub struct User {
    params: Location,
    data: Fields,
}

impl User {
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            params: Location::new(index, USER_TYPE),
            data: Fields::new(),
        }
    }

    pub fn with_data(mut self, data: Fields) -> Self {
        self.data = data;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.data.insert(ID_FIELD.to_string(), Value::String(id.into()));
        self
    }

    pub fn with_name(mut self, firstname: &str, lastname: &str) -> Self {
        self.data.insert("firstname".to_string(), Value::from(firstname));
        self.data.insert("lastname".to_string(), Value::from(lastname));
        self
    }

    pub fn into_data(self) -> Fields {
        self.data
    }

    pub fn firstname(&self) -> Option<&str> {
        self.data.get("firstname").and_then(Value::as_str)
    }

    pub fn lastname(&self) -> Option<&str> {
        self.data.get("lastname").and_then(Value::as_str)
    }

    /// Field mappings used when bootstrapping the index.
    pub fn mapping() -> Value {
        json!({
            "properties": {
                "firstname": { "type": "text" },
                "lastname": { "type": "text" }
            }
        })
    }
}

impl Model for User {
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
        USER_SCHEMA.validate(&self.data)
    }
}
