use serde_json::Value;

use crate::domain::errors::{ValidationError, Violation};
use crate::domain::model::Fields;

/// Rule for one string field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    name: String,
    max_len: Option<usize>,
    required: bool,
}

impl FieldRule {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            max_len: None,
            required: false,
        }
    }

    pub fn max(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, value: Option<&Value>, violations: &mut Vec<Violation>) {
        let value = match value {
            Some(value) => value,
            None => {
                if self.required {
                    violations.push(Violation::new(
                        &self.name,
                        format!("\"{}\" is required", self.name),
                    ));
                }
                return;
            }
        };

        let Some(text) = value.as_str() else {
            violations.push(Violation::new(
                &self.name,
                format!("\"{}\" must be a string", self.name),
            ));
            return;
        };

        if let Some(max_len) = self.max_len {
            if text.chars().count() > max_len {
                violations.push(Violation::new(
                    &self.name,
                    format!(
                        "\"{}\" length must be less than or equal to {} characters long",
                        self.name, max_len
                    ),
                ));
            }
        }
    }
}

/// Declarative object schema. Keys without a rule are rejected.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new(rules: Vec<FieldRule>) -> Self {
        Self { rules }
    }

    /// Collects every violation rather than stopping at the first one.
    pub fn validate(&self, data: &Fields) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        for rule in &self.rules {
            rule.check(data.get(rule.name()), &mut violations);
        }

        for key in data.keys() {
            if !self.rules.iter().any(|rule| rule.name() == key) {
                violations.push(Violation::new(key, format!("\"{key}\" is not allowed")));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(violations))
        }
    }
}
