//! Per-step validation hooks

use crate::steps::Step;
use crate::values::{field_is_filled, FieldErrors, FormValues};

/// Message used by [`RequiredFieldsValidator`] unless overridden
pub const DEFAULT_REQUIRED_MESSAGE: &str = "Required";

/// Validates the values of a single page
pub trait StepValidator: Send + Sync {
    /// Errors keyed by field name; empty when the page may be submitted
    fn validate(&self, values: &FormValues) -> FieldErrors;
}

impl<F> StepValidator for F
where
    F: Fn(&FormValues) -> FieldErrors + Send + Sync,
{
    fn validate(&self, values: &FormValues) -> FieldErrors {
        self(values)
    }
}

/// Reports every listed field that is not filled in
#[derive(Debug, Clone)]
pub struct RequiredFieldsValidator {
    fields: Vec<String>,
    message: String,
}

impl RequiredFieldsValidator {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            message: DEFAULT_REQUIRED_MESSAGE.to_string(),
        }
    }

    /// Validator for the required fields of `step`
    pub fn for_step(step: &Step) -> Self {
        Self::new(step.fields.iter().cloned())
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl StepValidator for RequiredFieldsValidator {
    fn validate(&self, values: &FormValues) -> FieldErrors {
        self.fields
            .iter()
            .filter(|field| !field_is_filled(values, field))
            .map(|field| (field.clone(), self.message.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_fields_reports_missing() {
        let validator = RequiredFieldsValidator::new(["title", "price"]);
        let values = json!({"title": "Bike", "price": 0}).as_object().cloned().unwrap();

        let errors = validator.validate(&values);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["price"], DEFAULT_REQUIRED_MESSAGE);
    }

    #[test]
    fn test_required_fields_for_step() {
        let step = Step::new("contact", "/contact").with_fields(["email"]);
        let validator = RequiredFieldsValidator::for_step(&step).with_message("Please fill this in");

        let errors = validator.validate(&FormValues::new());
        assert_eq!(errors["email"], "Please fill this in");

        let values = json!({"email": "a@b.c"}).as_object().cloned().unwrap();
        assert!(validator.validate(&values).is_empty());
    }

    #[test]
    fn test_closure_validator() {
        let validator = |values: &FormValues| {
            let mut errors = FieldErrors::new();
            if values.get("age").and_then(serde_json::Value::as_i64).unwrap_or(0) < 18 {
                errors.insert("age".to_string(), "Must be an adult".to_string());
            }
            errors
        };

        let minor = json!({"age": 12}).as_object().cloned().unwrap();
        assert_eq!(validator.validate(&minor).len(), 1);
        let adult = json!({"age": 30}).as_object().cloned().unwrap();
        assert!(StepValidator::validate(&validator, &adult).is_empty());
    }
}
