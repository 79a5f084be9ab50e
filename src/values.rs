//! Form value containers and the presence rules applied to them

use std::collections::BTreeMap;

use serde_json::Value;

/// Field name to value mapping held by the wizard and mirrored to storage
pub type FormValues = serde_json::Map<String, Value>;

/// Field name to error message mapping returned by step validators
pub type FieldErrors = BTreeMap<String, String>;

/// Whether a value counts as "filled in".
///
/// `null`, `false`, zero and the empty string are empty. Arrays and
/// objects are filled even when they have no entries.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether `field` is present in `values` with a truthy value
pub fn field_is_filled(values: &FormValues, field: &str) -> bool {
    values.get(field).is_some_and(is_truthy)
}

/// Merge the wizard's stored values with caller-supplied defaults.
///
/// For a field present on both sides the stored value wins, unless it is
/// the empty string and the default is filled in. Fields present on only
/// one side are carried over unchanged.
pub fn merge_values(stored: &FormValues, defaults: Option<&FormValues>) -> FormValues {
    let mut merged = stored.clone();
    let Some(defaults) = defaults else {
        return merged;
    };

    for (field, default) in defaults {
        match merged.get_mut(field) {
            Some(current) => {
                if current.as_str() == Some("") && is_truthy(default) {
                    *current = default.clone();
                }
            }
            None => {
                merged.insert(field.clone(), default.clone());
            }
        }
    }

    merged
}
