//! Conversion between stored and displayed form values.
//!
//! Monetary amounts are stored as integer minor units (cents) and shown to
//! the user as major units. Only the one configured field is touched.

use serde_json::{Number, Value};

use crate::values::FormValues;

/// Field converted by default
pub const DEFAULT_MONEY_FIELD: &str = "price";

const MINOR_PER_MAJOR: i64 = 100;

/// Scaled amounts are rounded to this many parts of a unit to drop float
/// residue, in both directions
const SNAP_SCALE: f64 = 1e9;

/// Reversible transform applied when values cross the storage boundary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueCodec {
    money_field: Option<String>,
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MONEY_FIELD)
    }
}

impl ValueCodec {
    /// Create a codec converting `money_field` between minor and major units
    pub fn new(money_field: impl Into<String>) -> Self {
        Self {
            money_field: Some(money_field.into()),
        }
    }

    /// A codec that passes values through untouched
    pub fn identity() -> Self {
        Self { money_field: None }
    }

    /// The converted field, if any
    pub fn money_field(&self) -> Option<&str> {
        self.money_field.as_deref()
    }

    /// Storage form to display form (minor units to major units)
    pub fn to_display(&self, values: &FormValues) -> FormValues {
        self.map_money(values, major_units)
    }

    /// Display form to storage form (major units to minor units)
    pub fn to_storage(&self, values: &FormValues) -> FormValues {
        self.map_money(values, minor_units)
    }

    fn map_money(&self, values: &FormValues, convert: fn(&Number) -> Option<Value>) -> FormValues {
        let mut out = values.clone();
        let Some(field) = self.money_field.as_deref() else {
            return out;
        };

        if let Some(Value::Number(amount)) = values.get(field) {
            if let Some(converted) = convert(amount) {
                out.insert(field.to_string(), converted);
            }
        }
        out
    }
}

fn major_units(amount: &Number) -> Option<Value> {
    if let Some(minor) = amount.as_i64() {
        if minor % MINOR_PER_MAJOR == 0 {
            return Some(Value::from(minor / MINOR_PER_MAJOR));
        }
    }
    whole_or_float(snap(amount.as_f64()? / MINOR_PER_MAJOR as f64))
}

fn minor_units(amount: &Number) -> Option<Value> {
    if let Some(major) = amount.as_i64() {
        if let Some(minor) = major.checked_mul(MINOR_PER_MAJOR) {
            return Some(Value::from(minor));
        }
    }

    whole_or_float(snap(amount.as_f64()? * MINOR_PER_MAJOR as f64))
}

fn snap(n: f64) -> f64 {
    (n * SNAP_SCALE).round() / SNAP_SCALE
}

/// Whole numbers become JSON integers so they compare equal to integer input
fn whole_or_float(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}
