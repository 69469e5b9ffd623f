//! Range checks applied to a prediction request before the model sees it.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::features::Feature;

/// Request body as decoded JSON. Values are loosely typed until coerced.
pub type Payload = Map<String, Value>;

/// Field name to human readable message. Empty means the payload is valid.
pub type ValidationErrors = BTreeMap<String, String>;

#[derive(Debug, Error, PartialEq)]
pub enum CoerceError {
    #[error("value is not numeric")]
    NotNumeric,
}

/// Converts a JSON value to `f64`. Numbers convert directly and strings are
/// parsed after trimming surrounding whitespace; everything else is rejected.
pub fn coerce_number(value: &Value) -> Result<f64, CoerceError> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(CoerceError::NotNumeric),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| CoerceError::NotNumeric),
        _ => Err(CoerceError::NotNumeric),
    }
}

/// Checks every known field and collects all violations.
pub fn validate(payload: &Payload) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for feature in Feature::ALL {
        if let Some(message) = check_field(feature, payload.get(feature.name())) {
            errors.insert(feature.name().to_string(), message);
        }
    }
    errors
}

fn check_field(feature: Feature, value: Option<&Value>) -> Option<String> {
    let Some(value) = value else {
        return Some("Missing".to_string());
    };
    let Ok(number) = coerce_number(value) else {
        return Some("Must be numeric".to_string());
    };
    if feature.contains(number) {
        return None;
    }
    let (min, max) = feature.range();
    Some(format!("Must be between {} and {}", min, max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn valid() -> Payload {
        payload(json!({
            "N": 90, "P": 42, "K": 43,
            "temperature": 20.5, "humidity": 82, "ph": 6.5, "rainfall": 200
        }))
    }

    #[test]
    fn accepts_valid_payload() {
        assert!(validate(&valid()).is_empty());
    }

    #[test]
    fn reports_each_missing_field() {
        for feature in Feature::ALL {
            let mut p = valid();
            p.remove(feature.name());
            let errors = validate(&p);
            assert_eq!(errors.len(), 1, "{}", feature);
            assert_eq!(errors[feature.name()], "Missing");
        }
    }

    #[test]
    fn rejects_non_numeric_values() {
        let mut p = valid();
        p.insert("ph".into(), json!("abc"));
        p.insert("N".into(), Value::Null);
        p.insert("K".into(), json!(true));
        p.insert("rainfall".into(), json!([1, 2]));
        let errors = validate(&p);
        assert_eq!(errors.len(), 4);
        for key in ["ph", "N", "K", "rainfall"] {
            assert_eq!(errors[key], "Must be numeric");
        }
    }

    #[test]
    fn booleans_are_not_numbers() {
        // JSON true/false are never coerced to 1/0.
        for flag in [true, false] {
            assert_eq!(coerce_number(&json!(flag)), Err(CoerceError::NotNumeric));
            let mut p = valid();
            p.insert("humidity".into(), json!(flag));
            let errors = validate(&p);
            assert_eq!(errors.len(), 1);
            assert_eq!(errors["humidity"], "Must be numeric");
        }
    }

    #[test]
    fn accepts_numeric_strings() {
        let mut p = valid();
        p.insert("humidity".into(), json!(" 55.5 "));
        p.insert("N".into(), json!("1e3"));
        assert!(validate(&p).is_empty());
    }

    #[test]
    fn range_messages_use_literal_bounds() {
        let mut p = valid();
        p.insert("temperature".into(), json!(-10.5));
        p.insert("N".into(), json!(3001));
        let errors = validate(&p);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["temperature"], "Must be between -10 and 60");
        assert_eq!(errors["N"], "Must be between 0 and 3000");
    }

    #[test]
    fn boundaries_are_accepted() {
        for feature in Feature::ALL {
            let (min, max) = feature.range();
            for bound in [min, max] {
                let mut p = valid();
                p.insert(feature.name().into(), json!(bound));
                assert!(validate(&p).is_empty(), "{} = {}", feature, bound);
            }
        }
    }

    #[test]
    fn nan_string_is_out_of_range() {
        let mut p = valid();
        p.insert("ph".into(), json!("NaN"));
        assert_eq!(validate(&p)["ph"], "Must be between 0 and 14");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let mut p = valid();
        p.insert("soil".into(), json!("loam"));
        assert!(validate(&p).is_empty());
    }

    #[test]
    fn collects_every_violation() {
        let errors = validate(&payload(json!({ "ph": 15, "humidity": "wet" })));
        assert_eq!(errors.len(), 7);
        assert_eq!(errors["ph"], "Must be between 0 and 14");
        assert_eq!(errors["humidity"], "Must be numeric");
        assert_eq!(errors["rainfall"], "Missing");
    }
}
