//! Procedure bodies registered by [`crate::router::app_router`].
//!
//! Each takes the request context and the raw call input, and validates the
//! input before touching the database.

pub mod auth;
pub mod documents;
pub mod posts;
pub mod products;
pub mod system;

use common::errors::AppError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Decode call input. A missing input decodes like an empty object.
pub fn parse_input<T: DeserializeOwned>(input: Option<Value>) -> Result<T, AppError> {
    let value = match input {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    };
    serde_json::from_value(value).map_err(|e| AppError::validation(format!("Invalid input: {}", e)))
}

pub fn to_data<T: Serialize>(value: T) -> Result<Value, AppError> {
    Ok(serde_json::to_value(value)?)
}

/// Trimmed value of a required text field.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} is required", field)));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, Debug)]
    struct Filter {
        category: Option<String>,
    }

    #[test]
    fn missing_input_is_an_empty_object() {
        let filter: Filter = parse_input(None).expect("filter");
        assert!(filter.category.is_none());

        let filter: Filter = parse_input(Some(Value::Null)).expect("filter");
        assert!(filter.category.is_none());
    }

    #[test]
    fn wrong_shape_is_a_validation_error() {
        let result: Result<Filter, _> = parse_input(Some(json!({ "category": 7 })));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn required_trims() {
        assert_eq!(required("sku", "  T-100 ").expect("sku"), "T-100");
        assert!(required("sku", "   ").is_err());
    }
}
