//! # Validation Rules
//!
//! Pure checks shared by the request schemas and the farmer entity:
//!
//! - the area invariant, `agricultural_area + vegetation_area <= total_area`
//! - set-style merging of farming options
//! - a field-level error collection for request bodies and query strings
//!
//! ```rust
//! use agro::{FarmingOption, normalize_farming_options, validate_total_area};
//!
//! assert!(validate_total_area(100, 40, 50).is_ok());
//! assert!(validate_total_area(100, 100, 50).is_err());
//!
//! let merged = normalize_farming_options(&[FarmingOption::Sugarcane], &[FarmingOption::Soy]);
//! assert_eq!(merged, vec![FarmingOption::Sugarcane, FarmingOption::Soy]);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{FarmerError, FarmingOption};

/// Message used for any query parameter the caller left out.
pub const MISSING_QUERY_PARAMETER: &str = "Missing required parameter in the query string";

/// Summary message attached to every field-level validation failure.
pub const VALIDATION_FAILED: &str = "Input payload validation failed";

/// Checks the area invariant.
///
/// Fails with [`FarmerError::AreaInvalid`] when the agricultural and vegetation
/// areas together exceed the total area.
pub fn validate_total_area(
    total_area: i32,
    agricultural_area: i32,
    vegetation_area: i32,
) -> Result<(), FarmerError> {
    if i64::from(agricultural_area) + i64::from(vegetation_area) > i64::from(total_area) {
        return Err(FarmerError::AreaInvalid {
            total: total_area,
            agricultural: agricultural_area,
            vegetation: vegetation_area,
        });
    }
    Ok(())
}

/// Merges newly supplied farming options into the existing ones.
///
/// An empty `new_options` leaves `existing_options` untouched (duplicates
/// included). Otherwise the result is the union of both, each tag once, with
/// existing tags first.
pub fn normalize_farming_options(
    existing_options: &[FarmingOption],
    new_options: &[FarmingOption],
) -> Vec<FarmingOption> {
    if new_options.is_empty() {
        return existing_options.to_vec();
    }
    dedup_farming_options(existing_options.iter().chain(new_options).copied())
}

/// Removes repeated tags, keeping the first occurrence of each.
pub fn dedup_farming_options(
    options: impl IntoIterator<Item = FarmingOption>,
) -> Vec<FarmingOption> {
    let mut result: Vec<FarmingOption> = Vec::new();
    for option in options {
        if !result.contains(&option) {
            result.push(option);
        }
    }
    result
}

/////////////////////////////////////////// ValidationErrors ///////////////////////////////////////////

/// Field-level validation failures, keyed by field name.
///
/// Serializes as `{"message": "Input payload validation failed", "errors": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding a single failure.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a failure for `field`; the first failure per field wins.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
    }

    /// Returns `true` when no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The message recorded for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Iterates over `(field, message)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Converts the collection into a `Result`, yielding `value` if it is empty.
    pub fn into_result<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ValidationErrors", 2)?;
        state.serialize_field("errors", &self.errors)?;
        state.serialize_field("message", VALIDATION_FAILED)?;
        state.end()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", VALIDATION_FAILED)?;
        for (field, message) in &self.errors {
            write!(f, "; {}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn area_exactly_full_is_valid() {
        assert!(validate_total_area(100, 40, 60).is_ok());
        assert!(validate_total_area(0, 0, 0).is_ok());
    }

    #[test]
    fn area_over_total_is_rejected() {
        assert_eq!(
            validate_total_area(100, 100, 50),
            Err(FarmerError::AreaInvalid {
                total: 100,
                agricultural: 100,
                vegetation: 50,
            })
        );
    }

    #[test]
    fn area_sum_does_not_overflow() {
        assert!(validate_total_area(i32::MAX, i32::MAX, 1).is_err());
        assert!(validate_total_area(i32::MAX, i32::MAX, 0).is_ok());
    }

    #[test]
    fn normalize_with_empty_new_keeps_existing() {
        let existing = vec![FarmingOption::Corn, FarmingOption::Corn];
        assert_eq!(normalize_farming_options(&existing, &[]), existing);
    }

    #[test]
    fn normalize_unions_and_dedups() {
        let merged = normalize_farming_options(
            &[FarmingOption::Sugarcane],
            &[FarmingOption::Soy, FarmingOption::Sugarcane, FarmingOption::Soy],
        );
        assert_eq!(merged, vec![FarmingOption::Sugarcane, FarmingOption::Soy]);
    }

    #[test]
    fn first_error_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("state", "first");
        errors.add("state", "second");
        assert_eq!(errors.get("state"), Some("first"));
    }

    #[test]
    fn into_result() {
        assert_eq!(ValidationErrors::new().into_result(7), Ok(7));
        assert!(ValidationErrors::single("a", "b").into_result(7).is_err());
    }

    #[test]
    fn serializes_with_summary_message() {
        let errors = ValidationErrors::single("cpf_cnpj", MISSING_QUERY_PARAMETER);
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            json!({
                "errors": {"cpf_cnpj": "Missing required parameter in the query string"},
                "message": "Input payload validation failed",
            })
        );
    }
}
