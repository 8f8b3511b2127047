//! # Request Schemas
//!
//! Shape checks for request bodies and query strings. Each parser reads a raw
//! JSON object field by field and collects every failure into a
//! [`ValidationErrors`], so one response reports all bad fields at once.
//!
//! Business rules that need stored state (the merged area check on update) are
//! left to [`crate::Farmer`].

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::validate::MISSING_QUERY_PARAMETER;
use crate::{
    CpfCnpj, FarmerChanges, FarmingOption, NewFarmer, ValidationErrors, dedup_farming_options,
    validate_total_area,
};

/// Longest accepted name, farm name or city.
pub const MAX_TEXT_LENGTH: usize = 200;

/// Page size used when `limit` is not given.
pub const DEFAULT_LIMIT: i64 = 20;

/// Fields that hold free text.
const TEXT_FIELDS: [&str; 3] = ["name", "farm_name", "city"];

/// Fields that hold areas in hectares.
const AREA_FIELDS: [&str; 3] = ["total_area", "agricultural_area", "vegetation_area"];

const NOT_AN_OBJECT: &str = "Request body must be a JSON object";
const REQUIRED: &str = "Missing required field";

/////////////////////////////////////////////// FieldReader ///////////////////////////////////////////////

/// Reads typed fields out of a JSON object, recording failures as it goes.
///
/// A `null` value is treated the same as an absent field.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            errors: ValidationErrors::new(),
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|value| !value.is_null())
    }

    fn required<T>(&mut self, field: &str, value: Option<T>) -> Option<T> {
        if value.is_none() && self.present(field).is_none() {
            self.errors.add(field, REQUIRED);
        }
        value
    }

    /// A string between 1 and [`MAX_TEXT_LENGTH`] characters.
    fn text(&mut self, field: &str) -> Option<String> {
        let value = self.string(field)?;
        let length = value.chars().count();
        if length == 0 || length > MAX_TEXT_LENGTH {
            self.errors.add(
                field,
                format!("Must be between 1 and {} characters", MAX_TEXT_LENGTH),
            );
            return None;
        }
        Some(value)
    }

    /// A two-character state code.
    fn state(&mut self, field: &str) -> Option<String> {
        let value = self.string(field)?;
        if value.chars().count() != 2 {
            self.errors.add(field, "Must be exactly 2 characters");
            return None;
        }
        Some(value)
    }

    fn string(&mut self, field: &str) -> Option<String> {
        match self.present(field)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.errors.add(field, "Must be a string");
                None
            }
        }
    }

    /// A non-negative integer that fits the storage column.
    fn area(&mut self, field: &str) -> Option<i32> {
        let value = self.present(field)?;
        match value.as_i64().map(i32::try_from) {
            Some(Ok(area)) if area >= 0 => Some(area),
            Some(_) => {
                self.errors.add(
                    field,
                    format!("Must be an integer between 0 and {}", i32::MAX),
                );
                None
            }
            None => {
                self.errors.add(field, "Must be an integer");
                None
            }
        }
    }

    /// A list of farming option names, deduplicated.
    fn farming_options(&mut self, field: &str) -> Option<Vec<FarmingOption>> {
        let Value::Array(items) = self.present(field)? else {
            self.errors.add(field, "Must be a list of strings");
            return None;
        };
        let mut options = Vec::with_capacity(items.len());
        for item in items {
            let Some(name) = item.as_str() else {
                self.errors.add(field, "Must be a list of strings");
                return None;
            };
            match name.parse::<FarmingOption>() {
                Ok(option) => options.push(option),
                Err(e) => {
                    self.errors.add(field, e.to_string());
                    return None;
                }
            }
        }
        Some(dedup_farming_options(options))
    }

    fn cpf_cnpj(&mut self, field: &str) -> Option<CpfCnpj> {
        let value = self.string(field)?;
        match CpfCnpj::parse(&value) {
            Ok(cpf_cnpj) => Some(cpf_cnpj),
            Err(e) => {
                self.errors.add(field, e.to_string());
                None
            }
        }
    }
}

fn parse_object(body: &[u8]) -> Result<Map<String, Value>, ValidationErrors> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Ok(object),
        _ => Err(ValidationErrors::single("body", NOT_AN_OBJECT)),
    }
}

////////////////////////////////////////////////// Bodies //////////////////////////////////////////////////

/// Parses the body of a create request.
///
/// Every field is required. Unknown fields are ignored. The area invariant is
/// checked here once all three areas are individually valid.
pub fn parse_create_body(body: &[u8]) -> Result<NewFarmer, ValidationErrors> {
    let object = parse_object(body)?;
    let mut reader = FieldReader::new(&object);

    let cpf_cnpj = reader.cpf_cnpj("cpf_cnpj");
    let cpf_cnpj = reader.required("cpf_cnpj", cpf_cnpj);
    let [name, farm_name, city] = TEXT_FIELDS.map(|field| {
        let value = reader.text(field);
        reader.required(field, value)
    });
    let state = reader.state("state");
    let state = reader.required("state", state);
    let [total_area, agricultural_area, vegetation_area] = AREA_FIELDS.map(|field| {
        let value = reader.area(field);
        reader.required(field, value)
    });
    let farming_options = reader.farming_options("farming_options");
    let farming_options = reader.required("farming_options", farming_options);

    if let (Some(total), Some(agricultural), Some(vegetation)) =
        (total_area, agricultural_area, vegetation_area)
    {
        if let Err(e) = validate_total_area(total, agricultural, vegetation) {
            reader.errors.add("total_area", e.to_string());
        }
    }

    match (
        cpf_cnpj,
        name,
        farm_name,
        city,
        state,
        total_area,
        agricultural_area,
        vegetation_area,
        farming_options,
    ) {
        (
            Some(cpf_cnpj),
            Some(name),
            Some(farm_name),
            Some(city),
            Some(state),
            Some(total_area),
            Some(agricultural_area),
            Some(vegetation_area),
            Some(farming_options),
        ) if reader.errors.is_empty() => Ok(NewFarmer {
            cpf_cnpj,
            name,
            farm_name,
            city,
            state,
            total_area,
            agricultural_area,
            vegetation_area,
            farming_options,
        }),
        _ => Err(reader.errors),
    }
}

/// Parses the body of a partial update request.
///
/// Every field is optional and `cpf_cnpj` is ignored, since the identifier
/// cannot change. An empty object is a valid no-op update.
pub fn parse_update_body(body: &[u8]) -> Result<FarmerChanges, ValidationErrors> {
    let object = parse_object(body)?;
    let mut reader = FieldReader::new(&object);

    let [name, farm_name, city] = TEXT_FIELDS.map(|field| reader.text(field));
    let [total_area, agricultural_area, vegetation_area] =
        AREA_FIELDS.map(|field| reader.area(field));
    let changes = FarmerChanges {
        name,
        farm_name,
        city,
        state: reader.state("state"),
        total_area,
        agricultural_area,
        vegetation_area,
        farming_options: reader.farming_options("farming_options"),
    };
    reader.errors.into_result(changes)
}

/////////////////////////////////////////////// Query strings ///////////////////////////////////////////////

/// Paging parameters of the list endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// Maximum number of farmers to return.
    pub limit: i64,
    /// Number of farmers to skip.
    pub offset: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// Parses `limit` and `offset`, falling back to the defaults when absent.
pub fn parse_list_query(params: &HashMap<String, String>) -> Result<ListQuery, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut parse = |field: &str, default: i64| match params.get(field) {
        None => default,
        Some(raw) => match raw.trim().parse::<i64>() {
            Ok(value) if value >= 0 => value,
            _ => {
                errors.add(field, "Must be a non-negative integer");
                default
            }
        },
    };
    let query = ListQuery {
        limit: parse("limit", DEFAULT_LIMIT),
        offset: parse("offset", 0),
    };
    errors.into_result(query)
}

/// Extracts the mandatory `cpf_cnpj` query parameter.
///
/// The value is not checksum-validated: lookups of a malformed identifier
/// simply find nothing.
pub fn require_cpf_cnpj(params: &HashMap<String, String>) -> Result<String, ValidationErrors> {
    match params.get("cpf_cnpj") {
        Some(cpf_cnpj) if !cpf_cnpj.is_empty() => Ok(cpf_cnpj.clone()),
        _ => Err(ValidationErrors::single(
            "cpf_cnpj",
            MISSING_QUERY_PARAMETER,
        )),
    }
}
