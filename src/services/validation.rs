//! Validation gate for submitted attribute values.
//!
//! Two passes run before any write reaches the moderation policy:
//!
//! 1. **Field collection** — caller-supplied parameters are checked against
//!    an explicit per-entity allow-list (no duck-typed copy loops), list
//!    fields are split on commas and normalized (an empty submission is an
//!    empty list, not an error), and numeric fields must parse.
//! 2. **Vocabulary membership** — attribute values with a controlled
//!    vocabulary must be members of the current value set, element-wise
//!    for list fields. Failures are aggregated into one error naming every
//!    offending field; there is no fail-fast.
//!
//! Moderators are not exempt: they bypass the approval queue, not data
//! validity.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};
use url::Url;

use crate::error::AppError;
use crate::models::domain::DomainValues;
use crate::models::lifecycle::EntityKind;

/// Parameters consumed by the framework/auth layers, never entity fields.
const SYSTEM_PARAMS: &[&str] = &["api_key"];

const BRAND_FIELDS: &[&str] = &[
    "name",
    "country",
    "founding_date",
    "logo",
    "address",
    "website",
];

const CIGAR_FIELDS: &[&str] = &[
    "brand",
    "name",
    "length",
    "ring_gauge",
    "vitola",
    "color",
    "country",
    "wrappers",
    "binders",
    "fillers",
    "strength",
    "year_introduced",
];

/// Comma-separated multi-value fields.
const LIST_FIELDS: &[&str] = &["wrappers", "binders", "fillers"];

const NUMERIC_FIELDS: &[&str] = &["length", "ring_gauge"];

/// Membership check against a vocabulary's current value set.
pub fn is_member_of_vocabulary(value: &str, vocabulary: &[String]) -> bool {
    vocabulary.iter().any(|member| member == value)
}

/// Allow-listed updatable fields for an entity type.
pub fn allowed_fields(kind: EntityKind) -> &'static [&'static str] {
    match kind {
        EntityKind::Brand => BRAND_FIELDS,
        EntityKind::Cigar => CIGAR_FIELDS,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn failed_fields_error(fields: Vec<String>) -> AppError {
    let message = if fields.len() == 1 {
        format!("The field {} failed validation.", fields[0])
    } else {
        format!(
            "The following fields failed validation: {}",
            fields.join(", ")
        )
    };
    AppError::InvalidValue(message)
}

/// Convert raw request parameters into a typed field map for `kind`.
///
/// Unknown parameters are rejected (all of them named at once); system
/// parameters are skipped; list fields become arrays; numeric fields must
/// parse as numbers.
pub fn collect_entity_fields(
    kind: EntityKind,
    params: &HashMap<String, String>,
) -> Result<Map<String, Value>, AppError> {
    let allowed = allowed_fields(kind);
    let mut unknown: Vec<String> = Vec::new();
    let mut unparsable: Vec<String> = Vec::new();
    let mut fields = Map::new();

    for (key, raw) in params {
        if SYSTEM_PARAMS.contains(&key.as_str()) {
            continue;
        }
        if !allowed.contains(&key.as_str()) {
            unknown.push(key.clone());
            continue;
        }
        if LIST_FIELDS.contains(&key.as_str()) {
            let items = split_list(raw);
            fields.insert(
                key.clone(),
                Value::Array(items.into_iter().map(Value::String).collect()),
            );
        } else if NUMERIC_FIELDS.contains(&key.as_str()) {
            match raw.trim().parse::<f64>().ok().and_then(Number::from_f64) {
                Some(number) => {
                    fields.insert(key.clone(), Value::Number(number));
                }
                None => unparsable.push(key.clone()),
            }
        } else {
            fields.insert(key.clone(), Value::String(raw.clone()));
        }
    }

    if !unknown.is_empty() {
        unknown.sort();
        return Err(AppError::InvalidValue(format!(
            "The following fields are not recognized: {}",
            unknown.join(", ")
        )));
    }
    if !unparsable.is_empty() {
        unparsable.sort();
        return Err(failed_fields_error(unparsable));
    }

    Ok(fields)
}

fn scalar_in_vocabulary(value: &Value, vocabulary: &[String]) -> bool {
    value
        .as_str()
        .is_some_and(|v| is_member_of_vocabulary(v, vocabulary))
}

fn list_in_vocabulary(value: &Value, vocabulary: &[String]) -> bool {
    // An empty list means "no value" and is always acceptable.
    value.as_array().is_some_and(|items| {
        items
            .iter()
            .all(|item| scalar_in_vocabulary(item, vocabulary))
    })
}

/// Validate a collected field map against the controlled vocabularies,
/// aggregating every failing field into a single error.
pub fn validate_against_domains(
    fields: &Map<String, Value>,
    domains: &DomainValues,
) -> Result<(), AppError> {
    let mut failed: Vec<String> = Vec::new();

    for (key, value) in fields {
        let ok = match key.as_str() {
            "vitola" => scalar_in_vocabulary(value, &domains.vitolas),
            "color" => scalar_in_vocabulary(value, &domains.colors),
            "country" => scalar_in_vocabulary(value, &domains.countries),
            "strength" => scalar_in_vocabulary(value, &domains.strengths),
            "wrappers" => list_in_vocabulary(value, &domains.wrappers),
            "binders" => list_in_vocabulary(value, &domains.binders),
            "fillers" => list_in_vocabulary(value, &domains.fillers),
            "website" => value.as_str().is_some_and(|v| Url::parse(v).is_ok()),
            _ => true,
        };
        if !ok {
            failed.push(key.clone());
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        failed.sort();
        Err(failed_fields_error(failed))
    }
}
