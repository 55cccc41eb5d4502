//! Checks decoded ingestion bodies and turns them into [`Record`]s.
//!
//! A field counts as missing when it is absent or falsy (`null`, `false`, `0`, `""`).
//! Present fields must already carry their wire type; nothing is coerced here.

use crate::record::Record;
use serde_json::{Map, Value};

pub const TIMESTAMP: &str = "timestamp";
pub const DOMAIN: &str = "domain";
pub const METHOD: &str = "method";
pub const PATH: &str = "path";
pub const COUNTRY: &str = "country";

const LEGACY_COUNTRY: &str = "ipcountry";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

impl ValidationError {
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField(field) => field,
            ValidationError::InvalidField { field, .. } => field,
        }
    }
}

/// Validates all five fields of an ingestion body.
pub fn validate(fields: &Map<String, Value>) -> Result<Record, ValidationError> {
    let (timestamp, domain, method, path) = validate_client_fields(fields)?;

    let country = fields
        .get(COUNTRY)
        .filter(|v| is_truthy(v))
        .or_else(|| fields.get(LEGACY_COUNTRY));
    let country = require_str(COUNTRY, country)?;

    Ok(Record::new(timestamp, domain, method, path, country))
}

/// Validates the four client-supplied fields and attaches a country resolved by the server.
///
/// Any `country` in the body is ignored.
pub fn validate_with_country(
    fields: &Map<String, Value>,
    country: &str,
) -> Result<Record, ValidationError> {
    let (timestamp, domain, method, path) = validate_client_fields(fields)?;
    if country.is_empty() {
        return Err(ValidationError::MissingField(COUNTRY));
    }

    Ok(Record::new(timestamp, domain, method, path, country))
}

fn validate_client_fields(
    fields: &Map<String, Value>,
) -> Result<(i64, &str, &str, &str), ValidationError> {
    // Missing fields are reported before badly typed ones, in declaration order.
    for name in [TIMESTAMP, DOMAIN, METHOD, PATH] {
        if !fields.get(name).is_some_and(is_truthy) {
            return Err(ValidationError::MissingField(name));
        }
    }

    let timestamp = fields
        .get(TIMESTAMP)
        .and_then(Value::as_i64)
        .ok_or(ValidationError::InvalidField {
            field: TIMESTAMP,
            expected: "integer",
        })?;

    Ok((
        timestamp,
        require_str(DOMAIN, fields.get(DOMAIN))?,
        require_str(METHOD, fields.get(METHOD))?,
        require_str(PATH, fields.get(PATH))?,
    ))
}

fn require_str<'a>(
    field: &'static str,
    value: Option<&'a Value>,
) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if is_truthy(v) => v.as_str().ok_or(ValidationError::InvalidField {
            field,
            expected: "string",
        }),
        _ => Err(ValidationError::MissingField(field)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test body must be an object"),
        }
    }

    fn complete() -> Value {
        json!({
            "timestamp": 1700000000,
            "domain": "example.com",
            "method": "GET",
            "path": "/blog",
            "country": "CH",
        })
    }

    #[test]
    fn test_valid_body() {
        let record = validate(&body(complete())).unwrap();
        assert_eq!(
            record,
            Record::new(1700000000, "example.com", "GET", "/blog", "CH")
        );
    }

    #[test]
    fn test_each_field_is_required() {
        for field in [TIMESTAMP, DOMAIN, METHOD, PATH, COUNTRY] {
            let mut fields = body(complete());
            fields.remove(field);
            assert_eq!(
                validate(&fields).unwrap_err(),
                ValidationError::MissingField(field)
            );
        }
    }

    #[test]
    fn test_falsy_values_are_missing() {
        for (field, falsy) in [
            (TIMESTAMP, json!(0)),
            (TIMESTAMP, json!(null)),
            (DOMAIN, json!("")),
            (METHOD, json!(false)),
            (COUNTRY, json!("")),
        ] {
            let mut fields = body(complete());
            fields.insert(field.to_string(), falsy);
            assert_eq!(
                validate(&fields).unwrap_err(),
                ValidationError::MissingField(field)
            );
        }
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        let mut fields = body(complete());
        fields.insert(TIMESTAMP.into(), json!("1700000000"));
        assert_eq!(
            validate(&fields).unwrap_err(),
            ValidationError::InvalidField {
                field: TIMESTAMP,
                expected: "integer"
            }
        );

        let mut fields = body(complete());
        fields.insert(TIMESTAMP.into(), json!(12.5));
        assert_eq!(validate(&fields).unwrap_err().field(), TIMESTAMP);

        let mut fields = body(complete());
        fields.insert(PATH.into(), json!(["/a"]));
        assert_eq!(
            validate(&fields).unwrap_err(),
            ValidationError::InvalidField {
                field: PATH,
                expected: "string"
            }
        );
    }

    #[test]
    fn test_legacy_country_name() {
        let mut fields = body(complete());
        fields.remove(COUNTRY);
        fields.insert(LEGACY_COUNTRY.into(), json!("FR"));
        assert_eq!(validate(&fields).unwrap().country, "FR");
    }

    #[test]
    fn test_server_resolved_country() {
        let mut fields = body(complete());
        fields.remove(COUNTRY);
        let record = validate_with_country(&fields, "NL").unwrap();
        assert_eq!(record.country, "NL");

        // A client-supplied country does not override the resolved one.
        let record = validate_with_country(&body(complete()), "NL").unwrap();
        assert_eq!(record.country, "NL");

        fields.remove(DOMAIN);
        assert_eq!(
            validate_with_country(&fields, "NL").unwrap_err(),
            ValidationError::MissingField(DOMAIN)
        );
    }
}
