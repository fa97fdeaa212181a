//! Argument schemas and wire encoding
//!
//! A [`Schema`] is a static declaration of the parameters one operation
//! accepts. Validating an [`Args`] against it produces a [`Payload`] whose
//! values are already in their wire form:
//!
//! - decimals become JSON floats
//! - timestamps become `"YYYY-MM-DD HH:MM:SS"` (naive, no zone)
//! - collections become one comma-joined string, order and duplicates kept
//! - ranges become `"lo,hi"` with each bound encoded by the field's own rule
//! - enumerations become their wire string
//!
//! Unknown keys, missing required keys and shape mismatches all fail with
//! [`Error::Validation`].

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

use super::args::{ArgValue, Args, Scalar};
use crate::api::error::{Error, Result};

/// Timestamp wire format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date wire format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Enumeration with a fixed wire representation
pub trait WireEnum: Copy {
    const VARIANTS: &'static [&'static str];

    /// String sent to the service
    fn wire(&self) -> &'static str;

    /// Human-readable name
    fn label(&self) -> &'static str;
}

/// Semantic type of a parameter, selecting its encoding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Decimal,
    Str,
    Bool,
    Timestamp,
    Date,
    Enum(&'static [&'static str]),
}

/// Accepted value shape for a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Scalar,
    MaybeRange,
    Collection,
}

/// Declaration of a single parameter
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub shape: Shape,
    pub required: bool,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name: name,
            kind,
            shape: Shape::Scalar,
            required: false,
        }
    }

    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            required: true,
            ..Self::optional(name, kind)
        }
    }

    pub const fn range(name: &'static str, kind: FieldKind) -> Self {
        Self {
            shape: Shape::MaybeRange,
            ..Self::optional(name, kind)
        }
    }

    pub const fn collection(name: &'static str, kind: FieldKind) -> Self {
        Self {
            shape: Shape::Collection,
            ..Self::optional(name, kind)
        }
    }

    /// Send under a different key than the one callers use
    pub const fn wire(self, wire_name: &'static str) -> Self {
        Self { wire_name, ..self }
    }
}

/// Parameter declarations for one operation
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

/// Schema that accepts no arguments at all
pub const EMPTY_SCHEMA: Schema = Schema {
    name: "empty",
    fields: &[],
};

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Validate caller arguments and encode them for the wire
    pub fn validate(&self, args: &Args) -> Result<Payload> {
        for (name, _) in args.iter() {
            if self.field(name).is_none() {
                return Err(Error::validation(format!(
                    "{}: unknown field {:?}",
                    self.name, name
                )));
            }
        }

        let mut entries = Vec::new();
        for spec in self.fields {
            match args.get(spec.name) {
                Some(value) => {
                    let encoded = encode_field(spec, value)
                        .map_err(|message| {
                            Error::validation(format!("{}.{}: {}", self.name, spec.name, message))
                        })?;
                    entries.push((spec.wire_name, encoded));
                }
                None if spec.required => {
                    return Err(Error::validation(format!(
                        "{}: missing required field {:?}",
                        self.name, spec.name
                    )));
                }
                None => {}
            }
        }

        Ok(Payload { entries })
    }

    /// Take the fields this schema declares out of a JSON object
    ///
    /// Used to turn an entity's current state into update arguments. Keys the
    /// schema does not declare and `null` values are skipped.
    pub fn project(&self, value: &Value) -> Result<Args> {
        let mut args = Args::new();
        for spec in self.fields {
            if let Some(v) = value.get(spec.name) {
                if let Some(v) = ArgValue::from_json(spec.name, v)? {
                    args.insert(spec.name, v);
                }
            }
        }
        Ok(args)
    }
}

/// Validated, wire-encoded arguments in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(&'static str, Value)>,
}

impl Payload {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, wire_name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| *k == wire_name)
            .map(|(_, v)| v)
    }

    /// JSON object for a request body
    pub fn to_json(&self) -> Value {
        Value::Object(self.to_map())
    }

    pub fn to_map(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Query pairs for a GET request
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.to_string(), value_to_string(v)))
            .collect()
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode_field(spec: &FieldSpec, value: &ArgValue) -> std::result::Result<Value, String> {
    match (spec.shape, value) {
        (Shape::Scalar | Shape::MaybeRange, ArgValue::One(s)) => encode_scalar(spec.kind, s),
        (Shape::Collection, ArgValue::One(s)) => {
            Ok(Value::String(value_to_string(&encode_scalar(spec.kind, s)?)))
        }
        (Shape::Collection, ArgValue::Many(items)) => {
            let parts = items
                .iter()
                .map(|s| encode_scalar(spec.kind, s).map(|v| value_to_string(&v)))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(Value::String(parts.join(",")))
        }
        (Shape::MaybeRange, ArgValue::Range(lo, hi)) => encode_range(spec.kind, lo, hi),
        (Shape::MaybeRange, ArgValue::Many(items)) => match items.as_slice() {
            [lo, hi] => encode_range(spec.kind, lo, hi),
            _ => Err(format!(
                "a range takes exactly two bounds, got {}",
                items.len()
            )),
        },
        (Shape::Scalar, ArgValue::Range(..)) => Err("expected a single value, got a range".into()),
        (Shape::Scalar, ArgValue::Many(_)) => Err("expected a single value, got a list".into()),
        (Shape::Collection, ArgValue::Range(..)) => {
            Err("expected a collection, got a range".into())
        }
    }
}

fn encode_range(kind: FieldKind, lo: &Scalar, hi: &Scalar) -> std::result::Result<Value, String> {
    let lo = value_to_string(&encode_scalar(kind, lo)?);
    let hi = value_to_string(&encode_scalar(kind, hi)?);
    Ok(Value::String(format!("{lo},{hi}")))
}

fn encode_scalar(kind: FieldKind, value: &Scalar) -> std::result::Result<Value, String> {
    let mismatch = || format!("expected {}, got {}", kind_name(kind), value.describe());

    match (kind, value) {
        (FieldKind::Int, Scalar::Int(i)) => Ok(Value::from(*i)),
        (FieldKind::Decimal, Scalar::Int(i)) => Ok(Value::from(*i)),
        (FieldKind::Decimal, Scalar::Decimal(d)) => decimal_to_json(d),
        (FieldKind::Decimal, Scalar::Str(s)) => Decimal::from_str(s.trim())
            .map_err(|_| format!("{s:?} is not a decimal"))
            .and_then(|d| decimal_to_json(&d)),
        (FieldKind::Str, Scalar::Str(s)) => Ok(Value::String(s.clone())),
        // numeric text such as INNs or phone numbers arrives parsed as a number
        (FieldKind::Str, Scalar::Int(i)) => Ok(Value::String(i.to_string())),
        (FieldKind::Str, Scalar::Decimal(d)) => Ok(Value::String(d.to_string())),
        (FieldKind::Str, Scalar::Bool(b)) => Ok(Value::String(bool_str(*b).to_string())),
        (FieldKind::Bool, Scalar::Bool(b)) => Ok(Value::Bool(*b)),
        (FieldKind::Timestamp, Scalar::Timestamp(ts)) => Ok(format_timestamp(ts)),
        (FieldKind::Timestamp, Scalar::Date(d)) => {
            Ok(format_timestamp(&d.and_time(NaiveTime::MIN)))
        }
        (FieldKind::Timestamp, Scalar::Str(s)) => parse_timestamp(s)
            .map(|ts| format_timestamp(&ts))
            .ok_or_else(|| format!("{s:?} is not a timestamp")),
        (FieldKind::Date, Scalar::Date(d)) => Ok(Value::String(d.format(DATE_FORMAT).to_string())),
        (FieldKind::Date, Scalar::Timestamp(ts)) => {
            Ok(Value::String(ts.date().format(DATE_FORMAT).to_string()))
        }
        (FieldKind::Date, Scalar::Str(s)) => parse_timestamp(s)
            .map(|ts| Value::String(ts.date().format(DATE_FORMAT).to_string()))
            .ok_or_else(|| format!("{s:?} is not a date")),
        (FieldKind::Enum(variants), Scalar::Str(s)) => {
            if variants.contains(&s.as_str()) {
                Ok(Value::String(s.clone()))
            } else {
                Err(format!("{s:?} is not one of {}", variants.join(", ")))
            }
        }
        (FieldKind::Enum(variants), Scalar::Bool(b)) if variants.contains(&bool_str(*b)) => {
            Ok(Value::String(bool_str(*b).to_string()))
        }
        _ => Err(mismatch()),
    }
}

fn bool_str(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Int => "integer",
        FieldKind::Decimal => "decimal",
        FieldKind::Str => "string",
        FieldKind::Bool => "boolean",
        FieldKind::Timestamp => "timestamp",
        FieldKind::Date => "date",
        FieldKind::Enum(_) => "enumeration value",
    }
}

// Precision loss is accepted; callers needing exact amounts pre-round.
fn decimal_to_json(d: &Decimal) -> std::result::Result<Value, String> {
    d.to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("{d} cannot be represented as a float"))
}

fn format_timestamp(ts: &NaiveDateTime) -> Value {
    Value::String(ts.format(TIMESTAMP_FORMAT).to_string())
}

/// Parse the timestamp forms the service and callers use
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, ISO `YYYY-MM-DDTHH:MM:SS` (with optional
/// fraction) and a bare `YYYY-MM-DD` (midnight).
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const KINDS: &[&str] = &["in", "out"];

    const FILTERS: Schema = Schema::new(
        "filters",
        &[
            FieldSpec::collection("ids", FieldKind::Int),
            FieldSpec::range("date", FieldKind::Timestamp),
            FieldSpec::range("value", FieldKind::Decimal),
            FieldSpec::optional("type", FieldKind::Enum(KINDS)),
            FieldSpec::optional("description", FieldKind::Str),
            FieldSpec::optional("page", FieldKind::Int),
            FieldSpec::optional("with_", FieldKind::Str).wire("with"),
        ],
    );

    const CREATE: Schema = Schema::new(
        "create",
        &[
            FieldSpec::required("value", FieldKind::Decimal),
            FieldSpec::optional("description", FieldKind::Str),
        ],
    );

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_absent_fields_are_omitted() {
        let payload = FILTERS.validate(&Args::new().set("page", 2i64)).unwrap();
        assert_eq!(payload.to_json(), json!({"page": 2}));
        assert!(payload.get("description").is_none());
    }

    #[test]
    fn test_collection_preserves_order_and_duplicates() {
        let payload = FILTERS
            .validate(&Args::new().set("ids", ArgValue::many([3i64, 1, 2, 1])))
            .unwrap();
        assert_eq!(payload.get("ids"), Some(&json!("3,1,2,1")));
    }

    #[test]
    fn test_single_value_collection() {
        let payload = FILTERS.validate(&Args::new().set("ids", 7i64)).unwrap();
        assert_eq!(payload.get("ids"), Some(&json!("7")));
    }

    #[test]
    fn test_timestamp_format() {
        let payload = FILTERS
            .validate(&Args::new().set("date", ts("2024-03-05T08:30:00")))
            .unwrap();
        assert_eq!(payload.get("date"), Some(&json!("2024-03-05 08:30:00")));
    }

    #[test]
    fn test_timestamp_range_encodes_both_bounds() {
        let args = Args::new().set(
            "date",
            ArgValue::range(ts("2024-01-01T00:00:00"), ts("2024-01-31T23:59:59")),
        );
        let payload = FILTERS.validate(&args).unwrap();
        assert_eq!(
            payload.get("date"),
            Some(&json!("2024-01-01 00:00:00,2024-01-31 23:59:59"))
        );
    }

    #[test]
    fn test_two_element_list_is_a_range() {
        let args = Args::from_json(&json!({"date": ["2024-01-01", "2024-02-01T10:00:00"]})).unwrap();
        let payload = FILTERS.validate(&args).unwrap();
        assert_eq!(
            payload.get("date"),
            Some(&json!("2024-01-01 00:00:00,2024-02-01 10:00:00"))
        );
    }

    #[test]
    fn test_three_element_range_fails() {
        let args = Args::new().set("value", ArgValue::many([1i64, 2, 3]));
        let err = FILTERS.validate(&args).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_range_on_scalar_field_fails() {
        let args = Args::new().set("page", ArgValue::range(1i64, 2i64));
        assert!(FILTERS.validate(&args).is_err());
    }

    #[test]
    fn test_decimal_encodes_as_float() {
        let args = Args::new().set("value", Decimal::new(-10050, 2));
        let payload = FILTERS.validate(&args).unwrap();
        assert_eq!(payload.get("value"), Some(&json!(-100.5)));

        let args = Args::new().set("value", ArgValue::range(10i64, Decimal::new(255, 1)));
        let payload = FILTERS.validate(&args).unwrap();
        assert_eq!(payload.get("value"), Some(&json!("10,25.5")));
    }

    #[test]
    fn test_decimal_accepts_numeric_string() {
        let payload = CREATE.validate(&Args::new().set("value", "-100.00")).unwrap();
        assert_eq!(payload.get("value"), Some(&json!(-100.0)));
    }

    #[test]
    fn test_enum_must_be_declared_variant() {
        let ok = FILTERS.validate(&Args::new().set("type", "out")).unwrap();
        assert_eq!(ok.get("type"), Some(&json!("out")));

        let err = FILTERS.validate(&Args::new().set("type", "Outgoing")).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn test_unknown_key_fails() {
        let args = Args::from_json(&json!({"totally_unknown_field": 1})).unwrap();
        let err = FILTERS.validate(&args).unwrap_err();
        assert!(err.to_string().contains("totally_unknown_field"));
    }

    #[test]
    fn test_missing_required_fails() {
        let err = CREATE
            .validate(&Args::new().set("description", "x"))
            .unwrap_err();
        assert!(err.to_string().contains("missing required field"));
    }

    #[test]
    fn test_kind_mismatch_fails() {
        assert!(FILTERS.validate(&Args::new().set("page", "two")).is_err());
        assert!(FILTERS.validate(&Args::new().set("date", "yesterday")).is_err());
    }

    #[test]
    fn test_numbers_in_string_fields_become_text() {
        let args = Args::from_json(&json!({"description": 7701234567i64})).unwrap();
        let payload = FILTERS.validate(&args).unwrap();
        assert_eq!(payload.get("description"), Some(&json!("7701234567")));

        let payload = FILTERS
            .validate(&Args::new().set("description", Decimal::new(1050, 2)))
            .unwrap();
        assert_eq!(payload.get("description"), Some(&json!("10.50")));

        let payload = FILTERS.validate(&Args::new().set("description", true)).unwrap();
        assert_eq!(payload.to_query(), vec![("description".to_string(), "true".to_string())]);
    }

    #[test]
    fn test_wire_name_is_used() {
        let payload = FILTERS.validate(&Args::new().set("with_", "account")).unwrap();
        assert_eq!(payload.to_json(), json!({"with": "account"}));
    }

    #[test]
    fn test_empty_schema_rejects_everything() {
        assert!(EMPTY_SCHEMA.validate(&Args::new()).unwrap().is_empty());
        assert!(EMPTY_SCHEMA.validate(&Args::new().set("name", "x")).is_err());
    }

    #[test]
    fn test_query_stringifies_values() {
        let args = Args::new()
            .set("page", 3i64)
            .set("ids", ArgValue::many([5i64, 4]))
            .set("description", "rent");
        let query = FILTERS.validate(&args).unwrap().to_query();
        assert_eq!(
            query,
            vec![
                ("ids".to_string(), "5,4".to_string()),
                ("description".to_string(), "rent".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_project_keeps_declared_non_null_fields() {
        let current = json!({"id": 1, "value": "-100", "description": null, "biz_id": 9});
        let args = CREATE.project(&current).unwrap();
        assert_eq!(args.len(), 1);
        assert!(args.contains("value"));
    }

    #[test]
    fn test_parse_timestamp_forms() {
        let expected = ts("2024-03-05T08:30:00");
        assert_eq!(parse_timestamp("2024-03-05 08:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-05T08:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-03-05"),
            Some(ts("2024-03-05T00:00:00"))
        );
        assert_eq!(parse_timestamp("March 5th"), None);
    }
}
