//! Caller-side argument values
//!
//! [`Args`] is the loosely-typed input to every manager operation. Nothing
//! here is validated; [`crate::resource::Schema::validate`] decides whether a
//! set of arguments is acceptable and how each value goes on the wire.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::api::error::{Error, Result};

/// A single argument value before validation
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Decimal(Decimal),
    Str(String),
    Bool(bool),
    Timestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl Scalar {
    /// Convert a JSON scalar. Arrays, objects and null are not scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::String(s) => Some(Self::Str(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Self::Int(i))
                } else {
                    let text = n.to_string();
                    Decimal::from_str(&text)
                        .or_else(|_| Decimal::from_scientific(&text))
                        .ok()
                        .map(Self::Decimal)
                }
            }
            _ => None,
        }
    }

    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Timestamp(_) => "timestamp",
            Self::Date(_) => "date",
        }
    }
}

macro_rules! scalar_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Scalar {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }

            impl From<$ty> for ArgValue {
                fn from(v: $ty) -> Self {
                    Self::One(Scalar::from(v))
                }
            }
        )*
    };
}

scalar_from! {
    i64 => Int,
    i32 => Int,
    Decimal => Decimal,
    &str => Str,
    String => Str,
    bool => Bool,
    NaiveDateTime => Timestamp,
    NaiveDate => Date,
}

impl From<Scalar> for ArgValue {
    fn from(v: Scalar) -> Self {
        Self::One(v)
    }
}

/// Shape of an argument value: one value, a bound pair, or a list
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    One(Scalar),
    Range(Scalar, Scalar),
    Many(Vec<Scalar>),
}

impl ArgValue {
    pub fn range(lo: impl Into<Scalar>, hi: impl Into<Scalar>) -> Self {
        Self::Range(lo.into(), hi.into())
    }

    pub fn many<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Scalar>,
    {
        Self::Many(items.into_iter().map(Into::into).collect())
    }

    /// Convert a JSON value; `null` means absent and yields `None`
    pub fn from_json(name: &str, value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    Scalar::from_json(item).ok_or_else(|| {
                        Error::validation(format!("{name}: nested values are not accepted"))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(|items| Some(Self::Many(items))),
            Value::Object(_) => Err(Error::validation(format!(
                "{name}: objects are not accepted as argument values"
            ))),
            other => Scalar::from_json(other)
                .map(|s| Some(Self::One(s)))
                .ok_or_else(|| Error::validation(format!("{name}: unsupported number"))),
        }
    }
}

/// Named argument set for one operation; absent keys mean "omit"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn set(mut self, name: &str, value: impl Into<ArgValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Builder-style insert that skips `None`
    pub fn set_opt<V: Into<ArgValue>>(mut self, name: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(name, value);
        }
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ArgValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.values.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<ArgValue> {
        self.values.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overlay `other` on top of `self`; keys in `other` win
    pub fn merge(mut self, other: Args) -> Self {
        self.values.extend(other.values);
        self
    }

    /// Build from a JSON object, dropping `null` entries
    pub fn from_json(value: &Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(Error::validation("arguments must be a JSON object"));
        };

        let mut args = Self::new();
        for (name, value) in map {
            if let Some(value) = ArgValue::from_json(name, value)? {
                args.values.insert(name.clone(), value);
            }
        }
        Ok(args)
    }
}

impl<K: Into<String>, V: Into<ArgValue>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
