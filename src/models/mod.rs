//! Finolog entity models
//!
//! Field lists and argument schemas for each entity kind the client supports.
//!
//! # Module Structure
//!
//! - [`account`] - Money accounts (bank and cash)
//! - [`company`] - Legal entities owned by the business
//! - [`contractor`] - Counterparties
//! - [`order`] - Sales orders and their items
//! - [`transaction`] - Money movements, including splitting

/// Declare a string-valued enumeration with a fixed wire form
///
/// Defined ahead of the entity modules so they can use it directly.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => ($wire:literal, $label:literal)),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )*
        }

        impl $crate::resource::WireEnum for $name {
            const VARIANTS: &'static [&'static str] = &[$($wire),*];

            fn wire(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)*
                }
            }

            fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str($crate::resource::WireEnum::label(self))
            }
        }

        impl From<$name> for $crate::resource::Scalar {
            fn from(v: $name) -> Self {
                Self::Str($crate::resource::WireEnum::wire(&v).to_string())
            }
        }

        impl From<$name> for $crate::resource::ArgValue {
            fn from(v: $name) -> Self {
                Self::One(v.into())
            }
        }
    };
}

pub mod account;
pub mod company;
pub mod contractor;
pub mod order;
pub mod transaction;

pub use account::Account;
pub use company::{Company, Summary};
pub use contractor::Contractor;
pub use order::{Item, ItemType, Order};
pub use transaction::{
    AvailableWith, CategoryActivity, CategoryCode, CategoryType, Transaction, TransactionStatus,
    TransactionType,
};

/// Accept a string or a bare number for identifier-like text fields
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// Serde helpers for the service's `YYYY-MM-DD HH:MM:SS` timestamps
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::resource::schema::{parse_timestamp, TIMESTAMP_FORMAT};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp {s:?}")))
    }

    /// Same format for optional fields
    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(s) if s.is_empty() => Ok(None),
                Some(s) => parse_timestamp(&s)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp {s:?}"))),
            }
        }
    }
}

/// Serde helpers for `YYYY-MM-DD` dates that may arrive with a time part
pub mod date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use crate::resource::schema::{parse_timestamp, DATE_FORMAT};

    pub fn serialize<S: Serializer>(value: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(DATE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_timestamp(&s)
            .map(|ts| ts.date())
            .ok_or_else(|| de::Error::custom(format!("invalid date {s:?}")))
    }

    pub mod option {
        use super::*;

        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(s) if s.is_empty() => Ok(None),
                Some(s) => parse_timestamp(&s)
                    .map(|ts| Some(ts.date()))
                    .ok_or_else(|| de::Error::custom(format!("invalid date {s:?}"))),
            }
        }
    }
}
