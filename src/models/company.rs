//! Companies
//!
//! Legal entities inside a business account, plus the balance summary shape
//! shared with accounts.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionStatus;
use crate::resource::{Entity, FieldKind, FieldSpec, Schema};

/// Balance summary attached to companies and accounts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub base_balance: Option<Decimal>,
    #[serde(default)]
    pub base_outcoming: Option<Decimal>,
    #[serde(default)]
    pub incoming: Option<Decimal>,
    #[serde(default)]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub currency_id: Option<i64>,
    #[serde(default, with = "super::date::option")]
    pub date: Option<NaiveDate>,
    #[serde(default, rename = "type")]
    pub kind: Option<TransactionStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub biz_id: i64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub address_city: Option<String>,
    #[serde(default)]
    pub address_postal_index: Option<String>,
    #[serde(default)]
    pub address_street: Option<String>,
    #[serde(default)]
    pub contractor_id: Option<i64>,
    #[serde(default)]
    pub country_id: Option<i64>,
    #[serde(default)]
    pub director_name: Option<String>,
    #[serde(default)]
    pub director_position: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub inn: Option<i64>,
    #[serde(default)]
    pub kpp: Option<i64>,
    #[serde(default)]
    pub is_closed: bool,

    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
    pub created_by_id: i64,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_by_id: Option<i64>,

    #[serde(default)]
    pub summary: Vec<Summary>,
    #[serde(default)]
    pub planned_summary: Vec<Summary>,
}

const COMPANY_CREATE: Schema = Schema::new(
    "company.create",
    &[
        FieldSpec::required("name", FieldKind::Str),
        FieldSpec::optional("full_name", FieldKind::Str),
        FieldSpec::optional("inn", FieldKind::Int),
        FieldSpec::optional("kpp", FieldKind::Int),
    ],
);

const COMPANY_UPDATE: Schema = Schema::new(
    "company.update",
    &[
        FieldSpec::optional("name", FieldKind::Str),
        FieldSpec::optional("full_name", FieldKind::Str),
        FieldSpec::optional("inn", FieldKind::Int),
        FieldSpec::optional("kpp", FieldKind::Int),
        FieldSpec::optional("is_closed", FieldKind::Bool),
    ],
);

impl Entity for Company {
    const KIND: &'static str = "company";
    const ROOT: &'static str = "/company";

    fn id(&self) -> i64 {
        self.id
    }

    fn create_schema() -> Option<&'static Schema> {
        Some(&COMPANY_CREATE)
    }

    fn update_schema() -> Option<&'static Schema> {
        Some(&COMPANY_UPDATE)
    }
}
