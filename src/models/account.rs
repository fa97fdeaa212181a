//! Accounts

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::company::Summary;
use crate::resource::{Entity, FieldKind, FieldSpec, Schema};

/// A bank or cash account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub biz_id: i64,
    pub company_id: i64,
    pub currency_id: i64,
    pub name: String,

    #[serde(default, deserialize_with = "super::lenient_string")]
    pub bank_account: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub bank_bik: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub bank_iban: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub bank_ks: Option<String>,
    #[serde(default, deserialize_with = "super::lenient_string")]
    pub bank_mfo: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,

    // the service spells it "initital_balance"
    #[serde(default, alias = "initital_balance")]
    pub initial_balance: Decimal,
    #[serde(default)]
    pub is_bank: bool,
    #[serde(default)]
    pub is_closed: bool,

    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
    pub created_by_id: i64,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_by_id: Option<i64>,
    #[serde(default, with = "super::timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,

    #[serde(default)]
    pub summary: Vec<Summary>,
    #[serde(default)]
    pub planned_summary: Vec<Summary>,
}

impl Account {
    /// Current balance in the account's own currency, if reported
    pub fn balance(&self) -> Option<Decimal> {
        self.summary.iter().find_map(|s| s.balance)
    }
}

const ACCOUNT_CREATE: Schema = Schema::new(
    "account.create",
    &[
        FieldSpec::required("name", FieldKind::Str),
        FieldSpec::required("company_id", FieldKind::Int),
        FieldSpec::required("currency_id", FieldKind::Int),
        FieldSpec::optional("initial_balance", FieldKind::Decimal),
        FieldSpec::optional("is_bank", FieldKind::Bool),
        FieldSpec::optional("bank_name", FieldKind::Str),
        FieldSpec::optional("bank_account", FieldKind::Str),
    ],
);

const ACCOUNT_UPDATE: Schema = Schema::new(
    "account.update",
    &[
        FieldSpec::optional("name", FieldKind::Str),
        FieldSpec::optional("company_id", FieldKind::Int),
        FieldSpec::optional("initial_balance", FieldKind::Decimal),
        FieldSpec::optional("is_closed", FieldKind::Bool),
        FieldSpec::optional("bank_name", FieldKind::Str),
        FieldSpec::optional("bank_account", FieldKind::Str),
    ],
);

impl Entity for Account {
    const KIND: &'static str = "account";
    const ROOT: &'static str = "/account";

    fn id(&self) -> i64 {
        self.id
    }

    fn create_schema() -> Option<&'static Schema> {
        Some(&ACCOUNT_CREATE)
    }

    fn update_schema() -> Option<&'static Schema> {
        Some(&ACCOUNT_UPDATE)
    }
}
