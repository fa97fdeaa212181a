//! Orders and catalog items
//!
//! Both live under the `/orders` section of the API and are read-only from
//! this client's point of view: only get, list and delete are meaningful.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transaction::TransactionType;
use crate::resource::{Entity, FieldKind, FieldSpec, Schema, WireEnum};

wire_enum! {
    /// Kind of catalog item
    pub enum ItemType {
        Product => ("product", "Product"),
        Service => ("service", "Service"),
    }
}

/// A sales order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub biz_id: i64,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(with = "super::timestamp")]
    pub date: NaiveDateTime,
    #[serde(default)]
    pub description: Option<String>,
    pub currency_id: i64,
    pub cost: Decimal,
    #[serde(default)]
    pub paid: Decimal,
    #[serde(default, with = "super::timestamp::option")]
    pub paid_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub paid_status: Option<String>,
    #[serde(default, with = "super::timestamp::option")]
    pub shipped_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub shipped_status: Option<String>,
    #[serde(default)]
    pub shipment: Option<i64>,

    pub buyer_id: i64,
    #[serde(default)]
    pub buyer: Value,
    pub seller_id: i64,
    #[serde(default)]
    pub seller: Value,
    #[serde(default)]
    pub package_id: Option<i64>,
    #[serde(default)]
    pub package: Value,
    #[serde(default)]
    pub documents: Vec<Value>,
    #[serde(default)]
    pub status_id: Option<i64>,
    #[serde(default)]
    pub offer_id: Option<i64>,
    #[serde(default)]
    pub payment_method_id: Option<i64>,
    #[serde(default)]
    pub payment_url: Option<String>,
    #[serde(default)]
    pub token: Option<String>,

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
    pub deleted_by_id: Option<i64>,

    #[serde(default)]
    pub utm_campaign: Option<Value>,
    #[serde(default)]
    pub utm_content: Option<Value>,
    #[serde(default)]
    pub utm_medium: Option<Value>,
    #[serde(default)]
    pub utm_source: Option<Value>,
    #[serde(default)]
    pub utm_term: Option<Value>,
}

impl Order {
    /// Amount still to be paid
    pub fn outstanding(&self) -> Decimal {
        self.cost - self.paid
    }
}

const ORDER_LIST: Schema = Schema::new(
    "order.list",
    &[
        FieldSpec::range("status_ids", FieldKind::Int),
        FieldSpec::range("contractor_ids", FieldKind::Int),
        FieldSpec::range("requisite_ids", FieldKind::Int),
        FieldSpec::optional("type", FieldKind::Enum(TransactionType::VARIANTS)),
        FieldSpec::range("date", FieldKind::Date),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::optional("page", FieldKind::Int),
        FieldSpec::optional("pagesize", FieldKind::Int),
        FieldSpec::optional("ids", FieldKind::Int),
        FieldSpec::optional("query", FieldKind::Str),
        FieldSpec::collection("descriptions", FieldKind::Str),
    ],
);

impl Entity for Order {
    const KIND: &'static str = "order";
    const ROOT: &'static str = "/orders/order";

    fn id(&self) -> i64 {
        self.id
    }

    fn list_schema() -> &'static Schema {
        &ORDER_LIST
    }
}

/// A product or service from the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub biz_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ItemType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub can_edit_initial_balance: bool,

    pub price: Decimal,
    pub price_currency_id: i64,
    #[serde(default)]
    pub initial_count: Option<i64>,
    #[serde(default)]
    pub initial_currency_id: Option<i64>,
    #[serde(default)]
    pub initial_price: Option<Decimal>,
    #[serde(default)]
    pub unit_id: Option<i64>,
    #[serde(default)]
    pub vat: Option<i64>,

    #[serde(default)]
    pub summary: Vec<Value>,
    #[serde(default)]
    pub summary_assets: Vec<Value>,

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
    pub deleted_by_id: Option<i64>,
}

const ITEM_LIST: Schema = Schema::new(
    "item.list",
    &[
        FieldSpec::optional("page", FieldKind::Int),
        FieldSpec::optional("pagesize", FieldKind::Int),
        FieldSpec::optional("id", FieldKind::Int),
        FieldSpec::range("ids", FieldKind::Int),
        FieldSpec::optional("query", FieldKind::Str),
    ],
);

impl Entity for Item {
    const KIND: &'static str = "item";
    const ROOT: &'static str = "/orders/item";

    fn id(&self) -> i64 {
        self.id
    }

    fn list_schema() -> &'static Schema {
        &ITEM_LIST
    }
}
