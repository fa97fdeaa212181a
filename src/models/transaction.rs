//! Transactions
//!
//! Money movements between accounts and categories. Besides the usual CRUD
//! operations a transaction can be split into several parts that each carry
//! their own category, project or counterparty.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::{Error, Result};
use crate::resource::{
    Args, Entity, FieldKind, FieldSpec, Record, ResourceManager, Scalar, Schema, WireEnum,
};

wire_enum! {
    /// Direction of a transaction
    pub enum TransactionType {
        In => ("in", "Incoming"),
        Out => ("out", "Outgoing"),
    }
}

wire_enum! {
    /// Whether a transaction already happened or is scheduled
    pub enum TransactionStatus {
        Regular => ("regular", "Regular"),
        Planned => ("planned", "Planned"),
    }
}

wire_enum! {
    /// Direction a category applies to
    pub enum CategoryType {
        In => ("in", "Income"),
        Out => ("out", "Expense"),
        InOut => ("inout", "Transfer"),
    }
}

wire_enum! {
    /// Cash-flow activity of a category
    pub enum CategoryActivity {
        Operating => ("operating", "Operating"),
        Financial => ("financial", "Financial"),
        Investment => ("investment", "Investment"),
    }
}

wire_enum! {
    /// Service-defined system categories
    pub enum CategoryCode {
        Transfer => ("transfer", "Unallocated transfers"),
        Taxes => ("taxes", "Taxes"),
        UnallocatedIn => ("unallocated_in", "Unallocated income"),
        UnallocatedOut => ("unallocated_out", "Unallocated expenses"),
        CashIn => ("cash_in", "Cash in"),
        CashOut => ("cash_out", "Cash out"),
    }
}

wire_enum! {
    /// Related objects the service can embed in list responses
    pub enum AvailableWith {
        Account => ("account", "Account"),
        Category => ("category", "Category"),
        Contractor => ("contractor", "Contractor"),
        Requisite => ("requisite", "Requisite"),
        Project => ("project", "Project"),
        Order => ("order", "Order"),
        Autoeditor => ("autoeditor", "Autoeditor"),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(with = "super::date")]
    pub date: NaiveDate,
    pub biz_id: i64,
    pub account_id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category_id: i64,
    #[serde(default)]
    pub contractor_id: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub value: Decimal,
    #[serde(default)]
    pub base_value: Option<Decimal>,

    #[serde(with = "super::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default, with = "super::timestamp::option")]
    pub updated_at: Option<NaiveDateTime>,
    pub created_by_id: i64,
    #[serde(default)]
    pub updated_by_id: Option<i64>,

    #[serde(default)]
    pub requisite_id: Option<i64>,
    #[serde(default)]
    pub transfer_id: Option<i64>,
    #[serde(default, with = "super::date::option")]
    pub report_date: Option<NaiveDate>,
    pub status: TransactionStatus,
    #[serde(default)]
    pub split_id: Option<Value>,
    #[serde(default)]
    pub payment_id: Option<i64>,
    #[serde(default)]
    pub schedule_id: Option<i64>,
    #[serde(default)]
    pub source_id: Option<i64>,
    #[serde(default)]
    pub project_id: Option<i64>,
    #[serde(default)]
    pub is_splitted: bool,
    #[serde(default, with = "super::timestamp::option")]
    pub deleted_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub deleted_by_id: Option<i64>,
    #[serde(default)]
    pub order_id: Option<i64>,
    #[serde(default)]
    pub is_multi_transfer: Option<bool>,
    #[serde(default)]
    pub is_debt: Option<bool>,
    #[serde(default)]
    pub has_comments: bool,
    #[serde(default)]
    pub payment_number: Option<i64>,
    #[serde(default)]
    pub vat: Option<Decimal>,
    #[serde(default)]
    pub base_vat: Option<Decimal>,
    #[serde(default)]
    pub autoeditor_id: Option<i64>,
    #[serde(default)]
    pub original_schedule_id: Option<i64>,
}

const TYPES: &[&str] = TransactionType::VARIANTS;
const STATUSES: &[&str] = TransactionStatus::VARIANTS;
const FLAG: &[&str] = &["true", "false"];
const FLAG_OR_ALL: &[&str] = &["true", "false", "all"];

const TRANSACTION_LIST: Schema = Schema::new(
    "transaction.list",
    &[
        FieldSpec::collection("ids", FieldKind::Int),
        FieldSpec::optional("type", FieldKind::Enum(TYPES)),
        FieldSpec::optional("status", FieldKind::Enum(STATUSES)),
        FieldSpec::range("date", FieldKind::Timestamp),
        FieldSpec::range("report_date", FieldKind::Timestamp),
        FieldSpec::range("value", FieldKind::Decimal),
        FieldSpec::range("base_value", FieldKind::Decimal),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::collection("category_ids", FieldKind::Int),
        FieldSpec::optional("category_type", FieldKind::Enum(CategoryType::VARIANTS)),
        FieldSpec::optional(
            "category_activities",
            FieldKind::Enum(CategoryActivity::VARIANTS),
        ),
        FieldSpec::optional("category_code", FieldKind::Enum(CategoryCode::VARIANTS)),
        FieldSpec::optional("category_cash_in_out", FieldKind::Enum(FLAG_OR_ALL)),
        FieldSpec::optional("category_interest_repayment", FieldKind::Enum(FLAG)),
        FieldSpec::collection("company_ids", FieldKind::Int),
        FieldSpec::collection("account_ids", FieldKind::Int),
        FieldSpec::collection("contractor_ids", FieldKind::Int),
        FieldSpec::collection("requisite_ids", FieldKind::Int),
        FieldSpec::collection("project_ids", FieldKind::Int),
        FieldSpec::collection("order_ids", FieldKind::Int),
        FieldSpec::optional("order_type", FieldKind::Enum(TYPES)),
        FieldSpec::range("created_at", FieldKind::Timestamp),
        FieldSpec::range("updated_at", FieldKind::Timestamp),
        FieldSpec::range("deleted_at", FieldKind::Timestamp),
        FieldSpec::collection("created_by_ids", FieldKind::Int),
        FieldSpec::collection("updated_by_ids", FieldKind::Int),
        FieldSpec::collection("deleted_by_ids", FieldKind::Int),
        FieldSpec::optional("page", FieldKind::Int),
        FieldSpec::optional("pagesize", FieldKind::Int),
        FieldSpec::optional("with_", FieldKind::Enum(AvailableWith::VARIANTS)).wire("with"),
        FieldSpec::optional("extra", FieldKind::Enum(&["transfer", "split"])),
        FieldSpec::optional("base_value_from", FieldKind::Decimal),
        FieldSpec::optional("base_value_to", FieldKind::Decimal),
        FieldSpec::optional("category_id", FieldKind::Int),
        FieldSpec::optional("category_group_id", FieldKind::Int),
        FieldSpec::collection("category_group_ids", FieldKind::Int),
        FieldSpec::optional("contractor_id", FieldKind::Int),
        FieldSpec::optional("requisite_id", FieldKind::Int),
        FieldSpec::optional("project_id", FieldKind::Int),
        FieldSpec::optional("order_id", FieldKind::Int),
        FieldSpec::range("report_date_from", FieldKind::Timestamp),
        FieldSpec::range("report_date_to", FieldKind::Timestamp),
        FieldSpec::collection("descriptions", FieldKind::Str),
        FieldSpec::optional("query", FieldKind::Str),
        FieldSpec::optional("with_transfer", FieldKind::Enum(FLAG)),
        FieldSpec::optional("with_multi_transfer", FieldKind::Enum(&["true"])),
        FieldSpec::optional("with_bizzed", FieldKind::Enum(FLAG)),
        FieldSpec::optional("with_splitted", FieldKind::Enum(FLAG)),
        FieldSpec::range("created", FieldKind::Timestamp),
        FieldSpec::range("changed", FieldKind::Timestamp),
        FieldSpec::collection("tax_types", FieldKind::Str),
        FieldSpec::optional("without_closed_accounts", FieldKind::Enum(FLAG)),
    ],
);

const TRANSACTION_CREATE: Schema = Schema::new(
    "transaction.create",
    &[
        FieldSpec::optional("company_id", FieldKind::Int),
        FieldSpec::optional("category_id", FieldKind::Int),
        FieldSpec::optional("contractor_id", FieldKind::Int),
        FieldSpec::optional("requisite_id", FieldKind::Int),
        FieldSpec::optional("project_id", FieldKind::Int),
        FieldSpec::required("date", FieldKind::Date),
        FieldSpec::optional("report_date", FieldKind::Date),
        FieldSpec::optional("from_id", FieldKind::Int),
        FieldSpec::optional("to_id", FieldKind::Int),
        FieldSpec::required("value", FieldKind::Decimal),
        FieldSpec::optional("from_value", FieldKind::Decimal),
        FieldSpec::optional("to_value", FieldKind::Decimal),
        FieldSpec::optional("status", FieldKind::Enum(STATUSES)),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::optional("order_id", FieldKind::Int),
        FieldSpec::optional("is_debt", FieldKind::Bool),
    ],
);

const TRANSACTION_UPDATE: Schema = Schema::new(
    "transaction.update",
    &[
        FieldSpec::optional("company_id", FieldKind::Int),
        FieldSpec::optional("category_id", FieldKind::Int),
        FieldSpec::optional("contractor_id", FieldKind::Int),
        FieldSpec::optional("requisite_id", FieldKind::Int),
        FieldSpec::optional("project_id", FieldKind::Int),
        FieldSpec::optional("date", FieldKind::Date),
        FieldSpec::optional("report_date", FieldKind::Date),
        FieldSpec::optional("from_id", FieldKind::Int),
        FieldSpec::optional("to_id", FieldKind::Int),
        FieldSpec::optional("value", FieldKind::Decimal),
        FieldSpec::optional("from_value", FieldKind::Decimal),
        FieldSpec::optional("to_value", FieldKind::Decimal),
        FieldSpec::optional("status", FieldKind::Enum(STATUSES)),
        FieldSpec::optional("description", FieldKind::Str),
        FieldSpec::optional("order_id", FieldKind::Int),
        FieldSpec::optional("is_debt", FieldKind::Bool),
    ],
);

/// One part of a split transaction
pub const SPLIT_ITEM: Schema = Schema::new(
    "transaction.split_item",
    &[
        FieldSpec::required("value", FieldKind::Decimal),
        FieldSpec::optional("report_date", FieldKind::Date),
        FieldSpec::optional("category_id", FieldKind::Int),
        FieldSpec::optional("project_id", FieldKind::Int),
        FieldSpec::optional("contractor_id", FieldKind::Int),
        FieldSpec::optional("requisite_id", FieldKind::Int),
        FieldSpec::optional("order_id", FieldKind::Int),
        FieldSpec::optional("is_debt", FieldKind::Bool),
    ],
);

impl Entity for Transaction {
    const KIND: &'static str = "transaction";
    const ROOT: &'static str = "/transaction";

    fn id(&self) -> i64 {
        self.id
    }

    fn list_schema() -> &'static Schema {
        &TRANSACTION_LIST
    }

    fn create_schema() -> Option<&'static Schema> {
        Some(&TRANSACTION_CREATE)
    }

    fn update_schema() -> Option<&'static Schema> {
        Some(&TRANSACTION_UPDATE)
    }
}

impl ResourceManager<Transaction> {
    /// Split transaction `id` into `parts`
    ///
    /// Every part is validated before anything is sent. The service's
    /// response is returned as-is.
    pub async fn split(&self, id: i64, parts: &[Args]) -> Result<Value> {
        let items = parts
            .iter()
            .map(|part| SPLIT_ITEM.validate(part).map(|p| p.to_json()))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("split transaction {} into {} part(s)", id, items.len());
        let body = json!({ "id": id, "items": items });
        self.transport()
            .post(&format!("{}/{}/split", Transaction::ROOT, id), &body)
            .await
    }
}

impl Record<Transaction> {
    /// Split this transaction, checking the amounts first
    ///
    /// The absolute value of the transaction must equal the absolute value
    /// of the sum of the parts, compared exactly.
    pub async fn split(&self, parts: &[Args]) -> Result<Value> {
        let total = parts.iter().try_fold(Decimal::ZERO, |total, part| {
            let value = part_value(part)?;
            total
                .checked_add(value)
                .ok_or_else(|| Error::validation("split parts overflow the decimal range"))
        })?;

        if self.value.abs() != total.abs() {
            return Err(Error::validation(format!(
                "parts sum to {} but transaction {} is {}",
                total,
                self.id,
                self.value
            )));
        }

        self.manager()?.split(self.id, parts).await
    }
}

fn part_value(part: &Args) -> Result<Decimal> {
    let value = match part.get("value") {
        Some(crate::resource::ArgValue::One(value)) => value,
        Some(_) => return Err(Error::validation("split part value must be a single amount")),
        None => return Err(Error::validation("split part is missing \"value\"")),
    };

    match value {
        Scalar::Int(i) => Ok(Decimal::from(*i)),
        Scalar::Decimal(d) => Ok(*d),
        Scalar::Str(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| Error::validation(format!("{s:?} is not a decimal"))),
        other => Err(Error::validation(format!(
            "split part value must be a number, got {}",
            other.describe()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::{HttpSend, Method};
    use crate::api::transport::stub::StubHttp;
    use crate::api::transport::Transport;
    use crate::resource::ArgValue;
    use std::sync::Arc;

    fn transaction(value: f64) -> Value {
        json!({
            "id": 77,
            "date": "2024-02-10 00:00:00",
            "biz_id": 1,
            "account_id": 3,
            "type": "out",
            "category_id": 12,
            "value": value,
            "base_value": value,
            "created_at": "2024-02-10 12:00:00",
            "updated_at": "2024-02-10 12:00:00",
            "created_by_id": 5,
            "updated_by_id": 5,
            "transfer_id": null,
            "report_date": "2024-02-10",
            "status": "regular",
            "is_splitted": false,
            "has_comments": false
        })
    }

    fn manager(http: &Arc<StubHttp>) -> Arc<ResourceManager<Transaction>> {
        let transport: Arc<dyn HttpSend> = http.clone();
        ResourceManager::new(Arc::new(Transport::new(1, transport)))
    }

    fn part(value: i64) -> Args {
        Args::new().set("value", value)
    }

    #[test]
    fn test_decode_transaction() {
        let tx: Transaction = serde_json::from_value(transaction(-100.5)).unwrap();
        assert_eq!(tx.kind, TransactionType::Out);
        assert_eq!(tx.status, TransactionStatus::Regular);
        assert_eq!(tx.value, Decimal::new(-1005, 1));
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 2, 10).unwrap());
    }

    #[test]
    fn test_list_filters_encode() {
        let args = Args::new()
            .set("ids", ArgValue::many([3i64, 1, 2, 1]))
            .set("type", TransactionType::Out)
            .set("with_", AvailableWith::Account)
            .set("with_splitted", true)
            .set("value", ArgValue::range(-500i64, Decimal::new(-105, 1)));
        let payload = Transaction::list_schema().validate(&args).unwrap();

        assert_eq!(payload.get("ids"), Some(&json!("3,1,2,1")));
        assert_eq!(payload.get("type"), Some(&json!("out")));
        assert_eq!(payload.get("with"), Some(&json!("account")));
        assert_eq!(payload.get("with_splitted"), Some(&json!("true")));
        assert_eq!(payload.get("value"), Some(&json!("-500,-10.5")));
    }

    #[test]
    fn test_create_requires_date_and_value() {
        let schema = Transaction::create_schema().unwrap();
        assert!(schema.validate(&Args::new().set("value", 10i64)).is_err());

        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let payload = schema
            .validate(&Args::new().set("value", 10i64).set("date", date).set("from_id", 3i64))
            .unwrap();
        assert_eq!(
            payload.to_json(),
            json!({"date": "2024-01-02", "from_id": 3, "value": 10})
        );
    }

    #[tokio::test]
    async fn test_split_with_matching_parts() {
        let http = StubHttp::new()
            .respond(200, transaction(-100.0))
            .respond(200, json!([{"id": 78}, {"id": 79}]));
        let transactions = manager(&http);

        let tx = transactions.get(77).await.unwrap();
        let response = tx.split(&[part(40), part(60)]).await.unwrap();

        assert_eq!(response, json!([{"id": 78}, {"id": 79}]));
        let request = &http.requests()[1];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/v1/biz/1/transaction/77/split");
        assert_eq!(
            http.last_body(),
            json!({"id": 77, "items": [{"value": 40}, {"value": 60}]})
        );
    }

    #[tokio::test]
    async fn test_split_mismatch_makes_no_request() {
        let http = StubHttp::new().respond(200, transaction(-100.0));
        let transactions = manager(&http);

        let tx = transactions.get(77).await.unwrap();
        let err = tx.split(&[part(40), part(50)]).await.unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn test_split_compares_decimals_exactly() {
        let http = StubHttp::new()
            .respond(200, transaction(0.3))
            .respond(200, json!({"success": true}));
        let transactions = manager(&http);

        let tx = transactions.get(77).await.unwrap();
        let parts = [
            Args::new().set("value", Decimal::new(1, 1)),
            Args::new().set("value", Decimal::new(2, 1)),
        ];
        assert!(tx.split(&parts).await.is_ok());
    }

    #[tokio::test]
    async fn test_split_overflow_is_validation_error() {
        let http = StubHttp::new().respond(200, transaction(-100.0));
        let transactions = manager(&http);

        let tx = transactions.get(77).await.unwrap();
        let huge = Args::new().set("value", Decimal::MAX);
        let err = tx.split(&[huge.clone(), huge]).await.unwrap_err();

        assert!(err.to_string().contains("overflow"));
        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn test_manager_split_validates_every_part() {
        let http = StubHttp::new();
        let transactions = manager(&http);

        let parts = [part(10), Args::new().set("category_id", 4i64)];
        let err = transactions.split(77, &parts).await.unwrap_err();

        assert!(err.to_string().contains("missing required field"));
        assert_eq!(http.calls(), 0);
    }
}
