//! Kind Dispatch
//!
//! Maps entity kind names to the matching manager of a [`Session`], so that
//! callers holding a kind as a string (the CLI) can work with plain JSON.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::args::Args;
use super::manager::{Deleted, Entity, ResourceManager};
use super::registry::Session;
use crate::api::error::{Error, Result};

/// Kind names accepted by [`get`], [`list`] and [`delete`]
pub const KINDS: &[&str] = &[
    "accounts",
    "companies",
    "contractors",
    "orders",
    "items",
    "transactions",
];

/// Fetch one entity of `kind` as JSON
pub async fn get(session: &Session, kind: &str, id: i64) -> Result<Value> {
    tracing::debug!("dispatch get: kind={}, id={}", kind, id);

    match kind {
        "accounts" => get_json(&session.accounts, id).await,
        "companies" => get_json(&session.companies, id).await,
        "contractors" => get_json(&session.contractors, id).await,
        "orders" => get_json(&session.orders, id).await,
        "items" => get_json(&session.items, id).await,
        "transactions" => get_json(&session.transactions, id).await,
        _ => Err(unknown_kind(kind)),
    }
}

/// List entities of `kind` as a JSON array
pub async fn list(session: &Session, kind: &str, filters: &Args) -> Result<Value> {
    tracing::debug!("dispatch list: kind={}, filters={}", kind, filters.len());

    match kind {
        "accounts" => list_json(&session.accounts, filters).await,
        "companies" => list_json(&session.companies, filters).await,
        "contractors" => list_json(&session.contractors, filters).await,
        "orders" => list_json(&session.orders, filters).await,
        "items" => list_json(&session.items, filters).await,
        "transactions" => list_json(&session.transactions, filters).await,
        _ => Err(unknown_kind(kind)),
    }
}

/// Delete one entity of `kind`
pub async fn delete(session: &Session, kind: &str, id: i64) -> Result<Deleted> {
    tracing::info!("dispatch delete: kind={}, id={}", kind, id);

    match kind {
        "accounts" => session.accounts.delete(id).await,
        "companies" => session.companies.delete(id).await,
        "contractors" => session.contractors.delete(id).await,
        "orders" => session.orders.delete(id).await,
        "items" => session.items.delete(id).await,
        "transactions" => session.transactions.delete(id).await,
        _ => Err(unknown_kind(kind)),
    }
}

async fn get_json<T: Entity>(manager: &Arc<ResourceManager<T>>, id: i64) -> Result<Value> {
    to_json(&manager.get(id).await?)
}

async fn list_json<T: Entity>(manager: &Arc<ResourceManager<T>>, filters: &Args) -> Result<Value> {
    to_json(&manager.list(filters).await?)
}

fn to_json<S: Serialize>(value: &S) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn unknown_kind(kind: &str) -> Error {
    Error::validation(format!(
        "unknown kind {:?}, expected one of {}",
        kind,
        KINDS.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::HttpSend;
    use crate::api::transport::stub::StubHttp;
    use serde_json::json;

    fn session(http: &Arc<StubHttp>) -> Session {
        let http: Arc<dyn HttpSend> = http.clone();
        Session::new(3, http)
    }

    #[tokio::test]
    async fn test_get_routes_by_kind() {
        let http = StubHttp::new().respond(200, json!({"id": 4, "name": "ACME"}));
        let session = session(&http);

        let value = get(&session, "contractors", 4).await.unwrap();

        assert_eq!(value, json!({"id": 4, "name": "ACME"}));
        assert_eq!(http.requests()[0].path, "/v1/biz/3/contractor/4");
    }

    #[tokio::test]
    async fn test_list_validates_against_kind_schema() {
        let http = StubHttp::new();
        let session = session(&http);
        let filters = Args::new().set("status_ids", 1i64);

        let err = list(&session, "contractors", &filters).await.unwrap_err();

        assert!(matches!(err, Error::Validation { .. }));
        assert_eq!(http.calls(), 0);
    }

    #[tokio::test]
    async fn test_delete_routes_by_kind() {
        let http = StubHttp::new().respond(200, json!({"success": true}));
        let session = session(&http);

        let deleted = delete(&session, "transactions", 9).await.unwrap();

        assert!(deleted.acknowledged);
        assert_eq!(http.requests()[0].path, "/v1/biz/3/transaction/9");
    }

    #[tokio::test]
    async fn test_unknown_kind() {
        let http = StubHttp::new();
        let session = session(&http);

        let err = get(&session, "widgets", 1).await.unwrap_err();
        assert!(err.to_string().contains("accounts"));
        assert_eq!(http.calls(), 0);
    }
}
