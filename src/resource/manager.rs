//! Resource Manager
//!
//! The only path from validated arguments to the network for one entity kind,
//! and from JSON responses back to [`Record`]s.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use super::args::Args;
use super::record::Record;
use super::schema::{Schema, EMPTY_SCHEMA};
use crate::api::error::{Error, Result};
use crate::api::transport::Transport;

/// A remote entity kind
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Short name used in logs and the CLI
    const KIND: &'static str;

    /// Endpoint root relative to the business prefix, e.g. `/transaction`
    const ROOT: &'static str;

    fn id(&self) -> i64;

    fn list_schema() -> &'static Schema {
        &EMPTY_SCHEMA
    }

    /// `None` when the service does not accept creates for this kind
    fn create_schema() -> Option<&'static Schema> {
        None
    }

    /// `None` when the service does not accept updates for this kind
    fn update_schema() -> Option<&'static Schema> {
        None
    }
}

/// Schema for a write operation, or a validation error if `T` has none
pub(crate) fn write_schema<T: Entity>(
    schema: Option<&'static Schema>,
    operation: &str,
) -> Result<&'static Schema> {
    schema.ok_or_else(|| Error::validation(format!("{} does not support {}", T::KIND, operation)))
}

/// Result of a delete call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub acknowledged: bool,
}

impl Deleted {
    /// Interpret the service's delete response
    ///
    /// An empty body on a success status counts as acknowledged.
    fn from_response(value: &Value) -> Self {
        let acknowledged = match value {
            Value::Null => true,
            Value::Bool(b) => *b,
            Value::Object(map) => ["acknowledged", "success", "result"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_bool))
                .unwrap_or(true),
            _ => true,
        };
        Self { acknowledged }
    }
}

/// Controller for one entity kind within one business account
pub struct ResourceManager<T: Entity> {
    transport: Arc<Transport>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> std::fmt::Debug for ResourceManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("kind", &T::KIND)
            .field("root", &T::ROOT)
            .field("prefix", &self.transport.prefix())
            .finish()
    }
}

impl<T: Entity> ResourceManager<T> {
    pub fn new(transport: Arc<Transport>) -> Arc<Self> {
        Arc::new(Self {
            transport,
            _entity: PhantomData,
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn root(&self) -> &'static str {
        T::ROOT
    }

    fn item_path(id: i64) -> String {
        format!("{}/{}", T::ROOT, id)
    }

    /// Decode one entity and bind it to this manager
    pub fn record(self: &Arc<Self>, value: Value) -> Result<Record<T>> {
        let data: T = serde_json::from_value(value)?;
        Ok(Record::new(data, Arc::downgrade(self)))
    }

    fn records(self: &Arc<Self>, value: Value) -> Result<Vec<Record<T>>> {
        let items: Vec<Value> = serde_json::from_value(value)?;
        items.into_iter().map(|item| self.record(item)).collect()
    }

    /// Fetch one entity by id
    pub async fn get(self: &Arc<Self>, id: i64) -> Result<Record<T>> {
        let path = Self::item_path(id);
        let value = self
            .transport
            .get(&path, Vec::new())
            .await
            .map_err(|e| self.not_found(e, &path))?;
        self.record(value)
    }

    /// List entities matching `filters`, in the order the service returns
    pub async fn list(self: &Arc<Self>, filters: &Args) -> Result<Vec<Record<T>>> {
        let payload = T::list_schema().validate(filters)?;
        let value = self.transport.get(T::ROOT, payload.to_query()).await?;
        self.records(value)
    }

    /// Create an entity; the response is authoritative
    pub async fn create(self: &Arc<Self>, args: &Args) -> Result<Record<T>> {
        let payload = write_schema::<T>(T::create_schema(), "create")?.validate(args)?;
        tracing::debug!("create {} with {} field(s)", T::KIND, payload.to_map().len());
        let value = self.transport.post(T::ROOT, &payload.to_json()).await?;
        self.record(value)
    }

    /// Update an entity, sending only the fields in `args`
    ///
    /// The returned record is built from the service's response, never from
    /// a local merge of `args`.
    pub async fn update(self: &Arc<Self>, id: i64, args: &Args) -> Result<Record<T>> {
        let payload = write_schema::<T>(T::update_schema(), "update")?.validate(args)?;
        let path = Self::item_path(id);
        let value = self
            .transport
            .put(&path, &payload.to_json())
            .await
            .map_err(|e| self.not_found(e, &path))?;
        self.record(value)
    }

    /// Delete an entity on the service
    pub async fn delete(self: &Arc<Self>, id: i64) -> Result<Deleted> {
        let path = Self::item_path(id);
        let value = self
            .transport
            .delete(&path)
            .await
            .map_err(|e| self.not_found(e, &path))?;
        Ok(Deleted::from_response(&value))
    }

    fn not_found(&self, error: Error, path: &str) -> Error {
        match error {
            Error::Remote { status: 404, .. } => Error::NotFound {
                path: self.transport.url_for(path),
            },
            other => other,
        }
    }
}
