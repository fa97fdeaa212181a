//! Resource abstraction layer
//!
//! Generic machinery shared by every entity kind: argument handling,
//! schemas, managers and the records they produce.
//!
//! # Architecture
//!
//! - [`args`] - Raw caller arguments ([`Args`], [`ArgValue`], [`Scalar`])
//! - [`schema`] - Static parameter declarations and wire encoding
//! - [`manager`] - [`ResourceManager`], the only path to the network
//! - [`record`] - Immutable entity snapshots bound to their manager
//! - [`registry`] - [`Session`] per business account and the [`Registry`]
//! - [`dispatch`] - Kind-name routing for callers working with plain JSON
//!
//! # Example
//!
//! ```ignore
//! use finolog::resource::{Args, ArgValue, Session};
//!
//! async fn january(session: &Session) -> finolog::Result<()> {
//!     let filters = Args::new()
//!         .set("date", ArgValue::range("2024-01-01", "2024-01-31 23:59:59"))
//!         .set("type", finolog::models::TransactionType::Out);
//!     for tx in session.transactions.list(&filters).await? {
//!         println!("{} {}", tx.id, tx.value);
//!     }
//!     Ok(())
//! }
//! ```

pub mod args;
pub mod dispatch;
pub mod manager;
pub mod record;
pub mod registry;
pub mod schema;

pub use args::{ArgValue, Args, Scalar};
pub use manager::{Deleted, Entity, ResourceManager};
pub use record::Record;
pub use registry::{Registry, Session};
pub use schema::{FieldKind, FieldSpec, Payload, Schema, Shape, WireEnum, EMPTY_SCHEMA};
