//! Typed async client for the Finolog accounting API
//!
//! A [`Session`] is bound to one business account and exposes a manager per
//! entity kind. Managers validate arguments against static schemas before
//! anything is sent, and return [`Record`]s built from the service's
//! responses.

pub mod api;
pub mod config;
pub mod models;
pub mod resource;

pub use api::error::{Error, Result};
pub use resource::{ArgValue, Args, Deleted, Record, Registry, Session};
