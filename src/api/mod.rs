//! Finolog API plumbing
//!
//! - [`error`] - Error kinds shared by the whole crate
//! - [`http`] - The injectable HTTP capability and its reqwest implementation
//! - [`transport`] - Business-scoped request execution

pub mod error;
pub mod http;
pub mod transport;

pub use error::{Error, Result};
pub use http::{HttpRequest, HttpResponse, HttpSend, Method, ReqwestClient};
pub use transport::Transport;
