//! HTTP surface of the playground.
//!
//! The server accepts requests on a background thread and serves each one
//! on a thread of its own. Routing lives in [`routes`]; it works on plain
//! [`PlaygroundRequest`] values so it can be exercised without a socket.

mod errors;
mod query;
pub mod routes;
mod server;
mod stream;

pub use self::errors::ServerError;
pub use self::routes::{Playground, PlaygroundRequest, Reply};
pub use self::server::{HttpServer, MAX_BODY_BYTES, ServerHandle};

const HTTP_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::http");
