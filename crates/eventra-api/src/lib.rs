//! # eventra-api
//!
//! HTTP API server for eventra: router construction, auth extractors,
//! handlers and the uniform JSON envelope. The binary in `main.rs` wires
//! configuration and serves [`router`].

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::router;
pub use state::AppState;
