//! HTTP surface for the pet catalog.
//!
//! # Responsibility
//! - Expose `petstore_core` use cases as JSON endpoints under `/martin/pets`.
//! - Own process bootstrap: configuration, logging, storage and serving.
//!
//! # Invariants
//! - Handlers never touch SQL; every call goes through `PetService`.
//! - Request handling is stateless apart from the shared store connection.

pub mod cli;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ServerError};
pub use server::{build_router, run, HttpServer};
pub use state::AppState;
