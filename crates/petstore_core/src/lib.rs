//! Core domain logic for the pet catalog service.
//! This crate is the single source of truth for record and search invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::pet::{Pet, PetDraft, PetId, PetValidationError};
pub use repo::pet_repo::{PetRepository, RepoError, RepoResult, SqlitePetRepository};
pub use search::{FilterError, PetFilter};
pub use service::pet_service::PetService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
