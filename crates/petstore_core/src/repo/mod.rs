//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the record store contract for pets.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce record validation before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod pet_repo;
