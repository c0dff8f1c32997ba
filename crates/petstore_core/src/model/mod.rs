//! Domain model for the pet catalog.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//!
//! # Invariants
//! - Every stored record is identified by a store-assigned `PetId`.
//! - Deletion is a hard delete; there are no tombstones or versions.

pub mod pet;
