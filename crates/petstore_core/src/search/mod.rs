//! Search filters over the pet catalog.
//!
//! # Responsibility
//! - Translate keyword and price searches into parameterized SQL predicates.
//! - Register the SQL functions those predicates depend on.

pub mod filter;

pub use filter::{fold_case, register_search_functions, FilterError, PetFilter, FOLD_FUNCTION};
