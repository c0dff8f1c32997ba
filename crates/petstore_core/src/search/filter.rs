//! Keyword and price filters for pet queries.
//!
//! # Responsibility
//! - Normalize user search input into a typed filter.
//! - Render each filter as a `WHERE` fragment plus bind values.
//!
//! # Invariants
//! - Keyword matching is a case-insensitive substring test OR-combined over
//!   `name`, `species`, `breed`, `gender` and `description`.
//! - `NULL` text columns behave like empty strings.
//! - Price filtering is inclusive (`price <= ceiling`).

use rusqlite::functions::{Context, FunctionFlags};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the case-folding scalar function registered on every connection.
pub const FOLD_FUNCTION: &str = "pet_fold";

const KEYWORD_COLUMNS: &[&str] = &["name", "species", "breed", "gender", "description"];

/// Rejected search input.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    NonFiniteCeiling(f64),
}

impl Display for FilterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFiniteCeiling(value) => {
                write!(f, "price ceiling must be a finite number, got `{value}`")
            }
        }
    }
}

impl Error for FilterError {}

/// Row selection applied to the `pets` table.
#[derive(Debug, Clone, PartialEq)]
pub enum PetFilter {
    All,
    /// Already case-folded, non-empty substring.
    Keyword(String),
    MaxPrice(f64),
}

impl PetFilter {
    /// Builds a keyword filter. An empty key selects every record.
    pub fn keyword(key: &str) -> Self {
        if key.is_empty() {
            return Self::All;
        }
        Self::Keyword(fold_case(key))
    }

    /// Builds an inclusive price ceiling filter.
    pub fn max_price(ceiling: f64) -> Result<Self, FilterError> {
        if !ceiling.is_finite() {
            return Err(FilterError::NonFiniteCeiling(ceiling));
        }
        Ok(Self::MaxPrice(ceiling))
    }

    /// Returns the SQL predicate (without `WHERE`) and its bind values.
    pub(crate) fn predicate(&self) -> Option<(String, Vec<Value>)> {
        match self {
            Self::All => None,
            Self::Keyword(key) => {
                let clause = KEYWORD_COLUMNS
                    .iter()
                    .map(|column| format!("instr({FOLD_FUNCTION}({column}), ?1) > 0"))
                    .collect::<Vec<_>>()
                    .join(" OR ");
                Some((clause, vec![Value::Text(key.clone())]))
            }
            Self::MaxPrice(ceiling) => {
                Some(("price <= ?1".to_string(), vec![Value::Real(*ceiling)]))
            }
        }
    }
}

/// Unicode-aware case fold shared by the SQL function and key normalization.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Registers the SQL functions used by search predicates.
pub fn register_search_functions(conn: &Connection) -> rusqlite::Result<()> {
    conn.create_scalar_function(
        FOLD_FUNCTION,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        fold_sql_value,
    )
}

fn fold_sql_value(ctx: &Context<'_>) -> rusqlite::Result<String> {
    let value: Option<String> = ctx.get(0)?;
    Ok(value.map(|text| fold_case(&text)).unwrap_or_default())
}
