//! Pet domain model.
//!
//! # Responsibility
//! - Define the client-supplied record shape (`PetDraft`) and the stored
//!   record shape (`Pet`).
//! - Provide write-path validation shared by every persistence backend.
//!
//! # Invariants
//! - `id` is assigned by the store and never taken from client input.
//! - Text attributes are optional and carry no uniqueness constraint.
//! - `price` must be finite; negative values are accepted.
//! - On input `price` may be a JSON number or a numeric string, as HTML form
//!   fields send it. `null` and `""` read as `0.0`.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned identifier for a pet record.
pub type PetId = i64;

/// Record fields without identity, as supplied by callers on create/update.
///
/// Unknown JSON fields (including a client-side `id`) are ignored on
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    /// URL or path to a picture of the pet.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `0.0` when absent, `null` or `""`.
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: f64,
}

/// Wire forms accepted for `price`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PriceInput {
    Number(f64),
    Text(String),
}

fn deserialize_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<PriceInput>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(PriceInput::Number(value)) => Ok(value),
        Some(PriceInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| D::Error::custom(format!("price `{text}` is not a number")))
        }
    }
}

/// Stored pet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub price: f64,
}

/// Validation errors raised before a draft reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub enum PetValidationError {
    NonFinitePrice(f64),
}

impl Display for PetValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonFinitePrice(value) => {
                write!(f, "price must be a finite number, got `{value}`")
            }
        }
    }
}

impl Error for PetValidationError {}

impl PetDraft {
    /// Convenience constructor for a named record with a price.
    pub fn new(name: impl Into<String>, price: f64) -> Self {
        Self {
            name: Some(name.into()),
            price,
            ..Self::default()
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), PetValidationError> {
        if !self.price.is_finite() {
            return Err(PetValidationError::NonFinitePrice(self.price));
        }
        Ok(())
    }

    /// Binds this draft to a store-assigned or path-specified id.
    pub fn with_id(self, id: PetId) -> Pet {
        Pet {
            id,
            name: self.name,
            species: self.species,
            breed: self.breed,
            gender: self.gender,
            image: self.image,
            description: self.description,
            price: self.price,
        }
    }
}

impl Pet {
    /// Returns the record fields without identity.
    pub fn to_draft(&self) -> PetDraft {
        PetDraft {
            name: self.name.clone(),
            species: self.species.clone(),
            breed: self.breed.clone(),
            gender: self.gender.clone(),
            image: self.image.clone(),
            description: self.description.clone(),
            price: self.price,
        }
    }

    pub fn validate(&self) -> Result<(), PetValidationError> {
        if !self.price.is_finite() {
            return Err(PetValidationError::NonFinitePrice(self.price));
        }
        Ok(())
    }
}
