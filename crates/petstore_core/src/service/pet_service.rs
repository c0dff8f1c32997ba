//! Pet use-case service.
//!
//! # Responsibility
//! - Provide the catalog use cases (create, bulk create, list, get, update,
//!   delete, keyword search, price search) for transport layers.
//! - Enforce the existence-check-then-mutate discipline the repository does
//!   not enforce itself.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Update always persists the caller-specified id, never one from the body.
//! - Absence is reported as `None`/`false`, never as an error.

use crate::model::pet::{Pet, PetDraft, PetId};
use crate::repo::pet_repo::{PetRepository, RepoError, RepoResult};
use log::debug;

/// Use-case service wrapper for pet catalog operations.
pub struct PetService<R: PetRepository> {
    repo: R,
}

impl<R: PetRepository> PetService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores one record and returns it with its assigned id.
    pub fn create(&self, draft: &PetDraft) -> RepoResult<Pet> {
        let pet = self.repo.insert(draft)?;
        debug!("event=pet_create module=service status=ok id={}", pet.id);
        Ok(pet)
    }

    /// Stores a batch atomically, preserving input order.
    pub fn create_bulk(&self, drafts: &[PetDraft]) -> RepoResult<Vec<Pet>> {
        let pets = self.repo.insert_bulk(drafts)?;
        debug!(
            "event=pet_create_bulk module=service status=ok count={}",
            pets.len()
        );
        Ok(pets)
    }

    pub fn list(&self) -> RepoResult<Vec<Pet>> {
        self.repo.find_all()
    }

    pub fn get(&self, id: PetId) -> RepoResult<Option<Pet>> {
        self.repo.find_by_id(id)
    }

    /// Replaces every field of an existing record.
    ///
    /// # Contract
    /// - Returns `Ok(None)` when no record has `id`.
    /// - Any id carried by the caller's payload is discarded for `id`.
    pub fn update(&self, id: PetId, draft: PetDraft) -> RepoResult<Option<Pet>> {
        if !self.repo.exists(id)? {
            return Ok(None);
        }

        let pet = draft.with_id(id);
        match self.repo.update(&pet) {
            Ok(()) => Ok(Some(pet)),
            // Deleted between the existence check and the write.
            Err(RepoError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Removes a record. Returns `false` when no record has `id`.
    pub fn delete(&self, id: PetId) -> RepoResult<bool> {
        if !self.repo.exists(id)? {
            return Ok(false);
        }

        match self.repo.delete_by_id(id) {
            Ok(()) => {
                debug!("event=pet_delete module=service status=ok id={id}");
                Ok(true)
            }
            Err(RepoError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn search_by_keyword(&self, key: &str) -> RepoResult<Vec<Pet>> {
        self.repo.search_by_keyword(key)
    }

    pub fn search_by_max_price(&self, price: f64) -> RepoResult<Vec<Pet>> {
        self.repo.search_by_max_price(price)
    }
}
