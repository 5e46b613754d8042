//! Emblem use-case service.
//!
//! # Invariants
//! - Emblems hold no back-reference; holders are found by lookup.
//! - Deleting an emblem removes it from every god's emblem list.

use crate::model::emblem::{Emblem, EmblemId};
use crate::model::god::God;
use crate::model::validation::normalize_name;
use crate::repo::emblem_repo::EmblemRepository;
use crate::repo::error::EntityKind;
use crate::repo::god_repo::GodRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::info;

/// Emblem service facade over repository implementations.
pub struct EmblemService<R: EmblemRepository + GodRepository> {
    repo: R,
}

impl<R: EmblemRepository + GodRepository> EmblemService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_emblems(&self) -> ServiceResult<Vec<Emblem>> {
        Ok(self.repo.list_emblems()?)
    }

    /// Gets one emblem; `None` means it does not exist.
    pub fn get_emblem(&self, id: EmblemId) -> ServiceResult<Option<Emblem>> {
        Ok(self.repo.get_emblem(id)?)
    }

    pub fn create_emblem(&self, name: &str) -> ServiceResult<Emblem> {
        let emblem = Emblem::create(name)?;
        let id = self.repo.create_emblem(&emblem)?;
        info!("event=emblem_create module=service status=ok emblem_id={id}");
        self.read_back(id, "created emblem not found in read-back")
    }

    pub fn update_emblem(&self, id: EmblemId, name: &str) -> ServiceResult<Emblem> {
        let name = normalize_name(name)?;
        self.repo.rename_emblem(id, &name)?;
        info!("event=emblem_update module=service status=ok emblem_id={id}");
        self.read_back(id, "updated emblem not found in read-back")
    }

    /// Deletes an emblem and returns the record as it was.
    pub fn delete_emblem(&self, id: EmblemId) -> ServiceResult<Emblem> {
        let emblem = self.repo.get_emblem(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Emblem,
            id,
        })?;
        self.repo.delete_emblem(id)?;
        info!("event=emblem_delete module=service status=ok emblem_id={id}");
        Ok(emblem)
    }

    /// Gods whose emblem list contains this emblem.
    pub fn gods_with_emblem(&self, id: EmblemId) -> ServiceResult<Vec<God>> {
        Ok(self.repo.gods_with_emblem(id)?)
    }

    fn read_back(&self, id: EmblemId, details: &'static str) -> ServiceResult<Emblem> {
        self.repo
            .get_emblem(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
