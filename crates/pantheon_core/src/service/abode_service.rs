//! Abode use-case service.
//!
//! # Invariants
//! - Deleting an abode clears it from every god that referenced it.

use crate::model::abode::{Abode, AbodeId, AbodePatch};
use crate::model::god::God;
use crate::repo::abode_repo::AbodeRepository;
use crate::repo::error::EntityKind;
use crate::repo::god_repo::GodRepository;
use crate::service::error::{ServiceError, ServiceResult};
use log::info;

/// Abode service facade over repository implementations.
pub struct AbodeService<R: AbodeRepository + GodRepository> {
    repo: R,
}

impl<R: AbodeRepository + GodRepository> AbodeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_abodes(&self) -> ServiceResult<Vec<Abode>> {
        Ok(self.repo.list_abodes()?)
    }

    /// Gets one abode; `None` means it does not exist.
    pub fn get_abode(&self, id: AbodeId) -> ServiceResult<Option<Abode>> {
        Ok(self.repo.get_abode(id)?)
    }

    pub fn create_abode(&self, name: &str, coordinates: &str) -> ServiceResult<Abode> {
        let abode = Abode::create(name, coordinates)?;
        let id = self.repo.create_abode(&abode)?;
        info!("event=abode_create module=service status=ok abode_id={id}");
        self.read_back(id, "created abode not found in read-back")
    }

    /// Applies supplied fields only.
    pub fn update_abode(&self, id: AbodeId, patch: &AbodePatch) -> ServiceResult<Abode> {
        self.repo.update_abode(id, patch)?;
        info!("event=abode_update module=service status=ok abode_id={id}");
        self.read_back(id, "updated abode not found in read-back")
    }

    /// Deletes an abode and returns the record as it was.
    pub fn delete_abode(&self, id: AbodeId) -> ServiceResult<Abode> {
        let abode = self.repo.get_abode(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::Abode,
            id,
        })?;
        self.repo.delete_abode(id)?;
        info!("event=abode_delete module=service status=ok abode_id={id}");
        Ok(abode)
    }

    /// Gods currently dwelling in the abode.
    pub fn gods_in_abode(&self, id: AbodeId) -> ServiceResult<Vec<God>> {
        Ok(self.repo.gods_in_abode(id)?)
    }

    fn read_back(&self, id: AbodeId, details: &'static str) -> ServiceResult<Abode> {
        self.repo
            .get_abode(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}
