//! Relationship graph use-case service.
//!
//! # Responsibility
//! - Provide god CRUD, relation, emblem, abode and domain mutations.
//! - Resolve nested god projections for read callers.
//!
//! # Invariants
//! - Relations are symmetric by construction (single edge per relation).
//! - Add/remove on relations, domains and emblems are idempotent: a duplicate
//!   add or a remove of an absent entry succeeds without changing state.
//! - Every mutation returns the god as re-read from storage.
//! - Storage calls are made once; failures surface unchanged.

use crate::model::abode::AbodeId;
use crate::model::emblem::EmblemId;
use crate::model::god::{God, GodId, GodPatch, NewGod, Relationship};
use crate::model::validation::{normalize_domain, ValidationError};
use crate::repo::error::EntityKind;
use crate::repo::PantheonRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::resolve::{GodResolver, GodView, ResolveOptions, MAX_RESOLVE_DEPTH};
use log::{info, warn};

/// Relationship graph service over an injected storage handle.
pub struct GodService<R: PantheonRepository> {
    repo: R,
}

impl<R: PantheonRepository> GodService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all god records in creation order.
    pub fn list_gods(&self) -> ServiceResult<Vec<God>> {
        Ok(self.repo.list_gods()?)
    }

    /// Gets one god record; `None` means it does not exist.
    pub fn get_god(&self, id: GodId) -> ServiceResult<Option<God>> {
        Ok(self.repo.get_god(id)?)
    }

    /// Lists relatives of one kind as full records.
    pub fn relatives(
        &self,
        god_id: GodId,
        relationship: Relationship,
    ) -> ServiceResult<Vec<God>> {
        self.require_god(god_id)?;
        let mut relatives = Vec::new();
        for id in self.repo.relatives(god_id, relationship)? {
            if let Some(god) = self.repo.get_god(id)? {
                relatives.push(god);
            }
        }
        Ok(relatives)
    }

    /// Resolves one god with nested associations and relatives.
    pub fn resolve_god(
        &self,
        id: GodId,
        options: ResolveOptions,
    ) -> ServiceResult<Option<GodView>> {
        let Some(god) = self.repo.get_god(id)? else {
            return Ok(None);
        };
        Ok(Some(self.view(god, options)?))
    }

    /// Projects an already loaded record, e.g. the one a mutation returned.
    pub fn view(&self, god: God, options: ResolveOptions) -> ServiceResult<GodView> {
        let mut resolver = GodResolver::new(&self.repo);
        Ok(resolver.resolve(god, clamp_depth(options))?)
    }

    /// Resolves every god; one resolver cache is shared across the list.
    pub fn resolve_gods(&self, options: ResolveOptions) -> ServiceResult<Vec<GodView>> {
        let depth = clamp_depth(options);
        let mut resolver = GodResolver::new(&self.repo);
        let mut views = Vec::new();
        for god in self.repo.list_gods()? {
            views.push(resolver.resolve(god, depth)?);
        }
        Ok(views)
    }

    /// Creates a god with empty domains, emblems, abode and relations.
    pub fn create_god(&self, request: NewGod) -> ServiceResult<God> {
        let god = request.into_god()?;
        let id = self.repo.create_god(&god)?;
        info!(
            "event=god_create module=service status=ok god_id={} type={}",
            id, god.kind
        );
        self.read_back(id, "created god not found in read-back")
    }

    /// Applies supplied fields only; absent fields are left untouched.
    ///
    /// An empty patch returns the current record without writing.
    pub fn update_god(
        &self,
        id: GodId,
        patch: &GodPatch,
        expected_version: Option<i64>,
    ) -> ServiceResult<God> {
        let patch = patch.normalized()?;
        if let Err(err) = self.repo.update_god_fields(id, &patch, expected_version) {
            let err = ServiceError::from(err);
            if matches!(err, ServiceError::VersionConflict { .. }) {
                warn!(
                    "event=god_update module=service status=conflict god_id={} error={}",
                    id, err
                );
            }
            return Err(err);
        }
        info!(
            "event=god_update module=service status={} god_id={}",
            if patch.is_empty() { "noop" } else { "ok" },
            id
        );
        self.read_back(id, "updated god not found in read-back")
    }

    /// Deletes a god and cascades its relations, domains and emblem links.
    ///
    /// Returns the record as it was before deletion.
    pub fn delete_god(&self, id: GodId) -> ServiceResult<God> {
        let god = self.require_god(id)?;
        self.repo.delete_god(id)?;
        info!("event=god_delete module=service status=ok god_id={}", id);
        Ok(god)
    }

    /// Records `relative_id` as `god_id`'s `relationship`.
    ///
    /// The relative sees the inverse relationship: adding B as A's parent
    /// makes A one of B's children; siblings are mutual.
    pub fn add_relative(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> ServiceResult<God> {
        ensure_distinct(god_id, relative_id)?;
        let inserted = self.repo.add_relation(god_id, relative_id, relationship)?;
        info!(
            "event=god_relative_add module=service status={} god_id={} relative_id={} relationship={}",
            change_status(inserted),
            god_id,
            relative_id,
            relationship
        );
        self.read_back(god_id, "god missing after relative add")
    }

    /// Removes a relation from both endpoints' views.
    pub fn remove_relative(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> ServiceResult<God> {
        ensure_distinct(god_id, relative_id)?;
        let removed = self
            .repo
            .remove_relation(god_id, relative_id, relationship)?;
        info!(
            "event=god_relative_remove module=service status={} god_id={} relative_id={} relationship={}",
            change_status(removed),
            god_id,
            relative_id,
            relationship
        );
        self.read_back(god_id, "god missing after relative remove")
    }

    /// Links an existing emblem to a god.
    pub fn add_emblem(&self, god_id: GodId, emblem_id: EmblemId) -> ServiceResult<God> {
        let inserted = self.repo.add_emblem(god_id, emblem_id)?;
        info!(
            "event=god_emblem_add module=service status={} god_id={} emblem_id={}",
            change_status(inserted),
            god_id,
            emblem_id
        );
        self.read_back(god_id, "god missing after emblem add")
    }

    /// Unlinks an emblem; the emblem itself need not exist.
    pub fn remove_emblem(&self, god_id: GodId, emblem_id: EmblemId) -> ServiceResult<God> {
        let removed = self.repo.remove_emblem(god_id, emblem_id)?;
        info!(
            "event=god_emblem_remove module=service status={} god_id={} emblem_id={}",
            change_status(removed),
            god_id,
            emblem_id
        );
        self.read_back(god_id, "god missing after emblem remove")
    }

    /// Sets the god's abode, replacing any previous one.
    pub fn update_abode(&self, god_id: GodId, abode_id: AbodeId) -> ServiceResult<God> {
        self.repo.set_abode(god_id, Some(abode_id))?;
        info!(
            "event=god_abode_update module=service status=ok god_id={} abode_id={}",
            god_id, abode_id
        );
        self.read_back(god_id, "god missing after abode update")
    }

    /// Clears the god's abode reference.
    pub fn clear_abode(&self, god_id: GodId) -> ServiceResult<God> {
        self.repo.set_abode(god_id, None)?;
        info!(
            "event=god_abode_clear module=service status=ok god_id={}",
            god_id
        );
        self.read_back(god_id, "god missing after abode clear")
    }

    /// Adds a domain; adding a present domain is a no-op.
    pub fn add_domain(&self, god_id: GodId, domain: &str) -> ServiceResult<God> {
        let domain = normalize_domain(domain)?;
        let inserted = self.repo.add_domain(god_id, &domain)?;
        info!(
            "event=god_domain_add module=service status={} god_id={}",
            change_status(inserted),
            god_id
        );
        self.read_back(god_id, "god missing after domain add")
    }

    /// Removes a domain; removing an absent domain is a no-op.
    pub fn remove_domain(&self, god_id: GodId, domain: &str) -> ServiceResult<God> {
        let domain = normalize_domain(domain)?;
        let removed = self.repo.remove_domain(god_id, &domain)?;
        info!(
            "event=god_domain_remove module=service status={} god_id={}",
            change_status(removed),
            god_id
        );
        self.read_back(god_id, "god missing after domain remove")
    }

    fn require_god(&self, id: GodId) -> ServiceResult<God> {
        self.repo.get_god(id)?.ok_or(ServiceError::NotFound {
            entity: EntityKind::God,
            id,
        })
    }

    fn read_back(&self, id: GodId, details: &'static str) -> ServiceResult<God> {
        self.repo
            .get_god(id)?
            .ok_or(ServiceError::InconsistentState(details))
    }
}

fn ensure_distinct(god_id: GodId, relative_id: GodId) -> Result<(), ValidationError> {
    if god_id == relative_id {
        return Err(ValidationError::SelfRelation(god_id));
    }
    Ok(())
}

fn clamp_depth(options: ResolveOptions) -> u8 {
    options.depth.min(MAX_RESOLVE_DEPTH)
}

fn change_status(changed: bool) -> &'static str {
    if changed {
        "ok"
    } else {
        "noop"
    }
}
