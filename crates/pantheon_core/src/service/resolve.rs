//! Nested god projections computed at read time.
//!
//! # Responsibility
//! - Join a god record with its abode, emblems and relatives.
//! - Bound relative expansion by an explicit depth.
//!
//! # Invariants
//! - Depth is clamped to `MAX_RESOLVE_DEPTH`.
//! - At depth 0 relation lists are not expanded (`None`).
//! - A reference that no longer resolves is skipped, never fatal.

use crate::model::abode::{Abode, AbodeId};
use crate::model::emblem::{Emblem, EmblemId};
use crate::model::god::{God, GodId, GodKind, Relationship};
use crate::repo::error::RepoResult;
use crate::repo::PantheonRepository;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_RESOLVE_DEPTH: u8 = 1;
pub const MAX_RESOLVE_DEPTH: u8 = 3;

/// Read options for nested projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Number of relative levels to expand.
    pub depth: u8,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_RESOLVE_DEPTH,
        }
    }
}

impl ResolveOptions {
    /// Builds options from caller input, applying default and cap.
    pub fn with_depth(depth: Option<u32>) -> Self {
        let depth = match depth {
            Some(value) => value.min(u32::from(MAX_RESOLVE_DEPTH)) as u8,
            None => DEFAULT_RESOLVE_DEPTH,
        };
        Self { depth }
    }
}

/// God projection with resolved associations and relatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GodView {
    pub id: GodId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: GodKind,
    pub description: String,
    pub domains: Vec<String>,
    pub abode: Option<Abode>,
    pub emblems: Vec<Emblem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<GodView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<GodView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub siblings: Option<Vec<GodView>>,
    pub version: i64,
}

impl GodView {
    /// Relatives of one kind, if expanded.
    pub fn relatives(&self, relationship: Relationship) -> Option<&[GodView]> {
        match relationship {
            Relationship::Parent => self.parents.as_deref(),
            Relationship::Child => self.children.as_deref(),
            Relationship::Sibling => self.siblings.as_deref(),
        }
    }
}

/// Per-call resolver with a read cache, so each record is loaded once.
pub(crate) struct GodResolver<'repo, R: PantheonRepository> {
    repo: &'repo R,
    gods: HashMap<GodId, Option<God>>,
    abodes: HashMap<AbodeId, Option<Abode>>,
    emblems: HashMap<EmblemId, Option<Emblem>>,
}

impl<'repo, R: PantheonRepository> GodResolver<'repo, R> {
    pub(crate) fn new(repo: &'repo R) -> Self {
        Self {
            repo,
            gods: HashMap::new(),
            abodes: HashMap::new(),
            emblems: HashMap::new(),
        }
    }

    pub(crate) fn resolve(&mut self, god: God, depth: u8) -> RepoResult<GodView> {
        self.gods.insert(god.id, Some(god.clone()));

        let abode = match god.abode_id {
            Some(abode_id) => self.abode(abode_id)?,
            None => None,
        };

        let mut emblems = Vec::with_capacity(god.emblem_ids.len());
        for emblem_id in &god.emblem_ids {
            if let Some(emblem) = self.emblem(*emblem_id)? {
                emblems.push(emblem);
            }
        }

        let (parents, children, siblings) = if depth == 0 {
            (None, None, None)
        } else {
            (
                Some(self.relatives(god.id, Relationship::Parent, depth - 1)?),
                Some(self.relatives(god.id, Relationship::Child, depth - 1)?),
                Some(self.relatives(god.id, Relationship::Sibling, depth - 1)?),
            )
        };

        Ok(GodView {
            id: god.id,
            name: god.name,
            kind: god.kind,
            description: god.description,
            domains: god.domains,
            abode,
            emblems,
            parents,
            children,
            siblings,
            version: god.version,
        })
    }

    fn relatives(
        &mut self,
        god_id: GodId,
        relationship: Relationship,
        depth: u8,
    ) -> RepoResult<Vec<GodView>> {
        let ids = self.repo.relatives(god_id, relationship)?;
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(relative) = self.god(id)? {
                views.push(self.resolve(relative, depth)?);
            }
        }
        Ok(views)
    }

    fn god(&mut self, id: GodId) -> RepoResult<Option<God>> {
        if let Some(cached) = self.gods.get(&id) {
            return Ok(cached.clone());
        }
        let loaded = self.repo.get_god(id)?;
        self.gods.insert(id, loaded.clone());
        Ok(loaded)
    }

    fn abode(&mut self, id: AbodeId) -> RepoResult<Option<Abode>> {
        if let Some(cached) = self.abodes.get(&id) {
            return Ok(cached.clone());
        }
        let loaded = self.repo.get_abode(id)?;
        self.abodes.insert(id, loaded.clone());
        Ok(loaded)
    }

    fn emblem(&mut self, id: EmblemId) -> RepoResult<Option<Emblem>> {
        if let Some(cached) = self.emblems.get(&id) {
            return Ok(cached.clone());
        }
        let loaded = self.repo.get_emblem(id)?;
        self.emblems.insert(id, loaded.clone());
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::{ResolveOptions, DEFAULT_RESOLVE_DEPTH, MAX_RESOLVE_DEPTH};

    #[test]
    fn depth_defaults_and_clamps() {
        assert_eq!(ResolveOptions::with_depth(None).depth, DEFAULT_RESOLVE_DEPTH);
        assert_eq!(ResolveOptions::with_depth(Some(0)).depth, 0);
        assert_eq!(ResolveOptions::with_depth(Some(2)).depth, 2);
        assert_eq!(
            ResolveOptions::with_depth(Some(10_000)).depth,
            MAX_RESOLVE_DEPTH
        );
        assert_eq!(ResolveOptions::default().depth, DEFAULT_RESOLVE_DEPTH);
    }
}
