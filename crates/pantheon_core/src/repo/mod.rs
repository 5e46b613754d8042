//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per record collection.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `VersionConflict`,
//!   `Timeout`) in addition to DB transport errors.
//! - Set-like mutations are idempotent and report whether anything changed.
//! - Every write touching a god bumps that god's `version` in the same
//!   transaction.

pub mod abode_repo;
pub mod emblem_repo;
pub mod error;
pub mod god_repo;
pub mod relation_repo;
pub mod sqlite;

use abode_repo::AbodeRepository;
use emblem_repo::EmblemRepository;
use god_repo::GodRepository;
use relation_repo::RelationRepository;

/// Full storage contract needed by the relationship graph service.
pub trait PantheonRepository:
    GodRepository + RelationRepository + AbodeRepository + EmblemRepository
{
}

impl<T> PantheonRepository for T where
    T: GodRepository + RelationRepository + AbodeRepository + EmblemRepository
{
}
