//! Core domain logic for the pantheon relationship graph.
//! This crate is the single source of truth for relation invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{load_config, ConfigError, PantheonConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::abode::{Abode, AbodeId, AbodePatch};
pub use model::emblem::{Emblem, EmblemId};
pub use model::god::{God, GodId, GodKind, GodPatch, NewGod, Relationship};
pub use model::validation::{parse_id, ValidationError};
pub use repo::abode_repo::AbodeRepository;
pub use repo::emblem_repo::EmblemRepository;
pub use repo::error::{EntityKind, RepoError, RepoResult};
pub use repo::god_repo::GodRepository;
pub use repo::relation_repo::RelationRepository;
pub use repo::sqlite::SqlitePantheonRepository;
pub use repo::PantheonRepository;
pub use service::abode_service::AbodeService;
pub use service::emblem_service::EmblemService;
pub use service::error::{ErrorCategory, ServiceError, ServiceResult};
pub use service::god_service::GodService;
pub use service::resolve::{GodView, ResolveOptions, DEFAULT_RESOLVE_DEPTH, MAX_RESOLVE_DEPTH};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
