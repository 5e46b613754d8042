//! Relation edge repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store god-to-god relations as single edges in `god_relations`.
//! - Compute each god's parents/children/siblings views by query.
//!
//! # Invariants
//! - One row per relation: parent edges point parent -> child, sibling edges
//!   store the pair in canonical order. The inverse view of an edge is never
//!   written separately, so both endpoints always agree.
//! - Adding an existing edge or removing a missing one changes nothing.

use crate::model::god::{GodId, Relationship};
use crate::model::validation::ValidationError;
use crate::repo::error::{EntityKind, RepoResult};
use crate::repo::sqlite::{
    begin_write, bump_god_version, collect_uuids, require_record, SqlitePantheonRepository,
};
use rusqlite::params;

/// Repository interface for relation edges between gods.
pub trait RelationRepository {
    /// Records `relative_id` as `god_id`'s `relationship`.
    ///
    /// Returns `false` when the edge already existed.
    fn add_relation(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> RepoResult<bool>;
    /// Returns `false` when no such edge existed.
    fn remove_relation(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> RepoResult<bool>;
    /// Lists `god_id`'s relatives of one kind in edge creation order.
    fn relatives(&self, god_id: GodId, relationship: Relationship) -> RepoResult<Vec<GodId>>;
}

/// Physical edge row for a logical relation.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    kind: &'static str,
    source: String,
    target: String,
}

impl Edge {
    fn for_relation(god_id: GodId, relative_id: GodId, relationship: Relationship) -> Self {
        let god = god_id.to_string();
        let relative = relative_id.to_string();
        match relationship {
            Relationship::Parent => Self {
                kind: "parent",
                source: relative,
                target: god,
            },
            Relationship::Child => Self {
                kind: "parent",
                source: god,
                target: relative,
            },
            Relationship::Sibling => {
                let (source, target) = if god < relative {
                    (god, relative)
                } else {
                    (relative, god)
                };
                Self {
                    kind: "sibling",
                    source,
                    target,
                }
            }
        }
    }
}

impl RelationRepository for SqlitePantheonRepository<'_> {
    fn add_relation(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> RepoResult<bool> {
        if god_id == relative_id {
            return Err(ValidationError::SelfRelation(god_id).into());
        }

        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, god_id)?;
        require_record(&tx, EntityKind::God, relative_id)?;

        let edge = Edge::for_relation(god_id, relative_id, relationship);
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO god_relations (kind, source_uuid, target_uuid)
             VALUES (?1, ?2, ?3);",
            params![edge.kind, edge.source, edge.target],
        )? > 0;
        if inserted {
            bump_god_version(&tx, god_id)?;
            bump_god_version(&tx, relative_id)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn remove_relation(
        &self,
        god_id: GodId,
        relative_id: GodId,
        relationship: Relationship,
    ) -> RepoResult<bool> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, god_id)?;
        require_record(&tx, EntityKind::God, relative_id)?;

        let edge = Edge::for_relation(god_id, relative_id, relationship);
        let removed = tx.execute(
            "DELETE FROM god_relations
             WHERE kind = ?1 AND source_uuid = ?2 AND target_uuid = ?3;",
            params![edge.kind, edge.source, edge.target],
        )? > 0;
        if removed {
            bump_god_version(&tx, god_id)?;
            bump_god_version(&tx, relative_id)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn relatives(&self, god_id: GodId, relationship: Relationship) -> RepoResult<Vec<GodId>> {
        let sql = match relationship {
            Relationship::Parent => {
                "SELECT source_uuid
                 FROM god_relations
                 WHERE kind = 'parent' AND target_uuid = ?1
                 ORDER BY id ASC;"
            }
            Relationship::Child => {
                "SELECT target_uuid
                 FROM god_relations
                 WHERE kind = 'parent' AND source_uuid = ?1
                 ORDER BY id ASC;"
            }
            Relationship::Sibling => {
                "SELECT CASE WHEN source_uuid = ?1 THEN target_uuid ELSE source_uuid END
                 FROM god_relations
                 WHERE kind = 'sibling' AND (source_uuid = ?1 OR target_uuid = ?1)
                 ORDER BY id ASC;"
            }
        };
        collect_uuids(self.conn, sql, god_id, "god_relations")
    }
}

#[cfg(test)]
mod tests {
    use super::Edge;
    use crate::model::god::Relationship;
    use uuid::Uuid;

    #[test]
    fn parent_and_child_map_to_the_same_edge() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        // a has parent b == b has child a
        assert_eq!(
            Edge::for_relation(a, b, Relationship::Parent),
            Edge::for_relation(b, a, Relationship::Child)
        );
    }

    #[test]
    fn sibling_edge_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edge = Edge::for_relation(a, b, Relationship::Sibling);
        assert_eq!(edge, Edge::for_relation(b, a, Relationship::Sibling));
        assert!(edge.source < edge.target);
    }
}
