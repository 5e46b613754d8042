//! God repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `gods` collection and its domain/emblem lists.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Domain and emblem lists are unique per god and insertion-ordered.
//! - Deleting a god cascades to its domains, emblem links and relation
//!   edges; surviving relatives get their version bumped.

use crate::model::abode::AbodeId;
use crate::model::emblem::EmblemId;
use crate::model::god::{God, GodId, GodKind, GodPatch};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::sqlite::{
    begin_write, bump_god_version, collect_uuids, parse_uuid, require_record,
    SqlitePantheonRepository,
};
use rusqlite::{params, Connection, OptionalExtension, Row};

const GOD_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    type,
    description,
    abode_uuid,
    version
FROM gods";

/// Repository interface for god records and their set-like lists.
pub trait GodRepository {
    fn create_god(&self, god: &God) -> RepoResult<GodId>;
    fn get_god(&self, id: GodId) -> RepoResult<Option<God>>;
    /// Lists all gods in creation order.
    fn list_gods(&self) -> RepoResult<Vec<God>>;
    /// Applies supplied patch fields only.
    ///
    /// With `expected_version`, the write is rejected unless it matches the
    /// stored version.
    fn update_god_fields(
        &self,
        id: GodId,
        patch: &GodPatch,
        expected_version: Option<i64>,
    ) -> RepoResult<()>;
    fn delete_god(&self, id: GodId) -> RepoResult<()>;
    /// Replaces the abode reference (last write wins).
    fn set_abode(&self, id: GodId, abode_id: Option<AbodeId>) -> RepoResult<()>;
    /// Returns `false` when the domain was already present.
    fn add_domain(&self, id: GodId, domain: &str) -> RepoResult<bool>;
    /// Returns `false` when the domain was absent.
    fn remove_domain(&self, id: GodId, domain: &str) -> RepoResult<bool>;
    /// Returns `false` when the emblem was already linked.
    fn add_emblem(&self, id: GodId, emblem_id: EmblemId) -> RepoResult<bool>;
    /// Returns `false` when the emblem was not linked.
    fn remove_emblem(&self, id: GodId, emblem_id: EmblemId) -> RepoResult<bool>;
    fn gods_in_abode(&self, abode_id: AbodeId) -> RepoResult<Vec<God>>;
    fn gods_with_emblem(&self, emblem_id: EmblemId) -> RepoResult<Vec<God>>;
}

impl GodRepository for SqlitePantheonRepository<'_> {
    fn create_god(&self, god: &God) -> RepoResult<GodId> {
        god.validate()?;

        let tx = begin_write(self.conn)?;
        if let Some(abode_id) = god.abode_id {
            require_record(&tx, EntityKind::Abode, abode_id)?;
        }
        tx.execute(
            "INSERT INTO gods (
                uuid,
                name,
                type,
                description,
                abode_uuid,
                version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                god.id.to_string(),
                god.name.as_str(),
                god.kind.as_str(),
                god.description.as_str(),
                god.abode_id.map(|value| value.to_string()),
                god.version,
            ],
        )?;
        for domain in &god.domains {
            insert_domain(&tx, god.id, domain)?;
        }
        for emblem_id in &god.emblem_ids {
            require_record(&tx, EntityKind::Emblem, *emblem_id)?;
            insert_emblem_link(&tx, god.id, *emblem_id)?;
        }
        tx.commit()?;

        Ok(god.id)
    }

    fn get_god(&self, id: GodId) -> RepoResult<Option<God>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{GOD_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(load_god(self.conn, row)?));
        }
        Ok(None)
    }

    fn list_gods(&self) -> RepoResult<Vec<God>> {
        query_gods(
            self.conn,
            &format!("{GOD_SELECT_SQL} ORDER BY rowid ASC;"),
            None,
        )
    }

    fn update_god_fields(
        &self,
        id: GodId,
        patch: &GodPatch,
        expected_version: Option<i64>,
    ) -> RepoResult<()> {
        let patch = patch.normalized()?;
        let tx = begin_write(self.conn)?;
        let actual = tx
            .query_row(
                "SELECT version FROM gods WHERE uuid = ?1;",
                [id.to_string()],
                |row| row.get::<_, i64>(0),
            )
            .optional()?
            .ok_or(RepoError::not_found(EntityKind::God, id))?;

        if let Some(expected) = expected_version {
            if expected != actual {
                return Err(RepoError::VersionConflict {
                    id,
                    expected,
                    actual,
                });
            }
        }

        if patch.is_empty() {
            return Ok(());
        }

        tx.execute(
            "UPDATE gods
             SET
                name = COALESCE(?2, name),
                type = COALESCE(?3, type),
                description = COALESCE(?4, description),
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                patch.name.as_deref(),
                patch.kind.map(GodKind::as_str),
                patch.description.as_deref(),
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_god(&self, id: GodId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;

        let neighbours = collect_uuids(
            &tx,
            "SELECT DISTINCT CASE WHEN source_uuid = ?1 THEN target_uuid ELSE source_uuid END
             FROM god_relations
             WHERE source_uuid = ?1 OR target_uuid = ?1;",
            id,
            "god_relations",
        )?;
        for neighbour in neighbours {
            bump_god_version(&tx, neighbour)?;
        }

        tx.execute("DELETE FROM gods WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }

    fn set_abode(&self, id: GodId, abode_id: Option<AbodeId>) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;
        if let Some(abode_id) = abode_id {
            require_record(&tx, EntityKind::Abode, abode_id)?;
        }
        tx.execute(
            "UPDATE gods
             SET
                abode_uuid = ?2,
                version = version + 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), abode_id.map(|value| value.to_string())],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn add_domain(&self, id: GodId, domain: &str) -> RepoResult<bool> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;
        let inserted = insert_domain(&tx, id, domain)?;
        if inserted {
            bump_god_version(&tx, id)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn remove_domain(&self, id: GodId, domain: &str) -> RepoResult<bool> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;
        let removed = tx.execute(
            "DELETE FROM god_domains WHERE god_uuid = ?1 AND domain = ?2;",
            params![id.to_string(), domain],
        )? > 0;
        if removed {
            bump_god_version(&tx, id)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn add_emblem(&self, id: GodId, emblem_id: EmblemId) -> RepoResult<bool> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;
        require_record(&tx, EntityKind::Emblem, emblem_id)?;
        let inserted = insert_emblem_link(&tx, id, emblem_id)?;
        if inserted {
            bump_god_version(&tx, id)?;
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn remove_emblem(&self, id: GodId, emblem_id: EmblemId) -> RepoResult<bool> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::God, id)?;
        let removed = tx.execute(
            "DELETE FROM god_emblems WHERE god_uuid = ?1 AND emblem_uuid = ?2;",
            params![id.to_string(), emblem_id.to_string()],
        )? > 0;
        if removed {
            bump_god_version(&tx, id)?;
        }
        tx.commit()?;
        Ok(removed)
    }

    fn gods_in_abode(&self, abode_id: AbodeId) -> RepoResult<Vec<God>> {
        query_gods(
            self.conn,
            &format!("{GOD_SELECT_SQL} WHERE abode_uuid = ?1 ORDER BY rowid ASC;"),
            Some(abode_id.to_string()),
        )
    }

    fn gods_with_emblem(&self, emblem_id: EmblemId) -> RepoResult<Vec<God>> {
        query_gods(
            self.conn,
            &format!(
                "{GOD_SELECT_SQL}
                 WHERE uuid IN (SELECT god_uuid FROM god_emblems WHERE emblem_uuid = ?1)
                 ORDER BY rowid ASC;"
            ),
            Some(emblem_id.to_string()),
        )
    }
}

fn insert_domain(conn: &Connection, id: GodId, domain: &str) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO god_domains (god_uuid, domain) VALUES (?1, ?2);",
        params![id.to_string(), domain],
    )?;
    Ok(changed > 0)
}

fn insert_emblem_link(conn: &Connection, id: GodId, emblem_id: EmblemId) -> RepoResult<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO god_emblems (god_uuid, emblem_uuid) VALUES (?1, ?2);",
        params![id.to_string(), emblem_id.to_string()],
    )?;
    Ok(changed > 0)
}

fn query_gods(conn: &Connection, sql: &str, bind: Option<String>) -> RepoResult<Vec<God>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = match bind {
        Some(value) => stmt.query([value])?,
        None => stmt.query([])?,
    };
    let mut gods = Vec::new();
    while let Some(row) = rows.next()? {
        gods.push(load_god(conn, row)?);
    }
    Ok(gods)
}

fn load_god(conn: &Connection, row: &Row<'_>) -> RepoResult<God> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "gods.uuid")?;

    let type_text: String = row.get("type")?;
    let kind = type_text.parse::<GodKind>().map_err(|_| {
        RepoError::InvalidData(format!("invalid god type `{type_text}` in gods.type"))
    })?;

    let abode_id = match row.get::<_, Option<String>>("abode_uuid")? {
        Some(value) => Some(parse_uuid(&value, "gods.abode_uuid")?),
        None => None,
    };

    let domains = load_domains(conn, &uuid_text)?;
    let emblem_ids = collect_uuids(
        conn,
        "SELECT emblem_uuid FROM god_emblems WHERE god_uuid = ?1 ORDER BY id ASC;",
        id,
        "god_emblems.emblem_uuid",
    )?;

    Ok(God {
        id,
        name: row.get("name")?,
        kind,
        description: row.get("description")?,
        domains,
        abode_id,
        emblem_ids,
        version: row.get("version")?,
    })
}

fn load_domains(conn: &Connection, god_uuid: &str) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT domain FROM god_domains WHERE god_uuid = ?1 ORDER BY id ASC;")?;
    let mut rows = stmt.query([god_uuid])?;
    let mut domains = Vec::new();
    while let Some(row) = rows.next()? {
        domains.push(row.get(0)?);
    }
    Ok(domains)
}
