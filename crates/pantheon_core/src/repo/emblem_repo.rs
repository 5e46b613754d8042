//! Emblem repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting an emblem removes it from every god's emblem list and bumps
//!   those gods' versions.

use crate::model::emblem::{Emblem, EmblemId};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::sqlite::{
    begin_write, bump_god_version, collect_uuids, parse_uuid, require_record,
    SqlitePantheonRepository,
};
use rusqlite::{params, Row};

/// Repository interface for emblem records.
pub trait EmblemRepository {
    fn create_emblem(&self, emblem: &Emblem) -> RepoResult<EmblemId>;
    fn get_emblem(&self, id: EmblemId) -> RepoResult<Option<Emblem>>;
    fn list_emblems(&self) -> RepoResult<Vec<Emblem>>;
    fn rename_emblem(&self, id: EmblemId, name: &str) -> RepoResult<()>;
    fn delete_emblem(&self, id: EmblemId) -> RepoResult<()>;
}

impl EmblemRepository for SqlitePantheonRepository<'_> {
    fn create_emblem(&self, emblem: &Emblem) -> RepoResult<EmblemId> {
        self.conn.execute(
            "INSERT INTO emblems (uuid, name) VALUES (?1, ?2);",
            params![emblem.id.to_string(), emblem.name.as_str()],
        )?;
        Ok(emblem.id)
    }

    fn get_emblem(&self, id: EmblemId) -> RepoResult<Option<Emblem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name FROM emblems WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_emblem_row(row)?));
        }
        Ok(None)
    }

    fn list_emblems(&self) -> RepoResult<Vec<Emblem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name FROM emblems ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut emblems = Vec::new();
        while let Some(row) = rows.next()? {
            emblems.push(parse_emblem_row(row)?);
        }
        Ok(emblems)
    }

    fn rename_emblem(&self, id: EmblemId, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE emblems
             SET
                name = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![id.to_string(), name],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Emblem, id));
        }
        Ok(())
    }

    fn delete_emblem(&self, id: EmblemId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::Emblem, id)?;

        let holders = collect_uuids(
            &tx,
            "SELECT god_uuid FROM god_emblems WHERE emblem_uuid = ?1;",
            id,
            "god_emblems.god_uuid",
        )?;
        for god_id in holders {
            bump_god_version(&tx, god_id)?;
        }

        tx.execute("DELETE FROM emblems WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_emblem_row(row: &Row<'_>) -> RepoResult<Emblem> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Emblem {
        id: parse_uuid(&uuid_text, "emblems.uuid")?,
        name: row.get("name")?,
    })
}
