//! Abode repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Deleting an abode clears the reference on every god that pointed to it
//!   (`ON DELETE SET NULL`) and bumps those gods' versions.

use crate::model::abode::{Abode, AbodeId, AbodePatch};
use crate::repo::error::{EntityKind, RepoError, RepoResult};
use crate::repo::sqlite::{
    begin_write, bump_god_version, collect_uuids, parse_uuid, require_record,
    SqlitePantheonRepository,
};
use rusqlite::{params, Row};

/// Repository interface for abode records.
pub trait AbodeRepository {
    fn create_abode(&self, abode: &Abode) -> RepoResult<AbodeId>;
    fn get_abode(&self, id: AbodeId) -> RepoResult<Option<Abode>>;
    fn list_abodes(&self) -> RepoResult<Vec<Abode>>;
    fn update_abode(&self, id: AbodeId, patch: &AbodePatch) -> RepoResult<()>;
    fn delete_abode(&self, id: AbodeId) -> RepoResult<()>;
}

impl AbodeRepository for SqlitePantheonRepository<'_> {
    fn create_abode(&self, abode: &Abode) -> RepoResult<AbodeId> {
        self.conn.execute(
            "INSERT INTO abodes (uuid, name, coordinates) VALUES (?1, ?2, ?3);",
            params![
                abode.id.to_string(),
                abode.name.as_str(),
                abode.coordinates.as_str()
            ],
        )?;
        Ok(abode.id)
    }

    fn get_abode(&self, id: AbodeId) -> RepoResult<Option<Abode>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, coordinates FROM abodes WHERE uuid = ?1;")?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_abode_row(row)?));
        }
        Ok(None)
    }

    fn list_abodes(&self) -> RepoResult<Vec<Abode>> {
        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name, coordinates FROM abodes ORDER BY rowid ASC;")?;
        let mut rows = stmt.query([])?;
        let mut abodes = Vec::new();
        while let Some(row) = rows.next()? {
            abodes.push(parse_abode_row(row)?);
        }
        Ok(abodes)
    }

    fn update_abode(&self, id: AbodeId, patch: &AbodePatch) -> RepoResult<()> {
        let patch = patch.normalized()?;
        if patch.is_empty() {
            return require_record(self.conn, EntityKind::Abode, id);
        }

        let changed = self.conn.execute(
            "UPDATE abodes
             SET
                name = COALESCE(?2, name),
                coordinates = COALESCE(?3, coordinates),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1;",
            params![
                id.to_string(),
                patch.name.as_deref(),
                patch.coordinates.as_deref()
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found(EntityKind::Abode, id));
        }
        Ok(())
    }

    fn delete_abode(&self, id: AbodeId) -> RepoResult<()> {
        let tx = begin_write(self.conn)?;
        require_record(&tx, EntityKind::Abode, id)?;

        let residents = collect_uuids(
            &tx,
            "SELECT uuid FROM gods WHERE abode_uuid = ?1;",
            id,
            "gods.uuid",
        )?;
        for god_id in residents {
            bump_god_version(&tx, god_id)?;
        }

        tx.execute("DELETE FROM abodes WHERE uuid = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_abode_row(row: &Row<'_>) -> RepoResult<Abode> {
    let uuid_text: String = row.get("uuid")?;
    Ok(Abode {
        id: parse_uuid(&uuid_text, "abodes.uuid")?,
        name: row.get("name")?,
        coordinates: row.get("coordinates")?,
    })
}
