use rusqlite::params;
use tracing::{debug, warn};

use super::{CatalogDb, InsertOutcome};
use crate::directory::{DirectoryAttributes, DirectoryRecord};
use crate::error::Result;
use crate::identity::IssnMap;

/// A persisted directory observation
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryRow {
    pub issnl: String,
    pub slug: String,
    pub identifier: Option<String>,
    pub name: Option<String>,
    pub attributes: DirectoryAttributes,
}

impl CatalogDb {
    /// Canonicalize and persist one record, along with its homepage URLs.
    ///
    /// Only the first record per (issnl, slug) is kept; later ones come back
    /// as `Duplicate` and their URLs are not recorded.
    pub fn insert_directory(
        &self,
        map: &IssnMap,
        mut record: DirectoryRecord,
    ) -> Result<InsertOutcome> {
        if !record.canonicalize(map) {
            return Ok(InsertOutcome::MissingIssn);
        }
        let Some(issnl) = record.issnl.clone() else {
            debug!(
                source = %record.slug,
                issne = ?record.issne,
                issnp = ?record.issnp,
                raw_issn = ?record.raw_issn,
                "No ISSN-L match"
            );
            return Ok(InsertOutcome::NoMatch);
        };

        let extra = record.extra_json()?;
        let changed = self.conn().execute(
            "INSERT OR IGNORE INTO directory (issnl, slug, identifier, name, extra) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![issnl, record.slug, record.custom_id, record.name, extra],
        )?;
        if changed == 0 {
            return Ok(InsertOutcome::Duplicate);
        }

        for homepage in &record.homepage_urls {
            self.insert_homepage(&issnl, homepage)?;
        }
        Ok(InsertOutcome::Inserted)
    }

    /// All directory rows for one canonical id, in insertion order
    pub fn directory_rows(&self, issnl: &str) -> Result<Vec<DirectoryRow>> {
        let mut stmt = self.conn().prepare(
            "SELECT issnl, slug, identifier, name, extra FROM directory WHERE issnl = ?1 ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![issnl])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let slug: String = row.get(1)?;
            let extra: Option<String> = row.get(4)?;
            let attributes = match extra.as_deref().map(DirectoryAttributes::from_json) {
                Some(Ok(attrs)) => attrs,
                Some(Err(e)) => {
                    warn!(issnl, source = %slug, error = %e, "Unreadable directory attributes");
                    DirectoryAttributes::default()
                }
                None => DirectoryAttributes::default(),
            };
            out.push(DirectoryRow {
                issnl: row.get(0)?,
                slug,
                identifier: row.get(2)?,
                name: row.get(3)?,
                attributes,
            });
        }
        Ok(out)
    }

    pub fn count_directory(&self, slug: &str) -> Result<i64> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM directory WHERE slug = ?1",
            params![slug],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
