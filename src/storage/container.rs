use rusqlite::{params, OptionalExtension, Row};

use super::CatalogDb;
use crate::error::Result;

/// One authority-registry container, keyed by its registry ident
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerRow {
    pub ident: String,
    pub revision: String,
    pub issnl: Option<String>,
    pub issne: Option<String>,
    pub issnp: Option<String>,
    pub wikidata_qid: Option<String>,
    pub name: Option<String>,
    pub container_type: Option<String>,
    pub publisher: Option<String>,
    pub country: Option<String>,
    pub lang: Option<String>,
    pub release_count: Option<i64>,
    pub ia_count: Option<i64>,
    pub ia_frac: Option<f64>,
    pub preserved_count: Option<i64>,
    pub preserved_frac: Option<f64>,
}

impl ContainerRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            ident: row.get("ident")?,
            revision: row.get("revision")?,
            issnl: row.get("issnl")?,
            issne: row.get("issne")?,
            issnp: row.get("issnp")?,
            wikidata_qid: row.get("wikidata_qid")?,
            name: row.get("name")?,
            container_type: row.get("container_type")?,
            publisher: row.get("publisher")?,
            country: row.get("country")?,
            lang: row.get("lang")?,
            release_count: row.get("release_count")?,
            ia_count: row.get("ia_count")?,
            ia_frac: row.get("ia_frac")?,
            preserved_count: row.get("preserved_count")?,
            preserved_frac: row.get("preserved_frac")?,
        })
    }
}

impl CatalogDb {
    pub fn upsert_container(&self, c: &ContainerRow) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO container
                (ident, revision, issnl, issne, issnp, wikidata_qid, name, container_type, publisher, country, lang)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                c.ident,
                c.revision,
                c.issnl,
                c.issne,
                c.issnp,
                c.wikidata_qid,
                c.name,
                c.container_type,
                c.publisher,
                c.country,
                c.lang
            ],
        )?;
        Ok(())
    }

    /// Attach release statistics; fractions are only defined when `total > 0`.
    /// Returns the number of containers updated (0 for unknown ids).
    pub fn update_container_stats(
        &self,
        issnl: &str,
        total: i64,
        in_web: i64,
        preserved: i64,
    ) -> Result<usize> {
        let (ia_frac, preserved_frac) = if total > 0 {
            (
                Some(in_web as f64 / total as f64),
                Some(preserved as f64 / total as f64),
            )
        } else {
            (None, None)
        };
        let changed = self.conn().execute(
            "UPDATE container SET release_count = ?1, ia_count = ?2, ia_frac = ?3,
                preserved_count = ?4, preserved_frac = ?5
             WHERE issnl = ?6",
            params![total, in_web, ia_frac, preserved, preserved_frac, issnl],
        )?;
        Ok(changed)
    }

    pub fn container_by_issnl(&self, issnl: &str) -> Result<Option<ContainerRow>> {
        let row = self
            .conn()
            .query_row(
                "SELECT * FROM container WHERE issnl = ?1",
                params![issnl],
                ContainerRow::from_row,
            )
            .optional()?;
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_db;

    fn lancet() -> ContainerRow {
        ContainerRow {
            ident: "aaaaaaaaaaaaaeiraaaaaaaaai".to_string(),
            revision: "rev1".to_string(),
            issnl: Some("0140-6736".to_string()),
            name: Some("The Lancet".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_upsert_and_stats() {
        let db = test_db();
        db.upsert_container(&lancet()).unwrap();
        assert_eq!(db.update_container_stats("0140-6736", 200, 50, 20).unwrap(), 1);
        assert_eq!(db.update_container_stats("0028-0836", 10, 1, 1).unwrap(), 0);

        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.release_count, Some(200));
        assert_eq!(row.ia_frac, Some(0.25));
        assert_eq!(row.preserved_frac, Some(0.1));
        assert_eq!(db.all_issnls().unwrap(), vec!["0140-6736".to_string()]);
    }

    #[test]
    fn test_zero_total_has_no_fractions() {
        let db = test_db();
        db.upsert_container(&lancet()).unwrap();
        db.update_container_stats("0140-6736", 0, 0, 0).unwrap();
        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.release_count, Some(0));
        assert_eq!(row.ia_frac, None);
    }

    #[test]
    fn test_upsert_replaces_revision() {
        let db = test_db();
        db.upsert_container(&lancet()).unwrap();
        let mut newer = lancet();
        newer.revision = "rev2".to_string();
        db.upsert_container(&newer).unwrap();
        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.revision, "rev2");
    }
}
