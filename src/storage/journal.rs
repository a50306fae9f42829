use rusqlite::{params, Row};
use serde::Serialize;

use super::CatalogDb;
use crate::error::Result;

/// The consolidated per-journal record. Always derived, never loaded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct JournalSummary {
    pub issnl: String,
    pub issne: Option<String>,
    pub issnp: Option<String>,
    pub wikidata_qid: Option<String>,
    pub container_ident: Option<String>,
    pub name: Option<String>,
    pub publisher: Option<String>,
    pub country: Option<String>,
    pub lang: Option<String>,
    pub is_oa: bool,
    pub sherpa_color: Option<String>,
    pub is_longtail: bool,
    pub publisher_type: Option<String>,
    pub has_dois: bool,
    pub any_homepage: bool,
    pub any_live_homepage: bool,
    pub any_gwb_homepage: bool,
    pub known_issnl: bool,
    pub valid_issnl: bool,
    pub release_count: Option<i64>,
    pub ia_count: Option<i64>,
    pub ia_frac: Option<f64>,
    pub preserved_count: Option<i64>,
    pub preserved_frac: Option<f64>,
}

impl JournalSummary {
    pub fn new(issnl: &str) -> Self {
        Self {
            issnl: issnl.to_string(),
            ..Default::default()
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            issnl: row.get("issnl")?,
            issne: row.get("issne")?,
            issnp: row.get("issnp")?,
            wikidata_qid: row.get("wikidata_qid")?,
            container_ident: row.get("container_ident")?,
            name: row.get("name")?,
            publisher: row.get("publisher")?,
            country: row.get("country")?,
            lang: row.get("lang")?,
            is_oa: row.get("is_oa")?,
            sherpa_color: row.get("sherpa_color")?,
            is_longtail: row.get("is_longtail")?,
            publisher_type: row.get("publisher_type")?,
            has_dois: row.get("has_dois")?,
            any_homepage: row.get("any_homepage")?,
            any_live_homepage: row.get("any_live_homepage")?,
            any_gwb_homepage: row.get("any_gwb_homepage")?,
            known_issnl: row.get("known_issnl")?,
            valid_issnl: row.get("valid_issnl")?,
            release_count: row.get("release_count")?,
            ia_count: row.get("ia_count")?,
            ia_frac: row.get("ia_frac")?,
            preserved_count: row.get("preserved_count")?,
            preserved_frac: row.get("preserved_frac")?,
        })
    }
}

impl CatalogDb {
    /// Replace the stored summary for one canonical id
    pub fn upsert_journal(&self, j: &JournalSummary) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO journal (issnl, issne, issnp, wikidata_qid, container_ident,
                name, publisher, country, lang, is_oa, sherpa_color, is_longtail, publisher_type,
                has_dois, any_homepage, any_live_homepage, any_gwb_homepage, known_issnl,
                valid_issnl, release_count, ia_count, ia_frac, preserved_count, preserved_frac)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                ?18, ?19, ?20, ?21, ?22, ?23, ?24)",
            params![
                j.issnl,
                j.issne,
                j.issnp,
                j.wikidata_qid,
                j.container_ident,
                j.name,
                j.publisher,
                j.country,
                j.lang,
                j.is_oa,
                j.sherpa_color,
                j.is_longtail,
                j.publisher_type,
                j.has_dois,
                j.any_homepage,
                j.any_live_homepage,
                j.any_gwb_homepage,
                j.known_issnl,
                j.valid_issnl,
                j.release_count,
                j.ia_count,
                j.ia_frac,
                j.preserved_count,
                j.preserved_frac
            ],
        )?;
        Ok(())
    }

    /// Drop every summary row ahead of a full rebuild
    pub fn clear_journals(&self) -> Result<usize> {
        Ok(self.conn().execute("DELETE FROM journal", [])?)
    }

    pub fn journals(&self) -> Result<Vec<JournalSummary>> {
        self.query_journals("SELECT * FROM journal ORDER BY issnl")
    }

    pub fn valid_journals(&self) -> Result<Vec<JournalSummary>> {
        self.query_journals("SELECT * FROM journal WHERE valid_issnl = 1 ORDER BY issnl")
    }

    pub fn journal(&self, issnl: &str) -> Result<Option<JournalSummary>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT * FROM journal WHERE issnl = ?1")?;
        let mut rows = stmt.query(params![issnl])?;
        match rows.next()? {
            Some(row) => Ok(Some(JournalSummary::from_row(row)?)),
            None => Ok(None),
        }
    }

    fn query_journals(&self, sql: &str) -> Result<Vec<JournalSummary>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map([], JournalSummary::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
