use serde::Deserialize;
use std::path::Path;
use tracing::{info, info_span, warn};

use super::ImportCounts;
use crate::error::Result;
use crate::identity::{clean_issn, is_wikidata_qid, HomepageUrl};
use crate::loaders::json_lines;
use crate::metrics::SummarizeMetrics;
use crate::storage::{CatalogDb, ContainerRow};
use crate::text::clean_str;

/// One container entity from the authority registry dump
#[derive(Debug, Deserialize)]
pub struct ContainerEntity {
    pub ident: String,
    pub revision: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub issnl: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub container_type: Option<String>,
    #[serde(default)]
    pub wikidata_qid: Option<String>,
    #[serde(default)]
    pub extra: ContainerExtra,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContainerExtra {
    #[serde(default)]
    pub issne: Option<String>,
    #[serde(default)]
    pub issnp: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

/// Release statistics for one container
#[derive(Debug, Deserialize)]
pub struct ContainerStats {
    pub issnl: String,
    pub total: i64,
    #[serde(default)]
    pub in_web: i64,
    #[serde(default)]
    pub is_preserved: i64,
}

/// Clean an ISSN field from the registry, dropping it with a warning if malformed
fn checked_issn(ident: &str, field: &'static str, raw: Option<String>) -> Option<String> {
    let raw = raw?;
    let cleaned = clean_issn(&raw);
    if cleaned.is_none() {
        warn!(ident, field, value = %raw, "Dropping malformed identifier");
        SummarizeMetrics::record_dropped_identifier(field);
    }
    cleaned
}

fn checked_qid(ident: &str, raw: Option<String>) -> Option<String> {
    let raw = raw?;
    if is_wikidata_qid(&raw) {
        Some(raw)
    } else {
        warn!(ident, field = "wikidata_qid", value = %raw, "Dropping malformed identifier");
        SummarizeMetrics::record_dropped_identifier("wikidata_qid");
        None
    }
}

fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl ContainerEntity {
    fn is_active(&self) -> bool {
        self.state.as_deref() == Some("active")
    }

    fn into_row(self) -> (ContainerRow, Vec<String>) {
        let ident = self.ident;
        let extra = self.extra;
        let row = ContainerRow {
            issnl: checked_issn(&ident, "issnl", self.issnl),
            issne: checked_issn(&ident, "issne", extra.issne),
            issnp: checked_issn(&ident, "issnp", extra.issnp),
            wikidata_qid: checked_qid(&ident, self.wikidata_qid),
            name: clean_str(self.name.as_deref()),
            container_type: non_blank(self.container_type),
            publisher: clean_str(extra.publisher.as_deref()),
            country: non_blank(extra.country).map(|c| c.to_lowercase()),
            lang: extra
                .languages
                .into_iter()
                .find_map(|l| non_blank(Some(l)))
                .map(|l| l.to_lowercase()),
            revision: self.revision,
            ident,
            ..Default::default()
        };
        (row, extra.urls)
    }
}

/// Load active container entities (JSON lines). Their URLs become homepage
/// rows for the container's ISSN-L.
pub fn load_containers(db: &CatalogDb, path: &Path) -> Result<ImportCounts> {
    let span = info_span!("import", kind = "containers");
    let _enter = span.enter();
    info!(path = %path.display(), "Loading authority containers");

    let rows = json_lines::<ContainerEntity>(path)?;
    let counts = db.in_transaction(|db| {
        let mut counts = ImportCounts::default();
        for entity in rows {
            counts.total += 1;
            let entity = match entity {
                Ok(entity) => entity,
                Err(e) => {
                    warn!(line = counts.total, error = %e, "Skipping unreadable container");
                    counts.skipped += 1;
                    continue;
                }
            };
            if !entity.is_active() {
                counts.skipped += 1;
                continue;
            }
            let (row, urls) = entity.into_row();
            db.upsert_container(&row)?;
            counts.updated += 1;

            if let Some(issnl) = row.issnl.as_deref() {
                for homepage in urls.iter().filter_map(|u| HomepageUrl::from_url(u)) {
                    db.insert_homepage(issnl, &homepage)?;
                }
            }
        }
        Ok(counts)
    })?;

    info!(%counts, "Finished loading containers");
    Ok(counts)
}

/// Attach release statistics (JSON lines) to already-loaded containers
pub fn load_container_stats(db: &CatalogDb, path: &Path) -> Result<ImportCounts> {
    let span = info_span!("import", kind = "container_stats");
    let _enter = span.enter();
    info!(path = %path.display(), "Loading container stats");

    let rows = json_lines::<ContainerStats>(path)?;
    let counts = db.in_transaction(|db| {
        let mut counts = ImportCounts::default();
        for stats in rows {
            counts.total += 1;
            let stats = match stats {
                Ok(stats) => stats,
                Err(e) => {
                    warn!(line = counts.total, error = %e, "Skipping unreadable stats row");
                    counts.skipped += 1;
                    continue;
                }
            };
            let changed = db.update_container_stats(
                &stats.issnl,
                stats.total,
                stats.in_web,
                stats.is_preserved,
            )?;
            if changed == 0 {
                counts.unmatched += 1;
            } else {
                counts.updated += 1;
            }
        }
        Ok(counts)
    })?;

    info!(%counts, "Finished loading container stats");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_db;

    fn write(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_active_containers_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "containers.json",
            concat!(
                r#"{"ident": "aaa", "revision": "r1", "state": "active", "issnl": "0140-6736", "name": "The Lancet", "wikidata_qid": "Q939416", "extra": {"issnp": "0140-6736", "languages": ["en"], "country": "GB", "publisher": "Elsevier", "urls": ["http://www.thelancet.com/", "mailto:editor@lancet.com"]}}"#,
                "\n",
                r#"{"ident": "bbb", "revision": "r1", "state": "deleted", "issnl": "0028-0836"}"#,
                "\n",
                "not json\n",
            ),
        );
        let db = test_db();
        let counts = load_containers(&db, &path).unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.updated, 1);
        assert_eq!(counts.skipped, 2);

        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.lang.as_deref(), Some("en"));
        assert_eq!(row.country.as_deref(), Some("gb"));
        assert_eq!(row.wikidata_qid.as_deref(), Some("Q939416"));
        assert_eq!(db.homepage_rows("0140-6736").unwrap().len(), 1);
    }

    #[test]
    fn test_malformed_identifiers_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "containers.json",
            r#"{"ident": "ccc", "revision": "r1", "state": "active", "issnl": "0140-6736", "wikidata_qid": "not-a-qid", "extra": {"issne": "NA"}}"#,
        );
        let db = test_db();
        load_containers(&db, &path).unwrap();
        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.wikidata_qid, None);
        assert_eq!(row.issne, None);
    }

    #[test]
    fn test_blank_fields_stored_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "containers.json",
            r#"{"ident": "ddd", "revision": "r1", "state": "active", "issnl": "0140-6736", "name": " ", "extra": {"publisher": "", "country": "", "languages": ["", "EN"]}}"#,
        );
        let db = test_db();
        load_containers(&db, &path).unwrap();
        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.name, None);
        assert_eq!(row.publisher, None);
        assert_eq!(row.country, None);
        assert_eq!(row.lang.as_deref(), Some("en"));
    }

    #[test]
    fn test_stats_update_known_containers() {
        let dir = tempfile::tempdir().unwrap();
        let containers = write(
            dir.path(),
            "containers.json",
            r#"{"ident": "aaa", "revision": "r1", "state": "active", "issnl": "0140-6736"}"#,
        );
        let stats = write(
            dir.path(),
            "stats.json",
            "{\"issnl\": \"0140-6736\", \"total\": 100, \"in_web\": 40, \"is_preserved\": 30}\n\
             {\"issnl\": \"0028-0836\", \"total\": 5, \"in_web\": 0, \"is_preserved\": 0}\n",
        );
        let db = test_db();
        load_containers(&db, &containers).unwrap();
        let counts = load_container_stats(&db, &stats).unwrap();
        assert_eq!(counts.updated, 1);
        assert_eq!(counts.unmatched, 1);
        let row = db.container_by_issnl("0140-6736").unwrap().unwrap();
        assert_eq!(row.ia_frac, Some(0.4));
        assert_eq!(row.preserved_count, Some(30));
    }
}
