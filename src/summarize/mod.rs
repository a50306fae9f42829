//! Fan-in of every stored observation into one journal row per ISSN-L

pub mod publisher;

pub use publisher::{classify, PublisherContext, PublisherType};

use std::fmt;
use tracing::{debug, info, info_span, warn};

use crate::config::Config;
use crate::constants::{DOI_SOURCES, OA_SOURCES, SHERPA_ROMEO, WEB_ARCHIVE_HOST, WIKIDATA};
use crate::error::Result;
use crate::identity::{is_valid_issn, is_wikidata_qid, IssnMap};
use crate::metrics::SummarizeMetrics;
use crate::storage::{CatalogDb, ContainerRow, DirectoryRow, HomepageRow, JournalSummary};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SummaryCounts {
    pub total: usize,
    pub unknown_issnl: usize,
    pub invalid_issnl: usize,
    pub longtail: usize,
}

impl fmt::Display for SummaryCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} unknown-issnl={} invalid-issnl={} longtail={}",
            self.total, self.unknown_issnl, self.invalid_issnl, self.longtail
        )
    }
}

/// Builds journal summaries using a source priority order: earlier sources
/// set fields, later sources only fill what is still empty.
pub struct Summarizer {
    priority: Vec<String>,
}

impl Summarizer {
    pub fn new(priority: Vec<String>) -> Self {
        Self { priority }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.summarize.source_priority.clone())
    }

    /// Rank of a slug; unlisted slugs sort after every listed one
    fn rank(&self, slug: &str) -> usize {
        self.priority
            .iter()
            .position(|s| s == slug)
            .unwrap_or(self.priority.len())
    }

    /// Rebuild the whole journal table in one transaction
    pub fn summarize(&self, db: &CatalogDb, map: &IssnMap) -> Result<SummaryCounts> {
        let span = info_span!("summarize");
        let _enter = span.enter();

        let issnls = db.all_issnls()?;
        info!("{} total ISSN-Ls", issnls.len());

        let counts = db.in_transaction(|db| {
            let cleared = db.clear_journals()?;
            debug!(cleared, "Cleared previous summaries");

            let mut counts = SummaryCounts::default();
            for issnl in &issnls {
                let journal = self.summarize_one(db, map, issnl)?;
                counts.total += 1;
                if !journal.known_issnl {
                    counts.unknown_issnl += 1;
                }
                if !journal.valid_issnl {
                    counts.invalid_issnl += 1;
                }
                if journal.is_longtail {
                    counts.longtail += 1;
                }
                db.upsert_journal(&journal)?;
                SummarizeMetrics::record_journal();
            }
            Ok(counts)
        })?;

        info!(%counts, "Finished summarizing");
        Ok(counts)
    }

    /// Build (without persisting) the summary for one canonical id
    pub fn summarize_one(
        &self,
        db: &CatalogDb,
        map: &IssnMap,
        issnl: &str,
    ) -> Result<JournalSummary> {
        let mut journal = JournalSummary::new(issnl);
        journal.known_issnl = map.is_known_issnl(issnl);
        journal.valid_issnl = is_valid_issn(issnl);

        if let Some(container) = db.container_by_issnl(issnl)? {
            apply_container(&mut journal, container);
        }

        let mut rows = db.directory_rows(issnl)?;
        rows.sort_by(|a, b| {
            self.rank(&a.slug)
                .cmp(&self.rank(&b.slug))
                .then_with(|| a.slug.cmp(&b.slug))
        });
        for row in &rows {
            apply_directory(&mut journal, row);
        }

        for field in [&mut journal.issne, &mut journal.issnp] {
            if field.as_deref().is_some_and(|v| !issn_shaped(v)) {
                debug!(issnl, value = ?field, "Dropping non-ISSN value");
                *field = None;
            }
        }

        for homepage in db.homepage_rows(issnl)? {
            apply_homepage(&mut journal, &homepage);
        }

        let publisher_type = classify(&PublisherContext {
            publisher: journal.publisher.as_deref(),
            is_oa: journal.is_oa,
            has_dois: journal.has_dois,
            lang: journal.lang.as_deref(),
            country: journal.country.as_deref(),
        });
        journal.is_longtail = publisher_type == Some(PublisherType::Longtail);
        journal.publisher_type = publisher_type.map(|t| t.as_str().to_string());
        Ok(journal)
    }
}

/// "NNNN-NNNN" shape only; some sources put "NA" or free text here
fn issn_shaped(value: &str) -> bool {
    value.len() == 9 && value.as_bytes()[4] == b'-'
}

fn fill(slot: &mut Option<String>, value: Option<&str>) {
    if slot.is_none() {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            *slot = Some(v.to_string());
        }
    }
}

fn apply_container(journal: &mut JournalSummary, container: ContainerRow) {
    journal.container_ident = Some(container.ident);
    fill(&mut journal.name, container.name.as_deref());
    fill(&mut journal.publisher, container.publisher.as_deref());
    fill(&mut journal.issne, container.issne.as_deref());
    fill(&mut journal.issnp, container.issnp.as_deref());
    fill(&mut journal.wikidata_qid, container.wikidata_qid.as_deref());
    fill(&mut journal.lang, container.lang.as_deref());
    fill(&mut journal.country, container.country.as_deref());
    journal.release_count = container.release_count;
    journal.ia_count = container.ia_count;
    journal.ia_frac = container.ia_frac;
    journal.preserved_count = container.preserved_count;
    journal.preserved_frac = container.preserved_frac;
}

fn apply_directory(journal: &mut JournalSummary, row: &DirectoryRow) {
    let slug = row.slug.as_str();
    if DOI_SOURCES.contains(&slug) {
        journal.has_dois = true;
    }
    if OA_SOURCES.contains(&slug) {
        journal.is_oa = true;
    }
    if slug == WIKIDATA {
        match row.identifier.as_deref() {
            Some(qid) if is_wikidata_qid(qid) => journal.wikidata_qid = Some(qid.to_string()),
            Some(qid) => {
                warn!(issnl = %row.issnl, value = qid, "Dropping malformed wikidata QID");
                SummarizeMetrics::record_dropped_identifier("wikidata_qid");
            }
            None => {}
        }
    }

    let attrs = &row.attributes;
    fill(&mut journal.name, row.name.as_deref());
    fill(&mut journal.country, attrs.country.as_deref());
    fill(&mut journal.lang, attrs.lang());
    fill(&mut journal.issne, attrs.issne.as_deref());
    fill(&mut journal.issnp, attrs.issnp.as_deref());
    fill(&mut journal.publisher, attrs.publisher.as_deref());

    if let Some(facts) = &attrs.facts {
        if facts.has_oa_color() {
            journal.is_oa = true;
        }
        if slug == SHERPA_ROMEO {
            journal.sherpa_color = facts.color().map(str::to_string);
        }
    }
}

fn apply_homepage(journal: &mut JournalSummary, homepage: &HomepageRow) {
    journal.any_homepage = true;
    if homepage.terminal_status_code == Some(200)
        && homepage.host.as_deref() != Some(WEB_ARCHIVE_HOST)
    {
        journal.any_live_homepage = true;
    }
    if homepage.has_archive_capture() {
        journal.any_gwb_homepage = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DOAJ, ROAD};
    use crate::directory::{DirectoryRecord, SherpaRomeoFacts, SourceFacts};
    use crate::identity::HomepageUrl;
    use crate::storage::{test_db, CrawlStatus};
    use std::io::Cursor;

    fn map() -> IssnMap {
        IssnMap::from_reader(Cursor::new(
            "0140-6736\t0140-6736\n1474-547X\t0140-6736\n0028-0836\t0028-0836\n",
        ))
        .unwrap()
    }

    fn record(slug: &str, issnl: &str) -> DirectoryRecord {
        let mut record = DirectoryRecord::new(slug);
        record.issnl = Some(issnl.to_string());
        record
    }

    #[test]
    fn test_priority_order_fills_gaps() {
        let db = test_db();
        let map = map();
        let mut old = record(ROAD, "0140-6736");
        old.name = Some("Old Name".to_string());
        old.country = Some("us".to_string());
        db.insert_directory(&map, old).unwrap();

        let mut new = record(DOAJ, "0140-6736");
        new.name = Some("New Name".to_string());
        db.insert_directory(&map, new).unwrap();

        let summarizer = Summarizer::new(vec![DOAJ.to_string(), ROAD.to_string()]);
        let journal = summarizer.summarize_one(&db, &map, "0140-6736").unwrap();
        assert_eq!(journal.name.as_deref(), Some("New Name"));
        assert_eq!(journal.country.as_deref(), Some("us"));
        assert!(journal.is_oa);
        assert!(journal.known_issnl);
        assert!(journal.valid_issnl);
        assert_eq!(journal.publisher_type.as_deref(), Some("longtail"));
        assert!(journal.is_longtail);
    }

    #[test]
    fn test_container_comes_first() {
        let db = test_db();
        let map = map();
        db.upsert_container(&ContainerRow {
            ident: "aaa".to_string(),
            revision: "r1".to_string(),
            issnl: Some("0028-0836".to_string()),
            name: Some("Nature".to_string()),
            ..Default::default()
        })
        .unwrap();
        let mut rec = record(DOAJ, "0028-0836");
        rec.name = Some("nature (london)".to_string());
        rec.publisher = Some("Springer Nature".to_string());
        db.insert_directory(&map, rec).unwrap();

        let journal = Summarizer::new(vec![]).summarize_one(&db, &map, "0028-0836").unwrap();
        assert_eq!(journal.name.as_deref(), Some("Nature"));
        assert_eq!(journal.container_ident.as_deref(), Some("aaa"));
        assert_eq!(journal.publisher_type.as_deref(), Some("big5"));
        assert!(!journal.is_longtail);
    }

    #[test]
    fn test_blank_container_fields_do_not_block_directory() {
        let db = test_db();
        let map = map();
        db.upsert_container(&ContainerRow {
            ident: "ccc".to_string(),
            revision: "r1".to_string(),
            issnl: Some("0028-0836".to_string()),
            name: Some("Nature".to_string()),
            publisher: Some("".to_string()),
            country: Some("  ".to_string()),
            ..Default::default()
        })
        .unwrap();
        let mut rec = record(DOAJ, "0028-0836");
        rec.publisher = Some("Elsevier".to_string());
        rec.country = Some("gb".to_string());
        db.insert_directory(&map, rec).unwrap();

        let journal = Summarizer::new(vec![]).summarize_one(&db, &map, "0028-0836").unwrap();
        assert_eq!(journal.name.as_deref(), Some("Nature"));
        assert_eq!(journal.publisher.as_deref(), Some("Elsevier"));
        assert_eq!(journal.country.as_deref(), Some("gb"));
        assert_eq!(journal.publisher_type.as_deref(), Some("big5"));
    }

    #[test]
    fn test_sherpa_color_and_bad_issne() {
        let db = test_db();
        let map = map();
        let mut rec = record(SHERPA_ROMEO, "0140-6736");
        rec.facts = Some(SourceFacts::SherpaRomeo(SherpaRomeoFacts {
            color: "green".to_string(),
        }));
        db.insert_directory(&map, rec).unwrap();
        db.upsert_container(&ContainerRow {
            ident: "bbb".to_string(),
            revision: "r1".to_string(),
            issnl: Some("0140-6736".to_string()),
            issne: Some("NA".to_string()),
            ..Default::default()
        })
        .unwrap();

        let journal = Summarizer::new(vec![]).summarize_one(&db, &map, "0140-6736").unwrap();
        assert_eq!(journal.sherpa_color.as_deref(), Some("green"));
        assert!(journal.is_oa);
        assert_eq!(journal.issne, None);
    }

    #[test]
    fn test_homepage_flags() {
        let db = test_db();
        let map = map();
        let live = HomepageUrl::from_url("http://www.thelancet.com/").unwrap();
        let archived =
            HomepageUrl::from_url("https://web.archive.org/web/2010/http://lancet.com/").unwrap();
        let mut rec = record(ROAD, "0140-6736");
        rec.homepage_urls = vec![live.clone(), archived.clone()];
        db.insert_directory(&map, rec).unwrap();
        db.update_homepage_status(&CrawlStatus {
            url: archived.url.clone(),
            terminal_status_code: Some(200),
            ..Default::default()
        })
        .unwrap();

        let journal = Summarizer::new(vec![]).summarize_one(&db, &map, "0140-6736").unwrap();
        assert!(journal.any_homepage);
        assert!(!journal.any_live_homepage);
        assert!(!journal.any_gwb_homepage);

        db.update_homepage_status(&CrawlStatus {
            url: live.url.clone(),
            terminal_status_code: Some(200),
            gwb_url_success_dt: Some("20190101000000".to_string()),
            ..Default::default()
        })
        .unwrap();
        let journal = Summarizer::new(vec![]).summarize_one(&db, &map, "0140-6736").unwrap();
        assert!(journal.any_live_homepage);
        assert!(journal.any_gwb_homepage);
    }

    #[test]
    fn test_summarize_replaces_previous_run() {
        let db = test_db();
        let map = map();
        db.insert_directory(&map, record(DOAJ, "0140-6736")).unwrap();
        let summarizer = Summarizer::new(vec![]);
        assert_eq!(summarizer.summarize(&db, &map).unwrap().total, 1);
        let counts = summarizer.summarize(&db, &map).unwrap();
        assert_eq!(counts.total, 1);
        assert_eq!(db.journals().unwrap().len(), 1);
    }
}
