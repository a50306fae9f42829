//! KBART holdings reports from preservation services.
//!
//! A report has one row per coverage interval, so a journal can appear many
//! times. Rows are folded into one record per ISSN-L before anything is
//! inserted.

use chrono::{Datelike, Local};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, info_span, warn};

use super::{csv_rows, CsvFormat, Encoding, IndexSource, LoadCounts, RowIter};
use crate::constants::{CLOCKSS, JSTOR, LOCKSS, PORTICO};
use crate::directory::{DirectoryRecord, KbartFacts, SourceFacts};
use crate::error::Result;
use crate::identity::{clean_issn, IssnMap};
use crate::metrics::IndexMetrics;
use crate::spans::{merge_spans, YearSpan};
use crate::storage::{CatalogDb, InsertOutcome};
use crate::text::clean_str;

pub const KBART_SOURCES: &[&str] = &[CLOCKSS, LOCKSS, PORTICO, JSTOR];

#[derive(Debug, Deserialize)]
pub struct KbartRow {
    publication_title: Option<String>,
    print_identifier: Option<String>,
    online_identifier: Option<String>,
    date_first_issue_online: Option<String>,
    date_last_issue_online: Option<String>,
    title_url: Option<String>,
    publisher_name: Option<String>,
    embargo_info: Option<String>,
}

impl KbartRow {
    /// Coverage years for this row. A first date with no last date means
    /// coverage runs through the current year.
    fn span(&self, current_year: i32) -> Option<YearSpan> {
        let start = year_prefix(self.date_first_issue_online.as_deref())?;
        let end = match self.date_last_issue_online.as_deref() {
            Some(last) => year_prefix(Some(last))?,
            None => current_year,
        };
        Some(YearSpan::observed(start, end))
    }
}

fn year_prefix(raw: Option<&str>) -> Option<i32> {
    let raw = raw?.trim();
    raw.get(..4).and_then(|y| y.parse().ok()).or_else(|| {
        debug!(value = raw, "Unparseable KBART date");
        None
    })
}

fn fill(slot: &mut Option<String>, value: Option<String>) {
    if slot.is_none() {
        *slot = value;
    }
}

pub struct KbartLoader {
    slug: &'static str,
    path: PathBuf,
}

impl KbartLoader {
    pub fn new(slug: &'static str, path: PathBuf) -> Self {
        Self { slug, path }
    }

    fn open(&self) -> Result<RowIter<KbartRow>> {
        csv_rows(&self.path, CsvFormat::TSV.encoding(Encoding::Utf8Lossy))
    }

    /// Fold every row into one record per ISSN-L
    fn accumulate(
        &self,
        rows: RowIter<KbartRow>,
        map: &IssnMap,
        counts: &mut LoadCounts,
    ) -> BTreeMap<String, DirectoryRecord> {
        let current_year = Local::now().year();
        let mut journals: BTreeMap<String, DirectoryRecord> = BTreeMap::new();

        for row in rows {
            counts.total += 1;
            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    warn!(line = counts.total, error = %e, "Skipping unreadable KBART row");
                    counts.skipped += 1;
                    IndexMetrics::record_skipped(self.slug);
                    continue;
                }
            };
            let issnp = row.print_identifier.as_deref().and_then(clean_issn);
            let issne = row.online_identifier.as_deref().and_then(clean_issn);
            if issnp.is_none() && issne.is_none() {
                counts.missing_issn += 1;
                IndexMetrics::record_outcome(self.slug, InsertOutcome::MissingIssn);
                continue;
            }
            let Some(issnl) = map.resolve([issnp.as_deref(), issne.as_deref()]) else {
                counts.no_match += 1;
                IndexMetrics::record_outcome(self.slug, InsertOutcome::NoMatch);
                continue;
            };

            let record = journals.entry(issnl.clone()).or_insert_with(|| {
                let mut record = DirectoryRecord::new(self.slug);
                record.issnl = Some(issnl);
                record.facts = Some(SourceFacts::Kbart(KbartFacts::default()));
                record
            });
            // each field keeps the first non-empty value across rows
            fill(&mut record.issnp, issnp);
            fill(&mut record.issne, issne);
            fill(&mut record.name, clean_str(row.publication_title.as_deref()));
            fill(&mut record.publisher, clean_str(row.publisher_name.as_deref()));
            if record.homepage_urls.is_empty() {
                record.add_homepage(row.title_url.as_deref());
            }

            if let Some(SourceFacts::Kbart(facts)) = record.facts.as_mut() {
                fill(&mut facts.embargo_info, clean_str(row.embargo_info.as_deref()));
                if let Some(span) = row.span(current_year) {
                    facts.year_spans = merge_spans(&facts.year_spans, &[span]);
                }
            }
        }
        journals
    }
}

impl IndexSource for KbartLoader {
    fn source_slug(&self) -> &'static str {
        self.slug
    }

    fn index(&mut self, db: &CatalogDb, map: &IssnMap) -> Result<LoadCounts> {
        let span = info_span!("index", source = self.slug);
        let _enter = span.enter();
        info!("Loading KBART report for {}", self.slug);

        let rows = self.open()?;
        let mut counts = LoadCounts::default();
        let journals = self.accumulate(rows, map, &mut counts);
        info!("{} distinct journals in {} KBART rows", journals.len(), counts.total);

        let counts = db.in_transaction(|db| {
            for record in journals.into_values() {
                let outcome = db.insert_directory(map, record)?;
                counts.record(outcome);
                IndexMetrics::record_outcome(self.slug, outcome);
            }
            Ok(counts)
        })?;

        info!(%counts, "Finished loading {}", self.slug);
        Ok(counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::CatalogDb;
    use std::io::Cursor;

    const HEADER: &str = "publication_title\tprint_identifier\tonline_identifier\tdate_first_issue_online\tnum_first_vol_online\tnum_first_issue_online\tdate_last_issue_online\tnum_last_vol_online\tnum_last_issue_online\ttitle_url\tfirst_author\ttitle_id\tembargo_info\tcoverage_depth\tcoverage_notes\tpublisher_name\n";

    /// Sixteen-column KBART row with only the columns we read filled in
    fn line(
        title: &str,
        print: &str,
        online: &str,
        first: &str,
        last: &str,
        url: &str,
        publisher: &str,
    ) -> String {
        [
            title, print, online, first, "", "", last, "", "", url, "", "", "", "", "", publisher,
        ]
        .join("\t")
    }

    fn map() -> IssnMap {
        IssnMap::from_reader(Cursor::new("0140-6736\t0140-6736\n1474-547X\t0140-6736\n"))
            .unwrap()
    }

    #[test]
    fn test_rows_fold_into_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clockss.tsv");
        let body = [
            line(
                "The Lancet",
                "0140-6736",
                "",
                "1990-01-01",
                "1995-12-31",
                "http://www.thelancet.com",
                "Elsevier",
            ),
            line("Lancet (later)", "", "1474-547X", "1996", "2000", "", "Someone Else"),
            line("Backwards", "1474547x", "", "2010", "2005", "", ""),
            line("No Ids", "", "", "2001", "2002", "", ""),
            line("Unknown", "1234-5678", "", "2001", "2002", "", ""),
        ]
        .join("\n");
        std::fs::write(&path, format!("{}{}\n", HEADER, body)).unwrap();

        let db = CatalogDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        let mut loader = KbartLoader::new(CLOCKSS, path);
        let counts = loader.index(&db, &map()).unwrap();
        assert_eq!(counts.total, 5);
        assert_eq!(counts.inserted, 1);
        assert_eq!(counts.missing_issn, 1);
        assert_eq!(counts.no_match, 1);

        let rows = db.directory_rows("0140-6736").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("The Lancet"));
        assert_eq!(rows[0].attributes.publisher.as_deref(), Some("Elsevier"));
        let facts = rows[0].attributes.facts.as_ref().unwrap();
        assert_eq!(
            facts.year_spans(),
            &[YearSpan(1990, 2000), YearSpan(2005, 2010)]
        );
        assert_eq!(db.homepage_rows("0140-6736").unwrap().len(), 1);
    }

    #[test]
    fn test_later_rows_fill_empty_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portico.tsv");
        let body = [
            line("", "0140-6736", "", "1990", "1991", "", ""),
            line(
                "The Lancet",
                "",
                "1474-547X",
                "1992",
                "1993",
                "http://www.thelancet.com",
                "Elsevier",
            ),
            line("Lancet Again", "", "", "1994", "1995", "http://other.example.org", "Other"),
        ]
        .join("\n");
        std::fs::write(&path, format!("{}{}\n", HEADER, body)).unwrap();

        let db = CatalogDb::open_in_memory().unwrap();
        db.init_schema().unwrap();
        KbartLoader::new(PORTICO, path).index(&db, &map()).unwrap();

        let rows = db.directory_rows("0140-6736").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name.as_deref(), Some("The Lancet"));
        assert_eq!(rows[0].attributes.publisher.as_deref(), Some("Elsevier"));
        assert_eq!(rows[0].attributes.issne.as_deref(), Some("1474-547X"));
        let homepages = db.homepage_rows("0140-6736").unwrap();
        assert_eq!(homepages.len(), 1);
        assert_eq!(homepages[0].host.as_deref(), Some("www.thelancet.com"));
    }

    #[test]
    fn test_open_ended_coverage_runs_to_current_year() {
        let row = KbartRow {
            publication_title: None,
            print_identifier: None,
            online_identifier: None,
            date_first_issue_online: Some("2015-03".to_string()),
            date_last_issue_online: None,
            title_url: None,
            publisher_name: None,
            embargo_info: None,
        };
        assert_eq!(row.span(2024), Some(YearSpan(2015, 2024)));
    }
}
