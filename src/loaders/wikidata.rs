use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, non_empty, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::WIKIDATA;
use crate::directory::{DirectoryRecord, SourceFacts, WikidataFacts};
use crate::error::Result;
use crate::text::clean_str;

static QID_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q\d").unwrap());

/// Wikidata SPARQL export (TSV) of items with an ISSN
pub struct WikidataLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct WikidataRow {
    item: Option<String>,
    issn: Option<String>,
    title: Option<String>,
    publisher_name: Option<String>,
    start_year: Option<String>,
    websiteurl: Option<String>,
}

impl WikidataLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Unlabelled publishers come back as a bare QID or a blank node id
fn publisher_label(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() || QID_LABEL.is_match(raw) || raw.starts_with("t1") {
        return None;
    }
    clean_str(Some(raw))
}

impl DirectoryLoader for WikidataLoader {
    const SLUG: &'static str = WIKIDATA;
    type Row = WikidataRow;

    fn open(&mut self) -> Result<RowIter<WikidataRow>> {
        csv_rows(&self.path, CsvFormat::TSV)
    }

    fn parse_record(&self, row: WikidataRow) -> Option<DirectoryRecord> {
        if row.issn.is_none() || row.title.is_none() {
            return None;
        }
        let mut record = DirectoryRecord::new(WIKIDATA);
        record.custom_id = row
            .item
            .as_deref()
            .and_then(|item| item.trim().rsplit('/').next())
            .and_then(|qid| non_empty(Some(qid)));
        record.raw_issn = row.issn;
        record.name = clean_str(row.title.as_deref());
        record.publisher = publisher_label(row.publisher_name.as_deref());
        if let Some(start_year) = non_empty(row.start_year.as_deref()) {
            record.facts = Some(SourceFacts::Wikidata(WikidataFacts {
                start_year: Some(start_year),
            }));
        }
        record.add_homepage(row.websiteurl.as_deref());
        Some(record)
    }
}
