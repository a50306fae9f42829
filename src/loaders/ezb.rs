use serde::Deserialize;
use std::path::PathBuf;

use super::{json_lines, lenient_string, DirectoryLoader, RowIter};
use crate::constants::EZB;
use crate::directory::{DirectoryRecord, EzbFacts, SourceFacts};
use crate::error::Result;
use crate::text::clean_str;

/// Elektronische Zeitschriftenbibliothek dump, one JSON object per line
pub struct EzbLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct EzbRow {
    #[serde(default, deserialize_with = "lenient_string")]
    ezb_id: Option<String>,
    title: Option<String>,
    #[serde(default)]
    issne: Option<String>,
    #[serde(default)]
    issnp: Option<String>,
    #[serde(default)]
    publisher: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    ezb_color: Option<String>,
    #[serde(default)]
    subjects: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    zdb_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    first_volume: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    first_issue: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    first_year: Option<String>,
    #[serde(default)]
    appearance: Option<String>,
    #[serde(default)]
    costs: Option<String>,
}

impl EzbLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectoryLoader for EzbLoader {
    const SLUG: &'static str = EZB;
    type Row = EzbRow;

    fn open(&mut self) -> Result<RowIter<EzbRow>> {
        json_lines(&self.path)
    }

    fn parse_record(&self, row: EzbRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(EZB);
        record.issne = row.issne;
        record.issnp = row.issnp;
        record.custom_id = row.ezb_id;
        record.name = clean_str(row.title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        record.facts = Some(SourceFacts::Ezb(EzbFacts {
            ezb_color: row.ezb_color.filter(|c| !c.is_empty()),
            subjects: row.subjects,
            keywords: row.keywords,
            zdb_id: row.zdb_id,
            first_volume: row.first_volume,
            first_issue: row.first_issue,
            first_year: row.first_year,
            appearance: row.appearance.filter(|a| !a.is_empty()),
            costs: row.costs.filter(|c| !c.is_empty()),
        }));
        record.add_homepage(row.url.as_deref());
        Some(record)
    }
}
