use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

use super::{json_lines, DirectoryLoader, RowIter};
use crate::constants::SZCZEPANSKI;
use crate::directory::{DirectoryRecord, SourceFacts, SzczepanskiFacts};
use crate::error::Result;
use crate::spans::{merge_spans, YearSpan};
use crate::text::clean_str;

/// Jan Szczepanski's list of open access journals, pre-parsed to JSON lines
pub struct SzczepanskiLoader {
    path: PathBuf,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SzczepanskiRow {
    title: Option<String>,
    #[serde(default)]
    issn: Option<String>,
    #[serde(default)]
    issne: Option<String>,
    #[serde(default)]
    issnp: Option<String>,
    #[serde(default)]
    ed: Option<String>,
    #[serde(default)]
    extra: Option<String>,
    #[serde(default)]
    other_titles: Vec<String>,
    #[serde(default)]
    year_spans: Vec<YearSpan>,
    #[serde(default)]
    url: Option<String>,
}

impl SzczepanskiLoader {
    pub fn new(path: PathBuf, as_of: Option<NaiveDate>) -> Self {
        Self { path, as_of }
    }
}

impl DirectoryLoader for SzczepanskiLoader {
    const SLUG: &'static str = SZCZEPANSKI;
    type Row = SzczepanskiRow;

    fn open(&mut self) -> Result<RowIter<SzczepanskiRow>> {
        json_lines(&self.path)
    }

    fn parse_record(&self, row: SzczepanskiRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(SZCZEPANSKI);
        record.issne = row.issne;
        record.issnp = row.issnp;
        record.raw_issn = row.issn;
        record.name = clean_str(row.title.as_deref());
        record.publisher = clean_str(row.ed.as_deref());
        record.facts = Some(SourceFacts::Szczepanski(SzczepanskiFacts {
            as_of: self.as_of,
            notes: row.extra.filter(|n| !n.trim().is_empty()),
            other_titles: row.other_titles,
            // normalize whatever the upstream parser produced
            year_spans: merge_spans(&[], &row.year_spans),
            ed: row.ed.filter(|e| !e.trim().is_empty()),
        }));
        record.add_homepage(row.url.as_deref());
        Some(record)
    }
}
