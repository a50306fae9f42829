use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::OPENAPC;
use crate::directory::{DirectoryRecord, OpenApcFacts, SourceFacts};
use crate::error::Result;
use crate::text::clean_str;

/// OpenAPC article charges; one row per article, so most rows are duplicates
pub struct OpenApcLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct OpenApcRow {
    is_hybrid: Option<String>,
    publisher: Option<String>,
    journal_full_title: Option<String>,
    issn: Option<String>,
    issn_print: Option<String>,
    issn_electronic: Option<String>,
    issn_l: Option<String>,
    url: Option<String>,
}

impl OpenApcLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectoryLoader for OpenApcLoader {
    const SLUG: &'static str = OPENAPC;
    type Row = OpenApcRow;

    fn open(&mut self) -> Result<RowIter<OpenApcRow>> {
        csv_rows(&self.path, CsvFormat::CSV)
    }

    fn parse_record(&self, row: OpenApcRow) -> Option<DirectoryRecord> {
        row.issn.as_ref()?;
        let mut record = DirectoryRecord::new(OPENAPC);
        record.issne = row.issn_electronic;
        record.issnp = row.issn_print;
        record.raw_issn = row.issn_l.or(row.issn);
        record.name = clean_str(row.journal_full_title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        let is_hybrid = row
            .is_hybrid
            .as_deref()
            .map_or(false, |h| h.trim().eq_ignore_ascii_case("true"));
        record.facts = Some(SourceFacts::OpenApc(OpenApcFacts { is_hybrid }));
        record.add_homepage(row.url.as_deref());
        Some(record)
    }
}
