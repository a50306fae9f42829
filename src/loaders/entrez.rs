use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, non_empty, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::ENTREZ;
use crate::directory::DirectoryRecord;
use crate::error::Result;
use crate::text::clean_str;

/// NCBI Entrez (NLM catalog) journal list
pub struct EntrezLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct EntrezRow {
    #[serde(rename = "JournalTitle")]
    title: Option<String>,
    #[serde(rename = "IsoAbbr")]
    iso_abbr: Option<String>,
    #[serde(rename = "ISSN (Print)")]
    issnp: Option<String>,
    #[serde(rename = "ISSN (Online)")]
    issne: Option<String>,
    #[serde(rename = "NlmId")]
    nlm_id: Option<String>,
}

impl EntrezLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectoryLoader for EntrezLoader {
    const SLUG: &'static str = ENTREZ;
    type Row = EntrezRow;

    fn open(&mut self) -> Result<RowIter<EntrezRow>> {
        csv_rows(&self.path, CsvFormat::CSV)
    }

    fn parse_record(&self, row: EntrezRow) -> Option<DirectoryRecord> {
        if row.issne.is_none() && row.issnp.is_none() {
            return None;
        }
        let mut record = DirectoryRecord::new(ENTREZ);
        record.issne = row.issne;
        record.issnp = row.issnp;
        record.custom_id = non_empty(row.nlm_id.as_deref());
        record.name = clean_str(row.title.as_deref());
        record.abbrev = clean_str(row.iso_abbr.as_deref());
        Some(record)
    }
}
