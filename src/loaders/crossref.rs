use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, non_empty, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::CROSSREF;
use crate::directory::DirectoryRecord;
use crate::error::Result;
use crate::text::clean_str;

/// Crossref title list. Only the first of `additionalIssns` is considered.
pub struct CrossrefLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct CrossrefRow {
    #[serde(rename = "JournalTitle")]
    title: Option<String>,
    #[serde(rename = "Publisher")]
    publisher: Option<String>,
    pissn: Option<String>,
    eissn: Option<String>,
    #[serde(rename = "additionalIssns")]
    additional_issns: Option<String>,
    doi: Option<String>,
}

impl CrossrefLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DirectoryLoader for CrossrefLoader {
    const SLUG: &'static str = CROSSREF;
    type Row = CrossrefRow;

    fn open(&mut self) -> Result<RowIter<CrossrefRow>> {
        csv_rows(&self.path, CsvFormat::CSV)
    }

    fn parse_record(&self, row: CrossrefRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(CROSSREF);
        record.issne = row.eissn;
        record.issnp = row.pissn;
        record.custom_id = non_empty(row.doi.as_deref());
        record.name = clean_str(row.title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        record.raw_issn = row
            .additional_issns
            .as_deref()
            .and_then(|s| s.split([';', ',']).map(str::trim).find(|s| !s.is_empty()))
            .map(str::to_string);
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let row = CrossrefRow {
            title: Some("The Lancet ".to_string()),
            publisher: Some("Elsevier BV".to_string()),
            pissn: Some("01406736".to_string()),
            eissn: None,
            additional_issns: Some("1474-547X; 0000-0000".to_string()),
            doi: Some(" 10.1016/s0140-6736 ".to_string()),
        };
        let rec = CrossrefLoader::new(PathBuf::new()).parse_record(row).unwrap();
        assert_eq!(rec.name.as_deref(), Some("The Lancet"));
        assert_eq!(rec.raw_issn.as_deref(), Some("1474-547X"));
        assert_eq!(rec.custom_id.as_deref(), Some("10.1016/s0140-6736"));
        assert_eq!(rec.issnp.as_deref(), Some("01406736"));
    }
}
