use std::path::PathBuf;

use super::{csv_rows, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::ROAD;
use crate::directory::DirectoryRecord;
use crate::error::Result;
use crate::text::{clean_str, parse_lang};

/// ROAD (Directory of Open Access Scholarly Resources) headerless TSV.
///
/// Columns: ISSN, ISSN-L, short title, title, publisher, URL1, URL2,
/// region, lang1, lang2.
pub struct RoadLoader {
    path: PathBuf,
}

impl RoadLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn column(row: &[String], idx: usize) -> Option<&str> {
    row.get(idx).map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl DirectoryLoader for RoadLoader {
    const SLUG: &'static str = ROAD;
    type Row = Vec<String>;

    fn open(&mut self) -> Result<RowIter<Vec<String>>> {
        csv_rows(&self.path, CsvFormat::TSV.without_headers())
    }

    fn parse_record(&self, row: Vec<String>) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(ROAD);
        record.raw_issn = column(&row, 1).map(str::to_string);
        record.name = clean_str(column(&row, 2));
        record.publisher = clean_str(column(&row, 4));
        for idx in [8, 9] {
            if let Some(lang) = column(&row, idx).and_then(parse_lang) {
                if !record.langs.contains(&lang) {
                    record.langs.push(lang);
                }
            }
        }
        record.add_homepage(column(&row, 5));
        record.add_homepage(column(&row, 6));
        Some(record)
    }
}
