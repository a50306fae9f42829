use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, non_empty, CsvFormat, DirectoryLoader, Encoding, RowIter};
use crate::constants::NORWEGIAN;
use crate::directory::{DirectoryRecord, NorwegianFacts, SourceFacts};
use crate::error::Result;
use crate::text::{clean_str, parse_country, parse_lang};

/// Norwegian Register for Scientific Journals (Latin-1, `;`-separated)
pub struct NorwegianLoader {
    path: PathBuf,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct NorwegianRow {
    #[serde(rename = "NSD tidsskrift_id")]
    nsd_id: Option<String>,
    #[serde(rename = "Original title")]
    original_title: Option<String>,
    #[serde(rename = "International title")]
    international_title: Option<String>,
    #[serde(rename = "Print ISSN")]
    issnp: Option<String>,
    #[serde(rename = "Online ISSN")]
    issne: Option<String>,
    #[serde(rename = "Level 2019")]
    level: Option<String>,
    #[serde(rename = "Publisher")]
    publisher: Option<String>,
    #[serde(rename = "Country of publication")]
    country: Option<String>,
    #[serde(rename = "Language")]
    language: Option<String>,
    #[serde(rename = "URL")]
    url: Option<String>,
}

impl NorwegianLoader {
    pub fn new(path: PathBuf, as_of: Option<NaiveDate>) -> Self {
        Self { path, as_of }
    }
}

impl DirectoryLoader for NorwegianLoader {
    const SLUG: &'static str = NORWEGIAN;
    type Row = NorwegianRow;

    fn open(&mut self) -> Result<RowIter<NorwegianRow>> {
        csv_rows(
            &self.path,
            CsvFormat::CSV.delimiter(b';').encoding(Encoding::Latin1),
        )
    }

    fn parse_record(&self, row: NorwegianRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(NORWEGIAN);
        record.issnp = row.issnp;
        record.issne = row.issne;
        record.custom_id = non_empty(row.nsd_id.as_deref());
        record.name = clean_str(row.international_title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        record.country = row.country.as_deref().and_then(parse_country);
        record.langs.extend(row.language.as_deref().and_then(parse_lang));
        if row.original_title != row.international_title {
            record.original_name = clean_str(row.original_title.as_deref());
        }
        record.facts = Some(SourceFacts::Norwegian(NorwegianFacts {
            as_of: self.as_of,
            level: row.level.as_deref().and_then(|l| l.trim().parse().ok()),
        }));
        record.add_homepage(row.url.as_deref());
        Some(record)
    }
}
