use serde::Deserialize;
use std::path::PathBuf;

use super::{csv_rows, CsvFormat, DirectoryLoader, Encoding, RowIter};
use crate::constants::GOLD_OA;
use crate::directory::{DirectoryRecord, GoldOaFacts, SourceFacts};
use crate::error::Result;
use crate::text::clean_str;

/// ISSN-GOLD-OA list (Latin-1 CSV) with per-index membership flags
pub struct GoldOaLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct GoldOaRow {
    #[serde(rename = "ISSN_L")]
    issn_l: Option<String>,
    #[serde(rename = "TITLE")]
    title: Option<String>,
    #[serde(rename = "JOURNAL_IN_DOAJ")]
    in_doaj: Option<String>,
    #[serde(rename = "JOURNAL_IN_ROAD")]
    in_road: Option<String>,
    #[serde(rename = "JOURNAL_IN_PMC")]
    in_pmc: Option<String>,
    #[serde(rename = "JOURNAL_IN_OAPC")]
    in_oapc: Option<String>,
    #[serde(rename = "JOURNAL_IN_WOS")]
    in_wos: Option<String>,
    #[serde(rename = "JOURNAL_IN_SCOPUS")]
    in_scopus: Option<String>,
}

impl GoldOaLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn flag(raw: &Option<String>) -> bool {
    raw.as_deref()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map_or(false, |v| v != 0)
}

impl DirectoryLoader for GoldOaLoader {
    const SLUG: &'static str = GOLD_OA;
    type Row = GoldOaRow;

    fn open(&mut self) -> Result<RowIter<GoldOaRow>> {
        csv_rows(&self.path, CsvFormat::CSV.encoding(Encoding::Latin1))
    }

    fn parse_record(&self, row: GoldOaRow) -> Option<DirectoryRecord> {
        if row.issn_l.is_none() || row.title.is_none() {
            return None;
        }
        let mut record = DirectoryRecord::new(GOLD_OA);
        record.facts = Some(SourceFacts::GoldOa(GoldOaFacts {
            in_doaj: flag(&row.in_doaj),
            in_road: flag(&row.in_road),
            in_pmc: flag(&row.in_pmc),
            in_oapc: flag(&row.in_oapc),
            in_wos: flag(&row.in_wos),
            in_scopus: flag(&row.in_scopus),
        }));
        record.raw_issn = row.issn_l;
        record.name = clean_str(row.title.as_deref());
        Some(record)
    }
}
