use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use super::{csv_rows, non_empty, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::SIM;
use crate::directory::{DirectoryRecord, SimFacts, SourceFacts};
use crate::error::Result;
use crate::spans::gaps_to_spans;
use crate::text::{clean_str, parse_lang};

/// Serials in Microfilm catalog; coverage is first/last year minus gaps
pub struct SimLoader {
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct SimRow {
    #[serde(rename = "NA Pub Cat ID")]
    pub_cat_id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
    #[serde(rename = "Publisher")]
    publisher: Option<String>,
    #[serde(rename = "ISSN")]
    issn: Option<String>,
    #[serde(rename = "First Volume")]
    first_volume: Option<String>,
    #[serde(rename = "Last Volume")]
    last_volume: Option<String>,
    #[serde(rename = "NA Gaps")]
    gaps: Option<String>,
    #[serde(rename = "Scholarly / Peer-\nReviewed")]
    scholarly_peer_reviewed: Option<String>,
    #[serde(rename = "Peer-\nReviewed")]
    peer_reviewed: Option<String>,
    #[serde(rename = "Pub Type")]
    pub_type: Option<String>,
    #[serde(rename = "Pub Language")]
    language: Option<String>,
}

impl SimLoader {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn truthy(raw: Option<&str>) -> Option<bool> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("y") => Some(true),
        Some("n") => Some(false),
        _ => None,
    }
}

fn year(raw: Option<&str>) -> Option<i32> {
    let raw = raw?.trim();
    match raw.parse() {
        Ok(y) => Some(y),
        Err(_) => {
            debug!(value = raw, "Unparseable SIM year");
            None
        }
    }
}

impl DirectoryLoader for SimLoader {
    const SLUG: &'static str = SIM;
    type Row = SimRow;

    fn open(&mut self) -> Result<RowIter<SimRow>> {
        csv_rows(&self.path, CsvFormat::CSV)
    }

    fn parse_record(&self, row: SimRow) -> Option<DirectoryRecord> {
        let issn = row.issn.as_deref().map(str::trim).filter(|s| *s != "NULL")?;

        let first_year = year(row.first_volume.as_deref());
        let last_year = year(row.last_volume.as_deref());
        let gaps: Vec<i32> = row
            .gaps
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .filter_map(|g| g.trim().parse().ok())
            .collect();
        let year_spans = match (first_year, last_year) {
            (Some(first), Some(last)) => gaps_to_spans(first, last, &gaps),
            _ => Vec::new(),
        };

        let mut record = DirectoryRecord::new(SIM);
        record.raw_issn = Some(issn.chars().take(9).collect());
        record.custom_id = non_empty(row.pub_cat_id.as_deref());
        record.name = clean_str(row.title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        record.langs.extend(row.language.as_deref().and_then(parse_lang));
        record.facts = Some(SourceFacts::Sim(SimFacts {
            first_year,
            last_year,
            gaps,
            year_spans,
            scholarly_peer_reviewed: truthy(row.scholarly_peer_reviewed.as_deref()),
            peer_reviewed: truthy(row.peer_reviewed.as_deref()),
            pub_type: clean_str(row.pub_type.as_deref()),
        }));
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spans::YearSpan;

    #[test]
    fn test_reads_multiline_headers_and_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.csv");
        std::fs::write(
            &path,
            "NA Pub Cat ID,Title,Publisher,ISSN,First Volume,Last Volume,NA Gaps,\"Scholarly / Peer-\nReviewed\",\"Peer-\nReviewed\",Pub Type,Pub Language\n\
             8675,Bulletin of Things,Thing Society,0140-6736 (print),1950,1970,1955;1956;1965,Y,N,Journal,English\n\
             8676,No ISSN,Nobody,NULL,,,,,,,\n",
        )
        .unwrap();

        let mut loader = SimLoader::new(path);
        let rows: Vec<SimRow> = loader.open().unwrap().collect::<Result<_>>().unwrap();
        let records: Vec<_> = rows.into_iter().filter_map(|r| loader.parse_record(r)).collect();
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(rec.raw_issn.as_deref(), Some("0140-6736"));
        assert_eq!(rec.langs, vec!["en".to_string()]);
        let Some(SourceFacts::Sim(facts)) = &rec.facts else {
            panic!("expected sim facts");
        };
        assert_eq!(
            facts.year_spans,
            vec![YearSpan(1950, 1954), YearSpan(1957, 1964), YearSpan(1966, 1970)]
        );
        assert_eq!(facts.scholarly_peer_reviewed, Some(true));
        assert_eq!(facts.peer_reviewed, Some(false));
    }
}
