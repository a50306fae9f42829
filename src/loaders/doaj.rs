use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::debug;

use super::{csv_rows, CsvFormat, DirectoryLoader, RowIter};
use crate::constants::DOAJ;
use crate::directory::{DirectoryRecord, DoajFacts, SourceFacts};
use crate::error::Result;
use crate::text::{clean_str, parse_country, parse_lang, parse_mimetypes, parse_platform};

/// Directory of Open Access Journals CSV export
pub struct DoajLoader {
    path: PathBuf,
    as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct DoajRow {
    #[serde(rename = "Journal title")]
    title: Option<String>,
    #[serde(rename = "Journal URL")]
    url: Option<String>,
    #[serde(rename = "Journal ISSN (print version)")]
    issnp: Option<String>,
    #[serde(rename = "Journal EISSN (online version)")]
    issne: Option<String>,
    #[serde(rename = "Publisher")]
    publisher: Option<String>,
    #[serde(rename = "Platform, host or aggregator")]
    platform: Option<String>,
    #[serde(rename = "Country of publisher")]
    country: Option<String>,
    #[serde(rename = "Full text language")]
    language: Option<String>,
    #[serde(rename = "Full text formats")]
    formats: Option<String>,
    #[serde(rename = "DOAJ Seal")]
    seal: Option<String>,
    #[serde(rename = "Digital archiving policy or program(s)")]
    archiving: Option<String>,
    #[serde(rename = "Archiving: national library")]
    national_library: Option<String>,
    #[serde(rename = "Journal full-text crawl permission")]
    crawl_permission: Option<String>,
    #[serde(rename = "Journal license")]
    license: Option<String>,
}

impl DoajLoader {
    pub fn new(path: PathBuf, as_of: Option<NaiveDate>) -> Self {
        Self { path, as_of }
    }
}

fn yes_no(raw: Option<&str>) -> Option<bool> {
    match raw.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("yes") => Some(true),
        Some("no") => Some(false),
        Some(other) if !other.is_empty() => {
            debug!(value = other, "Unexpected yes/no value");
            None
        }
        _ => None,
    }
}

impl DirectoryLoader for DoajLoader {
    const SLUG: &'static str = DOAJ;
    type Row = DoajRow;

    fn open(&mut self) -> Result<RowIter<DoajRow>> {
        csv_rows(&self.path, CsvFormat::CSV)
    }

    fn parse_record(&self, row: DoajRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(DOAJ);
        record.issnp = row.issnp;
        record.issne = row.issne;
        record.name = clean_str(row.title.as_deref());
        record.publisher = clean_str(row.publisher.as_deref());
        record.platform = row.platform.as_deref().and_then(parse_platform);
        record.country = row.country.as_deref().and_then(parse_country);
        record.langs.extend(row.language.as_deref().and_then(parse_lang));

        let archive = match (row.archiving.as_deref(), row.national_library.as_deref()) {
            (Some(programs), _) => programs
                .split(',')
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect(),
            (None, Some(_)) => vec!["national-library".to_string()],
            (None, None) => Vec::new(),
        };
        let default_license = row
            .license
            .as_deref()
            .filter(|l| l.starts_with("CC"))
            .map(|l| l.replace("CC ", "CC-").trim().to_string());

        record.facts = Some(SourceFacts::Doaj(DoajFacts {
            as_of: self.as_of,
            seal: yes_no(row.seal.as_deref()),
            mimetypes: row.formats.as_deref().and_then(parse_mimetypes),
            archive,
            crawl_permission: yes_no(row.crawl_permission.as_deref()),
            default_license,
        }));

        record.add_homepage(row.url.as_deref());
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> DoajRow {
        DoajRow {
            title: Some("Revista de Biología Tropical".to_string()),
            url: Some("www.revistas.ucr.ac.cr/index.php/rbt".to_string()),
            issnp: Some("0034-7744".to_string()),
            issne: Some("2215-2075".to_string()),
            publisher: Some("Universidad de Costa Rica".to_string()),
            platform: Some("OJS".to_string()),
            country: Some("Costa Rica".to_string()),
            language: Some("Spanish".to_string()),
            formats: Some("PDF".to_string()),
            seal: Some("No".to_string()),
            archiving: None,
            national_library: Some("Yes".to_string()),
            crawl_permission: Some("Yes".to_string()),
            license: Some("CC BY".to_string()),
        }
    }

    #[test]
    fn test_parse_record() {
        let as_of = NaiveDate::from_ymd_opt(2019, 12, 21);
        let rec = DoajLoader::new(PathBuf::new(), as_of)
            .parse_record(row())
            .unwrap();
        assert_eq!(rec.country.as_deref(), Some("cr"));
        assert_eq!(rec.langs, vec!["es".to_string()]);
        assert_eq!(rec.platform.as_deref(), Some("ojs"));
        assert_eq!(rec.homepage_urls.len(), 1);
        assert_eq!(
            rec.homepage_urls[0].url,
            "http://www.revistas.ucr.ac.cr/index.php/rbt"
        );

        let Some(SourceFacts::Doaj(facts)) = rec.facts else {
            panic!("expected doaj facts");
        };
        assert_eq!(facts.as_of, as_of);
        assert_eq!(facts.seal, Some(false));
        assert_eq!(facts.crawl_permission, Some(true));
        assert_eq!(facts.archive, vec!["national-library".to_string()]);
        assert_eq!(facts.default_license.as_deref(), Some("CC-BY"));
        assert_eq!(facts.mimetypes, Some(vec!["application/pdf".to_string()]));
    }
}
