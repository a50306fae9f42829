use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, info};

use super::{csv_rows, CsvFormat, DirectoryLoader, Encoding, RowIter};
use crate::constants::SHERPA_ROMEO;
use crate::directory::{DirectoryRecord, SherpaRomeoFacts, SourceFacts};
use crate::error::Result;
use crate::text::{clean_str, parse_country};

/// SHERPA/RoMEO journal list joined with its publisher policy list
pub struct SherpaRomeoLoader {
    journals_path: PathBuf,
    policies_path: PathBuf,
    policies: HashMap<String, SherpaPolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SherpaPolicy {
    #[serde(rename = "RoMEO Record ID")]
    record_id: String,
    #[serde(rename = "Publisher")]
    publisher: Option<String>,
    #[serde(rename = "Country")]
    country: Option<String>,
    #[serde(rename = "RoMEO colour")]
    color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SherpaJournalRow {
    #[serde(rename = "Journal Title")]
    title: Option<String>,
    #[serde(rename = "ISSN")]
    issn: Option<String>,
    #[serde(rename = "ESSN")]
    essn: Option<String>,
    #[serde(rename = "RoMEO Record ID")]
    record_id: Option<String>,
}

impl SherpaRomeoLoader {
    pub fn new(journals_path: PathBuf, policies_path: PathBuf) -> Self {
        Self {
            journals_path,
            policies_path,
            policies: HashMap::new(),
        }
    }
}

impl DirectoryLoader for SherpaRomeoLoader {
    const SLUG: &'static str = SHERPA_ROMEO;
    type Row = SherpaJournalRow;

    fn open(&mut self) -> Result<RowIter<SherpaJournalRow>> {
        let lossy = CsvFormat::CSV.encoding(Encoding::Utf8Lossy);
        self.policies.clear();
        for policy in csv_rows::<SherpaPolicy>(&self.policies_path, lossy)? {
            let policy = policy?;
            self.policies.insert(policy.record_id.clone(), policy);
        }
        info!("Loaded {} SHERPA/RoMEO policies", self.policies.len());
        csv_rows(&self.journals_path, lossy)
    }

    fn parse_record(&self, row: SherpaJournalRow) -> Option<DirectoryRecord> {
        let mut record = DirectoryRecord::new(SHERPA_ROMEO);
        record.issnp = row.issn;
        record.issne = row.essn;
        record.name = clean_str(row.title.as_deref());

        let policy = row.record_id.as_deref().and_then(|id| self.policies.get(id));
        match policy {
            Some(policy) => {
                record.publisher = clean_str(policy.publisher.as_deref());
                record.country = policy.country.as_deref().and_then(parse_country);
                record.facts = policy
                    .color
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(|color| {
                        SourceFacts::SherpaRomeo(SherpaRomeoFacts {
                            color: color.to_string(),
                        })
                    });
            }
            None => debug!(record_id = ?row.record_id, "No SHERPA/RoMEO policy for journal"),
        }
        record.custom_id = row.record_id;
        Some(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_join() {
        let dir = tempfile::tempdir().unwrap();
        let journals = dir.path().join("journals.csv");
        let policies = dir.path().join("policies.csv");
        std::fs::write(
            &policies,
            "RoMEO Record ID,Publisher,Policy Heading,Country,RoMEO colour\n\
             11,Elsevier,,Netherlands,green\n",
        )
        .unwrap();
        std::fs::write(
            &journals,
            "Journal Title,ISSN,ESSN,URL,RoMEO Record ID,Updated\n\
             The Lancet,0140-6736,1474-547X,,11,\n\
             Orphan,1234-5678,,,99,\n",
        )
        .unwrap();

        let mut loader = SherpaRomeoLoader::new(journals, policies);
        let rows: Vec<_> = loader.open().unwrap().collect::<Result<_>>().unwrap();
        let mut records = rows.into_iter().filter_map(|r| loader.parse_record(r));

        let lancet = records.next().unwrap();
        assert_eq!(lancet.publisher.as_deref(), Some("Elsevier"));
        assert_eq!(lancet.country.as_deref(), Some("nl"));
        assert!(lancet.facts.unwrap().has_oa_color());

        let orphan = records.next().unwrap();
        assert_eq!(orphan.custom_id.as_deref(), Some("99"));
        assert!(orphan.facts.is_none());
    }
}
