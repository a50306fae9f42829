//! The common record every source loader produces

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::constants::OA_COLOR;
use crate::error::Result;
use crate::identity::{clean_issn, HomepageUrl, IssnMap};
use crate::spans::YearSpan;

/// One observation of a journal from one directory source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryRecord {
    pub slug: String,
    pub raw_issn: Option<String>,
    pub issnl: Option<String>,
    pub issne: Option<String>,
    pub issnp: Option<String>,
    pub custom_id: Option<String>,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub publisher: Option<String>,
    pub abbrev: Option<String>,
    pub platform: Option<String>,
    pub country: Option<String>,
    pub langs: Vec<String>,
    pub homepage_urls: Vec<HomepageUrl>,
    pub facts: Option<SourceFacts>,
}

impl DirectoryRecord {
    pub fn new(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    /// True if any identifier field is set
    pub fn has_any_issn(&self) -> bool {
        [&self.issnl, &self.raw_issn, &self.issne, &self.issnp]
            .iter()
            .any(|f| f.is_some())
    }

    /// Normalize the identifier fields and resolve the canonical id.
    ///
    /// Returns whether any identifier survived cleaning. `issnl` ends up
    /// `None` when no candidate is in the map, even if one was supplied.
    pub fn canonicalize(&mut self, map: &IssnMap) -> bool {
        self.issnl = self.issnl.as_deref().and_then(clean_issn);
        self.raw_issn = self.raw_issn.as_deref().and_then(clean_issn);
        self.issne = self.issne.as_deref().and_then(clean_issn);
        self.issnp = self.issnp.as_deref().and_then(clean_issn);
        let supplied = self.has_any_issn();

        self.issnl = map.resolve([
            self.issnl.as_deref(),
            self.raw_issn.as_deref(),
            self.issne.as_deref(),
            self.issnp.as_deref(),
        ]);
        supplied
    }

    pub fn add_homepage(&mut self, raw: Option<&str>) {
        if let Some(url) = raw.and_then(HomepageUrl::from_url) {
            if !self.homepage_urls.contains(&url) {
                self.homepage_urls.push(url);
            }
        }
    }

    pub fn attributes(&self) -> DirectoryAttributes {
        DirectoryAttributes {
            issne: self.issne.clone(),
            issnp: self.issnp.clone(),
            name: self.name.clone(),
            original_name: self.original_name.clone(),
            publisher: self.publisher.clone(),
            abbrev: self.abbrev.clone(),
            platform: self.platform.clone(),
            country: self.country.clone(),
            langs: self.langs.clone(),
            facts: self.facts.clone(),
        }
    }

    /// The `extra` column: non-identifier fields as JSON with sorted keys,
    /// or `None` if there is nothing to say.
    pub fn extra_json(&self) -> Result<Option<String>> {
        let attrs = self.attributes();
        if attrs.is_empty() {
            return Ok(None);
        }
        // going through Value sorts keys (serde_json maps are BTreeMaps)
        let value = serde_json::to_value(&attrs)?;
        Ok(Some(serde_json::to_string(&value)?))
    }
}

/// Scalar fields persisted in the directory row's attributes blob
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectoryAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issne: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issnp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbrev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub langs: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facts: Option<SourceFacts>,
}

impl DirectoryAttributes {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// First language listed by the source
    pub fn lang(&self) -> Option<&str> {
        self.langs.first().map(String::as_str)
    }
}

/// Source-specific facts that have no column of their own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum SourceFacts {
    #[serde(rename = "doaj")]
    Doaj(DoajFacts),
    #[serde(rename = "ezb")]
    Ezb(EzbFacts),
    #[serde(rename = "sherpa_romeo")]
    SherpaRomeo(SherpaRomeoFacts),
    #[serde(rename = "szczepanski")]
    Szczepanski(SzczepanskiFacts),
    #[serde(rename = "gold_oa")]
    GoldOa(GoldOaFacts),
    #[serde(rename = "openapc")]
    OpenApc(OpenApcFacts),
    #[serde(rename = "wikidata")]
    Wikidata(WikidataFacts),
    #[serde(rename = "sim")]
    Sim(SimFacts),
    #[serde(rename = "norwegian")]
    Norwegian(NorwegianFacts),
    #[serde(rename = "kbart")]
    Kbart(KbartFacts),
}

impl SourceFacts {
    /// Rights color reported by sources that grade access (EZB, SHERPA/RoMEO)
    pub fn color(&self) -> Option<&str> {
        match self {
            SourceFacts::Ezb(f) => f.ezb_color.as_deref(),
            SourceFacts::SherpaRomeo(f) => Some(f.color.as_str()),
            _ => None,
        }
    }

    pub fn has_oa_color(&self) -> bool {
        self.color() == Some(OA_COLOR)
    }

    pub fn year_spans(&self) -> &[YearSpan] {
        match self {
            SourceFacts::Kbart(f) => &f.year_spans,
            SourceFacts::Sim(f) => &f.year_spans,
            SourceFacts::Szczepanski(f) => &f.year_spans,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoajFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seal: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetypes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub archive: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawl_permission: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_license: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EzbFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ezb_color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zdb_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SherpaRomeoFacts {
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SzczepanskiFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other_titles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub year_spans: Vec<YearSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoldOaFacts {
    pub in_doaj: bool,
    pub in_road: bool,
    pub in_pmc: bool,
    pub in_oapc: bool,
    pub in_wos: bool,
    pub in_scopus: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenApcFacts {
    pub is_hybrid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikidataFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gaps: Vec<i32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub year_spans: Vec<YearSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scholarly_peer_reviewed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peer_reviewed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pub_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NorwegianFacts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_of: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
}

/// Holdings coverage folded across every row of a KBART report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KbartFacts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub year_spans: Vec<YearSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embargo_info: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn map() -> IssnMap {
        IssnMap::from_reader(Cursor::new("0140-6736\t0140-6736\n1474-547X\t0140-6736\n")).unwrap()
    }

    #[test]
    fn test_canonicalize_prefers_existing_issnl() {
        let mut rec = DirectoryRecord::new("doaj");
        rec.issne = Some("1474547x".to_string());
        rec.issnp = Some("NA".to_string());
        assert!(rec.canonicalize(&map()));
        assert_eq!(rec.issnl.as_deref(), Some("0140-6736"));
        assert_eq!(rec.issne.as_deref(), Some("1474-547X"));
        assert_eq!(rec.issnp, None);
    }

    #[test]
    fn test_canonicalize_clears_unknown() {
        let mut rec = DirectoryRecord::new("doaj");
        rec.issnl = Some("1234-5678".to_string());
        assert!(rec.canonicalize(&map()));
        assert_eq!(rec.issnl, None);

        let mut blank = DirectoryRecord::new("doaj");
        blank.issne = Some("  ".to_string());
        blank.issnp = Some("NULL".to_string());
        assert!(!blank.canonicalize(&map()));
    }

    #[test]
    fn test_extra_json_sorted_and_typed() {
        let mut rec = DirectoryRecord::new("sherpa_romeo");
        rec.publisher = Some("Elsevier".to_string());
        rec.country = Some("nl".to_string());
        rec.facts = Some(SourceFacts::SherpaRomeo(SherpaRomeoFacts {
            color: "green".to_string(),
        }));
        let json = rec.extra_json().unwrap().unwrap();
        assert_eq!(
            json,
            r#"{"country":"nl","facts":{"color":"green","source":"sherpa_romeo"},"publisher":"Elsevier"}"#
        );

        let attrs = DirectoryAttributes::from_json(&json).unwrap();
        assert!(attrs.facts.as_ref().unwrap().has_oa_color());
        assert_eq!(attrs.country.as_deref(), Some("nl"));
    }

    #[test]
    fn test_extra_json_empty() {
        assert_eq!(DirectoryRecord::new("crossref").extra_json().unwrap(), None);
    }
}
