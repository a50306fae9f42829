//! Output surfaces: flat summary rows, nested catalog records, and the URL
//! list fed to the homepage crawler.

use serde::Serialize;
use std::fmt;
use std::io::Write;
use tracing::{debug, info, warn};

use crate::constants::{DOAJ, EZB, SZCZEPANSKI};
use crate::directory::{DoajFacts, SourceFacts};
use crate::error::Result;
use crate::identity::homepage::{NON_HOMEPAGE_HOSTS, NON_HOMEPAGE_PATHS};
use crate::storage::{CatalogDb, HomepageRow, JournalSummary};

/// Hosts that aggregate journals; their pages are never a journal homepage
const AGGREGATOR_MARKERS: &[&str] = &[
    "://doaj.org/",
    "://www.doaj.org/",
    "://www.ncbi.nlm.nih.gov/",
];

const WAYBACK_PREFIX: &str = "web.archive.org/web";

/// One JSON object per summary row
pub fn export_journals<W: Write>(db: &CatalogDb, mut writer: W) -> Result<usize> {
    let mut total = 0;
    for journal in db.journals()? {
        serde_json::to_writer(&mut writer, &journal)?;
        writer.write_all(b"\n")?;
        total += 1;
    }
    writer.flush()?;
    info!(total, "Exported journal summaries");
    Ok(total)
}

/// `issnl<TAB>url` per homepage row
pub fn export_urls<W: Write>(db: &CatalogDb, writer: W) -> Result<usize> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    let mut total = 0;
    for (issnl, url) in db.homepage_urls()? {
        if url.split_whitespace().count() != 1 {
            warn!(%issnl, %url, "Skipping URL with whitespace");
            continue;
        }
        out.write_record([issnl.as_str(), url.as_str()])?;
        total += 1;
    }
    out.flush()?;
    info!(total, "Exported homepage URLs");
    Ok(total)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub total: usize,
    pub exported: usize,
    pub empty_name: usize,
    pub short_name: usize,
}

impl fmt::Display for CatalogCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} exported={} empty-name={} short-name={}",
            self.total, self.exported, self.empty_name, self.short_name
        )
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogRecord {
    pub issnl: String,
    pub wikidata_qid: Option<String>,
    pub ident: Option<String>,
    pub publisher: Option<String>,
    pub name: String,
    #[serde(rename = "_known_issnl")]
    pub known_issnl: bool,
    pub extra: CatalogExtra,
}

#[derive(Debug, Default, Serialize)]
pub struct CatalogExtra {
    pub issnp: Option<String>,
    pub issne: Option<String>,
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sherpa_romeo: Option<ColorRef>,
    pub urls: Vec<String>,
    pub webarchive_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ezb: Option<EzbRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub szczepanski: Option<AsOfRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doaj: Option<DoajFacts>,
}

#[derive(Debug, Serialize)]
pub struct ColorRef {
    pub color: String,
}

#[derive(Debug, Serialize)]
pub struct EzbRef {
    pub ezb_id: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AsOfRef {
    pub as_of: Option<chrono::NaiveDate>,
}

/// Where a stored homepage ends up in a catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPlacement {
    Homepage(String),
    Archive(String),
    /// Archived copies are also usable as homepages
    Both(String),
    Skip(&'static str),
}

/// Decide how one homepage row is exported. `any_live` is whether the
/// journal has any live homepage at all.
pub fn place_url(row: &HomepageRow, any_live: bool) -> UrlPlacement {
    let url = row.url.as_str();
    if AGGREGATOR_MARKERS.iter().any(|m| url.contains(m)) {
        return UrlPlacement::Skip("aggregator");
    }
    if url.contains(WAYBACK_PREFIX) {
        return UrlPlacement::Both(url.to_string());
    }
    if row
        .host
        .as_deref()
        .is_some_and(|h| NON_HOMEPAGE_HOSTS.contains(&h))
    {
        return UrlPlacement::Skip("search-or-book");
    }
    if NON_HOMEPAGE_PATHS.iter().any(|p| url.contains(p)) {
        return UrlPlacement::Skip("oai-endpoint");
    }
    if !any_live {
        if let Some(dt) = row.gwb_url_success_dt.as_deref() {
            return UrlPlacement::Archive(format!("https://web.archive.org/web/{}/{}", dt, url));
        }
    }
    if row.blocked == Some(true) {
        return UrlPlacement::Homepage(url.to_string());
    }
    if row.terminal_status_code == Some(200) {
        return match row.terminal_url.as_deref() {
            Some(terminal) if is_trivial_redirect(url, terminal) => {
                UrlPlacement::Homepage(terminal.to_string())
            }
            _ => UrlPlacement::Homepage(url.to_string()),
        };
    }
    if row.status_code.is_none() {
        return UrlPlacement::Homepage(url.to_string());
    }
    UrlPlacement::Skip("dead")
}

/// http -> https, or an added trailing slash
fn is_trivial_redirect(url: &str, terminal: &str) -> bool {
    terminal == url.replace("http://", "https://") || terminal == format!("{}/", url)
}

fn catalog_record(db: &CatalogDb, journal: JournalSummary, name: String) -> Result<CatalogRecord> {
    let mut extra = CatalogExtra {
        issnp: journal.issnp,
        issne: journal.issne,
        country: journal.country,
        languages: journal.lang.map(|l| vec![l]),
        sherpa_romeo: journal.sherpa_color.map(|color| ColorRef { color }),
        ..Default::default()
    };

    for row in db.homepage_rows(&journal.issnl)? {
        match place_url(&row, journal.any_live_homepage) {
            UrlPlacement::Homepage(url) => extra.urls.push(url),
            UrlPlacement::Archive(url) => extra.webarchive_urls.push(url),
            UrlPlacement::Both(url) => {
                extra.webarchive_urls.push(url.clone());
                extra.urls.push(url);
            }
            UrlPlacement::Skip(reason) => {
                debug!(issnl = %journal.issnl, url = %row.url, reason, "Leaving URL out of catalog")
            }
        }
    }

    for row in db.directory_rows(&journal.issnl)? {
        match (row.slug.as_str(), row.attributes.facts) {
            (EZB, Some(SourceFacts::Ezb(facts))) => {
                extra.ezb = Some(EzbRef {
                    ezb_id: row.identifier,
                    color: facts.ezb_color,
                });
            }
            (SZCZEPANSKI, Some(SourceFacts::Szczepanski(facts))) => {
                extra.szczepanski = Some(AsOfRef { as_of: facts.as_of });
            }
            (DOAJ, Some(SourceFacts::Doaj(facts))) => extra.doaj = Some(facts),
            _ => {}
        }
    }

    let publisher = journal.publisher.and_then(|p| {
        let p = p.trim();
        (!p.is_empty()).then(|| p.to_string())
    });
    Ok(CatalogRecord {
        issnl: journal.issnl,
        wikidata_qid: journal.wikidata_qid,
        ident: journal.container_ident,
        publisher,
        name,
        known_issnl: journal.known_issnl,
        extra,
    })
}

/// Nested catalog records for journals with a checksum-valid ISSN-L and a
/// usable name
pub fn export_catalog<W: Write>(db: &CatalogDb, mut writer: W) -> Result<CatalogCounts> {
    let mut counts = CatalogCounts::default();
    for journal in db.valid_journals()? {
        counts.total += 1;
        let name = match journal.name.as_deref().map(str::trim) {
            None | Some("") => {
                counts.empty_name += 1;
                continue;
            }
            Some(n) if n.chars().count() <= 2 => {
                counts.short_name += 1;
                continue;
            }
            Some(n) => n.to_string(),
        };
        let record = catalog_record(db, journal, name)?;
        serde_json::to_writer(&mut writer, &record)?;
        writer.write_all(b"\n")?;
        counts.exported += 1;
    }
    writer.flush()?;
    info!(%counts, "Exported catalog");
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_db;

    fn homepage(url: &str) -> HomepageRow {
        HomepageRow {
            issnl: "0140-6736".to_string(),
            surt: String::new(),
            url: url.to_string(),
            host: url::Url::parse(url).ok().and_then(|u| u.host_str().map(str::to_string)),
            domain: None,
            suffix: None,
            status_code: None,
            crawl_error: None,
            terminal_url: None,
            terminal_status_code: None,
            terminal_content_type: None,
            platform_software: None,
            issnl_in_body: None,
            blocked: None,
            gwb_url_success_dt: None,
            gwb_terminal_url_success_dt: None,
        }
    }

    #[test]
    fn test_skip_aggregators_and_endpoints() {
        for url in [
            "https://doaj.org/toc/1234-5678",
            "https://www.ncbi.nlm.nih.gov/nlmcatalog/123",
            "https://books.google.com/books?id=abc",
            "http://journal.example.org/oai/request",
        ] {
            assert!(matches!(place_url(&homepage(url), false), UrlPlacement::Skip(_)), "{}", url);
        }
    }

    #[test]
    fn test_archive_urls() {
        let wayback = "https://web.archive.org/web/2010/http:/lancet.com/";
        assert_eq!(
            place_url(&homepage(wayback), true),
            UrlPlacement::Both(wayback.to_string())
        );

        let mut dead = homepage("http://old.example.org/");
        dead.status_code = Some(404);
        dead.gwb_url_success_dt = Some("20150101000000".to_string());
        assert_eq!(
            place_url(&dead, false),
            UrlPlacement::Archive(
                "https://web.archive.org/web/20150101000000/http://old.example.org/".to_string()
            )
        );
        assert_eq!(place_url(&dead, true), UrlPlacement::Skip("dead"));
    }

    #[test]
    fn test_live_and_redirects() {
        let mut row = homepage("http://www.thelancet.com");
        row.status_code = Some(301);
        row.terminal_status_code = Some(200);
        row.terminal_url = Some("https://www.thelancet.com".to_string());
        assert_eq!(
            place_url(&row, true),
            UrlPlacement::Homepage("https://www.thelancet.com".to_string())
        );

        row.terminal_url = Some("https://www.elsevier.com/lancet".to_string());
        assert_eq!(
            place_url(&row, true),
            UrlPlacement::Homepage("http://www.thelancet.com".to_string())
        );

        let never_crawled = homepage("http://new.example.org/");
        assert_eq!(
            place_url(&never_crawled, false),
            UrlPlacement::Homepage("http://new.example.org/".to_string())
        );

        let mut blocked = homepage("http://blocked.example.org/");
        blocked.status_code = Some(403);
        blocked.blocked = Some(true);
        assert!(matches!(place_url(&blocked, true), UrlPlacement::Homepage(_)));
    }

    #[test]
    fn test_catalog_filters_names() {
        let db = test_db();
        for (issnl, name, valid) in [
            ("0140-6736", Some("The Lancet"), true),
            ("0028-0836", Some("Na"), true),
            ("0036-8075", None, true),
            ("1234-5678", Some("Bogus"), false),
        ] {
            let mut j = JournalSummary::new(issnl);
            j.name = name.map(str::to_string);
            j.valid_issnl = valid;
            j.lang = Some("en".to_string());
            db.upsert_journal(&j).unwrap();
        }

        let mut out = Vec::new();
        let counts = export_catalog(&db, &mut out).unwrap();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.exported, 1);
        assert_eq!(counts.short_name, 1);
        assert_eq!(counts.empty_name, 1);

        let line: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(line["name"], "The Lancet");
        assert_eq!(line["_known_issnl"], false);
        assert_eq!(line["extra"]["languages"][0], "en");
        assert!(line["extra"]["urls"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_export_journals_and_urls() {
        let db = test_db();
        db.upsert_journal(&JournalSummary::new("0140-6736")).unwrap();
        let homepage = crate::identity::HomepageUrl::from_url("http://www.thelancet.com/").unwrap();
        db.insert_homepage("0140-6736", &homepage).unwrap();

        let mut out = Vec::new();
        assert_eq!(export_journals(&db, &mut out).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().starts_with("{\"issnl\":\"0140-6736\""));

        let mut out = Vec::new();
        assert_eq!(export_urls(&db, &mut out).unwrap(), 1);
        assert_eq!(String::from_utf8(out).unwrap(), "0140-6736\thttp://www.thelancet.com/\n");
    }
}
