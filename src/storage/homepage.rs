use rusqlite::{params, Row};
use serde::Deserialize;

use super::CatalogDb;
use crate::error::Result;
use crate::identity::HomepageUrl;

/// One line of output from the homepage crawl tool
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CrawlStatus {
    pub url: String,
    #[serde(default)]
    pub issnl: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default, alias = "error")]
    pub crawl_error: Option<String>,
    #[serde(default)]
    pub terminal_url: Option<String>,
    #[serde(default)]
    pub terminal_status_code: Option<i64>,
    #[serde(default)]
    pub terminal_content_type: Option<String>,
    #[serde(default, alias = "software_platform")]
    pub platform_software: Option<String>,
    #[serde(default)]
    pub issnl_in_body: Option<bool>,
    #[serde(default)]
    pub blocked: Option<bool>,
    #[serde(default)]
    pub gwb_url_success_dt: Option<String>,
    #[serde(default)]
    pub gwb_terminal_url_success_dt: Option<String>,
}

impl CrawlStatus {
    /// The crawl tool writes "error" when the archive lookup itself failed
    pub fn clear_archive_errors(&mut self) {
        for dt in [
            &mut self.gwb_url_success_dt,
            &mut self.gwb_terminal_url_success_dt,
        ] {
            if dt.as_deref() == Some("error") {
                *dt = None;
            }
        }
    }
}

/// A persisted homepage URL with whatever crawl status has been recorded
#[derive(Debug, Clone, PartialEq)]
pub struct HomepageRow {
    pub issnl: String,
    pub surt: String,
    pub url: String,
    pub host: Option<String>,
    pub domain: Option<String>,
    pub suffix: Option<String>,
    pub status_code: Option<i64>,
    pub crawl_error: Option<String>,
    pub terminal_url: Option<String>,
    pub terminal_status_code: Option<i64>,
    pub terminal_content_type: Option<String>,
    pub platform_software: Option<String>,
    pub issnl_in_body: Option<bool>,
    pub blocked: Option<bool>,
    pub gwb_url_success_dt: Option<String>,
    pub gwb_terminal_url_success_dt: Option<String>,
}

impl HomepageRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            issnl: row.get("issnl")?,
            surt: row.get("surt")?,
            url: row.get("url")?,
            host: row.get("host")?,
            domain: row.get("domain")?,
            suffix: row.get("suffix")?,
            status_code: row.get("status_code")?,
            crawl_error: row.get("crawl_error")?,
            terminal_url: row.get("terminal_url")?,
            terminal_status_code: row.get("terminal_status_code")?,
            terminal_content_type: row.get("terminal_content_type")?,
            platform_software: row.get("platform_software")?,
            issnl_in_body: row.get("issnl_in_body")?,
            blocked: row.get("blocked")?,
            gwb_url_success_dt: row.get("gwb_url_success_dt")?,
            gwb_terminal_url_success_dt: row.get("gwb_terminal_url_success_dt")?,
        })
    }

    pub fn has_archive_capture(&self) -> bool {
        self.gwb_url_success_dt.is_some() || self.gwb_terminal_url_success_dt.is_some()
    }
}

const HOMEPAGE_COLUMNS: &str = "issnl, surt, url, host, domain, suffix, status_code, crawl_error, \
     terminal_url, terminal_status_code, terminal_content_type, platform_software, \
     issnl_in_body, blocked, gwb_url_success_dt, gwb_terminal_url_success_dt";

impl CatalogDb {
    /// Record a URL for a journal; the same (issnl, url) pair is replaced
    pub fn insert_homepage(&self, issnl: &str, homepage: &HomepageUrl) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO homepage (issnl, surt, url, host, domain, suffix) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                issnl,
                homepage.surt,
                homepage.url,
                homepage.host,
                homepage.domain,
                homepage.suffix
            ],
        )?;
        Ok(())
    }

    /// Apply a crawl result to every row holding that exact URL.
    /// Returns the number of rows touched.
    pub fn update_homepage_status(&self, status: &CrawlStatus) -> Result<usize> {
        let changed = self.conn().execute(
            "UPDATE homepage SET status_code = ?1, crawl_error = ?2, terminal_url = ?3,
                terminal_status_code = ?4, terminal_content_type = ?5, platform_software = ?6,
                issnl_in_body = ?7, blocked = ?8, gwb_url_success_dt = ?9,
                gwb_terminal_url_success_dt = ?10
             WHERE url = ?11",
            params![
                status.status_code,
                status.crawl_error,
                status.terminal_url,
                status.terminal_status_code,
                status.terminal_content_type,
                status.platform_software,
                status.issnl_in_body,
                status.blocked,
                status.gwb_url_success_dt,
                status.gwb_terminal_url_success_dt,
                status.url
            ],
        )?;
        Ok(changed)
    }

    pub fn homepage_rows(&self, issnl: &str) -> Result<Vec<HomepageRow>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {} FROM homepage WHERE issnl = ?1 ORDER BY id",
            HOMEPAGE_COLUMNS
        ))?;
        let rows = stmt.query_map(params![issnl], HomepageRow::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// (issnl, url) for every homepage row, ordered by canonical id
    pub fn homepage_urls(&self) -> Result<Vec<(String, String)>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT issnl, url FROM homepage ORDER BY issnl, id")?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
