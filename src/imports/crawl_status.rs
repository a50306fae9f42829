use std::path::Path;
use tracing::{debug, info, info_span, warn};

use super::ImportCounts;
use crate::error::Result;
use crate::loaders::json_lines;
use crate::storage::{CatalogDb, CrawlStatus};

/// Apply homepage crawl results (JSON lines) to every stored row with the same URL
pub fn load_homepage_status(db: &CatalogDb, path: &Path) -> Result<ImportCounts> {
    let span = info_span!("import", kind = "homepage_status");
    let _enter = span.enter();
    info!(path = %path.display(), "Loading homepage crawl results");

    let rows = json_lines::<CrawlStatus>(path)?;
    let counts = db.in_transaction(|db| {
        let mut counts = ImportCounts::default();
        for status in rows {
            counts.total += 1;
            let mut status = match status {
                Ok(status) => status,
                Err(e) => {
                    warn!(line = counts.total, error = %e, "Skipping unreadable crawl status");
                    counts.skipped += 1;
                    continue;
                }
            };
            if status.url.trim().is_empty() {
                counts.skipped += 1;
                continue;
            }
            status.clear_archive_errors();
            if db.update_homepage_status(&status)? == 0 {
                debug!(url = %status.url, "Crawl status for unknown URL");
                counts.unmatched += 1;
            } else {
                counts.updated += 1;
            }
        }
        Ok(counts)
    })?;

    info!(%counts, "Finished loading homepage status");
    Ok(counts)
}
