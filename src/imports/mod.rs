//! Importers for files that annotate journals rather than list them:
//! authority containers, their release statistics, and homepage crawl results.

pub mod containers;
pub mod crawl_status;

pub use containers::{load_container_stats, load_containers};
pub use crawl_status::load_homepage_status;

use std::fmt;

/// Tallies for one import file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportCounts {
    pub total: usize,
    pub updated: usize,
    /// Rows that matched nothing already stored
    pub unmatched: usize,
    /// Unreadable or filtered rows
    pub skipped: usize,
}

impl fmt::Display for ImportCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} updated={} unmatched={} skipped={}",
            self.total, self.updated, self.unmatched, self.skipped
        )
    }
}
