//! SQLite-backed catalog store
//!
//! One exclusive connection for the whole batch job. Each source load and
//! the summarize pass run inside [`CatalogDb::in_transaction`].

mod container;
mod directory;
mod homepage;
mod journal;

pub use container::ContainerRow;
pub use directory::DirectoryRow;
pub use homepage::{CrawlStatus, HomepageRow};
pub use journal::JournalSummary;

use rusqlite::Connection;
use std::fmt;
use std::path::Path;
use tracing::info;

use crate::error::Result;

/// Result of one directory insertion attempt; all four are normal outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
    MissingIssn,
    NoMatch,
}

impl InsertOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsertOutcome::Inserted => "inserted",
            InsertOutcome::Duplicate => "duplicate",
            InsertOutcome::MissingIssn => "missing-issn",
            InsertOutcome::NoMatch => "no-match",
        }
    }
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open (or create) the database file. Failure here is fatal for the run.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!(path = %path.display(), "Opening catalog database");
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply pragmas and create all tables
    pub fn init_schema(&self) -> Result<()> {
        info!("Creating catalog schema");
        self.conn.execute_batch(
            r#"
            PRAGMA main.page_size = 4096;
            PRAGMA main.cache_size = 20000;
            PRAGMA main.locking_mode = EXCLUSIVE;
            PRAGMA main.synchronous = OFF;
            "#,
        )?;
        let migration_sql = include_str!("../../migrations/001_catalog_schema.sql");
        self.conn.execute_batch(migration_sql)?;
        Ok(())
    }

    /// Run `f` in one transaction, committing only if it returns `Ok`
    pub fn in_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    /// Every canonical id seen in a directory row or a container row
    pub fn all_issnls(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT issnl FROM directory
             UNION
             SELECT issnl FROM container WHERE issnl IS NOT NULL
             ORDER BY issnl",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut issnls = Vec::new();
        for issnl in rows {
            issnls.push(issnl?);
        }
        Ok(issnls)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> CatalogDb {
    let db = CatalogDb::open_in_memory().unwrap();
    db.init_schema().unwrap();
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;

    #[test]
    fn test_init_schema_is_repeatable() {
        let db = test_db();
        db.init_schema().unwrap();
        assert!(db.all_issnls().unwrap().is_empty());
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let db = test_db();
        let res: Result<()> = db.in_transaction(|db| {
            db.conn().execute(
                "INSERT INTO directory (issnl, slug) VALUES ('0140-6736', 'doaj')",
                [],
            )?;
            Err(CatalogError::Config("boom".to_string()))
        });
        assert!(res.is_err());
        assert!(db.all_issnls().unwrap().is_empty());
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(InsertOutcome::MissingIssn.to_string(), "missing-issn");
        assert_eq!(InsertOutcome::NoMatch.as_str(), "no-match");
    }
}
