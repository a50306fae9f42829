//! Directory source loaders
//!
//! Each source implements [`DirectoryLoader`]: open the file into a stream of
//! typed rows, then turn each row into a [`DirectoryRecord`]. The shared
//! indexing loop canonicalizes and inserts every record inside one
//! transaction per file.

pub mod crossref;
pub mod doaj;
pub mod entrez;
pub mod ezb;
pub mod gold_oa;
pub mod kbart;
pub mod norwegian;
pub mod openapc;
pub mod registry;
pub mod road;
pub mod sherpa_romeo;
pub mod sim;
pub mod szczepanski;
pub mod wikidata;

pub use registry::LoaderRegistry;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;
use tracing::{info, info_span, warn};

use crate::directory::DirectoryRecord;
use crate::error::{CatalogError, Result};
use crate::identity::IssnMap;
use crate::metrics::IndexMetrics;
use crate::storage::{CatalogDb, InsertOutcome};
use crate::text::decode_latin1;

/// A stream of parsed rows from one input file
pub type RowIter<T> = Box<dyn Iterator<Item = Result<T>>>;

/// Per-file tallies, printed after every load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadCounts {
    pub total: usize,
    pub inserted: usize,
    pub duplicate: usize,
    pub missing_issn: usize,
    pub no_match: usize,
    pub skipped: usize,
}

impl LoadCounts {
    pub fn record(&mut self, outcome: InsertOutcome) {
        match outcome {
            InsertOutcome::Inserted => self.inserted += 1,
            InsertOutcome::Duplicate => self.duplicate += 1,
            InsertOutcome::MissingIssn => self.missing_issn += 1,
            InsertOutcome::NoMatch => self.no_match += 1,
        }
    }
}

impl fmt::Display for LoadCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} inserted={} duplicate={} missing-issn={} no-match={} skipped={}",
            self.total,
            self.inserted,
            self.duplicate,
            self.missing_issn,
            self.no_match,
            self.skipped
        )
    }
}

/// Capability interface every directory source implements
pub trait DirectoryLoader {
    const SLUG: &'static str;
    type Row: DeserializeOwned + 'static;

    /// Open the input file. Missing or unreadable input is fatal.
    fn open(&mut self) -> Result<RowIter<Self::Row>>;

    /// `None` means the row is not worth inserting at all
    fn parse_record(&self, row: Self::Row) -> Option<DirectoryRecord>;
}

/// Object-safe view over any loader, used by the registry
pub trait IndexSource {
    fn source_slug(&self) -> &'static str;

    fn index(&mut self, db: &CatalogDb, map: &IssnMap) -> Result<LoadCounts>;
}

impl<L: DirectoryLoader> IndexSource for L {
    fn source_slug(&self) -> &'static str {
        L::SLUG
    }

    fn index(&mut self, db: &CatalogDb, map: &IssnMap) -> Result<LoadCounts> {
        let span = info_span!("index", source = L::SLUG);
        let _enter = span.enter();
        info!("Loading {}", L::SLUG);

        let rows = self.open()?;
        let loader: &L = self;
        let counts = db.in_transaction(|db| {
            let mut counts = LoadCounts::default();
            for row in rows {
                counts.total += 1;
                let row = match row {
                    Ok(row) => row,
                    Err(e) => {
                        warn!(line = counts.total, error = %e, "Skipping unreadable row");
                        counts.skipped += 1;
                        IndexMetrics::record_skipped(L::SLUG);
                        continue;
                    }
                };
                match loader.parse_record(row) {
                    Some(record) => {
                        let outcome = db.insert_directory(map, record)?;
                        counts.record(outcome);
                        IndexMetrics::record_outcome(L::SLUG, outcome);
                    }
                    None => {
                        counts.skipped += 1;
                        IndexMetrics::record_skipped(L::SLUG);
                    }
                }
            }
            Ok(counts)
        })?;

        info!(%counts, "Finished loading {}", L::SLUG);
        Ok(counts)
    }
}

/// How to turn file bytes into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// Invalid sequences become U+FFFD instead of failing the file
    Utf8Lossy,
    Latin1,
}

/// CSV dialect for [`csv_rows`]
#[derive(Debug, Clone, Copy)]
pub struct CsvFormat {
    pub delimiter: u8,
    pub has_headers: bool,
    pub quoting: bool,
    pub encoding: Encoding,
}

impl CsvFormat {
    pub const CSV: CsvFormat = CsvFormat {
        delimiter: b',',
        has_headers: true,
        quoting: true,
        encoding: Encoding::Utf8,
    };

    pub const TSV: CsvFormat = CsvFormat {
        delimiter: b'\t',
        has_headers: true,
        quoting: false,
        encoding: Encoding::Utf8,
    };

    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn without_headers(mut self) -> Self {
        self.has_headers = false;
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

fn read_text(path: &Path, encoding: Encoding) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Io(e),
    })?;
    Ok(match encoding {
        Encoding::Utf8 => String::from_utf8(bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        Encoding::Utf8Lossy => String::from_utf8_lossy(&bytes).into_owned(),
        Encoding::Latin1 => decode_latin1(&bytes),
    })
}

/// Deserialize delimited rows into `T`; empty fields become `None`
pub fn csv_rows<T: DeserializeOwned + 'static>(
    path: &Path,
    format: CsvFormat,
) -> Result<RowIter<T>> {
    let text = read_text(path, format.encoding)?;
    let reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter)
        .has_headers(format.has_headers)
        .quoting(format.quoting)
        .flexible(true)
        .from_reader(Cursor::new(text.into_bytes()));
    Ok(Box::new(
        reader
            .into_deserialize::<T>()
            .map(|row| row.map_err(CatalogError::from)),
    ))
}

/// One JSON object per line; blank lines are ignored
pub fn json_lines<T: DeserializeOwned + 'static>(path: &Path) -> Result<RowIter<T>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::MissingInput {
            path: path.to_path_buf(),
        },
        _ => CatalogError::Io(e),
    })?;
    let lines = BufReader::new(file).lines();
    Ok(Box::new(lines.filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(CatalogError::from)),
        Err(e) => Some(Err(CatalogError::Io(e))),
    })))
}

/// Accepts a JSON string or number, for feeds that are inconsistent about it
pub(crate) fn lenient_string<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient {
        Str(String),
        Int(i64),
        Float(f64),
    }
    Ok(match Option::<Lenient>::deserialize(deserializer)? {
        Some(Lenient::Str(s)) if s.trim().is_empty() => None,
        Some(Lenient::Str(s)) => Some(s),
        Some(Lenient::Int(i)) => Some(i.to_string()),
        Some(Lenient::Float(f)) => Some(f.to_string()),
        None => None,
    })
}

/// Trimmed, non-empty copy of an optional field
pub(crate) fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
