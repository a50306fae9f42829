use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

use crate::error::{CatalogError, Result};

/// Normalize a raw ISSN string to the `NNNN-NNNC` shape.
///
/// Uppercases, inserts the hyphen when given 8 contiguous characters, and
/// rejects anything that does not end up 9 characters long with a hyphen at
/// position 4. Checksums are not examined here.
pub fn clean_issn(raw: &str) -> Option<String> {
    let mut s = raw.trim().to_uppercase();
    if !s.is_ascii() {
        return None;
    }
    if s.len() == 8 {
        s.insert(4, '-');
    }
    if s.len() != 9 || s.as_bytes()[4] != b'-' {
        return None;
    }
    Some(s)
}

/// ISSN check digit validation (mod 11, weights 8..2, 10 written as `X`)
pub fn is_valid_issn(issn: &str) -> bool {
    let bytes = issn.as_bytes();
    if bytes.len() != 9 || bytes[4] != b'-' {
        return false;
    }
    let digits: Vec<u8> = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 4)
        .map(|(_, b)| *b)
        .collect();
    if !digits[..7].iter().all(u8::is_ascii_digit) {
        return false;
    }
    let sum: u32 = digits[..7]
        .iter()
        .zip((2..=8u32).rev())
        .map(|(d, w)| u32::from(d - b'0') * w)
        .sum();
    let check = (11 - sum % 11) % 11;
    match digits[7] {
        b'X' => check == 10,
        d if d.is_ascii_digit() => u32::from(d - b'0') == check,
        _ => false,
    }
}

/// The authoritative ISSN -> ISSN-L table.
///
/// Every ISSN-L is also self-mapped, so resolution is a single lookup no
/// matter which member of the group a source gives us.
#[derive(Debug, Default, Clone)]
pub struct IssnMap {
    issn_issnl: HashMap<String, String>,
}

impl IssnMap {
    /// Load the table from disk. A missing or unreadable file is fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading ISSN-L map file");
        let file = File::open(path).map_err(|source| CatalogError::IssnMap {
            path: path.to_path_buf(),
            source,
        })?;
        let map = Self::from_reader(BufReader::new(file)).map_err(|source| {
            CatalogError::IssnMap {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!("Got {} ISSN-L mappings", map.len());
        Ok(map)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut map = Self::default();
        for line in reader.lines() {
            let line = line?;
            if line.is_empty() || line.starts_with("ISSN") {
                continue;
            }
            let mut cols = line.split_whitespace();
            match (cols.next(), cols.next()) {
                (Some(issn), Some(issnl)) => map.insert(issn, issnl),
                _ => warn!(line = %line, "Skipping malformed ISSN-L map line"),
            }
        }
        Ok(map)
    }

    /// Register one `ISSN ISSN-L` pair
    pub fn insert(&mut self, issn: &str, issnl: &str) {
        self.issn_issnl.insert(issn.to_string(), issnl.to_string());
        self.issn_issnl
            .entry(issnl.to_string())
            .or_insert_with(|| issnl.to_string());
    }

    pub fn len(&self) -> usize {
        self.issn_issnl.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issn_issnl.is_empty()
    }

    /// Exact lookup of an already-cleaned ISSN
    pub fn issn_to_issnl(&self, issn: &str) -> Option<&str> {
        self.issn_issnl.get(issn).map(String::as_str)
    }

    /// True when `issnl` is itself a canonical id in the table
    pub fn is_known_issnl(&self, issnl: &str) -> bool {
        self.issn_to_issnl(issnl) == Some(issnl)
    }

    /// Try each candidate in caller priority order; the first one that
    /// cleans up and is present in the table wins.
    pub fn resolve<'a, I>(&self, candidates: I) -> Option<String>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        candidates
            .into_iter()
            .flatten()
            .filter_map(clean_issn)
            .find_map(|issn| self.issn_to_issnl(&issn).map(str::to_string))
    }
}
