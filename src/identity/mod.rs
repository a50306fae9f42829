// Identifier and URL canonicalization shared by every loader
pub mod homepage;
pub mod issn;

pub use homepage::HomepageUrl;
pub use issn::{clean_issn, is_valid_issn, IssnMap};

use once_cell::sync::Lazy;
use regex::Regex;

static WIKIDATA_QID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^Q\d+$").unwrap());

/// `Q` followed by digits only
pub fn is_wikidata_qid(value: &str) -> bool {
    WIKIDATA_QID.is_match(value)
}
