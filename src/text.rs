//! Cleanup and code parsing for the free-text fields of directory feeds

use isocountry::CountryCode;
use isolang::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::{debug, warn};

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Hosting platforms worth tracking; publisher-hosted platforms are ignored
pub const PLATFORM_MAP: &[(&str, &str)] = &[
    ("OJS", "ojs"),
    ("BMC", "bmc"),
    ("SciELO Brazil", "scielo"),
    ("SciELO Argentina", "scielo"),
    ("SciELO", "scielo"),
    ("SciELO Mexico", "scielo"),
    ("SciELO Spain", "scielo"),
    ("SciELO Portugal", "scielo"),
    ("WordPress", "wordpress"),
    ("Sciendo", "sciendo"),
    ("Drupal", "drupal"),
    ("revues.org", "openedition"),
];

pub const MIMETYPE_MAP: &[(&str, &str)] = &[
    ("PDF", "application/pdf"),
    ("HTML", "text/html"),
    ("XML", "application/xml"),
];

/// ISO 639-2/B codes that differ from their 639-2/T (and 639-3) form
const BIBLIOGRAPHIC_LANGS: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("mao", "mri"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("tib", "bod"),
    ("wel", "cym"),
];

/// Common names feeds use in place of the ISO short name
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("bolivia", "bo"),
    ("czech republic", "cz"),
    ("england", "gb"),
    ("great britain", "gb"),
    ("iran", "ir"),
    ("korea", "kr"),
    ("macedonia", "mk"),
    ("moldova", "md"),
    ("netherlands", "nl"),
    ("russia", "ru"),
    ("scotland", "gb"),
    ("south korea", "kr"),
    ("syria", "sy"),
    ("taiwan", "tw"),
    ("tanzania", "tz"),
    ("türkiye", "tr"),
    ("turkey", "tr"),
    ("uk", "gb"),
    ("united kingdom", "gb"),
    ("united states", "us"),
    ("united states of america", "us"),
    ("usa", "us"),
    ("venezuela", "ve"),
    ("vietnam", "vn"),
];

/// Lowercased ISO 3166-1 short names plus aliases, to lowercase alpha-2
static COUNTRY_NAMES: Lazy<HashMap<String, String>> = Lazy::new(|| {
    let mut map: HashMap<String, String> = CountryCode::iter()
        .map(|c| (c.name().to_lowercase(), c.alpha2().to_lowercase()))
        .collect();
    for (alias, a2) in COUNTRY_ALIASES {
        map.insert(alias.to_string(), a2.to_string());
    }
    map
});

/// ISO 639 lookup by 2-letter code, 3-letter code (either 639-2 form) or
/// English reference name
fn lookup_lang(raw: &str) -> Option<Language> {
    let lower = raw.to_lowercase();
    match lower.len() {
        2 => Language::from_639_1(&lower),
        3 => {
            let terminology = BIBLIOGRAPHIC_LANGS
                .iter()
                .find(|(b, _)| *b == lower)
                .map_or(lower.as_str(), |(_, t)| t);
            Language::from_639_3(terminology)
        }
        _ => {
            let mut chars = lower.chars();
            let titled: String = chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default();
            Language::from_name(raw).or_else(|| Language::from_name(&titled))
        }
    }
}

/// Strip one layer of surrounding quotes and a trailing period
fn unquote(s: &str) -> &str {
    let s = s
        .strip_prefix('"')
        .or_else(|| s.strip_prefix('\''))
        .unwrap_or(s);
    let s = s
        .strip_suffix('"')
        .or_else(|| s.strip_suffix('\''))
        .unwrap_or(s);
    s.strip_suffix('.').unwrap_or(s).trim()
}

/// Aggressive cleanup for journal titles and publisher names.
///
/// Strips tags, decodes HTML entities, folds whitespace and unquotes.
/// Returns `None` when nothing is left.
pub fn clean_str(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains('\u{FFFD}') {
        warn!(value = %raw, "Unicode replacement character in text field");
    }
    let without_tags = TAG_RE.replace_all(raw, "");
    let unescaped = html_escape::decode_html_entities(&without_tags).replace('\u{00A0}', " ");
    let folded = WS_RE.replace_all(unescaped.trim(), " ");
    let cleaned = unquote(&folded);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// ISO 639-1 code for a 2-letter, 3-letter or English language name
pub fn parse_lang(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || matches!(raw, "Not applicable" | "Multiple languages" | "Unknown") {
        return None;
    }
    match lookup_lang(raw).and_then(|lang| lang.to_639_1()) {
        Some(code) => Some(code.to_string()),
        None => {
            debug!(value = %raw, "Unrecognized language");
            None
        }
    }
}

/// ISO 3166-1 alpha-2 code (lowercase) for a code or country name
pub fn parse_country(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "Unknown" {
        return None;
    }
    let found = CountryCode::for_alpha2_caseless(raw)
        .ok()
        .map(|c| c.alpha2().to_lowercase())
        .or_else(|| COUNTRY_NAMES.get(&raw.to_lowercase()).cloned());
    match found {
        Some(code) => Some(code),
        None => {
            debug!(value = %raw, "Unrecognized country");
            None
        }
    }
}

/// Full-text format column to mimetypes; anything with a slash passes through
pub fn parse_mimetypes(raw: &str) -> Option<Vec<String>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.contains('/') {
        return Some(vec![raw.to_string()]);
    }
    MIMETYPE_MAP
        .iter()
        .find(|(k, _)| *k == raw)
        .map(|(_, v)| vec![v.to_string()])
}

pub fn parse_platform(raw: &str) -> Option<String> {
    PLATFORM_MAP
        .iter()
        .find(|(k, _)| *k == raw.trim())
        .map(|(_, v)| v.to_string())
}

/// Decode ISO-8859-1 bytes; every byte maps to the code point of equal value
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| char::from(*b)).collect()
}
