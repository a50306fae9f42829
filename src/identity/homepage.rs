use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// Raw or canonicalized values that are placeholders, not URLs.
/// Compared case-insensitively against the whole string.
pub const PLACEHOLDER_URLS: &[&str] = &[
    "n/a",
    "na",
    "none",
    "-",
    "http://n/a",
    "http://na",
    "http://na/",
    "http://n/a/",
    "http://none/",
    "http://-/",
];

/// Substring that disqualifies a string from being a homepage. Other
/// non-web schemes are rejected by `canonicalize`.
pub const JUNK_MARKER: &str = "mailto:";

/// Hosts that serve searches or single items, never a journal homepage.
/// Applied at catalog export; these still index as homepage rows.
pub const NON_HOMEPAGE_HOSTS: &[&str] = &["www.google.com", "books.google.com"];

/// Path fragments of machine endpoints, not homepages
pub const NON_HOMEPAGE_PATHS: &[&str] = &["/oai/request"];

static REPEATED_SLASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"/{2,}").unwrap());
static WWW_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^www\d*\.").unwrap());

/// A canonicalized journal homepage URL plus its derived keys
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomepageUrl {
    pub url: String,
    pub surt: String,
    pub host: Option<String>,
    pub domain: Option<String>,
    pub suffix: Option<String>,
}

impl HomepageUrl {
    /// Returns `None` for anything that is not a usable homepage URL.
    pub fn from_url(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || is_junk(raw) {
            return None;
        }

        let repaired = repair(raw);
        let url = match canonicalize(&repaired) {
            Some(url) => url,
            None => {
                debug!(url = %raw, "Unparseable homepage URL");
                return None;
            }
        };
        let canonical = url.as_str().to_string();
        // some placeholders only match after canonicalization
        if is_junk(&canonical) {
            return None;
        }

        let host = url
            .host_str()
            .map(|h| h.trim_end_matches('.').to_string());
        let (domain, suffix) = match (&host, url.domain()) {
            (Some(h), Some(_)) => (
                psl::domain_str(h).map(str::to_string),
                psl::suffix_str(h).map(str::to_string),
            ),
            _ => (None, None),
        };

        Some(Self {
            surt: surt(&url),
            url: canonical,
            host,
            domain,
            suffix,
        })
    }
}

fn is_junk(s: &str) -> bool {
    let lower = s.to_lowercase();
    PLACEHOLDER_URLS.contains(&lower.as_str()) || lower.contains(JUNK_MARKER)
}

/// Fix the common typos seen in directory feeds
fn repair(raw: &str) -> String {
    let lower = raw.to_lowercase();
    if lower.starts_with("www.") {
        format!("http://{}", raw)
    } else if lower.starts_with("ttp://") || lower.starts_with("ttps://") {
        format!("h{}", raw)
    } else if !raw.contains("://") {
        format!("http://{}", raw)
    } else {
        raw.to_string()
    }
}

/// Semantic canonicalization on top of WHATWG parsing.
///
/// The parser already lowercases scheme and host, drops default ports,
/// resolves dot segments and percent-encodes the path; on top of that we
/// collapse repeated slashes, drop fragments and empty queries, and strip a
/// trailing dot from the host.
fn canonicalize(raw: &str) -> Option<Url> {
    let mut url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_string();
    if host.is_empty() {
        return None;
    }
    if host.ends_with('.') {
        url.set_host(Some(host.trim_end_matches('.'))).ok()?;
    }

    let path = REPEATED_SLASHES.replace_all(url.path(), "/").into_owned();
    url.set_path(&path);
    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }
    Some(url)
}

/// Sort-friendly URL Reordering Transform, keeping the scheme:
/// `http://www.Example.com/Path?b=2&a=1` becomes `http://(com,example,)/path?a=1&b=2`.
pub fn surt(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let host = WWW_PREFIX.replace(&host, "");
    let mut reversed: Vec<&str> = host.split('.').filter(|s| !s.is_empty()).collect();
    reversed.reverse();

    let mut out = format!("{}://({},)", url.scheme(), reversed.join(","));
    if let Some(port) = url.port() {
        out.push_str(&format!(":{}", port));
    }
    out.push_str(&url.path().to_lowercase());
    if let Some(query) = url.query() {
        let mut params: Vec<&str> = query.split('&').filter(|p| !p.is_empty()).collect();
        params.sort_unstable();
        if !params.is_empty() {
            out.push('?');
            out.push_str(&params.join("&").to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url_domain_split() {
        let hp = HomepageUrl::from_url("http://thing.core.ac.uk").unwrap();
        assert_eq!(hp.domain.as_deref(), Some("core.ac.uk"));
        assert_eq!(hp.host.as_deref(), Some("thing.core.ac.uk"));
        assert_eq!(hp.suffix.as_deref(), Some("ac.uk"));

        let bare = HomepageUrl::from_url("thing.core.ac.uk").unwrap();
        assert_eq!(bare.domain.as_deref(), Some("core.ac.uk"));
        assert_eq!(bare.suffix.as_deref(), Some("ac.uk"));
    }

    #[test]
    fn test_from_url_bare_host() {
        let hp = HomepageUrl::from_url("google.com").unwrap();
        assert_eq!(hp.suffix.as_deref(), Some("com"));
        assert_eq!(hp.host.as_deref(), Some("google.com"));
        assert_eq!(hp.url, "http://google.com/");
    }

    #[test]
    fn test_from_url_canonical_form() {
        assert_eq!(
            HomepageUrl::from_url("thing.com").unwrap().url,
            "http://thing.com/"
        );
        assert_eq!(
            HomepageUrl::from_url("Http://thing.com///").unwrap().url,
            "http://thing.com/"
        );
        assert_eq!(
            HomepageUrl::from_url("HTTP://Thing.COM:80/a//b/#frag").unwrap().url,
            "http://thing.com/a/b/"
        );
    }

    #[test]
    fn test_from_url_repairs_typos() {
        assert_eq!(
            HomepageUrl::from_url("www.journal.org/home").unwrap().url,
            "http://www.journal.org/home"
        );
        assert_eq!(
            HomepageUrl::from_url("ttps://journal.org").unwrap().url,
            "https://journal.org/"
        );
    }

    #[test]
    fn test_from_url_rejects_junk() {
        assert_eq!(HomepageUrl::from_url("mailto:bnewbold@bogus.com"), None);
        assert_eq!(HomepageUrl::from_url(""), None);
        assert_eq!(HomepageUrl::from_url("   "), None);
        assert_eq!(HomepageUrl::from_url("N/A"), None);
        assert_eq!(HomepageUrl::from_url("http://NA"), None);
        assert_eq!(HomepageUrl::from_url("ftp://files.example.org/"), None);
        assert_eq!(HomepageUrl::from_url("javascript:void(0)"), None);
    }

    #[test]
    fn test_from_url_keeps_colons_in_path() {
        let hp = HomepageUrl::from_url("http://x.org/profile:12").unwrap();
        assert_eq!(hp.url, "http://x.org/profile:12");
        let hp = HomepageUrl::from_url("http://x.org/file:archive/").unwrap();
        assert_eq!(hp.host.as_deref(), Some("x.org"));
    }

    #[test]
    fn test_from_url_leaves_search_hosts_to_export() {
        let books = HomepageUrl::from_url("https://books.google.com/books?id=abc").unwrap();
        assert_eq!(books.host.as_deref(), Some("books.google.com"));
        assert!(HomepageUrl::from_url("http://journal.org/index.php/j/oai/request").is_some());
    }

    #[test]
    fn test_surt() {
        let hp = HomepageUrl::from_url("http://www.Example.com/Path?b=2&a=1").unwrap();
        assert_eq!(hp.surt, "http://(com,example,)/path?a=1&b=2");
        let hp = HomepageUrl::from_url("https://thing.core.ac.uk:8443/x").unwrap();
        assert_eq!(hp.surt, "https://(uk,ac,core,thing,):8443/x");
    }
}
