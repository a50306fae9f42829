/// Source slug constants to keep loaders, storage and summarization in agreement.

// Directory sources
pub const CROSSREF: &str = "crossref";
pub const DOAJ: &str = "doaj";
pub const ENTREZ: &str = "entrez";
pub const EZB: &str = "ezb";
pub const GOLD_OA: &str = "gold_oa";
pub const NORWEGIAN: &str = "norwegian";
pub const OPENAPC: &str = "openapc";
pub const ROAD: &str = "road";
pub const SHERPA_ROMEO: &str = "sherpa_romeo";
pub const SIM: &str = "sim";
pub const SZCZEPANSKI: &str = "szczepanski";
pub const WIKIDATA: &str = "wikidata";

// KBART (preservation holdings) sources
pub const CLOCKSS: &str = "clockss";
pub const LOCKSS: &str = "lockss";
pub const PORTICO: &str = "portico";
pub const JSTOR: &str = "jstor";

/// Config key for the authoritative ISSN to ISSN-L table
pub const ISSNL_TABLE: &str = "issnl";
/// Config keys for the two SHERPA/RoMEO files joined on record id
pub const SHERPA_ROMEO_JOURNALS: &str = "sherpa_romeo_journals";
pub const SHERPA_ROMEO_POLICIES: &str = "sherpa_romeo_policies";
/// Config key for authority container entities (JSON lines)
pub const CONTAINERS: &str = "containers";
/// Config key for authority container stats (JSON lines)
pub const CONTAINER_STATS: &str = "container_stats";
/// Config key for homepage crawl status (JSON lines)
pub const HOMEPAGE_STATUS: &str = "homepage_status";

/// Order in which directory rows fill summary fields. Earlier sources win;
/// later ones only fill gaps. Slugs missing from this list sort after it,
/// alphabetically.
pub const DEFAULT_SOURCE_PRIORITY: &[&str] = &[
    CROSSREF,
    DOAJ,
    ENTREZ,
    EZB,
    GOLD_OA,
    NORWEGIAN,
    OPENAPC,
    ROAD,
    SHERPA_ROMEO,
    SZCZEPANSKI,
    WIKIDATA,
    SIM,
    CLOCKSS,
    LOCKSS,
    PORTICO,
    JSTOR,
];

/// Presence of any of these sources marks a journal as open access
pub const OA_SOURCES: &[&str] = &[DOAJ, ROAD, SZCZEPANSKI, GOLD_OA];

/// Sources whose presence means the journal registers DOIs
pub const DOI_SOURCES: &[&str] = &[CROSSREF];

/// Rights-statement color that marks a journal as open access
pub const OA_COLOR: &str = "green";

/// Host of the web archive; a "live" homepage must not resolve there
pub const WEB_ARCHIVE_HOST: &str = "web.archive.org";

/// Get all source slugs with a loader, in default priority order
pub fn get_supported_sources() -> Vec<&'static str> {
    DEFAULT_SOURCE_PRIORITY.to_vec()
}

