use std::collections::HashMap;
use tracing::info;

use super::crossref::CrossrefLoader;
use super::doaj::DoajLoader;
use super::entrez::EntrezLoader;
use super::ezb::EzbLoader;
use super::gold_oa::GoldOaLoader;
use super::kbart::KbartLoader;
use super::norwegian::NorwegianLoader;
use super::openapc::OpenApcLoader;
use super::road::RoadLoader;
use super::sherpa_romeo::SherpaRomeoLoader;
use super::sim::SimLoader;
use super::szczepanski::SzczepanskiLoader;
use super::wikidata::WikidataLoader;
use super::{IndexSource, LoadCounts};
use crate::config::Config;
use crate::constants::*;
use crate::error::{CatalogError, Result};
use crate::identity::IssnMap;
use crate::storage::CatalogDb;

/// Every directory source that has an input file configured
pub struct LoaderRegistry {
    loaders: HashMap<String, Box<dyn IndexSource>>,
}

impl LoaderRegistry {
    pub fn new() -> Self {
        Self {
            loaders: HashMap::new(),
        }
    }

    /// Register a loader for each supported source present in the config.
    /// A configured file that is missing on disk is an error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        for slug in get_supported_sources() {
            if let Some(loader) = build_loader(slug, config)? {
                registry.register(loader);
            }
        }
        info!("Registered {} directory sources", registry.loaders.len());
        Ok(registry)
    }

    pub fn register(&mut self, loader: Box<dyn IndexSource>) {
        self.loaders.insert(loader.source_slug().to_string(), loader);
    }

    pub fn get_mut(&mut self, slug: &str) -> Option<&mut (dyn IndexSource + 'static)> {
        self.loaders.get_mut(slug).map(|l| l.as_mut())
    }

    /// Index one source by slug
    pub fn index(&mut self, slug: &str, db: &CatalogDb, map: &IssnMap) -> Result<LoadCounts> {
        match self.get_mut(slug) {
            Some(loader) => loader.index(db, map),
            None if get_supported_sources().contains(&slug) => Err(CatalogError::Config(format!(
                "No input file configured for source '{}'",
                slug
            ))),
            None => Err(CatalogError::UnknownSource(slug.to_string())),
        }
    }

    /// Index every registered source, in priority order
    pub fn index_all(
        &mut self,
        db: &CatalogDb,
        map: &IssnMap,
    ) -> Result<Vec<(String, LoadCounts)>> {
        let mut results = Vec::new();
        for slug in self.list_sources() {
            let counts = self.index(&slug, db, map)?;
            results.push((slug, counts));
        }
        Ok(results)
    }

    /// Registered slugs, supported sources first in priority order
    pub fn list_sources(&self) -> Vec<String> {
        let mut slugs: Vec<String> = self.loaders.keys().cloned().collect();
        slugs.sort_by_key(|slug| {
            let rank = DEFAULT_SOURCE_PRIORITY
                .iter()
                .position(|s| s == slug)
                .unwrap_or(usize::MAX);
            (rank, slug.clone())
        });
        slugs
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn build_loader(slug: &'static str, config: &Config) -> Result<Option<Box<dyn IndexSource>>> {
    if slug == SHERPA_ROMEO {
        return match (
            config.has_source(SHERPA_ROMEO_JOURNALS),
            config.has_source(SHERPA_ROMEO_POLICIES),
        ) {
            (false, false) => Ok(None),
            (true, true) => Ok(Some(Box::new(SherpaRomeoLoader::new(
                config.source_path(SHERPA_ROMEO_JOURNALS)?,
                config.source_path(SHERPA_ROMEO_POLICIES)?,
            )))),
            _ => Err(CatalogError::Config(format!(
                "{} needs both [sources.{}] and [sources.{}]",
                SHERPA_ROMEO, SHERPA_ROMEO_JOURNALS, SHERPA_ROMEO_POLICIES
            ))),
        };
    }
    if !config.has_source(slug) {
        return Ok(None);
    }

    let path = config.source_path(slug)?;
    let as_of = config.source_date(slug);
    let loader: Box<dyn IndexSource> = match slug {
        CROSSREF => Box::new(CrossrefLoader::new(path)),
        DOAJ => Box::new(DoajLoader::new(path, as_of)),
        ENTREZ => Box::new(EntrezLoader::new(path)),
        EZB => Box::new(EzbLoader::new(path)),
        GOLD_OA => Box::new(GoldOaLoader::new(path)),
        NORWEGIAN => Box::new(NorwegianLoader::new(path, as_of)),
        OPENAPC => Box::new(OpenApcLoader::new(path)),
        ROAD => Box::new(RoadLoader::new(path)),
        SIM => Box::new(SimLoader::new(path)),
        SZCZEPANSKI => Box::new(SzczepanskiLoader::new(path, as_of)),
        WIKIDATA => Box::new(WikidataLoader::new(path)),
        CLOCKSS | LOCKSS | PORTICO | JSTOR => Box::new(KbartLoader::new(slug, path)),
        other => return Err(CatalogError::UnknownSource(other.to_string())),
    };
    Ok(Some(loader))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn config_in(dir: &Path, sources: &str) -> Config {
        let mut config = Config::from_toml(sources).unwrap();
        config.data_dir = dir.to_path_buf();
        config
    }

    #[test]
    fn test_registers_only_configured_sources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("doaj.csv"), "").unwrap();
        std::fs::write(dir.path().join("clockss.tsv"), "").unwrap();
        let config = config_in(
            dir.path(),
            r#"
            [sources.doaj]
            filename = "doaj.csv"
            date = "2020-01-01"

            [sources.clockss]
            filename = "clockss.tsv"
            "#,
        );
        let registry = LoaderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.list_sources(), vec!["doaj", "clockss"]);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            r#"
            [sources.road]
            filename = "road.tsv"
            "#,
        );
        let err = LoaderRegistry::from_config(&config).err().unwrap();
        assert!(matches!(err, CatalogError::MissingInput { .. }));
    }

    #[test]
    fn test_sherpa_needs_both_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("journals.csv"), "").unwrap();
        let config = config_in(
            dir.path(),
            r#"
            [sources.sherpa_romeo_journals]
            filename = "journals.csv"
            "#,
        );
        let err = LoaderRegistry::from_config(&config).err().unwrap();
        assert!(matches!(err, CatalogError::Config(_)));
    }

    #[test]
    fn test_unknown_and_unconfigured_sources() {
        let db = CatalogDb::open_in_memory().unwrap();
        let map = IssnMap::default();
        let mut registry = LoaderRegistry::new();
        assert!(matches!(
            registry.index("myspace", &db, &map),
            Err(CatalogError::UnknownSource(_))
        ));
        assert!(matches!(
            registry.index(DOAJ, &db, &map),
            Err(CatalogError::Config(_))
        ));
    }
}
