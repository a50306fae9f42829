use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use serials_merge::config::Config;
use serials_merge::constants::{CONTAINERS, CONTAINER_STATS, HOMEPAGE_STATUS, ISSNL_TABLE};
use serials_merge::export;
use serials_merge::identity::IssnMap;
use serials_merge::imports;
use serials_merge::loaders::LoaderRegistry;
use serials_merge::logging;
use serials_merge::storage::CatalogDb;
use serials_merge::summarize::Summarizer;

#[derive(Parser)]
#[command(name = "serials_merge")]
#[command(about = "Merge scholarly journal directories into one record per ISSN-L")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to sources.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file (overrides the config)
    #[arg(long, global = true)]
    db_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database tables
    InitDb,
    /// Load one directory source by slug
    Index {
        source: String,
    },
    /// Load every configured directory source
    IndexAll,
    /// Load authority container entities
    LoadContainers,
    /// Attach release statistics to loaded containers
    LoadContainerStats,
    /// Apply homepage crawl results
    LoadHomepageStatus,
    /// Rebuild the journal summary table
    Summarize,
    /// Write summary rows as JSON lines
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write catalog records (valid ISSN-Ls only) as JSON lines
    ExportCatalog {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write issnl<TAB>url for the homepage crawler
    ExportUrls {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Init, index everything, load imports and summarize
    Everything,
}

/// Export destination; stdout unless a file is given
fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Failed to create {}", p.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

struct Job {
    config: Config,
    db: CatalogDb,
}

impl Job {
    fn issn_map(&self) -> Result<IssnMap> {
        let path = self.config.source_path(ISSNL_TABLE)?;
        let map = IssnMap::load(&path).context("ISSN-L table is required")?;
        info!("Loaded {} ISSN to ISSN-L mappings", map.len());
        Ok(map)
    }

    fn init_db(&self) -> Result<()> {
        println!("### Creating database {}", self.config.db_file.display());
        self.db.init_schema().context("Failed to create schema")?;
        Ok(())
    }

    fn index(&self, map: &IssnMap, source: &str) -> Result<()> {
        let mut registry = LoaderRegistry::from_config(&self.config)?;
        let counts = registry
            .index(source, &self.db, map)
            .with_context(|| format!("Indexing {} failed", source))?;
        println!("{}: {}", source, counts);
        Ok(())
    }

    fn index_all(&self, map: &IssnMap) -> Result<()> {
        let mut registry = LoaderRegistry::from_config(&self.config)?;
        for (source, counts) in registry.index_all(&self.db, map)? {
            println!("{}: {}", source, counts);
        }
        Ok(())
    }

    fn load_containers(&self) -> Result<()> {
        let path = self.config.source_path(CONTAINERS)?;
        let counts = imports::load_containers(&self.db, &path)?;
        println!("containers: {}", counts);
        Ok(())
    }

    fn load_container_stats(&self) -> Result<()> {
        let path = self.config.source_path(CONTAINER_STATS)?;
        let counts = imports::load_container_stats(&self.db, &path)?;
        println!("container stats: {}", counts);
        Ok(())
    }

    fn load_homepage_status(&self) -> Result<()> {
        let path = self.config.source_path(HOMEPAGE_STATUS)?;
        let counts = imports::load_homepage_status(&self.db, &path)?;
        println!("homepage status: {}", counts);
        Ok(())
    }

    fn summarize(&self, map: &IssnMap) -> Result<()> {
        let counts = Summarizer::from_config(&self.config).summarize(&self.db, map)?;
        println!("summarize: {}", counts);
        Ok(())
    }

    /// The full batch run. Optional imports are skipped when not configured.
    fn everything(&self, map: &IssnMap) -> Result<()> {
        self.init_db()?;
        self.index_all(map)?;
        if self.config.has_source(CONTAINERS) {
            self.load_containers()?;
        }
        if self.config.has_source(CONTAINER_STATS) {
            self.load_container_stats()?;
        }
        if self.config.has_source(HOMEPAGE_STATUS) {
            self.load_homepage_status()?;
        }
        self.summarize(map)?;
        println!("### Done with everything");
        Ok(())
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(db_file) = cli.db_file {
        config.db_file = db_file;
    }
    logging::init_logging(&config.log_dir);

    let db = CatalogDb::open(&config.db_file)
        .with_context(|| format!("Failed to open database {}", config.db_file.display()))?;
    let job = Job { config, db };

    // exports print their counts to stderr; stdout carries the data
    match cli.command {
        Commands::InitDb => job.init_db()?,
        Commands::Index { source } => job.index(&job.issn_map()?, &source)?,
        Commands::IndexAll => job.index_all(&job.issn_map()?)?,
        Commands::LoadContainers => job.load_containers()?,
        Commands::LoadContainerStats => job.load_container_stats()?,
        Commands::LoadHomepageStatus => job.load_homepage_status()?,
        Commands::Summarize => job.summarize(&job.issn_map()?)?,
        Commands::Export { output } => {
            let total = export::export_journals(&job.db, output_writer(output.as_deref())?)?;
            eprintln!("export: total={}", total);
        }
        Commands::ExportCatalog { output } => {
            let counts = export::export_catalog(&job.db, output_writer(output.as_deref())?)?;
            eprintln!("export-catalog: {}", counts);
        }
        Commands::ExportUrls { output } => {
            let total = export::export_urls(&job.db, output_writer(output.as_deref())?)?;
            eprintln!("export-urls: total={}", total);
        }
        Commands::Everything => job.everything(&job.issn_map()?)?,
    }
    Ok(())
}
