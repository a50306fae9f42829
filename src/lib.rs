pub mod config;
pub mod constants;
pub mod directory;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod spans;
pub mod text;

// Identifier resolution and URL canonicalization
pub mod identity;

// SQLite store and everything that reads or writes it
pub mod storage;
pub mod loaders;
pub mod imports;
pub mod summarize;
pub mod export;
