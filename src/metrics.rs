//! Index and summarize counters
//!
//! Thin wrappers over the `metrics` facade. No exporter is installed by the
//! binary, so these are no-ops unless the embedding program installs a
//! recorder.

use crate::storage::InsertOutcome;

/// Metrics collection for directory loading
pub struct IndexMetrics;

impl IndexMetrics {
    /// Record one insertion attempt for a source
    pub fn record_outcome(source: &str, outcome: InsertOutcome) {
        ::metrics::counter!(
            "serials_index_outcomes_total",
            "source" => source.to_string(),
            "outcome" => outcome.as_str()
        )
        .increment(1);
    }

    /// Record a row the loader skipped before insertion
    pub fn record_skipped(source: &str) {
        ::metrics::counter!("serials_index_skipped_total", "source" => source.to_string())
            .increment(1);
    }
}

/// Metrics collection for the summarization pass
pub struct SummarizeMetrics;

impl SummarizeMetrics {
    pub fn record_journal() {
        ::metrics::counter!("serials_journals_summarized_total").increment(1);
    }

    pub fn record_dropped_identifier(field: &'static str) {
        ::metrics::counter!("serials_dropped_identifiers_total", "field" => field).increment(1);
    }
}
