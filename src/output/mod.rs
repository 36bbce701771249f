//! Output module for scrape reports
//!
//! This module handles:
//! - Assembling results, metrics and breaker state into a report
//! - Writing the report as pretty-printed JSON
//! - Printing a short per-URL summary to stdout

mod summary;

pub use summary::{format_result_line, print_summary};

use crate::crawler::{CircuitStats, Orchestrator, ScrapedResult};
use crate::metrics::MetricsSnapshot;
use crate::ArachneError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Everything a run produced
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeReport {
    pub results: Vec<ScrapedResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsSnapshot>,
    pub circuit_breakers: BTreeMap<String, CircuitStats>,
}

impl ScrapeReport {
    /// Builds a report from an orchestrator's state after a run
    ///
    /// # Arguments
    ///
    /// * `results` - The results returned by the run
    /// * `orchestrator` - The orchestrator that produced them
    /// * `include_metrics` - Whether to embed a metrics snapshot
    pub fn collect(
        results: Vec<ScrapedResult>,
        orchestrator: &Orchestrator,
        include_metrics: bool,
    ) -> Self {
        Self {
            results,
            metrics: include_metrics.then(|| orchestrator.metrics_snapshot()),
            circuit_breakers: orchestrator.circuit_breaker_stats(),
        }
    }

    /// Number of results carrying an error
    pub fn failures(&self) -> usize {
        self.results.iter().filter(|r| !r.is_success()).count()
    }
}

/// Renders a report as pretty-printed JSON
pub fn render_report(report: &ScrapeReport) -> Result<String, ArachneError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes a report to `path` as pretty-printed JSON
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(ArachneError)` - Failed to create or write the file
pub fn write_report(path: &Path, report: &ScrapeReport) -> Result<(), ArachneError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::info!(
        "Wrote {} results to {}",
        report.results.len(),
        path.display()
    );
    Ok(())
}
