//! Generation metrics exported as JSON for CI artifacts.
//!
//! A report summarizes one headless generation run: how many chunks were
//! built, how the chunks split across biomes and how many cells each
//! populator wrote.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Top-level metrics report for one generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationMetrics {
    /// Run identifier.
    pub run_name: String,

    /// Timestamp when the report was created (ISO 8601).
    pub timestamp: String,

    /// World seed used for the run.
    pub seed: u64,

    /// Total chunks generated.
    pub chunks_generated: usize,

    /// Chunk count per biome label.
    pub biome_chunks: BTreeMap<String, usize>,

    /// Accepted writes per populator name.
    pub populator_writes: BTreeMap<String, usize>,

    /// Chunks whose ruin roll passed.
    pub ruin_chunks: usize,

    /// Cells changed by the surface rewrite across all chunks.
    pub surface_changes: usize,

    /// Wall-clock duration of the run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

/// Builder for [`GenerationMetrics`].
pub struct GenerationMetricsBuilder {
    report: GenerationMetrics,
}

impl GenerationMetricsBuilder {
    /// Start a report for `run_name` and `seed`, stamped with the current time.
    pub fn new(run_name: impl Into<String>, seed: u64) -> Self {
        Self {
            report: GenerationMetrics {
                run_name: run_name.into(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                seed,
                chunks_generated: 0,
                biome_chunks: BTreeMap::new(),
                populator_writes: BTreeMap::new(),
                ruin_chunks: 0,
                surface_changes: 0,
                duration_seconds: None,
            },
        }
    }

    /// Fold one chunk into the totals.
    pub fn record_chunk<'a>(
        &mut self,
        biome: &str,
        surface_changes: usize,
        ruin_chunk: bool,
        writes: impl IntoIterator<Item = (&'a str, usize)>,
    ) -> &mut Self {
        let report = &mut self.report;
        report.chunks_generated += 1;
        *report.biome_chunks.entry(biome.to_string()).or_default() += 1;
        report.surface_changes += surface_changes;
        if ruin_chunk {
            report.ruin_chunks += 1;
        }
        for (name, count) in writes {
            *report.populator_writes.entry(name.to_string()).or_default() += count;
        }
        self
    }

    /// Set the run duration.
    pub fn duration(&mut self, seconds: f64) -> &mut Self {
        self.report.duration_seconds = Some(seconds);
        self
    }

    /// Finish the report.
    pub fn build(&self) -> GenerationMetrics {
        self.report.clone()
    }
}

impl GenerationMetrics {
    /// Write the report as pretty JSON, creating parent directories.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path.as_ref())?;
        file.write_all(json.as_bytes())?;
        debug!(
            path = %path.as_ref().display(),
            chunks = self.chunks_generated,
            "Wrote generation metrics"
        );
        Ok(())
    }

    /// Share of chunks carrying `biome`, in `[0, 1]`.
    pub fn biome_fraction(&self, biome: &str) -> f64 {
        if self.chunks_generated == 0 {
            return 0.0;
        }
        self.biome_chunks.get(biome).copied().unwrap_or(0) as f64 / self.chunks_generated as f64
    }
}
