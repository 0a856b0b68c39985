//! JSONL batch driver: classify + merge every record in a file
//!
//! Reads one payload per line, runs the full pipeline, writes the updated
//! payloads to the output file, and folds per-field disagreement and
//! provenance counts into a `BatchStats` summary. Blank lines are ignored;
//! malformed lines are counted, logged, and skipped — they never abort the
//! batch.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{ClassifierConfig, ConfigError};
use crate::consensus::Source;
use crate::pipeline::Classifier;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn io_err(path: &Path, source: std::io::Error) -> BatchError {
    BatchError::Io { path: path.to_path_buf(), source }
}

// =============================================================================
// BatchStats
// =============================================================================

/// Provenance tally for one merged field.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SourceTally {
    pub heuristic: usize,
    pub external: usize,
    pub merged: usize,
}

impl SourceTally {
    fn record(&mut self, source: Source) {
        match source {
            Source::Heuristic => self.heuristic += 1,
            Source::External => self.external += 1,
            Source::Merged => self.merged += 1,
        }
    }
}

/// Aggregate summary of one batch run. Recomputable from the per-record
/// `consensus_meta` sections alone.
#[derive(Debug, Clone, Serialize)]
pub struct BatchStats {
    pub generated_at: DateTime<Utc>,
    pub total_records: usize,
    pub malformed_lines: usize,
    pub disagreement_counts: BTreeMap<&'static str, usize>,
    pub disagreement_rates: BTreeMap<&'static str, f64>,
    pub source_counts: BTreeMap<&'static str, SourceTally>,
}

impl BatchStats {
    fn new() -> Self {
        Self {
            generated_at: Utc::now(),
            total_records: 0,
            malformed_lines: 0,
            disagreement_counts: BTreeMap::new(),
            disagreement_rates: BTreeMap::new(),
            source_counts: BTreeMap::new(),
        }
    }

    fn fold(&mut self, consensus: &crate::consensus::ConsensusMeta) {
        self.total_records += 1;
        for (name, meta) in consensus.fields() {
            if meta.disagreement {
                *self.disagreement_counts.entry(name).or_default() += 1;
            }
            self.source_counts.entry(name).or_default().record(meta.source);
        }
    }

    fn finalize(&mut self) {
        self.generated_at = Utc::now();
        self.disagreement_rates = self
            .source_counts
            .keys()
            .map(|&name| {
                let count = self.disagreement_counts.get(name).copied().unwrap_or(0);
                let rate = if self.total_records > 0 {
                    round4(count as f64 / self.total_records as f64)
                } else {
                    0.0
                };
                (name, rate)
            })
            .collect();
    }
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

// =============================================================================
// Driver
// =============================================================================

/// Classify and merge every record in `input`, writing updated records to
/// `output` and returning the aggregate summary.
pub fn run_consensus_on_jsonl(
    input: &Path,
    output: &Path,
    cfg: &ClassifierConfig,
) -> Result<BatchStats, BatchError> {
    let classifier = Classifier::new(cfg.clone());
    let reader = BufReader::new(File::open(input).map_err(|e| io_err(input, e))?);
    let mut writer = BufWriter::new(File::create(output).map_err(|e| io_err(output, e))?);

    let mut stats = BatchStats::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| io_err(input, e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut payload: Value = match serde_json::from_str(line) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(line = idx + 1, %err, "skipping malformed line");
                stats.malformed_lines += 1;
                continue;
            }
        };

        let result = classifier.classify_value(&payload);
        result.write_into(&mut payload);

        let serialized = serde_json::to_string(&payload)?;
        writer
            .write_all(serialized.as_bytes())
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| io_err(output, e))?;

        stats.fold(&result.consensus);
        if stats.total_records % 1000 == 0 {
            info!(records = stats.total_records, "batch progress");
        }
    }

    writer.flush().map_err(|e| io_err(output, e))?;
    stats.finalize();
    info!(
        records = stats.total_records,
        malformed = stats.malformed_lines,
        "batch complete"
    );
    Ok(stats)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn write_input(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("input.jsonl");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn test_batch_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            concat!(
                r#"{"id": 1, "problem": {"text": "Compute gcd(4, 6)."}}"#,
                "\n\n",
                r#"{"id": 2, "problem": {"text": "Prove that n is even."}}"#,
                "\n",
            ),
        );
        let output = dir.path().join("out.jsonl");

        let stats =
            run_consensus_on_jsonl(&input, &output, &ClassifierConfig::default()).unwrap();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.malformed_lines, 0);

        let mut body = String::new();
        File::open(&output).unwrap().read_to_string(&mut body).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], serde_json::json!(1));
        assert_eq!(first["math_structure"]["domain"], serde_json::json!("number_theory"));
        assert!(first["math_structure"]["consensus_meta"].is_object());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_input(
            &dir,
            concat!(
                r#"{"problem": {"text": "Find x."}}"#,
                "\n",
                "this is not json\n",
                r#"{"problem": {"text": "Find y."}}"#,
                "\n",
            ),
        );
        let output = dir.path().join("out.jsonl");

        let stats =
            run_consensus_on_jsonl(&input, &output, &ClassifierConfig::default()).unwrap();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.malformed_lines, 1);

        let body = std::fs::read_to_string(&output).unwrap();
        assert_eq!(body.lines().count(), 2);
    }

    #[test]
    fn test_stats_fold_counts_sources_and_rates() {
        let dir = tempfile::tempdir().unwrap();
        // One record that disagrees on objects: heuristic finds none, the
        // external annotation supplies one.
        let input = write_input(
            &dir,
            concat!(
                r#"{"problem": {"text": "A generic statement."}, "math_structure": {"from_text": {"objects": ["integer"]}}}"#,
                "\n",
            ),
        );
        let output = dir.path().join("out.jsonl");

        let stats =
            run_consensus_on_jsonl(&input, &output, &ClassifierConfig::default()).unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.disagreement_counts.get("objects"), Some(&1));
        assert_eq!(stats.disagreement_rates.get("objects"), Some(&1.0));
        assert_eq!(stats.source_counts.get("objects").unwrap().external, 1);
        // All nine merged fields are tallied.
        assert_eq!(stats.source_counts.len(), 9);
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_consensus_on_jsonl(
            &dir.path().join("nope.jsonl"),
            &dir.path().join("out.jsonl"),
            &ClassifierConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::Io { .. }));
    }
}
