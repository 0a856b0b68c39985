//! mathcortex CLI: classify / annotate JSONL batches

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::{Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mathcortex::annotator::{AnnotatorConfig, AnnotatorPool};
use mathcortex::batch::run_consensus_on_jsonl;
use mathcortex::config::{ClassifierConfig, SettingsFile};
use mathcortex::fields::FieldView;
use mathcortex::Record;

#[derive(Parser)]
#[command(
    name = "mathcortex",
    version,
    about = "Heuristic math-problem domain classifier with consensus merge"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Classify a JSONL batch and merge external annotations
    Classify {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Hot-reloadable settings file; created with defaults if absent
        #[arg(long)]
        settings: Option<PathBuf>,
    },
    /// Fill missing external annotations via an OpenAI-compatible endpoint
    Annotate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        model: String,
        #[arg(long, env = "MATHCORTEX_API_KEY")]
        api_key: Option<String>,
        /// Maximum concurrent annotation requests
        #[arg(long, default_value_t = 8)]
        max_inflight: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "mathcortex starting");

    match Cli::parse().command {
        Command::Classify { input, output, settings } => {
            let cfg = match settings {
                Some(path) => SettingsFile::open(&path)?.config().clone(),
                None => ClassifierConfig::default(),
            };
            let stats = run_consensus_on_jsonl(&input, &output, &cfg)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Annotate { input, output, base_url, model, api_key, max_inflight } => {
            let mut cfg = AnnotatorConfig::new(base_url, model);
            cfg.api_key = api_key;
            cfg.max_inflight = max_inflight;
            let pool = AnnotatorPool::new(cfg).context("building annotation client")?;
            annotate_batch(&input, &output, pool).await?;
        }
    }
    Ok(())
}

/// Annotate every record that has no `math_structure.from_text` yet; records
/// already annotated (and unparseable lines) pass through unchanged.
async fn annotate_batch(
    input: &PathBuf,
    output: &PathBuf,
    pool: AnnotatorPool,
) -> anyhow::Result<()> {
    let body = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut lines: Vec<Line> = body.lines().map(Line::parse).collect();

    let pool = Arc::new(pool);
    let mut handles = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let Line::Payload(payload) = line else { continue };
        let record = Record::from_value(payload);
        if record.annotation.has_from_text {
            continue;
        }
        let view = FieldView::project(&record);
        let pool = Arc::clone(&pool);
        handles.push(tokio::spawn(async move {
            (idx, pool.annotate(&view.text, &view.code).await)
        }));
    }

    let pending = handles.len();
    let mut annotated = 0usize;
    for handle in handles {
        let (idx, result) = handle.await?;
        match result {
            Ok(annotation) => {
                if let Line::Payload(payload) = &mut lines[idx] {
                    apply_annotation(payload, &annotation);
                    annotated += 1;
                }
            }
            Err(err) => warn!(line = idx + 1, %err, "annotation failed"),
        }
    }
    info!(pending, annotated, "annotation pass complete");

    let mut out = String::new();
    for line in &lines {
        match line {
            Line::Payload(payload) => out.push_str(&serde_json::to_string(payload)?),
            Line::Raw(raw) => out.push_str(raw),
            Line::Blank => {}
        }
        out.push('\n');
    }
    std::fs::write(output, out).with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}

enum Line {
    Payload(Value),
    /// Unparseable content, passed through verbatim.
    Raw(String),
    Blank,
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Line::Blank;
        }
        match serde_json::from_str(trimmed) {
            Ok(payload) => Line::Payload(payload),
            Err(_) => Line::Raw(raw.to_string()),
        }
    }
}

/// Install the model's `from_text` / `from_solution` sections into the
/// payload's `math_structure`, leaving everything else untouched.
fn apply_annotation(payload: &mut Value, annotation: &Value) {
    if !payload.is_object() {
        *payload = Value::Object(Map::new());
    }
    let Some(root) = payload.as_object_mut() else { return };
    let ms = root
        .entry("math_structure".to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !ms.is_object() {
        *ms = Value::Object(Map::new());
    }
    let Some(ms) = ms.as_object_mut() else { return };

    for section in ["from_text", "from_solution"] {
        if let Some(value) = annotation.get(section) {
            if value.is_object() {
                ms.insert(section.to_string(), value.clone());
            }
        }
    }
}
