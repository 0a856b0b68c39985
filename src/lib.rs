//! MathCortex: Heuristic Math-Problem Classifier + Consensus Merge
//!
//! Classifies math-problem records into four domains and extracts nine
//! structural attributes, then reconciles each heuristic result with an
//! externally supplied annotation under per-field merge policies.
//!
//! # Architecture
//!
//! ## Core (pure, synchronous, per record)
//! - `record.rs` - Record: lenient payload extraction (never fails)
//! - `fields.rs` - FieldView: text / code / everything projections
//! - `registry/` - PatternRegistry: compile-once rule tables (regex sets)
//! - `domain/` - scorer, override chain, decision engine + audit bundle
//! - `attributes/` - nine text- and code-derived extractors
//! - `consensus/` - four merge policies with provenance + confidence
//! - `pipeline.rs` - Classifier facade + in-place payload write-back
//!
//! ## Collaborators (around the core)
//! - `config.rs` - ClassifierConfig + hot-reloadable settings file
//! - `batch.rs` - JSONL driver + aggregate statistics
//! - `annotator.rs` - bounded-concurrency annotation client
//!
//! # Usage
//! ```
//! use mathcortex::{Classifier, ClassifierConfig};
//! use serde_json::json;
//!
//! let classifier = Classifier::new(ClassifierConfig::default());
//! let mut payload = json!({
//!     "problem": { "text": "Compute gcd(12, 18)." }
//! });
//! let result = classifier.classify_value(&payload);
//! result.write_into(&mut payload);
//!
//! assert_eq!(payload["math_structure"]["domain"], json!("number_theory"));
//! ```

pub mod annotator;
pub mod attributes;
pub mod batch;
pub mod config;
pub mod consensus;
pub mod domain;
pub mod fields;
pub mod pipeline;
pub mod record;
pub mod registry;

pub use config::ClassifierConfig;
pub use domain::Domain;
pub use pipeline::{ClassifiedRecord, Classifier};
pub use record::Record;
