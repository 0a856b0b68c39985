//! Consensus merger: reconcile heuristic attributes with external annotations
//!
//! Four merge policies, dispatched per field:
//! - heuristic-authoritative: shape, case split, depth, reuse
//! - heuristic-with-guarded-fallback: auxiliary construction, output intent
//! - union-with-cap: objects, mechanisms (vocabulary-filtered)
//! - additive-only-with-corroboration: constraints (forall/exists only)
//!
//! Every merged field carries provenance, confidence, and a disagreement
//! flag, so downstream filtering can key on how a value was decided.

use std::collections::HashSet;

use serde::Serialize;

use crate::attributes::{
    AttributeSet, AuxiliaryConstruction, CaseSplit, IntermediateReuse, ReasoningDepth,
    ReasoningShape,
};
use crate::config::ClassifierConfig;
use crate::record::ExternalAnnotation;
use crate::registry::PatternRegistry;

// =============================================================================
// Outcome types
// =============================================================================

/// Who supplied the merged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Heuristic,
    External,
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Per-field merge audit: provenance, confidence, disagreement.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldMeta {
    pub source: Source,
    pub confidence: Confidence,
    pub disagreement: bool,
}

impl FieldMeta {
    fn new(source: Source, confidence: Confidence, disagreement: bool) -> Self {
        Self { source, confidence, disagreement }
    }
}

/// Final merged attribute values for one record.
#[derive(Debug, Clone, Serialize)]
pub struct MergedAttributes {
    pub objects: Vec<String>,
    pub constraints: Vec<String>,
    pub output_type: String,
    pub mechanisms: Vec<String>,
    pub reasoning_shape: ReasoningShape,
    pub case_split: CaseSplit,
    pub auxiliary_construction: AuxiliaryConstruction,
    pub reasoning_depth: ReasoningDepth,
    pub intermediate_reuse: IntermediateReuse,
}

/// Merge audit for all nine fields, keyed by field name on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct ConsensusMeta {
    pub reasoning_shape: FieldMeta,
    pub case_split: FieldMeta,
    pub auxiliary_construction: FieldMeta,
    pub reasoning_depth: FieldMeta,
    pub intermediate_reuse: FieldMeta,
    pub objects: FieldMeta,
    pub constraints: FieldMeta,
    pub mechanisms: FieldMeta,
    pub output_type: FieldMeta,
}

impl ConsensusMeta {
    /// Field metas in a fixed order, with their wire names.
    pub fn fields(&self) -> [(&'static str, &FieldMeta); 9] {
        [
            ("reasoning_shape", &self.reasoning_shape),
            ("case_split", &self.case_split),
            ("auxiliary_construction", &self.auxiliary_construction),
            ("reasoning_depth", &self.reasoning_depth),
            ("intermediate_reuse", &self.intermediate_reuse),
            ("objects", &self.objects),
            ("constraints", &self.constraints),
            ("mechanisms", &self.mechanisms),
            ("output_type", &self.output_type),
        ]
    }
}

// =============================================================================
// Merge entry point
// =============================================================================

/// Merge the heuristic attribute set with the external annotation.
pub fn merge(
    reg: &PatternRegistry,
    heur: &AttributeSet,
    ext: &ExternalAnnotation,
    problem_text: &str,
    cfg: &ClassifierConfig,
) -> (MergedAttributes, ConsensusMeta) {
    let (shape, shape_meta) = merge_reasoning_shape(heur.reasoning_shape, ext.reasoning_shape.as_deref());
    let (split, split_meta) = merge_case_split(heur.case_split, ext.case_split.as_deref());
    let (aux, aux_meta) =
        merge_auxiliary(heur.auxiliary_construction, ext.auxiliary_construction.as_deref());
    let (depth, depth_meta) =
        merge_proxy_bucket(heur.reasoning_depth, ext.reasoning_depth.as_deref());
    let (reuse, reuse_meta) =
        merge_proxy_bucket(heur.intermediate_reuse, ext.intermediate_reuse.as_deref());

    let (objects, objects_meta) = merge_union_capped(
        &heur.objects,
        ext.objects.as_deref(),
        |label| reg.is_object_label(label),
        cfg.max_objects,
    );
    let (mechanisms, mechanisms_meta) = merge_union_capped(
        &heur.mechanisms,
        ext.mechanisms.as_deref(),
        |label| reg.is_mechanism_label(label),
        cfg.max_mechanisms,
    );
    let (constraints, constraints_meta) = merge_constraints(
        reg,
        &heur.constraints,
        ext.constraints.as_deref(),
        problem_text,
        cfg.max_constraints,
    );
    let (output_type, output_meta) = merge_output_type(
        reg,
        heur.output_type.as_deref(),
        ext.output_type.as_deref(),
        problem_text,
        &cfg.default_output_intent,
    );

    (
        MergedAttributes {
            objects,
            constraints,
            output_type,
            mechanisms,
            reasoning_shape: shape,
            case_split: split,
            auxiliary_construction: aux,
            reasoning_depth: depth,
            intermediate_reuse: reuse,
        },
        ConsensusMeta {
            reasoning_shape: shape_meta,
            case_split: split_meta,
            auxiliary_construction: aux_meta,
            reasoning_depth: depth_meta,
            intermediate_reuse: reuse_meta,
            objects: objects_meta,
            constraints: constraints_meta,
            mechanisms: mechanisms_meta,
            output_type: output_meta,
        },
    )
}

// =============================================================================
// Heuristic-authoritative policies
// =============================================================================

fn merge_reasoning_shape(
    heur: ReasoningShape,
    ext: Option<&str>,
) -> (ReasoningShape, FieldMeta) {
    let conf = if heur != ReasoningShape::Linear {
        Confidence::High
    } else {
        Confidence::Medium
    };
    let disagree = ext.map_or(false, |e| e != heur.as_str());
    (heur, FieldMeta::new(Source::Heuristic, conf, disagree))
}

fn merge_case_split(heur: CaseSplit, ext: Option<&str>) -> (CaseSplit, FieldMeta) {
    let conf = if matches!(heur, CaseSplit::Binary | CaseSplit::Multi) {
        Confidence::High
    } else {
        Confidence::Medium
    };
    let disagree = ext.map_or(false, |e| e != heur.as_str());
    (heur, FieldMeta::new(Source::Heuristic, conf, disagree))
}

/// Depth and reuse are heuristic-only proxy buckets at medium confidence.
fn merge_proxy_bucket<T>(heur: T, ext: Option<&str>) -> (T, FieldMeta)
where
    T: Copy + HasLabel,
{
    let disagree = ext.map_or(false, |e| e != heur.label());
    (heur, FieldMeta::new(Source::Heuristic, Confidence::Medium, disagree))
}

trait HasLabel {
    fn label(&self) -> &'static str;
}

impl HasLabel for ReasoningDepth {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

impl HasLabel for IntermediateReuse {
    fn label(&self) -> &'static str {
        self.as_str()
    }
}

// =============================================================================
// Guarded-fallback policies
// =============================================================================

/// The external value can only upgrade a heuristic "none" to "structural",
/// and then only at low confidence.
fn merge_auxiliary(
    heur: AuxiliaryConstruction,
    ext: Option<&str>,
) -> (AuxiliaryConstruction, FieldMeta) {
    match heur {
        AuxiliaryConstruction::Structural => {
            let disagree = ext.map_or(false, |e| e != heur.as_str());
            (heur, FieldMeta::new(Source::Heuristic, Confidence::High, disagree))
        }
        AuxiliaryConstruction::Symbolic => {
            let disagree = ext.map_or(false, |e| e != heur.as_str());
            (heur, FieldMeta::new(Source::Heuristic, Confidence::Medium, disagree))
        }
        AuxiliaryConstruction::None => {
            if ext == Some("structural") {
                return (
                    AuxiliaryConstruction::Structural,
                    FieldMeta::new(Source::External, Confidence::Low, true),
                );
            }
            let disagree = ext.map_or(false, |e| e != "none");
            (heur, FieldMeta::new(Source::Heuristic, Confidence::Medium, disagree))
        }
    }
}

/// A specific heuristic intent always wins. When the heuristic fell back to
/// the default, a specific external intent is accepted only if its trigger
/// patterns corroborate it in the raw problem text.
fn merge_output_type(
    reg: &PatternRegistry,
    heur: Option<&str>,
    ext: Option<&str>,
    problem_text: &str,
    default_intent: &str,
) -> (String, FieldMeta) {
    if let Some(h) = heur {
        if h != default_intent {
            let disagree = ext.map_or(false, |e| e != h);
            return (
                h.to_string(),
                FieldMeta::new(Source::Heuristic, Confidence::High, disagree),
            );
        }
    }

    if let Some(e) = ext {
        if e != default_intent {
            let corroborated = reg
                .output_triggers
                .iter()
                .find(|(label, _)| *label == e)
                .map_or(false, |(_, group)| group.matches_any(problem_text));
            if corroborated {
                return (
                    e.to_string(),
                    FieldMeta::new(Source::External, Confidence::Medium, true),
                );
            }
        }
    }

    let value = heur.unwrap_or(default_intent).to_string();
    let disagree = ext.map_or(false, |e| e != value);
    (value, FieldMeta::new(Source::Heuristic, Confidence::Medium, disagree))
}

// =============================================================================
// Union-with-cap policy (objects, mechanisms)
// =============================================================================

fn merge_union_capped(
    heur: &[String],
    ext: Option<&[String]>,
    allowed: impl Fn(&str) -> bool,
    max: usize,
) -> (Vec<String>, FieldMeta) {
    // A missing or empty external list keeps the heuristic as-is.
    let ext_vals = match ext.filter(|v| !v.is_empty()) {
        Some(vals) => vals,
        None => {
            let conf = if heur.is_empty() { Confidence::Low } else { Confidence::High };
            let mut result = heur.to_vec();
            result.truncate(max);
            return (result, FieldMeta::new(Source::Heuristic, conf, false));
        }
    };

    let mut result = heur.to_vec();
    let mut seen: HashSet<&str> = heur.iter().map(String::as_str).collect();
    for label in ext_vals {
        if result.len() >= max {
            break;
        }
        if allowed(label) && !seen.contains(label.as_str()) {
            result.push(label.clone());
            seen.insert(label);
        }
    }

    let (source, conf) = if heur.is_empty() {
        (Source::External, Confidence::Low)
    } else if !set_eq(heur, &result) {
        (Source::Merged, Confidence::Medium)
    } else {
        (Source::Heuristic, Confidence::High)
    };
    let disagree = !set_eq(heur, ext_vals);

    result.truncate(max);
    (result, FieldMeta::new(source, conf, disagree))
}

// =============================================================================
// Additive-only policy (constraints)
// =============================================================================

/// The external list may only add "forall" / "exists", and only when the
/// matching quantifier wording actually appears in the problem text.
fn merge_constraints(
    reg: &PatternRegistry,
    heur: &[String],
    ext: Option<&[String]>,
    problem_text: &str,
    max: usize,
) -> (Vec<String>, FieldMeta) {
    let mut result = heur.to_vec();
    let mut seen: HashSet<&str> = heur.iter().map(String::as_str).collect();
    let mut added = false;

    if let Some(ext_vals) = ext {
        for label in ext_vals {
            if seen.contains(label.as_str()) {
                continue;
            }
            let triggers = match label.as_str() {
                "forall" => &reg.forall_triggers,
                "exists" => &reg.exists_triggers,
                _ => continue,
            };
            if result.len() >= max {
                break;
            }
            if triggers.matches_any(problem_text) {
                result.push(label.clone());
                seen.insert(label);
                added = true;
            }
        }
    }

    let source = if added { Source::Merged } else { Source::Heuristic };
    let conf = if heur.is_empty() { Confidence::Low } else { Confidence::High };
    let disagree = match ext {
        Some(ext_vals) => !set_eq(heur, ext_vals),
        None => !heur.is_empty(),
    };

    result.truncate(max);
    (result, FieldMeta::new(source, conf, disagree))
}

fn set_eq(a: &[String], b: &[String]) -> bool {
    let sa: HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.iter().map(String::as_str).collect();
    sa == sb
}

// =============================================================================
// Tests
// =============================================================================
