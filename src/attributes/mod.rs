//! Structural attribute extraction: nine heuristic detectors
//!
//! - `text.rs` text-derived: objects, constraints, output intent, mechanisms
//! - `code.rs` code-derived: reasoning shape, case split, auxiliary
//!   construction, depth proxy, reuse proxy
//!
//! Every extractor is total: absent input produces the documented default,
//! never an error.

pub mod code;
pub mod text;

use serde::{Deserialize, Serialize};

use crate::config::ClassifierConfig;
use crate::fields::FieldView;
use crate::registry::PatternRegistry;

// =============================================================================
// Scalar attribute vocabularies
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningShape {
    #[default]
    Linear,
    Branching,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSplit {
    #[default]
    None,
    Binary,
    Multi,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuxiliaryConstruction {
    #[default]
    None,
    Symbolic,
    Structural,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningDepth {
    #[default]
    Shallow,
    Medium,
    Deep,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntermediateReuse {
    #[default]
    None,
    Single,
    Multiple,
}

impl ReasoningShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Branching => "branching",
        }
    }
}

impl CaseSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Binary => "binary",
            Self::Multi => "multi",
        }
    }
}

impl AuxiliaryConstruction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Symbolic => "symbolic",
            Self::Structural => "structural",
        }
    }
}

impl ReasoningDepth {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shallow => "shallow",
            Self::Medium => "medium",
            Self::Deep => "deep",
        }
    }
}

impl IntermediateReuse {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Single => "single",
            Self::Multiple => "multiple",
        }
    }
}

// =============================================================================
// AttributeSet
// =============================================================================

/// All nine heuristic attributes for one record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AttributeSet {
    pub objects: Vec<String>,
    pub constraints: Vec<String>,
    /// `None` only when the problem text is empty.
    pub output_type: Option<String>,
    pub mechanisms: Vec<String>,
    pub reasoning_shape: ReasoningShape,
    pub case_split: CaseSplit,
    pub auxiliary_construction: AuxiliaryConstruction,
    pub reasoning_depth: ReasoningDepth,
    pub intermediate_reuse: IntermediateReuse,
}

/// Run all nine extractors over one field view.
pub fn extract(reg: &PatternRegistry, view: &FieldView, cfg: &ClassifierConfig) -> AttributeSet {
    AttributeSet {
        objects: text::extract_objects(reg, &view.text, cfg.max_objects),
        constraints: text::extract_constraints(reg, &view.text, cfg.max_constraints),
        output_type: text::extract_output_type(reg, &view.text, &cfg.default_output_intent),
        mechanisms: text::extract_mechanisms(reg, view, cfg.max_mechanisms),
        reasoning_shape: code::reasoning_shape(reg, &view.code),
        case_split: code::case_split(reg, &view.code),
        auxiliary_construction: code::auxiliary_construction(reg, &view.code),
        reasoning_depth: code::reasoning_depth(reg, &view.code),
        intermediate_reuse: code::intermediate_reuse(reg, &view.code),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::registry::registry;

    #[test]
    fn test_empty_record_yields_defaults() {
        let attrs = extract(
            registry(),
            &FieldView::default(),
            &ClassifierConfig::default(),
        );
        assert!(attrs.objects.is_empty());
        assert!(attrs.constraints.is_empty());
        assert_eq!(attrs.output_type, None);
        assert!(attrs.mechanisms.is_empty());
        assert_eq!(attrs.reasoning_shape, ReasoningShape::Linear);
        assert_eq!(attrs.case_split, CaseSplit::None);
        assert_eq!(attrs.auxiliary_construction, AuxiliaryConstruction::None);
        assert_eq!(attrs.reasoning_depth, ReasoningDepth::Shallow);
        assert_eq!(attrs.intermediate_reuse, IntermediateReuse::None);
    }

    #[test]
    fn test_full_extraction() {
        let record = Record {
            problem_text: "Prove by induction that for all positive integers n, \
                           the sum of the first n odd numbers equals n^2."
                .to_string(),
            code: Some("total = 0\nfor v in range(10):\n    total += v\nprint(total)".to_string()),
            ..Record::default()
        };
        let view = FieldView::project(&record);
        let attrs = extract(registry(), &view, &ClassifierConfig::default());

        assert_eq!(attrs.objects, vec!["positive_integer"]);
        assert!(attrs.constraints.contains(&"forall".to_string()));
        assert!(attrs.constraints.contains(&"parity".to_string()));
        assert_eq!(attrs.output_type.as_deref(), Some("proof"));
        assert_eq!(attrs.mechanisms, vec!["induction"]);
        assert_eq!(attrs.reasoning_shape, ReasoningShape::Linear);
    }

    #[test]
    fn test_scalar_wire_names() {
        assert_eq!(
            serde_json::to_string(&ReasoningDepth::Medium).unwrap(),
            "\"medium\""
        );
        assert_eq!(
            serde_json::to_string(&AuxiliaryConstruction::Symbolic).unwrap(),
            "\"symbolic\""
        );
    }
}
