//! Single-record orchestration: classify, extract, merge, write back
//!
//! The `Classifier` facade ties the stages together: field projection,
//! domain decision, attribute extraction, consensus merge. `write_into`
//! updates a raw payload in place, touching only the `math_structure`
//! sections it owns and preserving every unrelated key.

use serde_json::{Map, Value};

use crate::attributes::{self, AttributeSet};
use crate::config::ClassifierConfig;
use crate::consensus::{self, ConsensusMeta, MergedAttributes};
use crate::domain::decision::{decide, DomainDecision};
use crate::fields::FieldView;
use crate::record::Record;
use crate::registry::{registry, PatternRegistry};

// =============================================================================
// Classifier
// =============================================================================

/// Facade over the full per-record pipeline. Cheap to construct; the pattern
/// registry is compiled once per process and shared.
pub struct Classifier {
    reg: &'static PatternRegistry,
    cfg: ClassifierConfig,
}

impl Classifier {
    pub fn new(cfg: ClassifierConfig) -> Self {
        Self { reg: registry(), cfg }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.cfg
    }

    /// Run the full pipeline on one record.
    pub fn classify(&self, record: &Record) -> ClassifiedRecord {
        let view = FieldView::project(record);
        let domain = decide(self.reg, &view, record.annotation.domain.as_deref(), &self.cfg);
        let heuristic = attributes::extract(self.reg, &view, &self.cfg);
        let (merged, consensus) = consensus::merge(
            self.reg,
            &heuristic,
            &record.annotation,
            &view.text,
            &self.cfg,
        );
        ClassifiedRecord { domain, heuristic, merged, consensus }
    }

    /// Extract a record from a raw payload and classify it.
    pub fn classify_value(&self, payload: &Value) -> ClassifiedRecord {
        self.classify(&Record::from_value(payload))
    }
}

// =============================================================================
// ClassifiedRecord
// =============================================================================

/// Everything the pipeline produced for one record.
#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub domain: DomainDecision,
    pub heuristic: AttributeSet,
    pub merged: MergedAttributes,
    pub consensus: ConsensusMeta,
}

impl ClassifiedRecord {
    /// Write the results back into the raw payload, in place.
    ///
    /// Owned keys under `math_structure`: `domain`, `domain_meta`, the nine
    /// merged fields inside `from_text` / `from_solution`, and
    /// `consensus_meta`. Everything else in the payload is left untouched.
    pub fn write_into(&self, payload: &mut Value) {
        if !payload.is_object() {
            *payload = Value::Object(Map::new());
        }
        let Some(root) = payload.as_object_mut() else {
            return;
        };
        let ms = ensure_object(root, "math_structure");

        ms.insert("domain".to_string(), json_value(&self.domain.domain));
        ms.insert("domain_meta".to_string(), json_value(&self.domain.meta));

        let from_text = ensure_object(ms, "from_text");
        from_text.insert("objects".to_string(), json_value(&self.merged.objects));
        from_text.insert("constraints".to_string(), json_value(&self.merged.constraints));
        from_text.insert("mechanisms".to_string(), json_value(&self.merged.mechanisms));
        from_text.insert("output_type".to_string(), json_value(&self.merged.output_type));

        let from_sol = ensure_object(ms, "from_solution");
        from_sol.insert(
            "reasoning_shape".to_string(),
            json_value(&self.merged.reasoning_shape),
        );
        from_sol.insert("case_split".to_string(), json_value(&self.merged.case_split));
        from_sol.insert(
            "auxiliary_construction".to_string(),
            json_value(&self.merged.auxiliary_construction),
        );
        from_sol.insert(
            "reasoning_depth".to_string(),
            json_value(&self.merged.reasoning_depth),
        );
        from_sol.insert(
            "intermediate_reuse".to_string(),
            json_value(&self.merged.intermediate_reuse),
        );

        ms.insert("consensus_meta".to_string(), json_value(&self.consensus));
    }
}

/// Get `parent[key]` as a mutable object, replacing anything that is not one.
fn ensure_object<'a>(parent: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = parent
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    // just replaced with an object if it was anything else
    slot.as_object_mut().expect("slot is an object")
}

fn json_value<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Domain;
    use serde_json::json;

    fn classifier() -> Classifier {
        Classifier::new(ClassifierConfig::default())
    }

    #[test]
    fn test_combinatorics_override_end_to_end() {
        let payload = json!({
            "problem": { "text": "How many ways can 5 distinct beads be arranged in a row?" },
            "code": "import itertools\nprint(len(list(itertools.permutations(range(5)))))"
        });
        let result = classifier().classify_value(&payload);
        assert_eq!(result.domain.domain, Domain::Combinatorics);
        assert_eq!(result.domain.meta.decision_reason, "hard_override:combinatorics");
    }

    #[test]
    fn test_geometry_override_suppresses_number_theory() {
        let payload = json!({
            "problem": { "text": "In a triangle with an incircle tangent to one side, find the radius." },
            "code": "r = pow(a, b, 1000)"
        });
        let result = classifier().classify_value(&payload);
        assert_eq!(result.domain.domain, Domain::Geometry);
        assert_eq!(result.domain.meta.decision_reason, "hard_override:geometry");
    }

    #[test]
    fn test_proof_intent_with_positive_integers() {
        let payload = json!({
            "problem": { "text": "Prove by induction that for every positive integer n, f(n) holds." }
        });
        let result = classifier().classify_value(&payload);
        assert_eq!(result.merged.output_type, "proof");
        assert!(result.merged.objects.contains(&"positive_integer".to_string()));
        assert!(result.merged.mechanisms.contains(&"induction".to_string()));
    }

    #[test]
    fn test_object_union_respects_cap() {
        let payload = json!({
            "problem": { "text": "A sequence of integers is given." },
            "math_structure": {
                "from_text": { "objects": ["integer", "function", "circle"] }
            }
        });
        let result = classifier().classify_value(&payload);
        // heuristic [integer, sequence]; external adds "function", then the
        // cap of 3 is reached before "circle".
        assert_eq!(result.heuristic.objects, vec!["integer", "sequence"]);
        assert_eq!(result.merged.objects, vec!["integer", "sequence", "function"]);
        assert_eq!(
            serde_json::to_value(&result.consensus.objects.source).unwrap(),
            json!("merged")
        );
    }

    #[test]
    fn test_write_into_preserves_unrelated_keys() {
        let mut payload = json!({
            "id": "rec-17",
            "problem": { "text": "Compute 2 + 2.", "difficulty": "easy" },
            "math_structure": {
                "from_text": { "domain": "algebra", "notes": "annotator comment" },
                "pipeline_stage": 3
            }
        });
        let result = classifier().classify_value(&payload);
        result.write_into(&mut payload);

        assert_eq!(payload["id"], json!("rec-17"));
        assert_eq!(payload["problem"]["difficulty"], json!("easy"));
        assert_eq!(payload["math_structure"]["pipeline_stage"], json!(3));
        // Untouched keys inside from_text survive the merge.
        assert_eq!(
            payload["math_structure"]["from_text"]["notes"],
            json!("annotator comment")
        );
        // Owned keys are all present.
        assert!(payload["math_structure"]["domain"].is_string());
        assert!(payload["math_structure"]["domain_meta"]["heur_scores"].is_object());
        assert!(payload["math_structure"]["from_solution"]["reasoning_shape"].is_string());
        assert!(payload["math_structure"]["consensus_meta"]["objects"]["source"].is_string());
    }

    #[test]
    fn test_write_into_non_object_payload() {
        let mut payload = json!(null);
        let result = classifier().classify_value(&payload);
        result.write_into(&mut payload);
        assert!(payload["math_structure"]["domain"].is_string());
    }

    #[test]
    fn test_domain_meta_wire_shape() {
        let mut payload = json!({
            "problem": { "text": "Compute gcd(12, 18)." }
        });
        let result = classifier().classify_value(&payload);
        result.write_into(&mut payload);

        let meta = &payload["math_structure"]["domain_meta"];
        assert_eq!(meta["decision_reason"], json!("hard_override:number_theory"));
        assert_eq!(meta["forced_domain"], json!("number_theory"));
        assert_eq!(meta["external_domain"], json!(null));
        assert!(meta["heur_margin"].is_i64());
        assert!(meta["heur_scores"]["geometry"].is_i64());
    }

    #[test]
    fn test_classification_is_deterministic() {
        let payload = json!({
            "problem": { "text": "How many subsets of a set of 10 integers contain no two consecutive elements?" },
            "code": "count = 0\nfor mask in range(1 << 10):\n    count += 1",
            "math_structure": { "from_text": { "domain": "combinatorics" } }
        });
        let classifier = classifier();
        let first = serde_json::to_string(&{
            let mut p = payload.clone();
            classifier.classify_value(&payload).write_into(&mut p);
            p
        })
        .unwrap();
        for _ in 0..3 {
            let mut p = payload.clone();
            classifier.classify_value(&payload).write_into(&mut p);
            assert_eq!(serde_json::to_string(&p).unwrap(), first);
        }
    }
}
