//! Record: lenient input model for one math-problem payload
//!
//! A payload is one JSONL object produced by the upstream pipeline:
//! problem text, an optional solution program (directly or via an attempts
//! list), and an optional externally supplied `math_structure` annotation.
//! Extraction never fails — missing or mistyped fields simply come back
//! empty, matching the "absent input is a first-class case" contract.

use serde_json::Value;

// =============================================================================
// Types
// =============================================================================

/// One input record, extracted from a raw JSON payload.
#[derive(Debug, Clone, Default)]
pub struct Record {
    /// Problem statement text (`problem.text`).
    pub problem_text: String,
    /// Solution program, when present at the top level (`code`).
    pub code: Option<String>,
    /// Code of each attempt, in order (`attempts[i].code`).
    pub attempts: Vec<String>,
    /// 1-based index of the successful attempt (`outcome.pass_at_k`); 0 = none.
    pub pass_at_k: usize,
    /// Externally supplied annotation, flattened from `math_structure`.
    pub annotation: ExternalAnnotation,
}

/// Externally supplied annotation values, all optional and still raw strings.
///
/// Scalar fields come from `math_structure.from_text` / `from_solution`;
/// anything missing, null, or of the wrong JSON type is `None`.
#[derive(Debug, Clone, Default)]
pub struct ExternalAnnotation {
    pub domain: Option<String>,
    pub objects: Option<Vec<String>>,
    pub constraints: Option<Vec<String>>,
    pub mechanisms: Option<Vec<String>>,
    pub output_type: Option<String>,
    pub reasoning_shape: Option<String>,
    pub case_split: Option<String>,
    pub auxiliary_construction: Option<String>,
    pub reasoning_depth: Option<String>,
    pub intermediate_reuse: Option<String>,
    /// True when `math_structure.from_text` existed at all.
    pub has_from_text: bool,
}

// =============================================================================
// Extraction
// =============================================================================

impl Record {
    /// Extract a record from a raw payload value.
    pub fn from_value(payload: &Value) -> Self {
        let problem_text = payload
            .pointer("/problem/text")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        let code = payload
            .get("code")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let attempts = payload
            .get("attempts")
            .and_then(Value::as_array)
            .map(|arr| {
                arr.iter()
                    .map(|a| {
                        a.get("code")
                            .and_then(Value::as_str)
                            .unwrap_or("")
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let pass_at_k = payload
            .pointer("/outcome/pass_at_k")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize;

        Self {
            problem_text,
            code,
            attempts,
            pass_at_k,
            annotation: ExternalAnnotation::from_value(payload),
        }
    }
}

impl ExternalAnnotation {
    fn from_value(payload: &Value) -> Self {
        let from_text = payload.pointer("/math_structure/from_text");
        let from_sol = payload.pointer("/math_structure/from_solution");

        Self {
            domain: opt_string(from_text, "domain"),
            objects: opt_string_list(from_text, "objects"),
            constraints: opt_string_list(from_text, "constraints"),
            mechanisms: opt_string_list(from_text, "mechanisms"),
            output_type: opt_string(from_text, "output_type"),
            reasoning_shape: opt_string(from_sol, "reasoning_shape"),
            case_split: opt_string(from_sol, "case_split"),
            auxiliary_construction: opt_string(from_sol, "auxiliary_construction"),
            reasoning_depth: opt_string(from_sol, "reasoning_depth"),
            intermediate_reuse: opt_string(from_sol, "intermediate_reuse"),
            has_from_text: from_text.map(|v| v.is_object()).unwrap_or(false),
        }
    }
}

fn opt_string(section: Option<&Value>, key: &str) -> Option<String> {
    section?
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn opt_string_list(section: Option<&Value>, key: &str) -> Option<Vec<String>> {
    let arr = section?.get(key)?.as_array()?;
    Some(
        arr.iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_payload() {
        let payload = json!({
            "problem": { "text": "Prove that n is even." },
            "code": "print(2)",
            "attempts": [ { "code": "a" }, { "code": "b" } ],
            "outcome": { "pass_at_k": 2 },
            "math_structure": {
                "from_text": {
                    "domain": "number_theory",
                    "objects": ["integer"],
                    "output_type": "proof"
                },
                "from_solution": { "reasoning_shape": "linear" }
            }
        });

        let record = Record::from_value(&payload);
        assert_eq!(record.problem_text, "Prove that n is even.");
        assert_eq!(record.code.as_deref(), Some("print(2)"));
        assert_eq!(record.attempts, vec!["a", "b"]);
        assert_eq!(record.pass_at_k, 2);
        assert_eq!(record.annotation.domain.as_deref(), Some("number_theory"));
        assert_eq!(record.annotation.objects, Some(vec!["integer".to_string()]));
        assert_eq!(record.annotation.output_type.as_deref(), Some("proof"));
        assert_eq!(record.annotation.reasoning_shape.as_deref(), Some("linear"));
        assert!(record.annotation.has_from_text);
    }

    #[test]
    fn test_empty_payload() {
        let record = Record::from_value(&json!({}));
        assert_eq!(record.problem_text, "");
        assert!(record.code.is_none());
        assert!(record.attempts.is_empty());
        assert_eq!(record.pass_at_k, 0);
        assert!(record.annotation.domain.is_none());
        assert!(!record.annotation.has_from_text);
    }

    #[test]
    fn test_mistyped_fields_are_ignored() {
        let payload = json!({
            "problem": { "text": 42 },
            "code": ["not", "a", "string"],
            "outcome": { "pass_at_k": "three" },
            "math_structure": { "from_text": { "objects": "integer" } }
        });

        let record = Record::from_value(&payload);
        assert_eq!(record.problem_text, "");
        assert!(record.code.is_none());
        assert_eq!(record.pass_at_k, 0);
        assert!(record.annotation.objects.is_none());
    }

    #[test]
    fn test_non_string_list_entries_are_dropped() {
        let payload = json!({
            "math_structure": { "from_text": { "objects": ["integer", 7, null, "set"] } }
        });
        let record = Record::from_value(&payload);
        assert_eq!(
            record.annotation.objects,
            Some(vec!["integer".to_string(), "set".to_string()])
        );
    }
}
