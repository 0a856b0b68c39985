//! Text-derived extractors: objects, constraints, output intent, mechanisms
//!
//! All four walk their vocabulary tables in declaration order, so the output
//! label order is the table order and cardinality caps truncate from the end.

use std::collections::HashSet;

use crate::fields::FieldView;
use crate::registry::vocab;
use crate::registry::PatternRegistry;

// =============================================================================
// Objects
// =============================================================================

/// Mathematical objects mentioned in the problem text, capped.
pub fn extract_objects(reg: &PatternRegistry, text: &str, max: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut matched: Vec<&'static str> = Vec::new();
    for (label, group) in &reg.objects {
        let hit = if *label == "set" {
            // Bare "set" needs the not-followed-by-up/to/equal occurrence scan.
            group.matches_any(text) || reg.set_mentioned(text)
        } else {
            group.matches_any(text)
        };
        if hit {
            matched.push(*label);
        }
    }
    // positive_integer subsumes the generic label
    if matched.contains(&"positive_integer") {
        matched.retain(|l| *l != "integer");
    }
    matched.truncate(max);
    matched.into_iter().map(str::to_string).collect()
}

// =============================================================================
// Constraints
// =============================================================================

/// Constraint types stated in the problem text, capped.
pub fn extract_constraints(reg: &PatternRegistry, text: &str, max: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut matched: Vec<&'static str> = Vec::new();
    for (label, group) in &reg.constraints {
        if group.matches_any(text) {
            matched.push(*label);
        }
    }
    matched.truncate(max);
    matched.into_iter().map(str::to_string).collect()
}

// =============================================================================
// Output intent
// =============================================================================

/// Question intent of the problem statement. Rules are priority-ordered and
/// the first match wins; a non-empty text that matches nothing gets the
/// configured default. Empty text has no intent at all.
pub fn extract_output_type(
    reg: &PatternRegistry,
    text: &str,
    default_intent: &str,
) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    for (label, group) in &reg.output_rules {
        if group.matches_any(text) {
            return Some((*label).to_string());
        }
    }
    Some(default_intent.to_string())
}

// =============================================================================
// Mechanisms
// =============================================================================

/// Proof/solution mechanisms, gathered text-first then code, then the two
/// structural code detectors, capped.
pub fn extract_mechanisms(reg: &PatternRegistry, view: &FieldView, max: usize) -> Vec<String> {
    let mut matched: Vec<&'static str> = Vec::new();

    for (label, group) in &reg.mechanism_text {
        if group.matches_any(&view.text) {
            matched.push(*label);
        }
    }
    for (label, group) in &reg.mechanism_code {
        if !matched.contains(label) && group.matches_any(&view.code) {
            matched.push(*label);
        }
    }
    if !matched.contains(&"induction") && detect_recursive_definition(reg, &view.code) {
        matched.push("induction");
    }
    if !matched.contains(&"case_analysis") && detect_case_analysis_code(reg, &view.code) {
        matched.push("case_analysis");
    }

    matched.truncate(max);
    matched.into_iter().map(str::to_string).collect()
}

/// Induction proxy: a function definition whose name is called again anywhere
/// after the definition line.
fn detect_recursive_definition(reg: &PatternRegistry, code: &str) -> bool {
    if code.is_empty() {
        return false;
    }
    for caps in reg.re_def_name.captures_iter(code) {
        let (name, def_end) = match (caps.get(1), caps.get(0)) {
            (Some(name), Some(whole)) => (name.as_str(), whole.end()),
            _ => continue,
        };
        if contains_call(&code[def_end..], name) {
            return true;
        }
    }
    false
}

/// Whether `text` contains `name` as a whole word followed by `(`.
fn contains_call(text: &str, name: &str) -> bool {
    for (idx, _) in text.match_indices(name) {
        let starts_word = text[..idx]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric() && c != '_')
            .unwrap_or(true);
        if !starts_word {
            continue;
        }
        let after = text[idx + name.len()..].trim_start();
        if after.starts_with('(') {
            return true;
        }
    }
    false
}

/// Case-analysis proxy: two or more elif branches, or three or more distinct
/// numbered case labels.
fn detect_case_analysis_code(reg: &PatternRegistry, code: &str) -> bool {
    if code.is_empty() {
        return false;
    }
    if reg.re_elif.find_iter(code).count() >= 2 {
        return true;
    }
    let labels: HashSet<&str> = reg
        .re_case_label
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    labels.len() >= 3
}

// Skip-list is shared with the code-side extractors.
pub(crate) fn is_trivial_var(name: &str) -> bool {
    vocab::SKIP_VARS.contains(&name)
}

// =============================================================================
// Tests
// =============================================================================
