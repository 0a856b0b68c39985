//! Code-derived extractors: shape, case split, auxiliary, depth, reuse
//!
//! These are proxies computed from the solution program's surface structure:
//! line-anchored keyword counts, indentation, and assignment scans. Empty
//! code always yields the attribute's default bucket.

use std::collections::HashSet;

use regex::Regex;

use crate::registry::PatternRegistry;

use super::text::is_trivial_var;
use super::{AuxiliaryConstruction, CaseSplit, IntermediateReuse, ReasoningDepth, ReasoningShape};

// =============================================================================
// Reasoning shape
// =============================================================================

/// Branching requires an elif, a numbered case label, or multiple if/else
/// pairs — a single if/else is ordinary control flow, not branching
/// reasoning.
pub fn reasoning_shape(reg: &PatternRegistry, code: &str) -> ReasoningShape {
    if code.is_empty() {
        return ReasoningShape::Linear;
    }
    let if_count = count(&reg.re_if, code);
    let elif_count = count(&reg.re_elif, code);
    let else_count = count(&reg.re_else, code);
    let branch_signals = elif_count + distinct_case_labels(reg, code);

    if branch_signals >= 1 || (if_count >= 2 && else_count >= 2) {
        ReasoningShape::Branching
    } else {
        ReasoningShape::Linear
    }
}

// =============================================================================
// Case split
// =============================================================================

pub fn case_split(reg: &PatternRegistry, code: &str) -> CaseSplit {
    if code.is_empty() {
        return CaseSplit::None;
    }
    let n_cases = distinct_case_labels(reg, code);
    let elif_count = count(&reg.re_elif, code);
    let if_count = count(&reg.re_if, code);
    let else_count = count(&reg.re_else, code);

    if n_cases >= 3 || elif_count >= 2 {
        return CaseSplit::Multi;
    }
    if n_cases == 2 || elif_count == 1 {
        return CaseSplit::Binary;
    }
    // single if/else pair without elif
    if if_count >= 1 && else_count >= 1 {
        return CaseSplit::Binary;
    }
    CaseSplit::None
}

// =============================================================================
// Auxiliary construction
// =============================================================================

/// Structural: helper definitions or named auxiliary data structures.
/// Symbolic: at least three non-trivial variable assignments.
pub fn auxiliary_construction(reg: &PatternRegistry, code: &str) -> AuxiliaryConstruction {
    if code.is_empty() {
        return AuxiliaryConstruction::None;
    }
    if reg.structural.matches_any(code) {
        return AuxiliaryConstruction::Structural;
    }
    let meaningful = code
        .lines()
        .filter_map(|line| assigned_var(reg, line))
        .filter(|var| !is_trivial_var(var))
        .count();
    if meaningful >= 3 {
        AuxiliaryConstruction::Symbolic
    } else {
        AuxiliaryConstruction::None
    }
}

// =============================================================================
// Reasoning depth proxy
// =============================================================================

/// Steps = line-anchored assignments plus control-flow statements; nesting =
/// max indentation in 4-space units. Shallow: ≤8 steps and nesting ≤2.
/// Deep: ≥25 steps or nesting ≥5.
pub fn reasoning_depth(reg: &PatternRegistry, code: &str) -> ReasoningDepth {
    if code.is_empty() {
        return ReasoningDepth::Shallow;
    }
    let total_steps = count(&reg.re_step_assign, code)
        + count(&reg.re_if, code)
        + count(&reg.re_elif, code)
        + count(&reg.re_for, code)
        + count(&reg.re_while, code)
        + count(&reg.re_return, code);

    let max_indent = code
        .lines()
        .filter(|line| !line.trim_start().is_empty())
        .map(|line| (line.len() - line.trim_start().len()) / 4)
        .max()
        .unwrap_or(0);

    if total_steps <= 8 && max_indent <= 2 {
        ReasoningDepth::Shallow
    } else if total_steps >= 25 || max_indent >= 5 {
        ReasoningDepth::Deep
    } else {
        ReasoningDepth::Medium
    }
}

// =============================================================================
// Intermediate reuse proxy
// =============================================================================

/// How many non-trivial assigned names are referenced again on a later line
/// (re-assignments of the same name do not count as a reference).
pub fn intermediate_reuse(reg: &PatternRegistry, code: &str) -> IntermediateReuse {
    if code.is_empty() {
        return IntermediateReuse::None;
    }
    let lines: Vec<&str> = code.lines().collect();

    let mut assigned: Vec<(&str, usize)> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(var) = assigned_var(reg, line) {
            if !is_trivial_var(var) {
                assigned.push((var, i));
            }
        }
    }
    if assigned.is_empty() {
        return IntermediateReuse::None;
    }

    let mut reused = 0;
    for &(var, assign_idx) in &assigned {
        for later in &lines[assign_idx + 1..] {
            if assigned_var(reg, later) == Some(var) {
                continue;
            }
            if mentions_word(later, var) {
                reused += 1;
                break;
            }
        }
    }

    if reused >= 3 {
        IntermediateReuse::Multiple
    } else if reused >= 1 {
        IntermediateReuse::Single
    } else {
        IntermediateReuse::None
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn count(re: &Regex, code: &str) -> usize {
    re.find_iter(code).count()
}

fn distinct_case_labels(reg: &PatternRegistry, code: &str) -> usize {
    let labels: HashSet<&str> = reg
        .re_case_label
        .captures_iter(code)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    labels.len()
}

/// Name bound by a plain assignment on this line; `==` comparisons and
/// augmented assignments do not count.
fn assigned_var<'a>(reg: &PatternRegistry, line: &'a str) -> Option<&'a str> {
    let caps = reg.re_assign_prefix.captures(line)?;
    let end = caps.get(0)?.end();
    if line[end..].starts_with('=') {
        return None;
    }
    caps.get(1).map(|m| m.as_str())
}

/// Whole-word occurrence of `var` somewhere in `line`.
fn mentions_word(line: &str, var: &str) -> bool {
    for (idx, _) in line.match_indices(var) {
        let ok_before = line[..idx]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric() && c != '_')
            .unwrap_or(true);
        let ok_after = line[idx + var.len()..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric() && c != '_')
            .unwrap_or(true);
        if ok_before && ok_after {
            return true;
        }
    }
    false
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::registry;

    #[test]
    fn test_shape_single_if_else_is_linear() {
        let reg = registry();
        let code = "if a:\n    pass\nelse:\n    pass";
        assert_eq!(reasoning_shape(reg, code), ReasoningShape::Linear);
    }

    #[test]
    fn test_shape_elif_is_branching() {
        let reg = registry();
        let code = "if a:\n    pass\nelif b:\n    pass";
        assert_eq!(reasoning_shape(reg, code), ReasoningShape::Branching);
    }

    #[test]
    fn test_shape_case_labels_are_branching() {
        let reg = registry();
        let code = "# Case 1\nx = 1\n# Case 2\nx = 2";
        assert_eq!(reasoning_shape(reg, code), ReasoningShape::Branching);
    }

    #[test]
    fn test_case_split_buckets() {
        let reg = registry();
        assert_eq!(case_split(reg, ""), CaseSplit::None);
        assert_eq!(case_split(reg, "x = 1"), CaseSplit::None);
        assert_eq!(
            case_split(reg, "if a:\n    pass\nelse:\n    pass"),
            CaseSplit::Binary
        );
        assert_eq!(
            case_split(reg, "if a:\n    pass\nelif b:\n    pass"),
            CaseSplit::Binary
        );
        assert_eq!(
            case_split(reg, "if a:\n    pass\nelif b:\n    pass\nelif c:\n    pass"),
            CaseSplit::Multi
        );
        assert_eq!(case_split(reg, "# Case 1\n# Case 2\n# Case 3"), CaseSplit::Multi);
    }

    #[test]
    fn test_case_labels_counted_distinct() {
        let reg = registry();
        // The same label repeated is one case, not three.
        assert_eq!(case_split(reg, "# Case 1\n# Case 1\n# Case 1"), CaseSplit::None);
    }

    #[test]
    fn test_auxiliary_structural_beats_symbolic() {
        let reg = registry();
        let code = "def helper(v):\n    return v\ntotal = 1\nbest = 2\nworst = 3";
        assert_eq!(auxiliary_construction(reg, code), AuxiliaryConstruction::Structural);
    }

    #[test]
    fn test_auxiliary_symbolic_needs_three_meaningful_assignments() {
        let reg = registry();
        assert_eq!(
            auxiliary_construction(reg, "total = 1\nbest = 2\nworst = 3"),
            AuxiliaryConstruction::Symbolic
        );
        // Trivial names on the skip list do not count.
        assert_eq!(
            auxiliary_construction(reg, "i = 1\nans = 2\nres = 3"),
            AuxiliaryConstruction::None
        );
        // Comparisons are not assignments.
        assert_eq!(
            auxiliary_construction(reg, "total == 1\nbest == 2\nworst == 3"),
            AuxiliaryConstruction::None
        );
    }

    #[test]
    fn test_depth_buckets() {
        let reg = registry();
        assert_eq!(reasoning_depth(reg, ""), ReasoningDepth::Shallow);
        assert_eq!(reasoning_depth(reg, "x = 1\nreturn x"), ReasoningDepth::Shallow);

        let medium: String = (0..10)
            .map(|i| format!("val{i} = {i}\n"))
            .collect();
        assert_eq!(reasoning_depth(reg, &medium), ReasoningDepth::Medium);

        let deep: String = (0..25)
            .map(|i| format!("val{i} = {i}\n"))
            .collect();
        assert_eq!(reasoning_depth(reg, &deep), ReasoningDepth::Deep);
    }

    #[test]
    fn test_depth_deep_by_nesting() {
        let reg = registry();
        let code = "if a:\n                    x = 1";
        assert_eq!(reasoning_depth(reg, code), ReasoningDepth::Deep);
    }

    #[test]
    fn test_reuse_buckets() {
        let reg = registry();
        assert_eq!(intermediate_reuse(reg, ""), IntermediateReuse::None);

        let code = "total = a + b\nprint(total)";
        assert_eq!(intermediate_reuse(reg, code), IntermediateReuse::Single);

        let code = "width = 2\nheight = 3\narea = width * height\nprint(area)";
        assert_eq!(intermediate_reuse(reg, code), IntermediateReuse::Multiple);
    }

    #[test]
    fn test_reuse_reassignment_is_not_reuse() {
        let reg = registry();
        let code = "acc = 1\nacc = 2";
        assert_eq!(intermediate_reuse(reg, code), IntermediateReuse::None);
    }

    #[test]
    fn test_reuse_skips_trivial_names() {
        let reg = registry();
        let code = "i = 1\nprint(i)";
        assert_eq!(intermediate_reuse(reg, code), IntermediateReuse::None);
    }
}
