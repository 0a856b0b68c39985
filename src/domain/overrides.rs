//! Override resolver: priority-ordered hard-override chain
//!
//! Four boolean rules evaluated in fixed priority order — geometry, number
//! theory, algebra, combinatorics — returning the first that fires. The
//! chain is an ordered list of predicate+result pairs, not nested
//! conditionals, so priority stays auditable and each rule testable alone.

use crate::fields::FieldView;
use crate::registry::PatternRegistry;

use super::Domain;

/// One entry in the override chain.
pub struct OverrideRule {
    pub domain: Domain,
    pub fires: fn(&PatternRegistry, &FieldView) -> bool,
}

/// Geometry: at least two distinct strong geometry objects in the text.
fn geometry_fires(reg: &PatternRegistry, view: &FieldView) -> bool {
    reg.geometry_token_count(view) >= reg.domain(Domain::Geometry).hard_override_min_matches
}

/// Number theory: any NT token anywhere, unless geometry dominates.
fn number_theory_fires(reg: &PatternRegistry, view: &FieldView) -> bool {
    reg.strong_nt(view) && !geometry_fires(reg, view)
}

/// Algebra: any algebra token anywhere and no NT token.
fn algebra_fires(reg: &PatternRegistry, view: &FieldView) -> bool {
    reg.strong_alg(view) && !reg.strong_nt(view)
}

/// Combinatorics: code-side AND text-side signals, and no NT/algebra tokens.
fn combinatorics_fires(reg: &PatternRegistry, view: &FieldView) -> bool {
    reg.comb_code_signal(view)
        && reg.comb_text_signal(view)
        && !reg.strong_nt(view)
        && !reg.strong_alg(view)
}

/// The chain, highest priority first.
pub const OVERRIDE_CHAIN: &[OverrideRule] = &[
    OverrideRule { domain: Domain::Geometry, fires: geometry_fires },
    OverrideRule { domain: Domain::NumberTheory, fires: number_theory_fires },
    OverrideRule { domain: Domain::Algebra, fires: algebra_fires },
    OverrideRule { domain: Domain::Combinatorics, fires: combinatorics_fires },
];

/// First rule that fires wins; `None` when no override applies.
pub fn resolve_override(reg: &PatternRegistry, view: &FieldView) -> Option<Domain> {
    OVERRIDE_CHAIN
        .iter()
        .find(|rule| (rule.fires)(reg, view))
        .map(|rule| rule.domain)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::registry::registry;

    fn view(text: &str, code: &str) -> FieldView {
        FieldView::project(&Record {
            problem_text: text.to_string(),
            code: Some(code.to_string()),
            ..Record::default()
        })
    }

    #[test]
    fn test_geometry_needs_two_distinct_tokens() {
        let reg = registry();
        assert_eq!(resolve_override(reg, &view("a triangle appears", "")), None);
        assert_eq!(
            resolve_override(reg, &view("a triangle inscribed in a circle", "")),
            Some(Domain::Geometry)
        );
    }

    #[test]
    fn test_geometry_suppresses_number_theory() {
        let reg = registry();
        // NT token in code plus two geometry objects in text: geometry wins.
        let v = view("the incircle of a triangle", "r = pow(a, b, m)");
        assert_eq!(resolve_override(reg, &v), Some(Domain::Geometry));
    }

    #[test]
    fn test_number_theory_fires_on_single_token() {
        let reg = registry();
        assert_eq!(
            resolve_override(reg, &view("find n mod 7", "")),
            Some(Domain::NumberTheory)
        );
    }

    #[test]
    fn test_algebra_blocked_by_nt_token() {
        let reg = registry();
        assert_eq!(
            resolve_override(reg, &view("", "solve(eq, x)")),
            Some(Domain::Algebra)
        );
        assert_eq!(
            resolve_override(reg, &view("", "solve(eq, x) % gcd(a, b)")),
            Some(Domain::NumberTheory)
        );
    }

    #[test]
    fn test_combinatorics_requires_both_sides() {
        let reg = registry();
        let code = "for p in itertools.permutations(beads): pass";
        let text = "How many arrangements of 5 beads are there?";

        assert_eq!(resolve_override(reg, &view(text, code)), Some(Domain::Combinatorics));
        // Remove either half and the override no longer fires.
        assert_eq!(resolve_override(reg, &view(text, "print(120)")), None);
        assert_eq!(resolve_override(reg, &view("A pretty puzzle.", code)), None);
    }

    #[test]
    fn test_combinatorics_blocked_by_algebra_token() {
        let reg = registry();
        let v = view(
            "How many arrangements are there?",
            "itertools.permutations(x)\nsolve(eq)",
        );
        // The algebra token blocks combinatorics, and algebra itself fires.
        assert_eq!(resolve_override(reg, &v), Some(Domain::Algebra));
    }

    #[test]
    fn test_no_override_on_plain_text() {
        let reg = registry();
        assert_eq!(resolve_override(reg, &view("A question about numbers.", "")), None);
    }

    #[test]
    fn test_chain_priority_order() {
        let domains: Vec<_> = OVERRIDE_CHAIN.iter().map(|r| r.domain).collect();
        assert_eq!(
            domains,
            vec![
                Domain::Geometry,
                Domain::NumberTheory,
                Domain::Algebra,
                Domain::Combinatorics
            ]
        );
    }
}
