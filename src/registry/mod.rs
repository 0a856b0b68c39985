//! PatternRegistry: compile-once pattern tables shared across all records
//!
//! The declarative tables in `domains.rs` / `vocab.rs` are compiled here into
//! `RegexSet`s exactly once; the registry is then shared read-only by every
//! record (and every worker thread). No per-record state lives here.
//!
//! Group semantics: a group "matches" when ANY of its patterns matches, and
//! its distinct-match count is the number of patterns that matched at least
//! once — occurrences beyond the first per pattern never count.

pub mod domains;
pub mod vocab;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};

use crate::domain::Domain;
use crate::fields::{FieldView, Target};
use domains::{DomainPatternSet, PenaltyCondition};

// =============================================================================
// PatternGroup
// =============================================================================

/// A compiled pattern group: one RegexSet over N alternatives.
pub struct PatternGroup {
    set: RegexSet,
}

impl PatternGroup {
    /// Compile a group. Panics on an invalid static pattern — the tables are
    /// compile-time constants, so this is a programming error, not input.
    fn new(patterns: &[&str], case_insensitive: bool, multi_line: bool) -> Self {
        let set = RegexSetBuilder::new(patterns)
            .case_insensitive(case_insensitive)
            .multi_line(multi_line)
            .build()
            .unwrap();
        Self { set }
    }

    fn text(patterns: &[&str]) -> Self {
        Self::new(patterns, true, false)
    }

    /// True when any pattern in the group matches.
    pub fn matches_any(&self, text: &str) -> bool {
        !text.is_empty() && self.set.is_match(text)
    }

    /// Number of distinct patterns that match at least once.
    pub fn count_matched(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.set.matches(text).iter().count()
    }
}

// =============================================================================
// Compiled per-domain rules
// =============================================================================

/// One domain's compiled rule set.
pub struct CompiledDomain {
    pub domain: Domain,
    pub hard_override: PatternGroup,
    pub hard_override_min_matches: usize,
    /// (group, weight, target) — weight added once per matching group.
    pub scoring: Vec<(PatternGroup, i32, Target)>,
    pub penalties: &'static [PenaltyCondition],
    pub penalty_weight: i32,
}

impl CompiledDomain {
    fn compile(domain: Domain, def: &'static DomainPatternSet) -> Self {
        Self {
            domain,
            hard_override: PatternGroup::text(def.hard_override),
            hard_override_min_matches: def.hard_override_min_matches,
            scoring: def
                .scoring_rules
                .iter()
                .map(|rule| (PatternGroup::text(rule.patterns), rule.weight, rule.target))
                .collect(),
            penalties: def.penalties,
            penalty_weight: def.penalty_weight,
        }
    }
}

// =============================================================================
// PatternRegistry
// =============================================================================

/// Compiled, process-wide, read-only pattern tables.
pub struct PatternRegistry {
    domains: [CompiledDomain; 4],

    // Hard-override token groups used by penalties and the override resolver.
    nt_hard: PatternGroup,
    alg_hard: PatternGroup,
    geom_hard: PatternGroup,
    comb_hard_code: PatternGroup,
    comb_hard_text: PatternGroup,
    comb_enumeration: PatternGroup,

    // Attribute vocabularies.
    pub objects: Vec<(&'static str, PatternGroup)>,
    pub constraints: Vec<(&'static str, PatternGroup)>,
    pub output_rules: Vec<(&'static str, PatternGroup)>,
    pub output_triggers: Vec<(&'static str, PatternGroup)>,
    pub mechanism_text: Vec<(&'static str, PatternGroup)>,
    pub mechanism_code: Vec<(&'static str, PatternGroup)>,
    pub structural: PatternGroup,
    pub forall_triggers: PatternGroup,
    pub exists_triggers: PatternGroup,

    // Bare "set" word rule (lookahead rewrite, see vocab.rs).
    set_word: Regex,
    set_follow_stop: Regex,

    // Code-structure metrics.
    pub re_if: Regex,
    pub re_elif: Regex,
    pub re_else: Regex,
    pub re_for: Regex,
    pub re_while: Regex,
    pub re_return: Regex,
    pub re_step_assign: Regex,
    pub re_case_label: Regex,
    pub re_def_name: Regex,
    pub re_assign_prefix: Regex,
}

fn compile_vocab(
    table: &'static [(&'static str, &'static [&'static str])],
) -> Vec<(&'static str, PatternGroup)> {
    table
        .iter()
        .map(|(label, patterns)| (*label, PatternGroup::text(patterns)))
        .collect()
}

fn multiline(pattern: &str) -> Regex {
    RegexBuilder::new(pattern).multi_line(true).build().unwrap()
}

impl PatternRegistry {
    fn compile() -> Self {
        Self {
            domains: [
                CompiledDomain::compile(Domain::Algebra, &domains::ALGEBRA),
                CompiledDomain::compile(Domain::NumberTheory, &domains::NUMBER_THEORY),
                CompiledDomain::compile(Domain::Combinatorics, &domains::COMBINATORICS),
                CompiledDomain::compile(Domain::Geometry, &domains::GEOMETRY),
            ],
            nt_hard: PatternGroup::text(domains::NT_HARD_OVERRIDE),
            alg_hard: PatternGroup::text(domains::ALG_HARD_OVERRIDE),
            geom_hard: PatternGroup::text(domains::GEOM_HARD_OVERRIDE),
            comb_hard_code: PatternGroup::text(domains::COMB_HARD_CODE),
            comb_hard_text: PatternGroup::text(domains::COMB_HARD_TEXT),
            comb_enumeration: {
                let mut patterns: Vec<&str> = domains::COMB_CODE_ITERTOOLS.to_vec();
                patterns.extend_from_slice(domains::COMB_CODE_ENUMERATION);
                PatternGroup::text(&patterns)
            },
            objects: compile_vocab(vocab::OBJECT_PATTERNS),
            constraints: compile_vocab(vocab::CONSTRAINT_PATTERNS),
            output_rules: compile_vocab(vocab::OUTPUT_TYPE_RULES),
            output_triggers: compile_vocab(vocab::OUTPUT_TYPE_TRIGGERS),
            mechanism_text: compile_vocab(vocab::MECHANISM_TEXT_PATTERNS),
            mechanism_code: compile_vocab(vocab::MECHANISM_CODE_PATTERNS),
            structural: PatternGroup::new(vocab::STRUCTURAL_PATTERNS, false, true),
            forall_triggers: PatternGroup::text(vocab::FORALL_TRIGGERS),
            exists_triggers: PatternGroup::text(vocab::EXISTS_TRIGGERS),
            set_word: RegexBuilder::new(vocab::SET_WORD)
                .case_insensitive(true)
                .build()
                .unwrap(),
            set_follow_stop: RegexBuilder::new(vocab::SET_FOLLOW_STOP)
                .case_insensitive(true)
                .build()
                .unwrap(),
            re_if: multiline(r"^\s*if\s+"),
            re_elif: multiline(r"^\s*elif\s+"),
            re_else: multiline(r"^\s*else\s*:"),
            re_for: multiline(r"^\s*for\s+"),
            re_while: multiline(r"^\s*while\s+"),
            re_return: multiline(r"^\s*return\b"),
            re_step_assign: multiline(r"^\s*[a-zA-Z_]\w*\s*[+\-*/]?="),
            re_case_label: Regex::new(r"\b[Cc]ase\s+(\d+)").unwrap(),
            re_def_name: multiline(r"^\s*def\s+(\w+)\s*\("),
            re_assign_prefix: Regex::new(r"^\s*([a-zA-Z_]\w*)\s*=").unwrap(),
        }
    }

    /// All compiled domains, in a fixed order.
    pub fn domains(&self) -> &[CompiledDomain; 4] {
        &self.domains
    }

    /// Compiled rules for one domain.
    pub fn domain(&self, domain: Domain) -> &CompiledDomain {
        self.domains
            .iter()
            .find(|d| d.domain == domain)
            .expect("all four domains are compiled")
    }

    // -- override token detectors --------------------------------------------

    /// Strong number-theory tokens anywhere in text+code.
    pub fn strong_nt(&self, view: &FieldView) -> bool {
        self.nt_hard.matches_any(&view.everything)
    }

    /// Strong algebra tokens anywhere in text+code.
    pub fn strong_alg(&self, view: &FieldView) -> bool {
        self.alg_hard.matches_any(&view.everything)
    }

    /// Distinct geometry hard-override tokens in the problem text.
    pub fn geometry_token_count(&self, view: &FieldView) -> usize {
        self.geom_hard.count_matched(&view.text)
    }

    /// Combinatorics code-side hard signal.
    pub fn comb_code_signal(&self, view: &FieldView) -> bool {
        self.comb_hard_code.matches_any(&view.code)
    }

    /// Combinatorics text-side hard signal.
    pub fn comb_text_signal(&self, view: &FieldView) -> bool {
        self.comb_hard_text.matches_any(&view.text)
    }

    /// Enumeration-style code present without number-theory tokens.
    pub fn combinatorial_enumeration(&self, view: &FieldView) -> bool {
        self.comb_enumeration.matches_any(&view.code) && !self.strong_nt(view)
    }

    /// Evaluate one penalty condition against a field view.
    pub fn penalty_fires(&self, condition: PenaltyCondition, view: &FieldView) -> bool {
        match condition {
            PenaltyCondition::StrongNumberTheory => self.strong_nt(view),
            PenaltyCondition::StrongAlgebra => self.strong_alg(view),
            PenaltyCondition::CombinatorialEnumeration => self.combinatorial_enumeration(view),
        }
    }

    // -- vocabulary helpers --------------------------------------------------

    /// Bare-word "set" rule: some occurrence of set/sets not followed by
    /// up/to/equal.
    pub fn set_mentioned(&self, text: &str) -> bool {
        self.set_word
            .find_iter(text)
            .any(|m| !self.set_follow_stop.is_match(&text[m.end()..]))
    }

    /// Whether a label belongs to the object vocabulary.
    pub fn is_object_label(&self, label: &str) -> bool {
        self.objects.iter().any(|(l, _)| *l == label)
    }

    /// Whether a label belongs to the mechanism vocabulary.
    pub fn is_mechanism_label(&self, label: &str) -> bool {
        self.mechanism_text.iter().any(|(l, _)| *l == label)
    }
}

/// The shared compiled registry.
pub fn registry() -> &'static PatternRegistry {
    static REGISTRY: Lazy<PatternRegistry> = Lazy::new(PatternRegistry::compile);
    &REGISTRY
}

// =============================================================================
// Tests
// =============================================================================
