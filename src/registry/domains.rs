//! Per-domain pattern tables — pure declarative data
//!
//! Each domain carries three kinds of rules:
//! - scoring rules: (pattern group, weight, target view) — a group contributes
//!   its weight once when any of its patterns matches
//! - a hard-override group with a minimum distinct-match count
//! - penalty conditions, each a named boolean detector with a fixed negative
//!   weight
//!
//! New domains are added by data, not by new control paths. Compilation into
//! regex sets happens once in [`super::PatternRegistry`].

use crate::fields::Target;

// =============================================================================
// Rule types
// =============================================================================

/// One scoring rule: add `weight` once if any pattern matches in `target`.
pub struct ScoringRule {
    pub patterns: &'static [&'static str],
    pub weight: i32,
    pub target: Target,
}

/// Named boolean penalty detectors evaluated over the whole field view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PenaltyCondition {
    /// Any number-theory hard-override token anywhere.
    StrongNumberTheory,
    /// Any algebra hard-override token anywhere.
    StrongAlgebra,
    /// Combinatorial enumeration code present without number-theory tokens.
    CombinatorialEnumeration,
}

/// Full pattern definition for a single domain.
pub struct DomainPatternSet {
    pub hard_override: &'static [&'static str],
    /// Distinct hard-override patterns required for the override to count.
    pub hard_override_min_matches: usize,
    pub scoring_rules: &'static [ScoringRule],
    pub penalties: &'static [PenaltyCondition],
    pub penalty_weight: i32,
}

// =============================================================================
// Number theory
// =============================================================================

pub const NT_HARD_OVERRIDE: &[&str] = &[
    r"≡",
    r"\bmod\b",
    r"\bgcd\b",
    r"\blcm\b",
    r"\bisprime\b",
    r"\bfactorint\b",
    r"\bmod_inverse\b",
    r"\bcrt\b",
    r"\bvaluation\b",
    r"\bv_p\b",
    r"pow\s*\([^,]+,[^,]+,[^)]+\)", // pow(a, b, mod)
];

const NT_CODE: &[&str] = &[
    r"\bgcd\b",
    r"\bigcd\b",
    r"\bisprime\b",
    r"\bfactorint\b",
    r"\bprimerange\b",
    r"\bmod_inverse\b",
    r"\bcrt\b",
    r"\bvaluation\b",
    r"\bv_p\b",
    r"pow\s*\([^,]+,[^,]+,[^)]+\)",
];

const NT_TEXT: &[&str] = &[
    r"≡",
    r"\bmod\b",
    r"\bremainder\b",
    r"\bdivides\b",
    r"\bgcd\b",
    r"\blcm\b",
    r"\bprime\b",
    r"\bcomposite\b",
];

const NT_TEXT_SECONDARY: &[&str] = &[r"\bdiophantine\b", r"highest\s+power\s+of\s+p\s+dividing"];

const NT_PLAN: &[&str] = &[r"work\s+modulo", r"prime\s+factorization", r"divisibility"];

pub const NUMBER_THEORY: DomainPatternSet = DomainPatternSet {
    hard_override: NT_HARD_OVERRIDE,
    hard_override_min_matches: 1,
    scoring_rules: &[
        ScoringRule { patterns: NT_CODE, weight: 6, target: Target::Code },
        ScoringRule { patterns: NT_TEXT, weight: 5, target: Target::Text },
        ScoringRule { patterns: NT_TEXT_SECONDARY, weight: 3, target: Target::Text },
        ScoringRule { patterns: NT_PLAN, weight: 4, target: Target::Text },
    ],
    penalties: &[PenaltyCondition::CombinatorialEnumeration],
    penalty_weight: -4,
};

// =============================================================================
// Algebra
// =============================================================================

pub const ALG_HARD_OVERRIDE: &[&str] = &[
    r"\bMatrix\b",
    r"\bdet\b",
    r"\btrace\b",
    r"\brank\b",
    r"\beigen\b",
    r"\bPoly\b",
    r"\bgroebner\b",
    r"\bsolve\b",
    r"\blinsolve\b",
];

const ALG_CODE: &[&str] = &[
    r"\bsolve\b",
    r"\blinsolve\b",
    r"\bPoly\b",
    r"\bgroebner\b",
    r"\bMatrix\b",
    r"\bdet\b",
    r"\btrace\b",
    r"\brank\b",
    r"\beigen\b",
];

const ALG_TEXT: &[&str] = &[
    r"\bpolynomial\b",
    r"\broots\b",
    r"\bdegree\b",
    r"\bcoefficients?\b",
    r"functional\s+equation",
    r"system\s+of\s+equations",
    r"\bmatrix\b",
    r"\bdeterminant\b",
    r"\btrace\b",
    r"vector\s+space",
    r"linear\s+transformation",
];

const ALG_TEXT_SECONDARY: &[&str] = &[
    r"\bAM-GM\b",
    r"\bCauchy\b",
    r"\bJensen\b",
    r"\bSchur\b",
    r"\binequality\b",
    r"\binequalities\b",
];

const ALG_PLAN: &[&str] = &[
    r"solve\s+for",
    r"find\s+all\s+functions",
    r"analyze\s+roots",
    r"analyze\s+coefficients",
];

pub const ALGEBRA: DomainPatternSet = DomainPatternSet {
    hard_override: ALG_HARD_OVERRIDE,
    hard_override_min_matches: 1,
    scoring_rules: &[
        ScoringRule { patterns: ALG_CODE, weight: 6, target: Target::Code },
        ScoringRule { patterns: ALG_TEXT, weight: 5, target: Target::Text },
        ScoringRule { patterns: ALG_TEXT_SECONDARY, weight: 3, target: Target::Text },
        ScoringRule { patterns: ALG_PLAN, weight: 4, target: Target::Text },
    ],
    penalties: &[PenaltyCondition::StrongNumberTheory],
    penalty_weight: -4,
};

// =============================================================================
// Geometry
// =============================================================================

pub const GEOM_HARD_OVERRIDE: &[&str] = &[
    r"\btriangle\b",
    r"\bcircle\b",
    r"\bangle\b",
    r"\bperpendicular\b",
    r"\bparallel\b",
    r"\btangent\b",
    r"\bchord\b",
    r"\barc\b",
    r"\bcircumcircle\b",
    r"\bincircle\b",
    r"\bmidpoint\b",
    r"\bbisector\b",
    r"\borthocenter\b",
    r"\bincenter\b",
    r"\bcircumcenter\b",
    r"∠",
    r"°",
    r"Ω",
    r"ω",
];

const GEOM_TEXT: &[&str] = GEOM_HARD_OVERRIDE;

const GEOM_PLAN: &[&str] = &[
    r"let\s+points?\s+[A-Z]",
    r"\bintersection\b",
    r"\bconstruct\b",
    r"\breflection\b",
    r"\bhomothety\b",
];

const GEOM_CODE: &[&str] = &[r"sympy\.geometry", r"\bPoint\b", r"\bLine\b", r"\bCircle\b"];

pub const GEOMETRY: DomainPatternSet = DomainPatternSet {
    hard_override: GEOM_HARD_OVERRIDE,
    // Two distinct strong geometry objects required.
    hard_override_min_matches: 2,
    scoring_rules: &[
        ScoringRule { patterns: GEOM_TEXT, weight: 6, target: Target::Text },
        ScoringRule { patterns: GEOM_PLAN, weight: 4, target: Target::Text },
        ScoringRule { patterns: GEOM_CODE, weight: 6, target: Target::Code },
    ],
    penalties: &[PenaltyCondition::StrongNumberTheory],
    penalty_weight: -4,
};

// =============================================================================
// Combinatorics
// =============================================================================

pub const COMB_CODE_ITERTOOLS: &[&str] = &[
    r"itertools\.combinations",
    r"itertools\.permutations",
    r"itertools\.product",
];

pub const COMB_CODE_ENUMERATION: &[&str] = &[r"subset", r"bitmask", r"1\s*<<", r"bin\("];

const COMB_CODE_STRING: &[&str] = &[
    r#"'\d+'|"\d+""#, // string digit construction
    r"\.issubset\b",
    r"\bin\s+str\(",
];

const COMB_TEXT: &[&str] = &[
    r"how\s+many",
    r"number\s+of\s+ways",
    r"\barrangements?\b",
    r"\bpermutation\b",
    r"\bcombination\b",
    r"\bchoose\b",
    r"\bcount\b",
    r"exactly\s+k\s+of",
    r"\bsubstring\b",
    r"\bforbidden\b",
    r"\bavoid\b",
    r"\bgraph\b",
    r"\bmatching\b",
    r"\bcoloring\b",
    r"\binvariant\b",
    r"\bgame\b",
];

const COMB_PLAN: &[&str] = &[r"\benumerate\b", r"generate\s+all", r"\bfilter\b", r"brute\s+force"];

/// Combinatorics override needs BOTH a code-side and a text-side signal,
/// plus the absence of NT/algebra hard tokens; handled by the resolver.
pub const COMB_HARD_CODE: &[&str] = &[
    r"itertools\.combinations",
    r"itertools\.permutations",
    r"itertools\.product",
    r"\bsubset\b",
    r"\bbitmask\b",
];

pub const COMB_HARD_TEXT: &[&str] = &[
    r"how\s+many\s+ways",
    r"\barrangements?\b",
    r"\barranged\b",
    r"\bcounting\b",
    r"number\s+of\s+ways",
    r"exact\s+counts?",
    r"\bforbidden\b",
    r"\bsubstrings?\b",
    r"\bgraph\b",
    r"\bmatchings?\b",
];

pub const COMBINATORICS: DomainPatternSet = DomainPatternSet {
    hard_override: &[], // conjunction rule lives in the override resolver
    hard_override_min_matches: 1,
    scoring_rules: &[
        ScoringRule { patterns: COMB_CODE_ITERTOOLS, weight: 5, target: Target::Code },
        ScoringRule { patterns: COMB_CODE_ENUMERATION, weight: 5, target: Target::Code },
        ScoringRule { patterns: COMB_CODE_STRING, weight: 3, target: Target::Code },
        ScoringRule { patterns: COMB_TEXT, weight: 4, target: Target::Text },
        ScoringRule { patterns: COMB_PLAN, weight: 4, target: Target::Text },
    ],
    penalties: &[
        PenaltyCondition::StrongNumberTheory,
        PenaltyCondition::StrongAlgebra,
    ],
    penalty_weight: -4,
};
