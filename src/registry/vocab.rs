//! Attribute vocabularies and trigger tables — pure declarative data
//!
//! Label ordering is load-bearing: extractors keep matched labels in
//! declaration order, and caps truncate from the end.

// =============================================================================
// Objects (from text)
// =============================================================================

/// Labeled pattern groups for mathematical objects. Max 3 kept per record.
pub const OBJECT_PATTERNS: &[(&str, &[&str])] = &[
    ("integer", &[r"\bintegers?\b", r"\bn\s*[∈∊]\s*ℤ\b", r"\bwhole\s+numbers?\b"]),
    (
        "positive_integer",
        &[
            r"\bpositive\s+integers?\b",
            r"\bnatural\s+numbers?\b",
            r"\bn\s*[∈∊]\s*ℕ\b",
            r"\bnonnegative\s+integers?\b",
        ],
    ),
    ("real", &[r"\breals?\b", r"\breal\s+numbers?\b", r"\bℝ\b"]),
    ("rational", &[r"\brationals?\b", r"\brational\s+numbers?\b", r"\bℚ\b"]),
    ("complex", &[r"\bcomplex\s+numbers?\b", r"\bℂ\b", r"\bimaginary\b"]),
    ("sequence", &[r"\bsequences?\b", r"\ba_n\b", r"\ba_\{?\d+\}?\b"]),
    // "set" additionally needs the bare-word rule below (lookahead rewrite).
    ("set", &[r"\bsubsets?\b", r"\bempty\s+set\b"]),
    ("function", &[r"\bfunctions?\b", r"\bf\s*:\s*", r"\bf\s*\(\s*[a-z]\s*\)"]),
    ("polynomial", &[r"\bpolynomials?\b", r"\bdegree\s+\d", r"\bP\s*\(\s*x\s*\)"]),
    ("point", &[r"\bpoints?\b", r"\bvertices\b", r"\bvertex\b"]),
    ("line", &[r"\blines?\b", r"\bsegments?\b", r"\brays?\b"]),
    ("circle", &[r"\bcircles?\b", r"\bradius\b", r"\bdiameters?\b"]),
    ("triangle", &[r"\btriangles?\b", r"△"]),
    (
        "polygon",
        &[
            r"\bpolygons?\b",
            r"\bquadrilaterals?\b",
            r"\bpentagons?\b",
            r"\bhexagons?\b",
            r"\brectangles?\b",
            r"\bsquares?\b",
        ],
    ),
    ("graph", &[r"\bgraphs?\b", r"\bedges?\b.*\bvertices\b", r"\bvertices\b.*\bedges?\b"]),
    ("matrix", &[r"\bmatrix\b", r"\bmatrices\b"]),
    ("vector", &[r"\bvectors?\b"]),
];

/// Bare "set"/"sets" counts only when not followed by up/to/equal.
/// regex has no lookahead, so the occurrence scan lives in the registry.
pub const SET_WORD: &str = r"\bsets?\b";
pub const SET_FOLLOW_STOP: &str = r"^\s+(?:up|to|equal)";

// =============================================================================
// Constraints (from text)
// =============================================================================

/// Labeled pattern groups for constraint types. Max 4 kept per record.
///
/// The equality `=` rule is written without lookaround: an equals sign not
/// preceded by `<`, `>`, `!` and not followed by another `=`.
pub const CONSTRAINT_PATTERNS: &[(&str, &[&str])] = &[
    ("equality", &[r"(?:^|[^<>!])=(?:[^=]|$)", r"\bequals?\b", r"\bequal\s+to\b"]),
    (
        "inequality",
        &[
            r"[<>≥≤≠]",
            r"\bgreater\s+than\b",
            r"\bless\s+than\b",
            r"\bat\s+least\b",
            r"\bat\s+most\b",
            r"\binequality\b",
            r"\binequalities\b",
        ],
    ),
    (
        "divisibility",
        &[r"\bdivides\b", r"\bdivisible\b", r"\bfactor\s+of\b", r"\bmultiple\s+of\b"],
    ),
    ("parity", &[r"\beven\b", r"\bodd\b", r"\bparity\b"]),
    ("forall", &[r"\bfor\s+all\b", r"\bfor\s+every\b", r"\bfor\s+each\b", r"∀"]),
    ("exists", &[r"\bthere\s+exists?\b", r"\bfind\b.*\bsuch\s+that\b", r"∃"]),
    ("bounded", &[r"\bbounded\b", r"\bbetween\b", r"\d\s*[≤<].*[≤<]\s*\d"]),
    ("distinct", &[r"\bdistinct\b", r"\bno\s+two\b.*\bsame\b"]),
    (
        "monotonic",
        &[
            r"\bincreasing\b",
            r"\bdecreasing\b",
            r"\bmonotonic\b",
            r"\bnon-decreasing\b",
            r"\bnon-increasing\b",
        ],
    ),
    ("symmetry", &[r"\bsymmetric\b", r"\bsymmetry\b"]),
    ("invariant", &[r"\binvariant\b"]),
];

// =============================================================================
// Output type (from text)
// =============================================================================

/// Priority-ordered output-type rules — first match wins.
pub const OUTPUT_TYPE_RULES: &[(&str, &[&str])] = &[
    ("proof", &[r"\bprove\b", r"\bshow\s+that\b"]),
    ("existence", &[r"\bdoes\s+there\s+exist\b", r"\bis\s+there\b.*\?"]),
    ("non_existence", &[r"\bno\s+such\b", r"\bcannot\s+exist\b", r"\bimpossible\b"]),
    ("classification", &[r"\bfind\s+all\b", r"\bdetermine\s+all\b", r"\bcharacterize\b"]),
    ("maximum", &[r"\bmaximum\b", r"\blargest\b", r"\bgreatest\b"]),
    ("minimum", &[r"\bminimum\b", r"\bsmallest\b", r"\bleast\b"]),
    (
        "exact_value",
        &[
            r"\bfind\b",
            r"\bcompute\b",
            r"\bcalculate\b",
            r"\bdetermine\b",
            r"\bwhat\s+is\b",
            r"\bhow\s+many\b",
            r"\bevaluate\b",
        ],
    ),
];

/// Trigger patterns a non-default external output type must corroborate
/// against the raw problem text before the merger accepts it.
pub const OUTPUT_TYPE_TRIGGERS: &[(&str, &[&str])] = &[
    ("proof", &[r"\bprove\b", r"\bshow\s+that\b"]),
    ("existence", &[r"\bdoes\s+there\s+exist\b", r"\bis\s+there\b.*\?"]),
    ("non_existence", &[r"\bno\s+such\b", r"\bcannot\s+exist\b", r"\bimpossible\b"]),
    ("classification", &[r"\bfind\s+all\b", r"\bdetermine\s+all\b", r"\bcharacterize\b"]),
    ("maximum", &[r"\bmaximum\b", r"\blargest\b", r"\bgreatest\b"]),
    ("minimum", &[r"\bminimum\b", r"\bsmallest\b", r"\bleast\b"]),
];

// =============================================================================
// Mechanisms (from text, then code)
// =============================================================================

/// Text-side mechanism pattern groups. The key set doubles as the allowed
/// vocabulary for external mechanism labels.
pub const MECHANISM_TEXT_PATTERNS: &[(&str, &[&str])] = &[
    ("induction", &[r"\binduction\b", r"\binductive\b", r"\bbase\s+case\b"]),
    ("pigeonhole", &[r"\bpigeonhole\b", r"\bDirichlet\b"]),
    ("extremal", &[r"\bextremal\b", r"\bminimal\s+counterexample\b"]),
    ("case_analysis", &[r"\bconsider\s+cases\b", r"\bCase\s+1\b", r"\bWLOG\b"]),
    (
        "invariant",
        &[r"\binvariant\b", r"\bremains\s+constant\b", r"\bremains\s+unchanged\b"],
    ),
    ("monovariant", &[r"\bmonovariant\b"]),
    (
        "algebraic_manipulation",
        &[
            r"\bVieta\b",
            r"\bAM-GM\b",
            r"\bCauchy-Schwarz\b",
            r"\bfactorize\b",
            r"\bsubstitution\b",
        ],
    ),
    (
        "geometric_congruence",
        &[
            r"\bcongruent\b.*\btriangle\b",
            r"\btriangle\b.*\bcongruent\b",
            r"\bSAS\b",
            r"\bASA\b",
            r"\bSSS\b",
            r"\bAAS\b",
        ],
    ),
    ("geometric_similarity", &[r"\bsimilar\s+triangles\b", r"\bhomothety\b"]),
    (
        "counting",
        &[
            r"\bhow\s+many\b",
            r"\bnumber\s+of\s+ways\b",
            r"\bcombinations?\b",
            r"\bpermutations?\b",
        ],
    ),
];

/// Code-side mechanism pattern groups, checked after the text side.
pub const MECHANISM_CODE_PATTERNS: &[(&str, &[&str])] = &[
    (
        "counting",
        &[
            r"itertools\.combinations\b",
            r"itertools\.permutations\b",
            r"itertools\.product\b",
            r"\bmath\.comb\b",
            r"\bmath\.factorial\b",
        ],
    ),
    (
        "algebraic_manipulation",
        &[
            r"\bimport\s+sympy\b",
            r"\bfrom\s+sympy\b",
            r"\bsolve\s*\(",
            r"\bsimplify\s*\(",
            r"\bexpand\s*\(",
            r"\bfactor\s*\(",
            r"\bPoly\s*\(",
        ],
    ),
    ("case_analysis", &[r"#\s*[Cc]ase\s+\d"]),
];

// =============================================================================
// Code-structure tables
// =============================================================================

/// Structural auxiliary-construction signals (matched case-sensitively,
/// multiline): helper definitions and named auxiliary data structures.
pub const STRUCTURAL_PATTERNS: &[&str] = &[
    r"^\s*def\s+\w+\s*\(",
    r"^\s*class\s+\w+",
    r"\bdefaultdict\b",
    r"\bCounter\b",
    r"\bdeque\b",
    r"\bheapq\b",
];

/// Trivial binding names excluded from "symbolic" and reuse counting.
pub const SKIP_VARS: &[&str] = &[
    "_", "i", "j", "k", "n", "m", "x", "y", "f", "line", "ans", "result", "res", "ret",
    "output", "answer", "MOD", "mod", "INF", "inf",
];

// =============================================================================
// Quantifier triggers (consensus corroboration)
// =============================================================================

pub const FORALL_TRIGGERS: &[&str] =
    &[r"\bfor\s+all\b", r"\bfor\s+every\b", r"\bfor\s+each\b", r"∀"];

pub const EXISTS_TRIGGERS: &[&str] = &[r"\bthere\s+exists?\b", r"\bfind\b.*\bsuch\s+that\b", r"∃"];
