//! Domain classification: scorer, override chain, and decision engine
//!
//! - `score.rs`     weighted pattern scoring → ScoreBoard + ranking
//! - `overrides.rs` priority-ordered hard-override chain
//! - `decision.rs`  heuristic/external arbitration + audit bundle

pub mod decision;
pub mod overrides;
pub mod score;

use serde::{Deserialize, Serialize};

/// The closed four-value domain vocabulary.
///
/// Variant order is the ascending-name order used for deterministic
/// tie-breaking, so the derived `Ord` is the ranking tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Algebra,
    Combinatorics,
    Geometry,
    NumberTheory,
}

impl Domain {
    pub const ALL: [Domain; 4] = [
        Domain::Algebra,
        Domain::Combinatorics,
        Domain::Geometry,
        Domain::NumberTheory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Algebra => "algebra",
            Domain::Combinatorics => "combinatorics",
            Domain::Geometry => "geometry",
            Domain::NumberTheory => "number_theory",
        }
    }

    /// Normalize a raw external domain label into the closed vocabulary.
    ///
    /// Known synonyms map to a canonical domain; "mixed" and anything
    /// unrecognized mean "no opinion" and let the heuristic decide.
    pub fn normalize(raw: &str) -> Option<Domain> {
        match raw.trim().to_lowercase().as_str() {
            "algebra" => Some(Domain::Algebra),
            "combinatorics" => Some(Domain::Combinatorics),
            "geometry" => Some(Domain::Geometry),
            "number_theory" => Some(Domain::NumberTheory),
            "arithmetic" => Some(Domain::Algebra),
            "probability" => Some(Domain::Combinatorics),
            "inequalities" => Some(Domain::Algebra),
            "functional_equations" => Some(Domain::Algebra),
            _ => None, // includes explicit "mixed"
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
