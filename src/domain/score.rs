//! Domain scorer: weighted pattern rules → ScoreBoard + deterministic ranking
//!
//! A scoring rule contributes its weight once when any pattern in its group
//! matches the rule's target view — not per pattern, not per occurrence.
//! Penalty conditions then subtract their fixed weights, and the final score
//! is clamped at zero.

use serde::Serialize;

use crate::fields::FieldView;
use crate::registry::PatternRegistry;

use super::Domain;

// =============================================================================
// ScoreBoard
// =============================================================================

/// Non-negative heuristic score per domain, recomputed per record.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ScoreBoard {
    pub algebra: i32,
    pub number_theory: i32,
    pub combinatorics: i32,
    pub geometry: i32,
}

/// Best/second ranking with the margin between them.
#[derive(Debug, Clone, Copy)]
pub struct Ranking {
    pub best: Domain,
    pub second: Domain,
    pub margin: i32,
}

impl ScoreBoard {
    pub fn get(&self, domain: Domain) -> i32 {
        match domain {
            Domain::Algebra => self.algebra,
            Domain::NumberTheory => self.number_theory,
            Domain::Combinatorics => self.combinatorics,
            Domain::Geometry => self.geometry,
        }
    }

    fn set(&mut self, domain: Domain, score: i32) {
        match domain {
            Domain::Algebra => self.algebra = score,
            Domain::NumberTheory => self.number_theory = score,
            Domain::Combinatorics => self.combinatorics = score,
            Domain::Geometry => self.geometry = score,
        }
    }

    /// Rank domains by (score descending, name ascending) for determinism.
    pub fn ranking(&self) -> Ranking {
        let mut ranked = Domain::ALL;
        ranked.sort_by(|a, b| self.get(*b).cmp(&self.get(*a)).then(a.cmp(b)));
        Ranking {
            best: ranked[0],
            second: ranked[1],
            margin: self.get(ranked[0]) - self.get(ranked[1]),
        }
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Score a single domain against a field view.
pub fn score_domain(reg: &PatternRegistry, domain: Domain, view: &FieldView) -> i32 {
    let compiled = reg.domain(domain);
    let mut score = 0;

    for (group, weight, target) in &compiled.scoring {
        if group.matches_any(view.get(*target)) {
            score += weight;
        }
    }

    for condition in compiled.penalties {
        if reg.penalty_fires(*condition, view) {
            score += compiled.penalty_weight;
        }
    }

    score.max(0)
}

/// Score all four domains.
pub fn score_all(reg: &PatternRegistry, view: &FieldView) -> ScoreBoard {
    let mut board = ScoreBoard::default();
    for domain in Domain::ALL {
        board.set(domain, score_domain(reg, domain, view));
    }
    board
}

// =============================================================================
// Tests
// =============================================================================
