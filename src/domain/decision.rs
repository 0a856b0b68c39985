//! Domain decision engine: heuristic/external arbitration with an audit trail
//!
//! Order of precedence:
//! 1. hard override fired
//! 2. external domain missing or ambiguous → heuristic best (or fallback)
//! 3. external agrees with heuristic best
//! 4. heuristic margin at or above threshold → heuristic wins
//! 5. otherwise the external domain wins
//!
//! Every decision carries a reason code plus the full score trace so a
//! reviewer can reconstruct why a record landed where it did.

use serde::Serialize;

use crate::config::ClassifierConfig;
use crate::fields::FieldView;
use crate::registry::PatternRegistry;

use super::overrides::resolve_override;
use super::score::{score_all, ScoreBoard};
use super::Domain;

/// Audit bundle written alongside the resolved domain.
#[derive(Debug, Clone, Serialize)]
pub struct DomainMeta {
    /// Normalized external domain, `None` when missing or ambiguous.
    pub external_domain: Option<Domain>,
    pub heur_scores: ScoreBoard,
    pub heur_best: Domain,
    pub heur_margin: i32,
    pub forced_domain: Option<Domain>,
    pub decision_reason: String,
}

/// Resolved domain plus its audit bundle. The domain is always one of the
/// four allowed values by construction.
#[derive(Debug, Clone, Serialize)]
pub struct DomainDecision {
    pub domain: Domain,
    pub meta: DomainMeta,
}

/// Arbitrate between the heuristic scores and the external annotation.
pub fn decide(
    reg: &PatternRegistry,
    view: &FieldView,
    external_raw: Option<&str>,
    cfg: &ClassifierConfig,
) -> DomainDecision {
    let external = external_raw.and_then(Domain::normalize);
    let scores = score_all(reg, view);
    let ranking = scores.ranking();
    let forced = resolve_override(reg, view);

    let (domain, reason) = if let Some(forced) = forced {
        (forced, format!("hard_override:{forced}"))
    } else if external.is_none() {
        let domain = if scores.get(ranking.best) > 0 {
            ranking.best
        } else {
            cfg.fallback_domain
        };
        (domain, "external_missing_fallback".to_string())
    } else if external == Some(ranking.best) {
        (ranking.best, "agree".to_string())
    } else if ranking.margin >= cfg.h_threshold {
        (ranking.best, format!("heuristic_override:margin={}", ranking.margin))
    } else {
        // external is Some and disagrees with a weak heuristic
        (external.unwrap_or(cfg.fallback_domain), "external_default".to_string())
    };

    DomainDecision {
        domain,
        meta: DomainMeta {
            external_domain: external,
            heur_scores: scores,
            heur_best: ranking.best,
            heur_margin: ranking.margin,
            forced_domain: forced,
            decision_reason: reason,
        },
    }
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

    fn cfg() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn test_hard_override_beats_external() {
        let reg = registry();
        let v = view("a triangle inscribed in a circle", "");
        let d = decide(reg, &v, Some("algebra"), &cfg());
        assert_eq!(d.domain, Domain::Geometry);
        assert_eq!(d.meta.decision_reason, "hard_override:geometry");
        assert_eq!(d.meta.forced_domain, Some(Domain::Geometry));
        assert_eq!(d.meta.external_domain, Some(Domain::Algebra));
    }

    #[test]
    fn test_external_missing_uses_heuristic_best() {
        let reg = registry();
        // Geometry text signal with only one override token.
        let v = view("the triangle has area 6", "");
        let d = decide(reg, &v, None, &cfg());
        assert_eq!(d.meta.decision_reason, "external_missing_fallback");
        assert_eq!(d.domain, d.meta.heur_best);
        assert!(d.meta.heur_scores.get(d.domain) > 0);
    }

    #[test]
    fn test_external_missing_all_zero_uses_fallback() {
        let reg = registry();
        let v = view("An utterly featureless statement.", "");
        let d = decide(reg, &v, None, &cfg());
        assert_eq!(d.domain, Domain::Algebra);
        assert_eq!(d.meta.decision_reason, "external_missing_fallback");

        let custom = ClassifierConfig {
            fallback_domain: Domain::Geometry,
            ..cfg()
        };
        assert_eq!(decide(reg, &v, None, &custom).domain, Domain::Geometry);
    }

    #[test]
    fn test_ambiguous_external_treated_as_missing() {
        let reg = registry();
        let v = view("An utterly featureless statement.", "");
        let d = decide(reg, &v, Some("mixed"), &cfg());
        assert_eq!(d.meta.external_domain, None);
        assert_eq!(d.meta.decision_reason, "external_missing_fallback");
    }

    #[test]
    fn test_agree() {
        let reg = registry();
        let v = view("the triangle has area 6", "");
        let ranking = score_all(reg, &v).ranking();
        let d = decide(reg, &v, Some(ranking.best.as_str()), &cfg());
        assert_eq!(d.meta.decision_reason, "agree");
        assert_eq!(d.domain, ranking.best);
    }

    #[test]
    fn test_margin_threshold_boundary() {
        let reg = registry();
        // Geometry text rule alone scores 6 with everything else at 0,
        // which sits exactly on the default threshold.
        let v = view("the triangle has area 6", "");
        let ranking = score_all(reg, &v).ranking();
        assert_eq!(ranking.margin, 6);

        let d = decide(reg, &v, Some("combinatorics"), &cfg());
        assert_eq!(d.domain, ranking.best);
        assert_eq!(d.meta.decision_reason, "heuristic_override:margin=6");

        // One notch above the margin and the external annotation wins.
        let strict = ClassifierConfig { h_threshold: 7, ..cfg() };
        let d = decide(reg, &v, Some("combinatorics"), &strict);
        assert_eq!(d.domain, Domain::Combinatorics);
        assert_eq!(d.meta.decision_reason, "external_default");
    }

    #[test]
    fn test_external_synonym_normalized_before_compare() {
        let reg = registry();
        let v = view("An utterly featureless statement.", "");
        // "probability" normalizes to combinatorics; margin is 0 < threshold.
        let d = decide(reg, &v, Some("probability"), &cfg());
        assert_eq!(d.meta.external_domain, Some(Domain::Combinatorics));
        assert_eq!(d.domain, Domain::Combinatorics);
        assert_eq!(d.meta.decision_reason, "external_default");
    }

    #[test]
    fn test_decision_is_deterministic() {
        let reg = registry();
        let v = view("How many primes divide 720? gcd matters.", "print(6)");
        let first = decide(reg, &v, Some("number_theory"), &cfg());
        for _ in 0..5 {
            let again = decide(reg, &v, Some("number_theory"), &cfg());
            assert_eq!(again.domain, first.domain);
            assert_eq!(again.meta.decision_reason, first.meta.decision_reason);
        }
    }
}
