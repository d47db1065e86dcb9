use std::collections::HashMap;
use crate::models::ScoredCandidate;
use crate::core::matcher::rank_order;

/// One re-ranking opinion returned by the language model
#[derive(Debug, Clone, PartialEq)]
pub struct LlmVerdict {
    pub architect_id: String,
    pub score: f64,
    pub reason: Option<String>,
}

/// Candidate with its final score after (optional) re-ranking
#[derive(Debug, Clone)]
pub struct RerankedCandidate {
    pub candidate: ScoredCandidate,
    pub score: f64,
    pub llm_score: Option<f64>,
    pub rationale: Option<String>,
}

/// Rule-based order, used whenever the LLM is disabled or fails
pub fn rules_only(candidates: Vec<ScoredCandidate>) -> Vec<RerankedCandidate> {
    candidates
        .into_iter()
        .map(|candidate| RerankedCandidate {
            score: candidate.rule_score,
            candidate,
            llm_score: None,
            rationale: None,
        })
        .collect()
}

/// Blend LLM verdicts into the rule-based scores and re-sort
///
/// Returns `None` when no verdict refers to a known candidate, so the caller
/// can fall back to [`rules_only`].
pub fn apply_llm_ranking(
    candidates: Vec<ScoredCandidate>,
    verdicts: &[LlmVerdict],
    blend_weight: f64,
) -> Option<Vec<RerankedCandidate>> {
    let blend_weight = blend_weight.clamp(0.0, 1.0);

    let mut by_id: HashMap<&str, &LlmVerdict> = HashMap::with_capacity(verdicts.len());
    for verdict in verdicts.iter().filter(|v| v.score.is_finite()) {
        by_id.entry(verdict.architect_id.as_str()).or_insert(verdict);
    }

    let mut applied = 0usize;
    let mut reranked: Vec<RerankedCandidate> = candidates
        .into_iter()
        .map(|candidate| match by_id.get(candidate.architect_id.as_str()) {
            Some(verdict) => {
                applied += 1;
                let llm_score = verdict.score.clamp(0.0, 100.0);
                RerankedCandidate {
                    score: ((1.0 - blend_weight) * candidate.rule_score + blend_weight * llm_score)
                        .clamp(0.0, 100.0),
                    llm_score: Some(llm_score),
                    rationale: verdict.reason.clone(),
                    candidate,
                }
            }
            None => RerankedCandidate {
                score: candidate.rule_score,
                candidate,
                llm_score: None,
                rationale: None,
            },
        })
        .collect();

    if applied == 0 {
        return None;
    }

    reranked.sort_by(|a, b| {
        rank_order(
            (a.score, a.candidate.distance_km, &a.candidate.architect_id),
            (b.score, b.candidate.distance_km, &b.candidate.architect_id),
        )
    });

    Some(reranked)
}
