use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;
use crate::core::RerankedCandidate;
use crate::models::{Decision, Match, MatchCandidate, MatchStatus, NeedSheet, RankingSource};

/// Which party is answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Client,
    Architect,
}

/// Errors raised by the approval state machine
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatusError {
    #[error("Invalid transition: candidate is already {0:?}")]
    AlreadyFinal(MatchStatus),

    #[error("Invalid transition: a decision cannot be reset to pending")]
    ResetToPending,
}

/// Derive the combined status from both sides' decisions
pub fn derive_status(client: Decision, architect: Decision) -> MatchStatus {
    match (client, architect) {
        (Decision::Rejected, _) | (_, Decision::Rejected) => MatchStatus::Rejected,
        (Decision::Approved, Decision::Approved) => MatchStatus::Matched,
        (Decision::Approved, _) | (_, Decision::Approved) => MatchStatus::Approved,
        _ => MatchStatus::Pending,
    }
}

/// Record one side's decision on a candidate
///
/// Matched and rejected candidates are final.
pub fn apply_decision(
    candidate: &mut MatchCandidate,
    side: Side,
    decision: Decision,
) -> Result<MatchStatus, StatusError> {
    if candidate.status.is_terminal() {
        return Err(StatusError::AlreadyFinal(candidate.status));
    }
    if decision == Decision::Pending {
        return Err(StatusError::ResetToPending);
    }

    match side {
        Side::Client => candidate.client_decision = decision,
        Side::Architect => candidate.architect_decision = decision,
    }
    candidate.status = derive_status(candidate.client_decision, candidate.architect_decision);

    Ok(candidate.status)
}

/// Build the match document for a run on top of the stored one
///
/// Decisions already taken by architects still in the ranking are carried
/// over. Previous candidates with any decision recorded are kept, after the
/// fresh ranking, even if they no longer rank. Must be called with the
/// stored match read under the same lock that guards its replacement.
pub fn assemble_match(
    need_sheet: &NeedSheet,
    ranked: Vec<RerankedCandidate>,
    source: RankingSource,
    previous: Option<&Match>,
) -> Match {
    let now = chrono::Utc::now();

    let mut prior: HashMap<&str, &MatchCandidate> = previous
        .map(|m| m.candidates.iter().map(|c| (c.architect_id.as_str(), c)).collect())
        .unwrap_or_default();

    let mut candidates: Vec<MatchCandidate> = ranked
        .into_iter()
        .map(|r| {
            let (client_decision, architect_decision) = prior
                .remove(r.candidate.architect_id.as_str())
                .map(|p| (p.client_decision, p.architect_decision))
                .unwrap_or((Decision::Pending, Decision::Pending));

            MatchCandidate {
                architect_id: r.candidate.architect_id,
                name: r.candidate.name,
                rank: 0,
                score: r.score,
                rule_score: r.candidate.rule_score,
                llm_score: r.llm_score,
                rationale: r.rationale,
                distance_km: r.candidate.distance_km,
                breakdown: r.candidate.breakdown,
                matched_services: r.candidate.matched_services,
                matched_styles: r.candidate.matched_styles,
                client_decision,
                architect_decision,
                status: derive_status(client_decision, architect_decision),
            }
        })
        .collect();

    if let Some(previous) = previous {
        candidates.extend(
            previous
                .candidates
                .iter()
                .filter(|c| prior.contains_key(c.architect_id.as_str()))
                .filter(|c| c.client_decision != Decision::Pending || c.architect_decision != Decision::Pending)
                .cloned(),
        );
    }

    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i as u32 + 1;
    }

    Match {
        id: previous.map(|m| m.id).unwrap_or_else(Uuid::new_v4),
        need_sheet_id: need_sheet.id,
        client_id: need_sheet.client_id.clone(),
        ranking_source: source,
        candidates,
        version: previous.map(|m| m.version + 1).unwrap_or(1),
        created_at: previous.map(|m| m.created_at).unwrap_or(now),
        updated_at: now,
    }
}
