use crate::core::LlmVerdict;
use crate::models::{NeedSheet, ScoredCandidate};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the language model
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("LLM returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("LLM returned no choices")]
    EmptyResponse,

    #[error("Invalid LLM output: {0}")]
    InvalidOutput(String),
}

const SYSTEM_PROMPT: &str = "You rank architects for a client's project. \
Reply with JSON only, shaped as {\"rankings\":[{\"architectId\":string,\"score\":number 0-100,\"reason\":string}]}. \
Include every candidate exactly once.";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct RankingEnvelope {
    rankings: Vec<RawRanking>,
}

#[derive(Debug, Deserialize)]
struct RawRanking {
    #[serde(default, rename = "architectId", alias = "architect_id", alias = "id")]
    architect_id: Value,
    #[serde(default)]
    score: Value,
    #[serde(default, alias = "rationale")]
    reason: Option<String>,
}

/// Client for a locally hosted, OpenAI-compatible chat completions API
pub struct LlmClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
    client: Client,
}

impl LlmClient {
    /// Create a new LLM client
    pub fn new(
        base_url: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
        temperature: f32,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key: api_key.filter(|k| !k.is_empty()),
            temperature,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model to re-rank pre-filtered candidates for a needsheet
    pub async fn rerank(
        &self,
        need_sheet: &NeedSheet,
        candidates: &[ScoredCandidate],
    ) -> Result<Vec<LlmVerdict>, LlmError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage { role: "system".to_string(), content: SYSTEM_PROMPT.to_string() },
                ChatMessage { role: "user".to_string(), content: build_prompt(need_sheet, candidates) },
            ],
            temperature: self.temperature,
            stream: false,
        };

        tracing::debug!(
            "Requesting LLM re-rank of {} candidates for needsheet {} ({})",
            candidates.len(),
            need_sheet.id,
            self.model
        );

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(LlmError::ApiError { status, body });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        parse_rankings(&content)
    }

    /// Check that the model server answers
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/v1/models", self.base_url);

        let mut request = self.client.get(&url).timeout(Duration::from_secs(5));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                tracing::warn!("LLM health check failed: {}", resp.status());
                false
            }
            Err(e) => {
                tracing::warn!("LLM unreachable: {}", e);
                false
            }
        }
    }
}

/// Build the user prompt: a compact JSON summary of the project and candidates
pub fn build_prompt(need_sheet: &NeedSheet, candidates: &[ScoredCandidate]) -> String {
    let project = json!({
        "title": need_sheet.title,
        "description": need_sheet.description,
        "requiredServices": need_sheet.required_services,
        "preferredStyles": need_sheet.preferred_styles,
        "budgetMin": need_sheet.budget_min,
        "budgetMax": need_sheet.budget_max,
        "startWithinWeeks": need_sheet.start_within_weeks,
        "maxDistanceKm": need_sheet.max_distance_km,
    });

    let candidates: Vec<Value> = candidates
        .iter()
        .map(|c| {
            json!({
                "architectId": c.architect_id,
                "name": c.name,
                "ruleScore": (c.rule_score * 10.0).round() / 10.0,
                "distanceKm": c.distance_km.map(|d| (d * 10.0).round() / 10.0),
                "matchedServices": c.matched_services,
                "matchedStyles": c.matched_styles,
                "breakdown": c.breakdown,
            })
        })
        .collect();

    format!(
        "Project:\n{}\n\nCandidates:\n{}\n\nScore each candidate for this project.",
        project,
        Value::Array(candidates)
    )
}

/// Extract verdicts from model output
///
/// Accepts a bare JSON document, a document wrapped in prose or code fences,
/// an object with a `rankings` array, or a bare array.
pub fn parse_rankings(content: &str) -> Result<Vec<LlmVerdict>, LlmError> {
    let raw = extract_rankings(content)
        .ok_or_else(|| LlmError::InvalidOutput(truncate_for_log(content)))?;

    let verdicts: Vec<LlmVerdict> = raw
        .into_iter()
        .filter_map(|r| {
            let architect_id = match r.architect_id {
                Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let score = match &r.score {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            Some(LlmVerdict {
                architect_id,
                score,
                reason: r.reason.filter(|s| !s.trim().is_empty()),
            })
        })
        .collect();

    if verdicts.is_empty() {
        return Err(LlmError::InvalidOutput("no usable rankings".to_string()));
    }

    Ok(verdicts)
}

fn extract_rankings(content: &str) -> Option<Vec<RawRanking>> {
    let trimmed = content.trim();

    if let Some(found) = parse_document(trimmed) {
        return Some(found);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Some(found) = parse_document(&trimmed[start..=end]) {
                return Some(found);
            }
        }
    }

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            return parse_document(&trimmed[start..=end]);
        }
    }

    None
}

fn parse_document(text: &str) -> Option<Vec<RawRanking>> {
    if let Ok(envelope) = serde_json::from_str::<RankingEnvelope>(text) {
        return Some(envelope.rankings);
    }
    serde_json::from_str::<Vec<RawRanking>>(text).ok()
}

fn truncate_for_log(content: &str) -> String {
    content.chars().take(200).collect()
}
