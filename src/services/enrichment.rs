use crate::models::{
    BuyerProfile, CompatibilityScore, InterestLevel, PropertyListing, RecommendedAction,
};
use crate::services::cache::{CacheKey, ReasoningCache};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 2;
const RETRY_BACKOFF_MS: u64 = 300;

const SYSTEM_PROMPT: &str = "You are a real-estate matching assistant. Given a buyer \
profile, a property listing and precomputed compatibility sub-scores, explain the match \
in two or three sentences. Respond with a JSON object containing exactly the keys \
\"reasoning\" (string), \"recommendedAction\" (one of \"high-priority\", \"good-match\", \
\"potential\", \"not-recommended\") and \"estimatedInterestLevel\" (one of \"very-high\", \
\"high\", \"medium\"). Return JSON only, no prose outside the object.";

/// Errors that can occur when calling the enrichment collaborator
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Collaborator returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Structured payload the collaborator must return
///
/// The labels are parsed strictly so a malformed or free-form response is
/// rejected and treated the same as a failed call. Only `reasoning` is ever
/// authoritative; the labels are reconciled against the deterministic
/// classification by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentPayload {
    pub reasoning: String,
    #[serde(rename = "recommendedAction")]
    pub recommended_action: RecommendedAction,
    #[serde(rename = "estimatedInterestLevel")]
    pub estimated_interest_level: InterestLevel,
}

/// Client for the OpenAI-compatible text-generation collaborator
///
/// Handles the single chat-completions call used to turn a computed
/// compatibility breakdown into human-readable reasoning. Retries once with
/// a short backoff on rate limits, server errors and transport failures.
pub struct EnrichmentClient {
    base_url: String,
    api_key: String,
    model: String,
    client: Client,
}

impl EnrichmentClient {
    /// Create a new enrichment client
    ///
    /// `timeout_secs` bounds each HTTP attempt; the caller applies an outer
    /// deadline across retries as well.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    ) -> Result<Self, EnrichmentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            model,
            client,
        })
    }

    /// Ask the collaborator to explain a scored match
    pub async fn explain(
        &self,
        buyer: &BuyerProfile,
        property: &PropertyListing,
        score: &CompatibilityScore,
    ) -> Result<EnrichmentPayload, EnrichmentError> {
        let prompt = build_prompt(buyer, property, score);

        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.4,
            max_tokens: 300,
        };

        let url = format!(
            "{}/chat/completions",
            self.base_url.trim_end_matches('/')
        );

        let mut last_error: Option<EnrichmentError> = None;

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                warn!(
                    "Enrichment attempt {} failed, retrying after {}ms",
                    attempt, RETRY_BACKOFF_MS
                );
                tokio::time::sleep(Duration::from_millis(RETRY_BACKOFF_MS)).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(EnrichmentError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                last_error = Some(EnrichmentError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EnrichmentError::Api {
                    status: status.as_u16(),
                    message: body,
                });
            }

            let chat: ChatResponse = response.json().await?;

            let content = chat
                .choices
                .first()
                .and_then(|c| c.message.content.as_deref())
                .ok_or(EnrichmentError::EmptyContent)?;

            let payload: EnrichmentPayload =
                serde_json::from_str(strip_json_fences(content))?;

            debug!(
                "Enrichment succeeded for property {} (buyer {})",
                property.id, buyer.id
            );

            return Ok(payload);
        }

        Err(last_error.unwrap_or(EnrichmentError::EmptyContent))
    }
}

/// Build the structured prompt for one scored match
fn build_prompt(
    buyer: &BuyerProfile,
    property: &PropertyListing,
    score: &CompatibilityScore,
) -> String {
    format!(
        "Buyer: budget ${:.0}-${:.0}, wants {} bedrooms / {} bathrooms, \
         preferred locations: {}, must-have features: {}, timeline: {}, financing: {}.\n\
         Property: {} in {} priced at ${:.0}, {} bedrooms / {} bathrooms, {} sqft, \
         features: {}, status: {}.\n\
         Computed sub-scores (0-100): price {:.0}, location {:.0}, features {:.0}, \
         size {:.0}, timeline {:.0}. Overall: {}.",
        buyer.budget.min,
        buyer.budget.max,
        buyer.preferences.bedrooms,
        buyer.preferences.bathrooms,
        join_or_none(&buyer.preferences.locations),
        join_or_none(&buyer.preferences.must_have_features),
        serde_plain(&buyer.timeline),
        serde_plain(&buyer.financing),
        property.address.as_deref().unwrap_or("listing"),
        property.location_label(),
        property.price,
        property.bedrooms,
        property.bathrooms,
        property.square_feet,
        join_or_none(&property.features),
        serde_plain(&property.status),
        score.breakdown.price_match,
        score.breakdown.location_match,
        score.breakdown.features_match,
        score.breakdown.size_match,
        score.breakdown.timeline_match,
        score.overall_score,
    )
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// Render a serde enum in its wire form, e.g. "pre-approved"
fn serde_plain<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Strips ```json ... ``` or ``` ... ``` code fences from collaborator output
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

/// Enrichment orchestrator
///
/// Wraps the optional collaborator client with a reasoning cache, a bounded
/// per-match deadline and the fallback rule: any failure keeps the
/// deterministic template reasoning and never alters numeric fields.
#[derive(Clone)]
pub struct Enricher {
    client: Option<Arc<EnrichmentClient>>,
    cache: Arc<ReasoningCache>,
    deadline: Duration,
}

impl Enricher {
    pub fn new(
        client: Option<Arc<EnrichmentClient>>,
        cache: Arc<ReasoningCache>,
        deadline_secs: u64,
    ) -> Self {
        Self {
            client,
            cache,
            deadline: Duration::from_secs(deadline_secs),
        }
    }

    /// Whether a collaborator is configured
    pub fn enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Enrich a single scored match with collaborator reasoning
    ///
    /// The numeric score and its derived labels are never touched. If the
    /// collaborator disagrees with the deterministic classification, its
    /// labels are discarded and the disagreement is logged.
    pub async fn enrich(
        &self,
        buyer: &BuyerProfile,
        property: &PropertyListing,
        mut score: CompatibilityScore,
    ) -> CompatibilityScore {
        let client = match &self.client {
            Some(c) => c,
            None => return score,
        };

        let key = CacheKey::reasoning(&buyer.id, &property.id, score.overall_score);
        if let Some(reasoning) = self.cache.get(&key).await {
            score.reasoning = reasoning;
            return score;
        }

        match tokio::time::timeout(self.deadline, client.explain(buyer, property, &score)).await {
            Ok(Ok(payload)) => {
                if payload.recommended_action != score.recommended_action
                    || payload.estimated_interest_level != score.estimated_interest_level
                {
                    debug!(
                        "Collaborator labels disagree for property {} ({:?}/{:?} vs {:?}/{:?}), keeping deterministic",
                        property.id,
                        payload.recommended_action,
                        payload.estimated_interest_level,
                        score.recommended_action,
                        score.estimated_interest_level,
                    );
                }

                self.cache.insert(key, payload.reasoning.clone()).await;
                score.reasoning = payload.reasoning;
            }
            Ok(Err(e)) => {
                warn!(
                    "Enrichment degraded for property {}, using template reasoning: {}",
                    property.id, e
                );
            }
            Err(_) => {
                warn!(
                    "Enrichment timed out after {:?} for property {}, using template reasoning",
                    self.deadline, property.id
                );
            }
        }

        score
    }

    /// Enrich a ranked result set concurrently
    ///
    /// Each match is enriched as an independent task; completion order does
    /// not affect output order.
    pub async fn enrich_all(
        &self,
        buyer: &BuyerProfile,
        pairs: Vec<(PropertyListing, CompatibilityScore)>,
    ) -> Vec<CompatibilityScore> {
        if self.client.is_none() || pairs.is_empty() {
            return pairs.into_iter().map(|(_, score)| score).collect();
        }

        let fallback: Vec<CompatibilityScore> =
            pairs.iter().map(|(_, score)| score.clone()).collect();

        let mut tasks = JoinSet::new();
        for (idx, (property, score)) in pairs.into_iter().enumerate() {
            let enricher = self.clone();
            let buyer = buyer.clone();
            tasks.spawn(async move {
                let enriched = enricher.enrich(&buyer, &property, score).await;
                (idx, enriched)
            });
        }

        let mut out: Vec<Option<CompatibilityScore>> = vec![None; fallback.len()];
        while let Some(joined) = tasks.join_next().await {
            if let Ok((idx, enriched)) = joined {
                out[idx] = Some(enriched);
            }
        }

        out.into_iter()
            .enumerate()
            .map(|(idx, slot)| slot.unwrap_or_else(|| fallback[idx].clone()))
            .collect()
    }
}
