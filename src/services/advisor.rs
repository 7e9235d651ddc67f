//! Trading recommendations: score thresholding, optional external
//! reasoning, and a bounded recommendation history.

use crate::config::{ReasoningConfig, TrendThresholds};
use crate::types::{
    Recommendation, RecommendationDetails, RecommendationSource, Signal, TradeAction,
};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Maximum recommendations retained for later retrieval.
const MAX_HISTORY: usize = 100;

/// Inputs for one recommendation request.
#[derive(Debug, Clone)]
pub struct AdviceRequest {
    pub symbol: String,
    pub timeframe: String,
    pub current_price: f64,
    /// Composite score, when scoring produced one.
    pub score: Option<f64>,
    pub signals: Vec<Signal>,
}

/// Free-form completion backend for externally reasoned recommendations.
#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Return the raw model response for a prompt.
    async fn complete(&self, prompt: &str) -> anyhow::Result<String>;
}

/// Chat-completion client for an OpenAI-compatible endpoint.
pub struct ChatCompletionClient {
    client: reqwest::Client,
    config: ReasoningConfig,
}

impl ChatCompletionClient {
    /// Create a new chat-completion client.
    pub fn new(config: ReasoningConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("Sift/0.1 (Market Scanning Engine)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[async_trait]
impl ReasoningService for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<String> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an experienced trading analyst. Provide precise \
                                recommendations based on technical analysis."
                },
                { "role": "user", "content": prompt }
            ],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("reasoning request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(anyhow!("reasoning API returned {}", status));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("invalid reasoning response body")?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("reasoning response had no choices"))
    }
}

/// Maps a composite score and signal list to a trade recommendation.
///
/// With a reasoning service attached the engine defers to it first;
/// any failure there falls back to the local threshold logic, so
/// `recommend` itself never fails. Every produced recommendation is
/// appended to a bounded history (oldest evicted first).
pub struct RecommendationEngine {
    thresholds: TrendThresholds,
    reasoning: Option<Arc<dyn ReasoningService>>,
    history: RwLock<VecDeque<Recommendation>>,
}

impl RecommendationEngine {
    /// Create an engine using only local threshold logic.
    pub fn new(thresholds: TrendThresholds) -> Self {
        Self {
            thresholds,
            reasoning: None,
            history: RwLock::new(VecDeque::new()),
        }
    }

    /// Attach an external reasoning service; local logic remains the
    /// fallback.
    pub fn with_reasoning(mut self, service: Arc<dyn ReasoningService>) -> Self {
        self.reasoning = Some(service);
        self
    }

    /// Produce a recommendation for the request.
    pub async fn recommend(&self, request: &AdviceRequest) -> Recommendation {
        let recommendation = match &self.reasoning {
            Some(service) => match self.external_recommendation(service.as_ref(), request).await {
                Ok(recommendation) => recommendation,
                Err(e) => {
                    warn!(
                        "External reasoning failed for {}: {:#}; falling back to local thresholds",
                        request.symbol, e
                    );
                    self.local_recommendation(request)
                }
            },
            None => self.local_recommendation(request),
        };

        self.record(recommendation.clone()).await;
        recommendation
    }

    /// Threshold the composite score into an action and confidence.
    fn local_recommendation(&self, request: &AdviceRequest) -> Recommendation {
        let t = &self.thresholds;
        let (action, confidence, trend_text) = match request.score {
            Some(score) if score >= t.strong_bull => (
                TradeAction::StrongBuy,
                score,
                format!("Strong bullish trend ({:.1}%)", score),
            ),
            Some(score) if score >= t.bull => (
                TradeAction::Buy,
                score,
                format!("Bullish trend ({:.1}%)", score),
            ),
            Some(score) if score <= t.strong_bear => (
                TradeAction::StrongSell,
                100.0 - score,
                format!("Strong bearish trend ({:.1}%)", score),
            ),
            Some(score) if score <= t.bear => (
                TradeAction::Sell,
                100.0 - score,
                format!("Bearish trend ({:.1}%)", score),
            ),
            Some(score) => (
                TradeAction::Hold,
                50.0,
                format!("Neutral trend ({:.1}%)", score),
            ),
            None => (
                TradeAction::Hold,
                50.0,
                "No composite score available".to_string(),
            ),
        };

        let mut reasoning = format!("{} on {}. ", trend_text, request.symbol);
        if request.signals.is_empty() {
            reasoning.push_str("No clear signals to act on.");
        } else {
            let listed: Vec<String> = request
                .signals
                .iter()
                .map(|s| format!("{} ({})", s.signal_type.label(), s.source.label()))
                .collect();
            reasoning.push_str(&format!("Signals: {}.", listed.join(", ")));
        }

        self.build(
            action,
            confidence,
            reasoning,
            RecommendationSource::Local,
            request,
            None,
        )
    }

    async fn external_recommendation(
        &self,
        service: &dyn ReasoningService,
        request: &AdviceRequest,
    ) -> anyhow::Result<Recommendation> {
        let prompt = build_prompt(request);
        let response = service.complete(&prompt).await?;
        let parsed = parse_reasoning_response(&response)?;
        debug!(
            "External reasoning for {}: {:?} at {}%",
            request.symbol, parsed.action, parsed.confidence
        );

        Ok(self.build(
            parsed.action,
            parsed.confidence as f64,
            parsed.reasoning,
            RecommendationSource::External,
            request,
            Some(response),
        ))
    }

    fn build(
        &self,
        action: TradeAction,
        confidence: f64,
        reasoning: String,
        source: RecommendationSource,
        request: &AdviceRequest,
        raw_response: Option<String>,
    ) -> Recommendation {
        Recommendation {
            id: Uuid::new_v4(),
            action,
            confidence: confidence.round().clamp(0.0, 100.0) as u8,
            reasoning,
            timestamp: chrono::Utc::now().timestamp_millis(),
            source,
            details: RecommendationDetails {
                symbol: request.symbol.clone(),
                timeframe: request.timeframe.clone(),
                current_price: request.current_price,
                score: request.score,
                signals: request.signals.clone(),
                raw_response,
            },
        }
    }

    async fn record(&self, recommendation: Recommendation) {
        let mut history = self.history.write().await;
        history.push_back(recommendation);
        while history.len() > MAX_HISTORY {
            history.pop_front();
        }
    }

    /// Most recent recommendation, if any.
    pub async fn last(&self) -> Option<Recommendation> {
        self.history.read().await.back().cloned()
    }

    /// Recommendation history, oldest first. `limit = 0` returns
    /// everything retained.
    pub async fn history(&self, limit: usize) -> Vec<Recommendation> {
        let history = self.history.read().await;
        if limit == 0 || limit >= history.len() {
            history.iter().cloned().collect()
        } else {
            history.iter().skip(history.len() - limit).cloned().collect()
        }
    }

    /// Clear the recommendation history.
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }
}

/// Structured prompt sent to the reasoning service.
fn build_prompt(request: &AdviceRequest) -> String {
    let score_text = request
        .score
        .map(|score| format!("{:.1}", score))
        .unwrap_or_else(|| "n/a".to_string());

    let signals_text = if request.signals.is_empty() {
        "No signals".to_string()
    } else {
        request
            .signals
            .iter()
            .map(|s| format!("{} ({})", s.signal_type.label(), s.source.label()))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Analyze the following data for the trading pair {} on the {} timeframe:\n\n\
         1. Current price: {}\n\
         2. Composite score: {}%\n\
         3. Signals: {}\n\n\
         Provide a trading recommendation in JSON format:\n\
         {{\n\
           \"action\": \"STRONG_BUY\" | \"BUY\" | \"HOLD\" | \"SELL\" | \"STRONG_SELL\",\n\
           \"confidence\": number from 0 to 100,\n\
           \"reasoning\": \"Detailed explanation of the recommendation\"\n\
         }}\n\n\
         Justify the decision using the current market context and the technical indicators.",
        request.symbol, request.timeframe, request.current_price, score_text, signals_text
    )
}

struct ParsedReasoning {
    action: TradeAction,
    confidence: u8,
    reasoning: String,
}

#[derive(Debug, Deserialize)]
struct RawReasoning {
    action: String,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    reasoning: String,
}

/// Extract and validate the JSON recommendation embedded in a free-form
/// model response.
fn parse_reasoning_response(text: &str) -> anyhow::Result<ParsedReasoning> {
    let start = text
        .find('{')
        .ok_or_else(|| anyhow!("no JSON object in reasoning response"))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("no JSON object in reasoning response"))?;

    let raw: RawReasoning = serde_json::from_str(&text[start..=end])
        .context("malformed JSON in reasoning response")?;

    let action = TradeAction::parse(&raw.action)
        .ok_or_else(|| anyhow!("invalid action from reasoning service: {}", raw.action))?;

    if raw.reasoning.trim().is_empty() {
        return Err(anyhow!("reasoning response missing explanation"));
    }

    let confidence = raw.confidence.unwrap_or(50.0).clamp(0.0, 100.0).round() as u8;

    Ok(ParsedReasoning {
        action,
        confidence,
        reasoning: raw.reasoning,
    })
}
