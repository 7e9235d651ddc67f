use super::Signal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Discrete recommendation action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeAction {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl TradeAction {
    /// Parse from string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STRONG_BUY" => Some(Self::StrongBuy),
            "BUY" => Some(Self::Buy),
            "HOLD" => Some(Self::Hold),
            "SELL" => Some(Self::Sell),
            "STRONG_SELL" => Some(Self::StrongSell),
            _ => None,
        }
    }

    /// Get display label for this action.
    pub fn label(&self) -> &'static str {
        match self {
            TradeAction::StrongBuy => "Strong Buy",
            TradeAction::Buy => "Buy",
            TradeAction::Hold => "Hold",
            TradeAction::Sell => "Sell",
            TradeAction::StrongSell => "Strong Sell",
        }
    }
}

/// Which path produced a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Local threshold logic.
    Local,
    /// External reasoning service.
    External,
}

/// Inputs a recommendation was derived from, kept for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationDetails {
    pub symbol: String,
    pub timeframe: String,
    pub current_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub signals: Vec<Signal>,
    /// Verbatim reasoning-service response, when one was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// A trade recommendation for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Unique recommendation ID.
    pub id: Uuid,
    pub action: TradeAction,
    /// Confidence level (0-100).
    pub confidence: u8,
    /// Human-readable rationale.
    pub reasoning: String,
    /// Unix timestamp (milliseconds) when produced.
    pub timestamp: i64,
    pub source: RecommendationSource,
    pub details: RecommendationDetails,
}
