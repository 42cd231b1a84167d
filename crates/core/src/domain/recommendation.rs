use crate::domain::score::{Lens, ScoreResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationLabel {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl RecommendationLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationLabel::StrongBuy => "STRONG BUY",
            RecommendationLabel::Buy => "BUY",
            RecommendationLabel::Hold => "HOLD",
            RecommendationLabel::Sell => "SELL",
            RecommendationLabel::StrongSell => "STRONG SELL",
        }
    }

    pub fn is_buy(self) -> bool {
        matches!(self, RecommendationLabel::StrongBuy | RecommendationLabel::Buy)
    }

    pub fn is_sell(self) -> bool {
        matches!(self, RecommendationLabel::StrongSell | RecommendationLabel::Sell)
    }
}

impl fmt::Display for RecommendationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of the synthesizer. Derived solely from the three lens scores and price bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub recommendation: RecommendationLabel,
    pub confidence: u8,
    pub thesis: String,
    pub risk_reward_ratio: Option<f64>,
    /// Weighted blend before conflict damping.
    pub weighted_score: f64,
    /// max - min of the three lens scores.
    pub spread: u8,
    pub conflicting: bool,
    pub dominant: Lens,
    pub lagging: Lens,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub fundamental: u8,
    pub technical: u8,
    pub sentiment: u8,
    pub final_confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedAnalysis {
    pub fundamental: ScoreResult,
    pub technical: ScoreResult,
    pub sentiment: ScoreResult,
    pub synthesis: Recommendation,
}

/// One line of the output file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub ticker: String,
    pub timestamp: DateTime<Utc>,
    pub current_price: Option<f64>,
    pub scores: Scores,
    pub recommendation: RecommendationLabel,
    pub thesis: String,
    pub risk_reward_ratio: Option<f64>,
    pub detailed_analysis: DetailedAnalysis,
}

impl AnalysisResult {
    pub fn assemble(
        ticker: impl Into<String>,
        timestamp: DateTime<Utc>,
        current_price: Option<f64>,
        fundamental: ScoreResult,
        technical: ScoreResult,
        sentiment: ScoreResult,
        synthesis: Recommendation,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            timestamp,
            current_price,
            scores: Scores {
                fundamental: fundamental.score,
                technical: technical.score,
                sentiment: sentiment.score,
                final_confidence: synthesis.confidence,
            },
            recommendation: synthesis.recommendation,
            thesis: synthesis.thesis.clone(),
            risk_reward_ratio: synthesis.risk_reward_ratio,
            detailed_analysis: DetailedAnalysis {
                fundamental,
                technical,
                sentiment,
                synthesis,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_serialize_upper_case() {
        let v = serde_json::to_value(RecommendationLabel::StrongBuy).unwrap();
        assert_eq!(v, serde_json::json!("STRONG BUY"));
        let back: RecommendationLabel = serde_json::from_value(serde_json::json!("SELL")).unwrap();
        assert_eq!(back, RecommendationLabel::Sell);
    }

    #[test]
    fn label_classes() {
        assert!(RecommendationLabel::Buy.is_buy());
        assert!(RecommendationLabel::StrongSell.is_sell());
        assert!(!RecommendationLabel::Hold.is_buy());
        assert!(!RecommendationLabel::Hold.is_sell());
    }
}
