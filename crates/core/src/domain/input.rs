use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the scorers need for one ticker, as returned by a data provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub ticker: String,
    pub price: Option<PriceSnapshot>,
    pub fundamentals: Fundamentals,
    pub technicals: Technicals,
    pub sentiment: Option<SentimentData>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSnapshot {
    pub current_price: Option<f64>,
    pub previous_close: Option<f64>,
    pub day_change_pct: Option<f64>,
    pub high_52w: Option<f64>,
    pub low_52w: Option<f64>,
}

/// Ratios and growth rates are fractions (0.15 = 15%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fundamentals {
    pub pe_ratio: Option<f64>,
    pub forward_pe: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub dividend_yield: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Technicals {
    pub price: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub sma_200: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// News and social scores are in [-1, 1].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentData {
    pub news_score: Option<f64>,
    pub article_count: Option<u32>,
    pub positive_articles: Option<u32>,
    pub negative_articles: Option<u32>,
    pub social_score: Option<f64>,
    pub analyst_buy: Option<u32>,
    pub analyst_hold: Option<u32>,
    pub analyst_sell: Option<u32>,
    pub analyst_target_price: Option<f64>,
}

impl SentimentData {
    /// True when at least one field carries a signal.
    pub fn has_signal(&self) -> bool {
        self.news_score.is_some()
            || self.social_score.is_some()
            || self.article_count.is_some_and(|n| n > 0)
            || self.analyst_total() > 0
            || self.analyst_target_price.is_some()
    }

    /// Widened to `u64` so three `u32` counts cannot overflow.
    pub fn analyst_total(&self) -> u64 {
        [self.analyst_buy, self.analyst_hold, self.analyst_sell]
            .into_iter()
            .map(|n| u64::from(n.unwrap_or(0)))
            .sum()
    }
}

impl AnalysisInput {
    /// Best available current price: the price snapshot first, then the technicals record.
    pub fn current_price(&self) -> Option<f64> {
        self.price
            .as_ref()
            .and_then(|p| p.current_price)
            .or(self.technicals.price)
            .filter(|p| p.is_finite() && *p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_deserialize_as_none() {
        let f: Fundamentals = serde_json::from_value(json!({"pe_ratio": 12.5})).unwrap();
        assert_eq!(f.pe_ratio, Some(12.5));
        assert_eq!(f.debt_to_equity, None);
    }

    #[test]
    fn current_price_falls_back_to_technicals() {
        let input = AnalysisInput {
            ticker: "AAPL".to_string(),
            price: None,
            fundamentals: Fundamentals::default(),
            technicals: Technicals {
                price: Some(101.0),
                ..Default::default()
            },
            sentiment: None,
            timestamp: Utc::now(),
        };
        assert_eq!(input.current_price(), Some(101.0));
    }

    #[test]
    fn empty_sentiment_has_no_signal() {
        assert!(!SentimentData::default().has_signal());
        let s = SentimentData {
            article_count: Some(0),
            ..Default::default()
        };
        assert!(!s.has_signal());
        let s = SentimentData {
            analyst_buy: Some(3),
            ..Default::default()
        };
        assert!(s.has_signal());
    }

    #[test]
    fn analyst_total_does_not_overflow_near_u32_max() {
        let s = SentimentData {
            analyst_buy: Some(u32::MAX),
            analyst_hold: Some(1),
            analyst_sell: Some(u32::MAX),
            ..Default::default()
        };
        assert_eq!(s.analyst_total(), 2 * u64::from(u32::MAX) + 1);
        assert!(s.has_signal());
    }
}
