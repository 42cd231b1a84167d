use crate::domain::input::{AnalysisInput, Fundamentals, PriceSnapshot, SentimentData, Technicals};
use anyhow::ensure;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire shape returned by a data provider for a single ticker.
///
/// Every section is optional on the wire; the scorers treat absent sections as neutral.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSnapshot {
    pub ticker: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub price: Option<PriceSnapshot>,
    #[serde(default)]
    pub fundamentals: Option<Fundamentals>,
    #[serde(default)]
    pub technicals: Option<Technicals>,
    #[serde(default)]
    pub sentiment: Option<SentimentData>,
}

impl ProviderSnapshot {
    pub fn validate_and_into_input(
        self,
        expected_ticker: &str,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<AnalysisInput> {
        let ticker = self.ticker.trim().to_ascii_uppercase();
        ensure!(!ticker.is_empty(), "ticker must be non-empty");
        ensure!(
            ticker.eq_ignore_ascii_case(expected_ticker.trim()),
            "provider ticker mismatch: expected {expected_ticker}, got {ticker}"
        );

        if let Some(price) = self.price.as_ref().and_then(|p| p.current_price) {
            ensure!(
                price.is_finite() && price > 0.0,
                "current_price must be positive (got {price})"
            );
        }

        Ok(AnalysisInput {
            ticker,
            price: self.price,
            fundamentals: self.fundamentals.unwrap_or_default(),
            technicals: self.technicals.unwrap_or_default(),
            sentiment: self.sentiment,
            timestamp: self.timestamp.unwrap_or(fetched_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fetched_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 27, 10, 0, 0).unwrap()
    }

    #[test]
    fn accepts_minimal_snapshot() {
        let snap: ProviderSnapshot = serde_json::from_value(json!({"ticker": " aapl "})).unwrap();
        let input = snap.validate_and_into_input("AAPL", fetched_at()).unwrap();
        assert_eq!(input.ticker, "AAPL");
        assert_eq!(input.timestamp, fetched_at());
        assert!(input.sentiment.is_none());
        assert_eq!(input.fundamentals, Fundamentals::default());
    }

    #[test]
    fn keeps_provider_timestamp() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 26, 21, 0, 0).unwrap();
        let snap: ProviderSnapshot = serde_json::from_value(json!({
            "ticker": "MSFT",
            "timestamp": ts,
            "price": {"current_price": 410.5},
        }))
        .unwrap();
        let input = snap.validate_and_into_input("MSFT", fetched_at()).unwrap();
        assert_eq!(input.timestamp, ts);
        assert_eq!(input.current_price(), Some(410.5));
    }

    #[test]
    fn rejects_wrong_ticker() {
        let snap: ProviderSnapshot = serde_json::from_value(json!({"ticker": "TSLA"})).unwrap();
        assert!(snap.validate_and_into_input("AAPL", fetched_at()).is_err());
    }

    #[test]
    fn rejects_empty_ticker() {
        let snap: ProviderSnapshot = serde_json::from_value(json!({"ticker": "  "})).unwrap();
        assert!(snap.validate_and_into_input("", fetched_at()).is_err());
    }

    #[test]
    fn rejects_non_positive_price() {
        let snap: ProviderSnapshot = serde_json::from_value(json!({
            "ticker": "AAPL",
            "price": {"current_price": 0.0},
        }))
        .unwrap();
        assert!(snap.validate_and_into_input("AAPL", fetched_at()).is_err());
    }

    #[test]
    fn rejects_non_numeric_metrics_via_deserialize() {
        let res = serde_json::from_value::<ProviderSnapshot>(json!({
            "ticker": "AAPL",
            "fundamentals": {"pe_ratio": "12"},
        }));
        assert!(res.is_err());
    }
}
