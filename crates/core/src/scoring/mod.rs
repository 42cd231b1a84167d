//! Heuristic scorers for the three lenses.
//!
//! Each scorer starts from the neutral midpoint, applies fixed threshold rules and clamps the
//! result to `0..=100`. Missing inputs contribute no points, so an empty record scores 50.

pub mod fundamental;
pub mod sentiment;
pub mod technical;

pub use fundamental::FundamentalScorer;
pub use sentiment::SentimentScorer;
pub use technical::TechnicalScorer;

use crate::domain::score::{Lens, Metric, ScoreResult, Signal, MAX_SCORE, NEUTRAL_SCORE};
use std::collections::BTreeMap;

/// Point accumulator shared by the scorers.
#[derive(Debug)]
pub(crate) struct ScoreCard {
    lens: Lens,
    ticker: String,
    points: i32,
    details: BTreeMap<String, Metric>,
    signals: Vec<Signal>,
}

impl ScoreCard {
    pub(crate) fn new(lens: Lens, ticker: &str) -> Self {
        Self {
            lens,
            ticker: ticker.trim().to_string(),
            points: 0,
            details: BTreeMap::new(),
            signals: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, points: i32, reason: impl Into<String>) {
        if points == 0 {
            return;
        }
        self.points += points;
        self.signals.push(Signal {
            reason: reason.into(),
            points,
        });
    }

    pub(crate) fn points(&self) -> i32 {
        self.points
    }

    pub(crate) fn metric(&mut self, key: &str, value: impl Into<Metric>) {
        self.details.insert(key.to_string(), value.into());
    }

    pub(crate) fn metric_opt(&mut self, key: &str, value: Option<f64>) {
        if let Some(v) = value {
            self.metric(key, v);
        }
    }

    pub(crate) fn finish(self) -> ScoreResult {
        let raw = i32::from(NEUTRAL_SCORE) + self.points;
        let score = raw.clamp(0, i32::from(MAX_SCORE)) as u8;

        tracing::debug!(
            ticker = %self.ticker,
            lens = %self.lens,
            raw,
            score,
            signals = self.signals.len(),
            "lens scored"
        );

        ScoreResult {
            lens: self.lens,
            ticker: self.ticker,
            score,
            details: self.details,
            signals: self.signals,
        }
    }
}

/// Drops NaN and infinities so they never reach a threshold comparison.
pub(crate) fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

pub(crate) fn pct(v: f64) -> String {
    format!("{:.1}%", v * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_to_bounds() {
        let mut card = ScoreCard::new(Lens::Technical, "AAPL");
        card.add(80, "huge");
        assert_eq!(card.finish().score, 100);

        let mut card = ScoreCard::new(Lens::Technical, "AAPL");
        card.add(-75, "awful");
        assert_eq!(card.finish().score, 0);
    }

    #[test]
    fn zero_point_rules_leave_no_signal() {
        let mut card = ScoreCard::new(Lens::Sentiment, "AAPL");
        card.add(0, "nothing");
        let r = card.finish();
        assert_eq!(r.score, 50);
        assert!(r.signals.is_empty());
    }

    #[test]
    fn finite_filters_nan() {
        assert_eq!(finite(Some(f64::NAN)), None);
        assert_eq!(finite(Some(f64::INFINITY)), None);
        assert_eq!(finite(Some(1.5)), Some(1.5));
    }
}
