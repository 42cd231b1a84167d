use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const NEUTRAL_SCORE: u8 = 50;
pub const MAX_SCORE: u8 = 100;

/// One of the three independent analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lens {
    Fundamental,
    Technical,
    Sentiment,
}

impl Lens {
    pub const ALL: [Lens; 3] = [Lens::Fundamental, Lens::Technical, Lens::Sentiment];

    pub fn as_str(self) -> &'static str {
        match self {
            Lens::Fundamental => "fundamental",
            Lens::Technical => "technical",
            Lens::Sentiment => "sentiment",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named sub-metric value in a score's detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metric {
    Flag(bool),
    Number(f64),
    Label(String),
}

impl From<f64> for Metric {
    fn from(v: f64) -> Self {
        Metric::Number(v)
    }
}

impl From<u32> for Metric {
    fn from(v: u32) -> Self {
        Metric::Number(f64::from(v))
    }
}

impl From<u64> for Metric {
    fn from(v: u64) -> Self {
        Metric::Number(v as f64)
    }
}

impl From<bool> for Metric {
    fn from(v: bool) -> Self {
        Metric::Flag(v)
    }
}

impl From<&str> for Metric {
    fn from(v: &str) -> Self {
        Metric::Label(v.to_string())
    }
}

impl From<String> for Metric {
    fn from(v: String) -> Self {
        Metric::Label(v)
    }
}

/// A single rule that moved a score, e.g. "RSI 25.0 is oversold" (+10).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub reason: String,
    pub points: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub lens: Lens,
    pub ticker: String,
    pub score: u8,
    pub details: BTreeMap<String, Metric>,
    pub signals: Vec<Signal>,
}

impl ScoreResult {
    /// A neutral result for a lens with nothing to go on.
    pub fn neutral(lens: Lens, ticker: impl Into<String>) -> Self {
        Self {
            lens,
            ticker: ticker.into(),
            score: NEUTRAL_SCORE,
            details: BTreeMap::new(),
            signals: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Metric> {
        self.details.get(key)
    }

    /// The rule that pushed the score up the most, if any did.
    pub fn strongest_bullish(&self) -> Option<&Signal> {
        self.signals
            .iter()
            .filter(|s| s.points > 0)
            .max_by_key(|s| s.points)
    }

    /// The rule that pushed the score down the most, if any did.
    pub fn strongest_bearish(&self) -> Option<&Signal> {
        self.signals
            .iter()
            .filter(|s| s.points < 0)
            .min_by_key(|s| s.points)
    }
}
