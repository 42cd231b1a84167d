//! Weighted synthesis of the three lens scores into one recommendation.
//!
//! The weights and thresholds are policy, not algorithm: [`SynthesisPolicy`] carries them with
//! sensible defaults and the worker may override them.

use crate::domain::input::AnalysisInput;
use crate::domain::recommendation::{Recommendation, RecommendationLabel};
use crate::domain::score::{Lens, ScoreResult, MAX_SCORE, NEUTRAL_SCORE};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisWeights {
    pub fundamental: f64,
    pub technical: f64,
    pub sentiment: f64,
}

impl Default for SynthesisWeights {
    fn default() -> Self {
        Self {
            fundamental: 0.40,
            technical: 0.35,
            sentiment: 0.25,
        }
    }
}

impl SynthesisWeights {
    /// Parses `"fundamental,technical,sentiment"`, e.g. `"0.4,0.35,0.25"`.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        ensure!(
            parts.len() == 3,
            "weights must have exactly 3 comma-separated values (got {})",
            parts.len()
        );

        let mut values = [0.0_f64; 3];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .parse::<f64>()
                .with_context(|| format!("invalid weight: {part:?}"))?;
        }

        let weights = Self {
            fundamental: values[0],
            technical: values[1],
            sentiment: values[2],
        };
        weights.validate()?;
        Ok(weights)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (lens, w) in self.iter() {
            ensure!(
                w.is_finite() && w >= 0.0,
                "{lens} weight must be a non-negative number (got {w})"
            );
        }
        ensure!(self.sum() > 0.0, "weights must not all be zero");
        Ok(())
    }

    pub fn get(&self, lens: Lens) -> f64 {
        match lens {
            Lens::Fundamental => self.fundamental,
            Lens::Technical => self.technical,
            Lens::Sentiment => self.sentiment,
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Lens, f64)> + '_ {
        Lens::ALL.into_iter().map(|lens| (lens, self.get(lens)))
    }

    fn sum(&self) -> f64 {
        self.fundamental + self.technical + self.sentiment
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisPolicy {
    pub weights: SynthesisWeights,
    /// Minimum confidence for each label, from most to least bullish.
    pub strong_buy_at: u8,
    pub buy_at: u8,
    pub hold_at: u8,
    pub sell_at: u8,
    /// Spread (max - min lens score) at which the lenses are considered in conflict.
    pub conflict_spread: u8,
    /// Fraction of the distance from neutral removed when the lenses conflict.
    pub conflict_damping: f64,
}

impl Default for SynthesisPolicy {
    fn default() -> Self {
        Self {
            weights: SynthesisWeights::default(),
            strong_buy_at: 80,
            buy_at: 65,
            hold_at: 45,
            sell_at: 30,
            conflict_spread: 30,
            conflict_damping: 0.25,
        }
    }
}

impl SynthesisPolicy {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.weights.validate()?;
        ensure!(
            self.strong_buy_at <= MAX_SCORE
                && self.strong_buy_at > self.buy_at
                && self.buy_at > self.hold_at
                && self.hold_at > self.sell_at,
            "label thresholds must be strictly descending within 0..=100 (got {}/{}/{}/{})",
            self.strong_buy_at,
            self.buy_at,
            self.hold_at,
            self.sell_at
        );
        ensure!(
            self.conflict_spread <= MAX_SCORE,
            "conflict_spread must be within 0..=100 (got {})",
            self.conflict_spread
        );
        ensure!(
            (0.0..=1.0).contains(&self.conflict_damping),
            "conflict_damping must be within 0..=1 (got {})",
            self.conflict_damping
        );
        Ok(())
    }

    pub fn label_for(&self, confidence: u8) -> RecommendationLabel {
        if confidence >= self.strong_buy_at {
            RecommendationLabel::StrongBuy
        } else if confidence >= self.buy_at {
            RecommendationLabel::Buy
        } else if confidence >= self.hold_at {
            RecommendationLabel::Hold
        } else if confidence >= self.sell_at {
            RecommendationLabel::Sell
        } else {
            RecommendationLabel::StrongSell
        }
    }
}

/// Price levels used for the risk/reward ratio.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceBounds {
    pub price: Option<f64>,
    /// Upside target: analyst target, else resistance, else 52-week high.
    pub target: Option<f64>,
    /// Downside floor: support, else lower Bollinger band, else 52-week low.
    pub floor: Option<f64>,
}

impl PriceBounds {
    pub fn from_input(input: &AnalysisInput) -> Self {
        let positive = |v: Option<f64>| v.filter(|x| x.is_finite() && *x > 0.0);
        let high_52w = input.price.as_ref().and_then(|p| p.high_52w);
        let low_52w = input.price.as_ref().and_then(|p| p.low_52w);
        let analyst_target = input.sentiment.as_ref().and_then(|s| s.analyst_target_price);

        Self {
            price: input.current_price(),
            target: positive(analyst_target)
                .or(positive(input.technicals.resistance))
                .or(positive(high_52w)),
            floor: positive(input.technicals.support)
                .or(positive(input.technicals.bollinger_lower))
                .or(positive(low_52w)),
        }
    }

    pub fn risk_reward_ratio(&self) -> Option<f64> {
        let (price, target, floor) = (self.price?, self.target?, self.floor?);
        let upside = target - price;
        let downside = price - floor;
        if !(upside > 0.0 && downside > 0.0) {
            return None;
        }
        Some((upside / downside * 100.0).round() / 100.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    policy: SynthesisPolicy,
}

impl Synthesizer {
    pub fn new(policy: SynthesisPolicy) -> anyhow::Result<Self> {
        policy.validate().context("invalid synthesis policy")?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &SynthesisPolicy {
        &self.policy
    }

    pub fn synthesize(
        &self,
        ticker: &str,
        fundamental: &ScoreResult,
        technical: &ScoreResult,
        sentiment: &ScoreResult,
        bounds: &PriceBounds,
    ) -> Recommendation {
        let scored = [
            (Lens::Fundamental, fundamental),
            (Lens::Technical, technical),
            (Lens::Sentiment, sentiment),
        ];

        let weights = &self.policy.weights;
        let total_weight = weights.sum();
        let weighted_score: f64 = scored
            .iter()
            .map(|(lens, r)| weights.get(*lens) / total_weight * f64::from(r.score.min(MAX_SCORE)))
            .sum();

        let mut dominant = scored[0];
        let mut lagging = scored[0];
        for entry in &scored[1..] {
            if entry.1.score > dominant.1.score {
                dominant = *entry;
            }
            if entry.1.score < lagging.1.score {
                lagging = *entry;
            }
        }

        let spread = dominant.1.score - lagging.1.score;
        let conflicting = spread >= self.policy.conflict_spread;

        let neutral = f64::from(NEUTRAL_SCORE);
        let adjusted = if conflicting {
            neutral + (weighted_score - neutral) * (1.0 - self.policy.conflict_damping)
        } else {
            weighted_score
        };
        let confidence = adjusted.round().clamp(0.0, f64::from(MAX_SCORE)) as u8;
        let label = self.policy.label_for(confidence);
        let risk_reward_ratio = bounds.risk_reward_ratio();

        let thesis = compose_thesis(
            label,
            confidence,
            dominant,
            lagging,
            spread,
            conflicting,
            risk_reward_ratio,
        );

        tracing::debug!(
            %ticker,
            weighted_score,
            spread,
            conflicting,
            confidence,
            label = %label,
            "synthesized recommendation"
        );

        Recommendation {
            recommendation: label,
            confidence,
            thesis,
            risk_reward_ratio,
            weighted_score: (weighted_score * 100.0).round() / 100.0,
            spread,
            conflicting,
            dominant: dominant.0,
            lagging: lagging.0,
        }
    }
}

fn compose_thesis(
    label: RecommendationLabel,
    confidence: u8,
    dominant: (Lens, &ScoreResult),
    lagging: (Lens, &ScoreResult),
    spread: u8,
    conflicting: bool,
    risk_reward_ratio: Option<f64>,
) -> String {
    let mut out = format!("{label} with {confidence}% confidence.");

    if spread == 0 {
        out.push_str(&format!(
            " All three lenses score {}/100.",
            dominant.1.score
        ));
    } else {
        out.push_str(&format!(
            " {} analysis leads at {}/100",
            capitalize(dominant.0.as_str()),
            dominant.1.score
        ));
        if let Some(signal) = dominant.1.strongest_bullish() {
            out.push_str(&format!(" ({})", signal.reason));
        }
        out.push_str(&format!(
            "; {} analysis trails at {}/100",
            lagging.0,
            lagging.1.score
        ));
        if let Some(signal) = lagging.1.strongest_bearish() {
            out.push_str(&format!(" ({})", signal.reason));
        }
        out.push('.');
    }

    if conflicting {
        out.push_str(&format!(
            " Signals are mixed ({spread}-point spread), so conviction is tempered."
        ));
    } else if spread < 10 {
        out.push_str(" The three lenses broadly agree.");
    }

    if let Some(rr) = risk_reward_ratio {
        out.push_str(&format!(" Risk/reward is {rr:.2}."));
    }

    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::Signal;

    fn score(lens: Lens, score: u8) -> ScoreResult {
        let mut r = ScoreResult::neutral(lens, "AAPL");
        r.score = score;
        r
    }

    fn run(f: u8, t: u8, s: u8) -> Recommendation {
        Synthesizer::default().synthesize(
            "AAPL",
            &score(Lens::Fundamental, f),
            &score(Lens::Technical, t),
            &score(Lens::Sentiment, s),
            &PriceBounds::default(),
        )
    }

    #[test]
    fn neutral_triple_is_hold_at_fifty() {
        let r = run(50, 50, 50);
        assert_eq!(r.confidence, 50);
        assert_eq!(r.recommendation, RecommendationLabel::Hold);
        assert!(!r.conflicting);
        assert!(r.thesis.contains("All three lenses score 50/100"));
    }

    #[test]
    fn weights_are_applied() {
        // 0.4*80 + 0.35*70 + 0.25*62 = 72
        let r = run(80, 70, 62);
        assert_eq!(r.weighted_score, 72.0);
        assert_eq!(r.confidence, 72);
        assert_eq!(r.recommendation, RecommendationLabel::Buy);
        assert_eq!(r.dominant, Lens::Fundamental);
        assert_eq!(r.lagging, Lens::Sentiment);
    }

    #[test]
    fn identical_inputs_are_deterministic() {
        for (f, t, s) in [(10, 90, 50), (77, 64, 81), (0, 0, 100)] {
            let a = run(f, t, s);
            let b = run(f, t, s);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn confidence_stays_in_range() {
        for f in (0..=100).step_by(10) {
            for t in (0..=100).step_by(10) {
                for s in (0..=100).step_by(10) {
                    let r = run(f, t, s);
                    assert!(r.confidence <= 100);
                }
            }
        }
        assert_eq!(run(100, 100, 100).confidence, 100);
        assert_eq!(run(0, 0, 0).confidence, 0);
    }

    #[test]
    fn conflicting_signals_are_damped_toward_neutral() {
        // weighted = 0.4*90 + 0.35*90 + 0.25*20 = 72.5; damped = 50 + 22.5*0.75 = 66.875
        let r = run(90, 90, 20);
        assert!(r.conflicting);
        assert_eq!(r.spread, 70);
        assert_eq!(r.confidence, 67);
        assert_eq!(r.recommendation, RecommendationLabel::Buy);
        assert!(r.thesis.contains("Signals are mixed"));
    }

    #[test]
    fn bearish_triple_is_sell_class() {
        let r = run(20, 15, 30);
        assert!(r.recommendation.is_sell());
        assert_eq!(r.recommendation, RecommendationLabel::StrongSell);
    }

    #[test]
    fn label_thresholds() {
        let p = SynthesisPolicy::default();
        assert_eq!(p.label_for(80), RecommendationLabel::StrongBuy);
        assert_eq!(p.label_for(79), RecommendationLabel::Buy);
        assert_eq!(p.label_for(65), RecommendationLabel::Buy);
        assert_eq!(p.label_for(64), RecommendationLabel::Hold);
        assert_eq!(p.label_for(45), RecommendationLabel::Hold);
        assert_eq!(p.label_for(44), RecommendationLabel::Sell);
        assert_eq!(p.label_for(30), RecommendationLabel::Sell);
        assert_eq!(p.label_for(29), RecommendationLabel::StrongSell);
    }

    #[test]
    fn thesis_names_dominant_signal() {
        let mut f = score(Lens::Fundamental, 85);
        f.signals.push(Signal {
            reason: "P/E 12.0 looks undervalued".to_string(),
            points: 10,
        });
        let mut s = score(Lens::Sentiment, 70);
        s.signals.push(Signal {
            reason: "news tone -0.10".to_string(),
            points: -2,
        });
        let r = Synthesizer::default().synthesize(
            "AAPL",
            &f,
            &score(Lens::Technical, 82),
            &s,
            &PriceBounds::default(),
        );
        assert!(r.thesis.starts_with("STRONG BUY with"));
        assert!(r.thesis.contains("Fundamental analysis leads at 85/100 (P/E 12.0 looks undervalued)"));
        assert!(r.thesis.contains("sentiment analysis trails at 70/100 (news tone -0.10)"));
    }

    #[test]
    fn custom_weights_are_normalized() {
        let policy = SynthesisPolicy {
            weights: SynthesisWeights {
                fundamental: 2.0,
                technical: 0.0,
                sentiment: 0.0,
            },
            ..Default::default()
        };
        let synth = Synthesizer::new(policy).unwrap();
        let r = synth.synthesize(
            "AAPL",
            &score(Lens::Fundamental, 70),
            &score(Lens::Technical, 60),
            &score(Lens::Sentiment, 55),
            &PriceBounds::default(),
        );
        assert_eq!(r.confidence, 70);
    }

    #[test]
    fn rejects_bad_policy() {
        let zero = SynthesisPolicy {
            weights: SynthesisWeights {
                fundamental: 0.0,
                technical: 0.0,
                sentiment: 0.0,
            },
            ..Default::default()
        };
        assert!(Synthesizer::new(zero).is_err());

        let unordered = SynthesisPolicy {
            buy_at: 90,
            ..Default::default()
        };
        assert!(Synthesizer::new(unordered).is_err());

        let unreachable_spread = SynthesisPolicy {
            conflict_spread: 101,
            ..Default::default()
        };
        assert!(Synthesizer::new(unreachable_spread).is_err());
    }

    #[test]
    fn parses_weights() {
        let w = SynthesisWeights::parse("0.5, 0.3, 0.2").unwrap();
        assert_eq!(w.fundamental, 0.5);
        assert_eq!(w.sentiment, 0.2);
        assert!(SynthesisWeights::parse("0.5,0.5").is_err());
        assert!(SynthesisWeights::parse("a,b,c").is_err());
        assert!(SynthesisWeights::parse("-1,1,1").is_err());
    }

    #[test]
    fn risk_reward_from_bounds() {
        let b = PriceBounds {
            price: Some(100.0),
            target: Some(130.0),
            floor: Some(90.0),
        };
        assert_eq!(b.risk_reward_ratio(), Some(3.0));

        let above_target = PriceBounds {
            price: Some(140.0),
            ..b
        };
        assert_eq!(above_target.risk_reward_ratio(), None);

        let missing_floor = PriceBounds { floor: None, ..b };
        assert_eq!(missing_floor.risk_reward_ratio(), None);
    }
}
