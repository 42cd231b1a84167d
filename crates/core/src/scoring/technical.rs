use crate::domain::input::Technicals;
use crate::domain::score::{Lens, ScoreResult};
use crate::scoring::{finite, ScoreCard};

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const VOLUME_SURGE: f64 = 1.5;

/// Trend, momentum, volatility bands and volume.
#[derive(Debug, Clone, Copy, Default)]
pub struct TechnicalScorer;

impl TechnicalScorer {
    pub fn analyze(&self, ticker: &str, t: &Technicals) -> ScoreResult {
        let mut card = ScoreCard::new(Lens::Technical, ticker);

        let price = finite(t.price).filter(|p| *p > 0.0);
        let rsi = finite(t.rsi_14);
        let macd = finite(t.macd);
        let macd_signal = finite(t.macd_signal);
        let sma20 = finite(t.sma_20);
        let sma50 = finite(t.sma_50);
        let sma200 = finite(t.sma_200);

        if let Some(rsi) = rsi {
            if rsi < RSI_OVERSOLD {
                card.add(10, format!("RSI {rsi:.1} is oversold"));
            } else if rsi < 45.0 {
                card.add(3, format!("RSI {rsi:.1} leaves room to run"));
            } else if rsi > RSI_OVERBOUGHT {
                card.add(-10, format!("RSI {rsi:.1} is overbought"));
            } else if rsi >= 55.0 {
                card.add(5, format!("RSI {rsi:.1} shows bullish momentum"));
            }
        }

        let macd_bias = match (macd, macd_signal) {
            (Some(m), Some(s)) if m > s => {
                card.add(10, "MACD above signal line");
                Some(true)
            }
            (Some(m), Some(s)) if m < s => {
                card.add(-10, "MACD below signal line");
                Some(false)
            }
            (Some(m), None) if m > 0.0 => {
                card.add(5, "MACD positive");
                Some(true)
            }
            (Some(m), None) if m < 0.0 => {
                card.add(-5, "MACD negative");
                Some(false)
            }
            _ => None,
        };

        let above_50 = compare(price, sma50);
        let above_200 = compare(price, sma200);
        let above_20 = compare(price, sma20);

        match above_50 {
            Some(true) => card.add(8, "price above 50-day average"),
            Some(false) => card.add(-8, "price below 50-day average"),
            None => {}
        }
        match above_200 {
            Some(true) => card.add(10, "price above 200-day average"),
            Some(false) => card.add(-10, "price below 200-day average"),
            None => {}
        }
        match above_20 {
            Some(true) => card.add(3, "price above 20-day average"),
            Some(false) => card.add(-3, "price below 20-day average"),
            None => {}
        }

        let cross = match (sma50, sma200) {
            (Some(fast), Some(slow)) if fast > slow => {
                card.add(7, "golden cross (50-day over 200-day)");
                Some("golden")
            }
            (Some(fast), Some(slow)) if fast < slow => {
                card.add(-7, "death cross (50-day under 200-day)");
                Some("death")
            }
            _ => None,
        };

        if let Some(p) = price {
            if let Some(lower) = finite(t.bollinger_lower) {
                if p <= lower {
                    card.add(5, "price at lower Bollinger band");
                }
            }
            if let Some(upper) = finite(t.bollinger_upper) {
                if p >= upper {
                    card.add(-5, "price at upper Bollinger band");
                }
            }
        }

        let volume_ratio = match (finite(t.volume), finite(t.avg_volume)) {
            (Some(v), Some(avg)) if avg > 0.0 => Some(v / avg),
            _ => None,
        };
        if let Some(ratio) = volume_ratio {
            if ratio > VOLUME_SURGE {
                match above_20 {
                    Some(true) => card.add(5, format!("volume {ratio:.1}x average on strength")),
                    Some(false) => card.add(-5, format!("volume {ratio:.1}x average on weakness")),
                    None => {}
                }
            }
        }

        let trend = match (above_50, above_200) {
            (Some(true), Some(true)) => "Uptrend",
            (Some(false), Some(false)) => "Downtrend",
            (Some(_), Some(_)) => "Sideways",
            (Some(true), None) | (None, Some(true)) => "Uptrend",
            (Some(false), None) | (None, Some(false)) => "Downtrend",
            (None, None) => "Unknown",
        };

        let momentum = match (rsi, macd_bias) {
            (Some(r), _) if r > RSI_OVERBOUGHT => "Overbought",
            (Some(r), _) if r < RSI_OVERSOLD => "Oversold",
            (_, Some(true)) => "Bullish",
            (_, Some(false)) => "Bearish",
            (Some(_), None) => "Neutral",
            (None, None) => "Unknown",
        };

        card.metric("trend", trend);
        card.metric("momentum", momentum);
        if let Some(cross) = cross {
            card.metric("ma_cross", cross);
        }
        card.metric_opt("price", price);
        card.metric_opt("rsi", rsi);
        card.metric_opt("macd", macd);
        card.metric_opt("macd_signal", macd_signal);
        card.metric_opt("sma_20", sma20);
        card.metric_opt("sma_50", sma50);
        card.metric_opt("sma_200", sma200);
        card.metric_opt("volume_ratio", volume_ratio);

        card.finish()
    }
}

fn compare(price: Option<f64>, average: Option<f64>) -> Option<bool> {
    match (price, average) {
        (Some(p), Some(a)) if p != a => Some(p > a),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::score::Metric;

    fn uptrend() -> Technicals {
        Technicals {
            price: Some(120.0),
            rsi_14: Some(60.0),
            macd: Some(1.8),
            macd_signal: Some(1.2),
            sma_20: Some(115.0),
            sma_50: Some(110.0),
            sma_200: Some(95.0),
            bollinger_upper: Some(130.0),
            bollinger_lower: Some(100.0),
            volume: Some(2.0e6),
            avg_volume: Some(1.0e6),
            support: Some(110.0),
            resistance: Some(140.0),
        }
    }

    #[test]
    fn empty_inputs_are_neutral() {
        let r = TechnicalScorer.analyze("AAPL", &Technicals::default());
        assert_eq!(r.score, 50);
        assert_eq!(r.detail("trend"), Some(&Metric::from("Unknown")));
        assert_eq!(r.detail("momentum"), Some(&Metric::from("Unknown")));
    }

    #[test]
    fn uptrend_scores_high() {
        let r = TechnicalScorer.analyze("AAPL", &uptrend());
        // 5 + 10 + 8 + 10 + 3 + 7 + 5
        assert_eq!(r.score, 98);
        assert_eq!(r.detail("trend"), Some(&Metric::from("Uptrend")));
        assert_eq!(r.detail("momentum"), Some(&Metric::from("Bullish")));
        assert_eq!(r.detail("ma_cross"), Some(&Metric::from("golden")));
        assert_eq!(r.detail("volume_ratio"), Some(&Metric::from(2.0)));
    }

    #[test]
    fn downtrend_scores_low() {
        let t = Technicals {
            price: Some(80.0),
            rsi_14: Some(50.0),
            macd: Some(-1.0),
            macd_signal: Some(-0.5),
            sma_20: Some(85.0),
            sma_50: Some(90.0),
            sma_200: Some(100.0),
            volume: Some(3.0e6),
            avg_volume: Some(1.0e6),
            ..Default::default()
        };
        let r = TechnicalScorer.analyze("TSLA", &t);
        // -10 - 8 - 10 - 3 - 7 - 5
        assert_eq!(r.score, 7);
        assert_eq!(r.detail("trend"), Some(&Metric::from("Downtrend")));
        assert_eq!(r.detail("momentum"), Some(&Metric::from("Bearish")));
    }

    #[test]
    fn overbought_rsi_subtracts() {
        let t = Technicals {
            rsi_14: Some(82.0),
            ..Default::default()
        };
        let r = TechnicalScorer.analyze("NVDA", &t);
        assert_eq!(r.score, 40);
        assert_eq!(r.detail("momentum"), Some(&Metric::from("Overbought")));
    }

    #[test]
    fn oversold_rsi_adds() {
        let t = Technicals {
            rsi_14: Some(22.0),
            ..Default::default()
        };
        let r = TechnicalScorer.analyze("NVDA", &t);
        assert_eq!(r.score, 60);
        assert_eq!(r.detail("momentum"), Some(&Metric::from("Oversold")));
    }

    #[test]
    fn mixed_averages_are_sideways() {
        let t = Technicals {
            price: Some(100.0),
            sma_50: Some(105.0),
            sma_200: Some(95.0),
            ..Default::default()
        };
        let r = TechnicalScorer.analyze("MSFT", &t);
        // -8 + 10 + 7
        assert_eq!(r.score, 59);
        assert_eq!(r.detail("trend"), Some(&Metric::from("Sideways")));
    }
}
