use crate::domain::input::{
    AnalysisInput, Fundamentals, PriceSnapshot, SentimentData, Technicals,
};
use crate::ingest::provider::DataProvider;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Deterministic offline data so the pipeline runs without a network provider.
///
/// A handful of well-known tickers get hand-written profiles; anything else gets a profile
/// derived from the ticker's bytes, so the same symbol always yields the same input.
#[derive(Debug, Clone)]
pub struct FixtureDataProvider {
    as_of: DateTime<Utc>,
}

impl FixtureDataProvider {
    pub fn new(as_of: DateTime<Utc>) -> Self {
        Self { as_of }
    }

    pub fn snapshot(&self, ticker: &str) -> AnalysisInput {
        let ticker = ticker.trim().to_ascii_uppercase();
        let (price, fundamentals, technicals, sentiment) = match ticker.as_str() {
            "AAPL" => aapl(),
            "MSFT" => msft(),
            "TSLA" => tsla(),
            other => derived(other),
        };

        AnalysisInput {
            ticker,
            price: Some(price),
            fundamentals,
            technicals,
            sentiment,
            timestamp: self.as_of,
        }
    }
}

#[async_trait::async_trait]
impl DataProvider for FixtureDataProvider {
    fn provider_name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch(&self, ticker: &str) -> Result<AnalysisInput> {
        Ok(self.snapshot(ticker))
    }
}

type Profile = (PriceSnapshot, Fundamentals, Technicals, Option<SentimentData>);

fn aapl() -> Profile {
    (
        PriceSnapshot {
            current_price: Some(192.5),
            previous_close: Some(190.1),
            day_change_pct: Some(0.0126),
            high_52w: Some(199.6),
            low_52w: Some(164.1),
        },
        Fundamentals {
            pe_ratio: Some(22.0),
            forward_pe: Some(20.5),
            peg_ratio: Some(1.8),
            price_to_book: Some(30.0),
            debt_to_equity: Some(1.4),
            current_ratio: Some(1.0),
            return_on_equity: Some(1.47),
            profit_margin: Some(0.25),
            revenue_growth: Some(0.08),
            earnings_growth: Some(0.11),
            free_cash_flow: Some(9.9e10),
            dividend_yield: Some(0.005),
        },
        Technicals {
            price: Some(192.5),
            rsi_14: Some(61.0),
            macd: Some(1.9),
            macd_signal: Some(1.4),
            sma_20: Some(188.0),
            sma_50: Some(184.0),
            sma_200: Some(178.0),
            bollinger_upper: Some(197.0),
            bollinger_lower: Some(179.0),
            volume: Some(6.1e7),
            avg_volume: Some(5.4e7),
            support: Some(184.0),
            resistance: Some(199.6),
        },
        Some(SentimentData {
            news_score: Some(0.35),
            article_count: Some(42),
            positive_articles: Some(24),
            negative_articles: Some(8),
            social_score: Some(0.2),
            analyst_buy: Some(28),
            analyst_hold: Some(10),
            analyst_sell: Some(2),
            analyst_target_price: Some(215.0),
        }),
    )
}

fn msft() -> Profile {
    (
        PriceSnapshot {
            current_price: Some(412.0),
            previous_close: Some(409.3),
            day_change_pct: Some(0.0066),
            high_52w: Some(430.8),
            low_52w: Some(309.5),
        },
        Fundamentals {
            pe_ratio: Some(35.0),
            forward_pe: Some(31.0),
            peg_ratio: Some(2.2),
            price_to_book: Some(12.5),
            debt_to_equity: Some(0.35),
            current_ratio: Some(1.7),
            return_on_equity: Some(0.38),
            profit_margin: Some(0.36),
            revenue_growth: Some(0.17),
            earnings_growth: Some(0.2),
            free_cash_flow: Some(6.5e10),
            dividend_yield: Some(0.007),
        },
        Technicals {
            price: Some(412.0),
            rsi_14: Some(57.0),
            macd: Some(3.1),
            macd_signal: Some(2.6),
            sma_20: Some(405.0),
            sma_50: Some(398.0),
            sma_200: Some(370.0),
            bollinger_upper: Some(425.0),
            bollinger_lower: Some(385.0),
            volume: Some(2.3e7),
            avg_volume: Some(2.1e7),
            support: Some(398.0),
            resistance: Some(430.8),
        },
        Some(SentimentData {
            news_score: Some(0.4),
            article_count: Some(35),
            positive_articles: Some(21),
            negative_articles: Some(5),
            social_score: Some(0.3),
            analyst_buy: Some(45),
            analyst_hold: Some(6),
            analyst_sell: Some(1),
            analyst_target_price: Some(470.0),
        }),
    )
}

fn tsla() -> Profile {
    (
        PriceSnapshot {
            current_price: Some(238.0),
            previous_close: Some(246.4),
            day_change_pct: Some(-0.0341),
            high_52w: Some(299.3),
            low_52w: Some(152.4),
        },
        Fundamentals {
            pe_ratio: Some(68.0),
            forward_pe: Some(75.0),
            peg_ratio: Some(5.1),
            price_to_book: Some(11.8),
            debt_to_equity: Some(0.1),
            current_ratio: Some(1.7),
            return_on_equity: Some(0.12),
            profit_margin: Some(0.07),
            revenue_growth: Some(-0.09),
            earnings_growth: Some(-0.45),
            free_cash_flow: Some(4.4e9),
            dividend_yield: None,
        },
        Technicals {
            price: Some(238.0),
            rsi_14: Some(41.0),
            macd: Some(-4.2),
            macd_signal: Some(-1.8),
            sma_20: Some(247.0),
            sma_50: Some(251.0),
            sma_200: Some(226.0),
            bollinger_upper: Some(268.0),
            bollinger_lower: Some(226.0),
            volume: Some(1.4e8),
            avg_volume: Some(8.8e7),
            support: Some(220.0),
            resistance: Some(265.0),
        },
        Some(SentimentData {
            news_score: Some(-0.15),
            article_count: Some(88),
            positive_articles: Some(30),
            negative_articles: Some(41),
            social_score: Some(0.25),
            analyst_buy: Some(18),
            analyst_hold: Some(17),
            analyst_sell: Some(13),
            analyst_target_price: Some(225.0),
        }),
    )
}

/// SplitMix64 finalizer.
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Stable pseudo-random profile from the ticker bytes.
fn derived(ticker: &str) -> Profile {
    let seed = ticker
        .bytes()
        .fold(17_u64, |acc, b| acc.wrapping_mul(31).wrapping_add(u64::from(b)));
    // Fraction in [0, 1), independent per slot.
    let frac = |slot: u64| {
        (mix(seed.wrapping_add(slot.wrapping_mul(0x9e37_79b9_7f4a_7c15))) % 1000) as f64 / 1000.0
    };

    let price = 20.0 + frac(0) * 480.0;
    let sma_50 = price * (0.9 + frac(4) * 0.2);
    let sma_200 = price * (0.85 + frac(8) * 0.3);

    (
        PriceSnapshot {
            current_price: Some(price),
            previous_close: Some(price * (0.98 + frac(12) * 0.04)),
            day_change_pct: None,
            high_52w: Some(price * (1.05 + frac(16) * 0.4)),
            low_52w: Some(price * (0.6 + frac(20) * 0.3)),
        },
        Fundamentals {
            pe_ratio: Some(8.0 + frac(24) * 50.0),
            debt_to_equity: Some(frac(28) * 2.5),
            return_on_equity: Some(frac(32) * 0.35),
            profit_margin: Some(-0.05 + frac(36) * 0.35),
            revenue_growth: Some(-0.1 + frac(40) * 0.35),
            ..Default::default()
        },
        Technicals {
            price: Some(price),
            rsi_14: Some(20.0 + frac(44) * 60.0),
            macd: Some(-2.0 + frac(48) * 4.0),
            macd_signal: Some(-2.0 + frac(52) * 4.0),
            sma_50: Some(sma_50),
            sma_200: Some(sma_200),
            ..Default::default()
        },
        // Roughly a third of derived tickers have no sentiment coverage.
        if seed % 3 == 0 {
            None
        } else {
            Some(SentimentData {
                news_score: Some(-1.0 + frac(56) * 2.0),
                ..Default::default()
            })
        },
    )
}
