use crate::domain::input::{Fundamentals, Technicals};
use crate::domain::score::{Lens, ScoreResult};
use crate::scoring::{finite, pct, ScoreCard};

/// Valuation, balance sheet, profitability and growth, with a long-term trend check.
#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalScorer;

impl FundamentalScorer {
    /// `current_price` is the resolved quote; the technicals record's own price is the fallback.
    pub fn analyze(
        &self,
        ticker: &str,
        f: &Fundamentals,
        t: &Technicals,
        current_price: Option<f64>,
    ) -> ScoreResult {
        let mut card = ScoreCard::new(Lens::Fundamental, ticker);

        let pe = finite(f.pe_ratio);
        let valuation = match pe {
            Some(pe) if pe <= 0.0 => {
                card.add(-10, format!("negative P/E {pe:.1} (losses)"));
                "Unprofitable"
            }
            Some(pe) if pe < 15.0 => {
                card.add(10, format!("P/E {pe:.1} looks undervalued"));
                "Undervalued"
            }
            Some(pe) if pe <= 25.0 => {
                card.add(5, format!("P/E {pe:.1} is reasonable"));
                "Fair"
            }
            Some(pe) if pe > 40.0 => {
                card.add(-10, format!("P/E {pe:.1} is stretched"));
                "Overvalued"
            }
            Some(_) => "Fair",
            None => "Unknown",
        };

        if let (Some(pe), Some(fwd)) = (pe, finite(f.forward_pe)) {
            if pe > 0.0 && fwd > 0.0 && fwd < pe {
                card.add(5, format!("forward P/E {fwd:.1} below trailing {pe:.1}"));
            }
        }

        match finite(f.peg_ratio) {
            Some(peg) if peg > 0.0 && peg < 1.0 => {
                card.add(8, format!("PEG {peg:.2} under 1"));
            }
            Some(peg) if peg > 2.0 => card.add(-5, format!("PEG {peg:.2} above 2")),
            _ => {}
        }

        match finite(f.price_to_book) {
            Some(pb) if pb > 0.0 && pb < 1.5 => card.add(4, format!("price/book {pb:.2}")),
            Some(pb) if pb > 10.0 => card.add(-4, format!("price/book {pb:.1} is rich")),
            _ => {}
        }

        let mut health: Option<i32> = None;
        let mut track = |card: &mut ScoreCard, points: i32, reason: String| {
            *health.get_or_insert(0) += points;
            card.add(points, reason);
        };

        match finite(f.debt_to_equity) {
            Some(de) if de < 0.5 => track(&mut card, 8, format!("low leverage (D/E {de:.2})")),
            Some(de) if de > 2.0 => track(&mut card, -10, format!("high leverage (D/E {de:.2})")),
            Some(_) => track(&mut card, 0, String::new()),
            None => {}
        }

        match finite(f.current_ratio) {
            Some(cr) if cr >= 1.5 => track(&mut card, 4, format!("current ratio {cr:.2}")),
            Some(cr) if cr < 1.0 => {
                track(&mut card, -6, format!("current ratio {cr:.2} below 1"))
            }
            Some(_) => track(&mut card, 0, String::new()),
            None => {}
        }

        match finite(f.free_cash_flow) {
            Some(fcf) if fcf > 0.0 => track(&mut card, 4, "positive free cash flow".to_string()),
            Some(fcf) if fcf < 0.0 => track(&mut card, -6, "negative free cash flow".to_string()),
            Some(_) => track(&mut card, 0, String::new()),
            None => {}
        }

        match finite(f.return_on_equity) {
            Some(roe) if roe > 0.20 => card.add(8, format!("ROE {}", pct(roe))),
            Some(roe) if roe < 0.05 => card.add(-6, format!("weak ROE {}", pct(roe))),
            _ => {}
        }

        match finite(f.profit_margin) {
            Some(m) if m > 0.20 => card.add(8, format!("profit margin {}", pct(m))),
            Some(m) if m < 0.0 => card.add(-10, format!("negative profit margin {}", pct(m))),
            _ => {}
        }

        let revenue_growth = finite(f.revenue_growth);
        match revenue_growth {
            Some(g) if g > 0.15 => card.add(8, format!("revenue growth {}", pct(g))),
            Some(g) if g > 0.05 => card.add(4, format!("revenue growth {}", pct(g))),
            Some(g) if g < 0.0 => card.add(-8, format!("revenue shrinking {}", pct(g))),
            _ => {}
        }

        let earnings_growth = finite(f.earnings_growth);
        match earnings_growth {
            Some(g) if g > 0.15 => card.add(6, format!("earnings growth {}", pct(g))),
            Some(g) if g < 0.0 => card.add(-6, format!("earnings declining {}", pct(g))),
            _ => {}
        }

        if let Some(y) = finite(f.dividend_yield) {
            if y > 0.02 {
                card.add(2, format!("dividend yield {}", pct(y)));
            }
        }

        let price = finite(current_price).or(finite(t.price));
        if let (Some(price), Some(sma200)) = (price, finite(t.sma_200)) {
            if price > sma200 {
                card.add(4, "trading above the 200-day average");
            } else if price < sma200 {
                card.add(-4, "trading below the 200-day average");
            }
        }

        let financial_health = match health {
            Some(h) if h > 0 => "Strong",
            Some(h) if h < 0 => "Weak",
            Some(_) => "Adequate",
            None => "Unknown",
        };

        let growth = match revenue_growth.or(earnings_growth) {
            Some(g) if g > 0.15 => "High",
            Some(g) if g >= 0.0 => "Moderate",
            Some(_) => "Negative",
            None => "Unknown",
        };

        card.metric("valuation", valuation);
        card.metric("financial_health", financial_health);
        card.metric("growth", growth);
        card.metric_opt("pe_ratio", pe);
        card.metric_opt("forward_pe", finite(f.forward_pe));
        card.metric_opt("peg_ratio", finite(f.peg_ratio));
        card.metric_opt("price_to_book", finite(f.price_to_book));
        card.metric_opt("debt_to_equity", finite(f.debt_to_equity));
        card.metric_opt("current_ratio", finite(f.current_ratio));
        card.metric_opt("return_on_equity", finite(f.return_on_equity));
        card.metric_opt("profit_margin", finite(f.profit_margin));
        card.metric_opt("revenue_growth", revenue_growth);
        card.metric_opt("earnings_growth", earnings_growth);
        card.metric_opt("free_cash_flow", finite(f.free_cash_flow));
        card.metric_opt("dividend_yield", finite(f.dividend_yield));

        card.finish()
    }
}
