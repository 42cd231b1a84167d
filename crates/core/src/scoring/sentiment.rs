use crate::domain::input::SentimentData;
use crate::domain::score::{Lens, ScoreResult};
use crate::scoring::{finite, ScoreCard};

/// News tone, social chatter and analyst consensus.
///
/// Absent or empty sentiment is not an error: the lens scores exactly neutral and records
/// `data_available = false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SentimentScorer;

impl SentimentScorer {
    pub fn analyze(
        &self,
        ticker: &str,
        sentiment: Option<&SentimentData>,
        current_price: Option<f64>,
    ) -> ScoreResult {
        let mut card = ScoreCard::new(Lens::Sentiment, ticker);

        let Some(s) = sentiment.filter(|s| s.has_signal()) else {
            card.metric("data_available", false);
            card.metric("mood", "Neutral");
            return card.finish();
        };
        card.metric("data_available", true);

        if let Some(news) = finite(s.news_score) {
            let news = news.clamp(-1.0, 1.0);
            card.add((news * 20.0).round() as i32, format!("news tone {news:+.2}"));
            card.metric("news_score", news);
        }

        if let Some(social) = finite(s.social_score) {
            let social = social.clamp(-1.0, 1.0);
            card.add((social * 10.0).round() as i32, format!("social tone {social:+.2}"));
            card.metric("social_score", social);
        }

        if let Some(count) = s.article_count.filter(|n| *n > 0) {
            let pos = f64::from(s.positive_articles.unwrap_or(0));
            let neg = f64::from(s.negative_articles.unwrap_or(0));
            let balance = ((pos - neg) / f64::from(count)).clamp(-1.0, 1.0);
            card.add(
                (balance * 10.0).round() as i32,
                format!("{pos:.0} positive vs {neg:.0} negative of {count} articles"),
            );
            card.metric("article_count", count);
            card.metric("article_balance", balance);
        }

        let total = s.analyst_total();
        if total > 0 {
            let buy_share = f64::from(s.analyst_buy.unwrap_or(0)) / total as f64;
            let sell_share = f64::from(s.analyst_sell.unwrap_or(0)) / total as f64;
            if buy_share > 0.6 {
                card.add(10, format!("{:.0}% of analysts rate it a buy", buy_share * 100.0));
            } else if sell_share > 0.3 {
                card.add(-10, format!("{:.0}% of analysts rate it a sell", sell_share * 100.0));
            }
            card.metric("analyst_count", total);
            card.metric("analyst_buy_share", buy_share);
        }

        if let Some(target) = finite(s.analyst_target_price) {
            card.metric("analyst_target_price", target);
            if let Some(price) = finite(current_price).filter(|p| *p > 0.0) {
                let upside = target / price - 1.0;
                if upside > 0.10 {
                    card.add(5, format!("analyst target {:.0}% above price", upside * 100.0));
                } else if upside < 0.0 {
                    card.add(-5, format!("analyst target {:.0}% below price", -upside * 100.0));
                }
                card.metric("analyst_upside", upside);
            }
        }

        let mood = match card.points() {
            p if p >= 10 => "Bullish",
            p if p <= -10 => "Bearish",
            _ => "Neutral",
        };
        card.metric("mood", mood);

        card.finish()
    }
}
