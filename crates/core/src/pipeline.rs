//! Per-ticker driver: fetch, score each lens, synthesize.
//!
//! Tickers are processed strictly in input order, one at a time. A failure for one ticker is
//! captured as a [`TickerAnalysisError`] and never stops the run.

use crate::domain::input::AnalysisInput;
use crate::domain::recommendation::AnalysisResult;
use crate::ingest::DataProvider;
use crate::scoring::{FundamentalScorer, SentimentScorer, TechnicalScorer};
use crate::synthesis::{PriceBounds, Synthesizer};
use anyhow::ensure;
use std::fmt;
use std::sync::Arc;

const MAX_TICKER_LEN: usize = 12;

/// The single failure kind surfaced by the pipeline: analysis of one ticker failed.
#[derive(Debug)]
pub struct TickerAnalysisError {
    pub ticker: String,
    pub stage: &'static str,
    pub source: anyhow::Error,
}

impl fmt::Display for TickerAnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ticker analysis failed (ticker={}, stage={}): {:#}",
            self.ticker, self.stage, self.source
        )
    }
}

impl std::error::Error for TickerAnalysisError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Successful analyses, in input order.
    pub results: Vec<AnalysisResult>,
    pub failures: Vec<TickerAnalysisError>,
}

impl PipelineReport {
    pub fn attempted(&self) -> usize {
        self.results.len() + self.failures.len()
    }
}

pub struct Pipeline {
    provider: Arc<dyn DataProvider>,
    fundamental: FundamentalScorer,
    technical: TechnicalScorer,
    sentiment: SentimentScorer,
    synthesizer: Synthesizer,
}

impl Pipeline {
    pub fn new(provider: Arc<dyn DataProvider>, synthesizer: Synthesizer) -> Self {
        Self {
            provider,
            fundamental: FundamentalScorer,
            technical: TechnicalScorer,
            sentiment: SentimentScorer,
            synthesizer,
        }
    }

    pub async fn run(&self, tickers: &[String]) -> PipelineReport {
        let mut report = PipelineReport::default();

        for ticker in tickers {
            match self.analyze(ticker).await {
                Ok(result) => {
                    tracing::info!(
                        ticker = %result.ticker,
                        recommendation = %result.recommendation,
                        confidence = result.scores.final_confidence,
                        risk_reward_ratio = ?result.risk_reward_ratio,
                        thesis = %result.thesis,
                        "final recommendation"
                    );
                    report.results.push(result);
                }
                Err(err) => {
                    tracing::error!(%ticker, stage = err.stage, error = %err, "skipping ticker");
                    report.failures.push(err);
                }
            }
        }

        tracing::info!(
            provider = self.provider.provider_name(),
            attempted = report.attempted(),
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "analysis run complete"
        );
        report
    }

    pub async fn analyze(&self, ticker: &str) -> Result<AnalysisResult, TickerAnalysisError> {
        let ticker = normalize_ticker(ticker).map_err(|source| TickerAnalysisError {
            ticker: ticker.to_string(),
            stage: "validate",
            source,
        })?;

        tracing::info!(%ticker, provider = self.provider.provider_name(), "fetching data");
        let input = self
            .provider
            .fetch(&ticker)
            .await
            .map_err(|source| TickerAnalysisError {
                ticker: ticker.clone(),
                stage: "fetch",
                source,
            })?;

        Ok(self.score_input(&input))
    }

    /// Scores an already fetched input. Infallible: missing data scores neutral.
    pub fn score_input(&self, input: &AnalysisInput) -> AnalysisResult {
        let ticker = input.ticker.as_str();
        let current_price = input.current_price();

        let fundamental = self
            .fundamental
            .analyze(ticker, &input.fundamentals, &input.technicals, current_price);
        tracing::info!(%ticker, score = fundamental.score, "fundamental analysis");

        let technical = self.technical.analyze(ticker, &input.technicals);
        tracing::info!(%ticker, score = technical.score, "technical analysis");

        let sentiment = self
            .sentiment
            .analyze(ticker, input.sentiment.as_ref(), current_price);
        tracing::info!(%ticker, score = sentiment.score, "sentiment analysis");

        let bounds = PriceBounds::from_input(input);
        let synthesis =
            self.synthesizer
                .synthesize(ticker, &fundamental, &technical, &sentiment, &bounds);

        AnalysisResult::assemble(
            ticker,
            input.timestamp,
            current_price,
            fundamental,
            technical,
            sentiment,
            synthesis,
        )
    }
}

/// Trims and upper-cases a ticker symbol, rejecting anything that cannot be one.
pub fn normalize_ticker(raw: &str) -> anyhow::Result<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    ensure!(!ticker.is_empty(), "ticker must be non-empty");
    ensure!(
        ticker.len() <= MAX_TICKER_LEN,
        "ticker longer than {MAX_TICKER_LEN} characters: {ticker}"
    );
    ensure!(
        ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^')),
        "ticker contains invalid characters: {ticker}"
    );
    Ok(ticker)
}
