use crate::config::Settings;
use crate::domain::contract::ProviderSnapshot;
use crate::domain::input::AnalysisInput;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PATH: &str = "/v1/analysis_input";

/// Source of per-ticker price, fundamentals, technicals and sentiment.
#[async_trait::async_trait]
pub trait DataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    async fn fetch(&self, ticker: &str) -> Result<AnalysisInput>;
}

/// Fetches one ticker per request from an HTTP endpoint returning a [`ProviderSnapshot`].
#[derive(Debug, Clone)]
pub struct HttpJsonDataProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
}

impl HttpJsonDataProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_data_provider_base_url()?.to_string();
        let timeout = Duration::from_secs(
            settings
                .data_provider_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        let path = settings
            .data_provider_path
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        Self::new(base_url, settings.data_provider_api_key.clone(), path, timeout)
    }

    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build data provider http client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
            path: path.into(),
        })
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl DataProvider for HttpJsonDataProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch(&self, ticker: &str) -> Result<AnalysisInput> {
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[("ticker", ticker)])
            .send()
            .await
            .context("data provider request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read provider response")?;

        parse_snapshot(status, &text, ticker, chrono::Utc::now())
    }
}

fn parse_snapshot(
    status: reqwest::StatusCode,
    text: &str,
    ticker: &str,
    fetched_at: chrono::DateTime<chrono::Utc>,
) -> Result<AnalysisInput> {
    let raw_json = serde_json::from_str::<Value>(text)
        .with_context(|| format!("provider response is not valid JSON: {text}"))?;

    if !status.is_success() {
        anyhow::bail!("data provider HTTP {status}: {raw_json}");
    }

    let parsed = serde_json::from_value::<ProviderSnapshot>(raw_json)
        .context("failed to parse provider response into ProviderSnapshot")?;
    parsed.validate_and_into_input(ticker, fetched_at)
}
