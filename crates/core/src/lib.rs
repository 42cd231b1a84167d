pub mod domain;
pub mod ingest;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod synthesis;

pub mod config {
    use crate::synthesis::{SynthesisPolicy, SynthesisWeights};
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub data_provider_base_url: Option<String>,
        pub data_provider_api_key: Option<String>,
        pub data_provider_path: Option<String>,
        pub data_provider_timeout_secs: Option<u64>,
        pub tickers: Option<String>,
        pub synthesis_weights: Option<String>,
        pub synthesis_conflict_spread: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                data_provider_base_url: std::env::var("DATA_PROVIDER_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty()),
                data_provider_api_key: std::env::var("DATA_PROVIDER_API_KEY").ok(),
                data_provider_path: std::env::var("DATA_PROVIDER_PATH").ok(),
                data_provider_timeout_secs: std::env::var("DATA_PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok()),
                tickers: std::env::var("TICKERS").ok(),
                synthesis_weights: std::env::var("SYNTHESIS_WEIGHTS").ok(),
                synthesis_conflict_spread: std::env::var("SYNTHESIS_CONFLICT_SPREAD").ok(),
            })
        }

        pub fn require_data_provider_base_url(&self) -> anyhow::Result<&str> {
            self.data_provider_base_url
                .as_deref()
                .context("DATA_PROVIDER_BASE_URL is required")
        }

        pub fn synthesis_policy(&self) -> anyhow::Result<SynthesisPolicy> {
            let mut policy = SynthesisPolicy::default();
            if let Some(raw) = self.synthesis_weights.as_deref() {
                policy.weights =
                    SynthesisWeights::parse(raw).context("invalid SYNTHESIS_WEIGHTS")?;
            }
            if let Some(raw) = self.synthesis_conflict_spread.as_deref() {
                policy.conflict_spread = raw
                    .trim()
                    .parse::<u8>()
                    .with_context(|| format!("invalid SYNTHESIS_CONFLICT_SPREAD: {raw:?}"))?;
            }
            policy.validate()?;
            Ok(policy)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn default_policy_without_overrides() {
            let policy = Settings::default().synthesis_policy().unwrap();
            assert_eq!(policy, SynthesisPolicy::default());
        }

        #[test]
        fn applies_policy_overrides() {
            let settings = Settings {
                synthesis_weights: Some("0.5,0.3,0.2".to_string()),
                synthesis_conflict_spread: Some("40".to_string()),
                ..Default::default()
            };
            let policy = settings.synthesis_policy().unwrap();
            assert_eq!(policy.weights.fundamental, 0.5);
            assert_eq!(policy.conflict_spread, 40);
        }

        #[test]
        fn rejects_bad_weights() {
            let settings = Settings {
                synthesis_weights: Some("1,2".to_string()),
                ..Default::default()
            };
            assert!(settings.synthesis_policy().is_err());
        }

        #[test]
        fn rejects_bad_conflict_spread() {
            for raw in ["thirty", "-5", "300", "101"] {
                let settings = Settings {
                    synthesis_conflict_spread: Some(raw.to_string()),
                    ..Default::default()
                };
                assert!(settings.synthesis_policy().is_err(), "accepted {raw}");
            }
        }

        #[test]
        fn base_url_is_required_for_http_provider() {
            assert!(Settings::default().require_data_provider_base_url().is_err());
        }
    }
}
