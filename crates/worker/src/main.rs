use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stockpick_core::ingest::{DataProvider, FixtureDataProvider, HttpJsonDataProvider};
use stockpick_core::output::DEFAULT_OUTPUT_PATH;
use stockpick_core::pipeline::Pipeline;
use stockpick_core::synthesis::Synthesizer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod tickers;

#[derive(Debug, Parser)]
#[command(name = "stockpick_worker")]
struct Args {
    /// Tickers to analyze. Falls back to TICKERS, then AAPL MSFT TSLA.
    tickers: Vec<String>,

    /// Where to write the JSON array of results.
    #[arg(long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Analyze and log, but do not write the results file.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let tickers = tickers::resolve_tickers(&args.tickers, settings.tickers.as_deref());
    let synthesizer = match settings.synthesis_policy().and_then(Synthesizer::new) {
        Ok(s) => s,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };
    let provider = build_provider(&settings)?;

    tracing::info!(
        provider = provider.provider_name(),
        tickers = ?tickers,
        weights = ?synthesizer.policy().weights,
        dry_run = args.dry_run,
        "starting analysis run"
    );

    let pipeline = Pipeline::new(provider, synthesizer);
    let report = pipeline.run(&tickers).await;

    for failure in &report.failures {
        sentry::capture_error(failure);
    }

    if args.dry_run {
        tracing::info!(
            succeeded = report.results.len(),
            failed = report.failures.len(),
            "dry run; results file not written"
        );
        return Ok(());
    }

    if let Err(err) = stockpick_core::output::write_results(&args.output, &report.results) {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }

    Ok(())
}

fn build_provider(
    settings: &stockpick_core::config::Settings,
) -> anyhow::Result<Arc<dyn DataProvider>> {
    if settings.data_provider_base_url.is_some() {
        return Ok(Arc::new(HttpJsonDataProvider::from_settings(settings)?));
    }

    tracing::warn!("DATA_PROVIDER_BASE_URL not set; using offline fixture data");
    Ok(Arc::new(FixtureDataProvider::new(chrono::Utc::now())))
}

fn init_sentry(settings: &stockpick_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
