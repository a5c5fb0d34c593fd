//! ChainSignal CLI
//!
//! Warms the snapshot history from provider daily history, fetches one live
//! snapshot from the bundled providers and prints the resulting trading
//! signal as JSON.
//!
//! Usage: `chainsignal [SYMBOL] [METRIC,METRIC,...]`

use std::env;
use std::sync::Arc;
use std::time::Duration;

use chainsignal::config::{EngineConfig, ProviderSettings};
use chainsignal::core::SignalPipeline;
use chainsignal::logging::{self, LogFormat};
use chainsignal::models::metrics;
use chainsignal::services::defillama::DefiLlamaAdapter;
use chainsignal::services::glassnode::GlassnodeAdapter;
use chainsignal::services::ProviderRegistry;
use dotenvy::dotenv;
use tracing::{info, warn};

const GLASSNODE_URL: &str = "https://api.glassnode.com";
const DEFILLAMA_URL: &str = "https://api.llama.fi";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    let environment = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
    logging::init_logging(LogFormat::for_environment(&environment));

    let mut args = env::args().skip(1);
    let symbol = args.next().unwrap_or_else(|| "BTC".to_string());
    let requested: Vec<String> = match args.next() {
        Some(list) => list.split(',').map(|m| m.trim().to_string()).collect(),
        None => metrics::owned(&[
            metrics::PRICE,
            metrics::MVRV,
            metrics::SOPR,
            metrics::NVT,
            metrics::EXCHANGE_NETFLOW,
        ]),
    };

    let deadline = env::var("SIGNAL_DEADLINE_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(15));

    let config = EngineConfig::default();
    let mut registry = ProviderRegistry::new(config.registry.clone());

    match env::var("GLASSNODE_API_KEY") {
        Ok(api_key) => {
            let base_url = env::var("GLASSNODE_BASE_URL").unwrap_or_else(|_| GLASSNODE_URL.into());
            let settings = ProviderSettings::new(base_url)
                .with_api_key(api_key)
                .with_min_request_interval(Duration::from_secs(1));
            registry.register(Arc::new(GlassnodeAdapter::new(settings)?))?;
        }
        Err(_) => warn!("GLASSNODE_API_KEY not set, on-chain metrics disabled"),
    }

    let base_url = env::var("DEFILLAMA_BASE_URL").unwrap_or_else(|_| DEFILLAMA_URL.into());
    registry.register(Arc::new(DefiLlamaAdapter::new(ProviderSettings::new(base_url))?))?;

    info!(environment = %environment, providers = ?registry.provider_ids(), "Starting ChainSignal");

    let pipeline = SignalPipeline::new(config, Arc::new(registry))?;
    match pipeline.warm_up(&symbol, &requested, deadline).await {
        Ok(stored) => info!(symbol = %symbol, stored, "history warm-up finished"),
        Err(e) => warn!(symbol = %symbol, error = %e, "history warm-up failed"),
    }
    let signal = pipeline.get_signal(&symbol, &requested, deadline).await?;

    println!("{}", serde_json::to_string_pretty(&signal)?);

    for report in pipeline.registry().health_report().await {
        info!(
            provider = %report.provider,
            state = ?report.state,
            "provider health"
        );
    }

    Ok(())
}
