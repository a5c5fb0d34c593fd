//! Glassnode market data provider implementation
//!
//! Every metric maps to one `/v1/metrics/<path>` endpoint returning a JSON
//! array of `{t, v}` points; the newest point is the metric value.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::future::join_all;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::ProviderSettings;
use crate::error::{EngineError, EngineResult, ProviderContractError, ProviderFetchError};
use crate::models::metrics;
use crate::models::snapshot::{HistoricalPoint, ProviderResult};
use crate::services::market_data::{check_request, collect_metric_outcomes, ProviderAdapter};

pub const PROVIDER_ID: &str = "glassnode";

const ENDPOINTS: &[(&str, &str)] = &[
    (metrics::PRICE, "market/price_usd_close"),
    (metrics::MARKET_CAP, "market/marketcap_usd"),
    (metrics::MVRV, "market/mvrv"),
    (metrics::SOPR, "indicators/sopr"),
    (metrics::NVT, "indicators/nvt"),
    (metrics::ACTIVE_ADDRESSES, "addresses/active_count"),
    (metrics::EXCHANGE_NETFLOW, "transactions/transfers_volume_exchanges_net"),
];

#[derive(Debug, Deserialize)]
struct MetricPoint {
    t: i64,
    v: Option<f64>,
}

pub struct GlassnodeAdapter {
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
    min_request_interval: Option<Duration>,
    client: reqwest::Client,
    capabilities: BTreeSet<String>,
}

impl GlassnodeAdapter {
    pub fn new(settings: ProviderSettings) -> EngineResult<Self> {
        let base_url = settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| EngineError::config(format!("glassnode http client: {}", e)))?;

        Ok(Self {
            base_url,
            api_key: settings.api_key,
            timeout: settings.timeout,
            min_request_interval: settings.min_request_interval,
            client,
            capabilities: ENDPOINTS.iter().map(|(m, _)| m.to_string()).collect(),
        })
    }

    /// Glassnode asset code for a canonical symbol
    pub fn asset_for(symbol: &str) -> Option<&'static str> {
        let asset = match symbol {
            "BTC" | "BITCOIN" => "BTC",
            "ETH" | "ETHEREUM" => "ETH",
            "LTC" | "LITECOIN" => "LTC",
            "BCH" | "BITCOINCASH" => "BCH",
            "XRP" | "RIPPLE" => "XRP",
            "ADA" | "CARDANO" => "ADA",
            "DOT" | "POLKADOT" => "DOT",
            "LINK" | "CHAINLINK" => "LINK",
            "UNI" | "UNISWAP" => "UNI",
            "AAVE" => "AAVE",
            _ => return None,
        };
        Some(asset)
    }

    fn endpoint_for(metric: &str) -> Option<&'static str> {
        ENDPOINTS
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, path)| *path)
    }

    /// Daily `{t, v}` points of one metric, optionally bounded to `since..=until` (unix seconds)
    async fn fetch_series(
        &self,
        asset: &str,
        metric: &str,
        range: Option<(i64, i64)>,
        timeout: Duration,
    ) -> Result<Vec<MetricPoint>, ProviderFetchError> {
        let path = Self::endpoint_for(metric)
            .ok_or_else(|| ProviderFetchError::MissingValue(metric.to_string()))?;
        let url = format!(
            "{}/v1/metrics/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path
        );

        let mut request = self
            .client
            .get(&url)
            .query(&[("a", asset), ("i", "24h")])
            .timeout(timeout);
        if let Some((since, until)) = range {
            request = request.query(&[("s", since), ("u", until)]);
        }
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFetchError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        let points: Vec<MetricPoint> = response.json().await?;
        debug!(provider = PROVIDER_ID, metric, points = points.len(), "metric series received");
        Ok(points)
    }

    async fn fetch_metric(
        &self,
        asset: &str,
        metric: &str,
        timeout: Duration,
    ) -> Result<f64, ProviderFetchError> {
        self.fetch_series(asset, metric, None, timeout)
            .await?
            .last()
            .and_then(|p| p.v)
            .ok_or_else(|| ProviderFetchError::MissingValue(metric.to_string()))
    }
}

#[async_trait]
impl ProviderAdapter for GlassnodeAdapter {
    fn id(&self) -> &str {
        PROVIDER_ID
    }

    fn capabilities(&self) -> &BTreeSet<String> {
        &self.capabilities
    }

    fn min_request_interval(&self) -> Option<Duration> {
        self.min_request_interval
    }

    async fn fetch(
        &self,
        symbol: &str,
        metrics: &[String],
        deadline: Duration,
    ) -> Result<ProviderResult, ProviderContractError> {
        check_request(self, symbol, metrics)?;

        if deadline.is_zero() {
            return Ok(ProviderResult::unavailable(PROVIDER_ID, "deadline elapsed"));
        }

        let Some(asset) = Self::asset_for(symbol) else {
            warn!(provider = PROVIDER_ID, symbol, "unsupported symbol");
            return Ok(ProviderResult::error(
                PROVIDER_ID,
                ProviderFetchError::UnsupportedSymbol(symbol.to_string()).to_string(),
            ));
        };

        let timeout = self.timeout.min(deadline);
        let outcomes = join_all(metrics.iter().map(|metric| async move {
            (metric.clone(), self.fetch_metric(asset, metric, timeout).await)
        }))
        .await;

        let result = collect_metric_outcomes(PROVIDER_ID, outcomes, Utc::now());
        if let Some(reason) = result.status.reason() {
            warn!(provider = PROVIDER_ID, symbol, reason, "fetch incomplete");
        }
        Ok(result)
    }

    fn supports_history(&self, metric: &str) -> bool {
        Self::endpoint_for(metric).is_some()
    }

    async fn fetch_history(
        &self,
        symbol: &str,
        metric: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        deadline: Duration,
    ) -> Result<Vec<HistoricalPoint>, ProviderFetchError> {
        if !self.supports_history(metric) {
            return Err(ProviderFetchError::HistoryUnsupported(metric.to_string()));
        }
        if deadline.is_zero() {
            return Err(ProviderFetchError::Timeout);
        }
        let asset = Self::asset_for(symbol)
            .ok_or_else(|| ProviderFetchError::UnsupportedSymbol(symbol.to_string()))?;

        let (since, until) = (start.timestamp(), end.timestamp());
        let points = self
            .fetch_series(asset, metric, Some((since, until)), self.timeout.min(deadline))
            .await?;

        let mut history: Vec<HistoricalPoint> = points
            .into_iter()
            .filter(|p| (since..=until).contains(&p.t))
            .filter_map(|p| {
                let value = p.v.filter(|v| v.is_finite())?;
                let timestamp = Utc.timestamp_opt(p.t, 0).single()?;
                Some(HistoricalPoint { timestamp, value })
            })
            .collect();
        history.sort_by_key(|p| p.timestamp);
        Ok(history)
    }
}
