//! DefiLlama market data provider implementation
//!
//! Price and market cap come from `/prices/current/<id>`, protocol metrics
//! (TVL, volume, fees, revenue) from `/protocols/<id>`. At most one request
//! per group is issued, both groups run concurrently. Daily price and market
//! cap history comes from `/prices/historical/<id>`. No API key is needed.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use url::Url;

use crate::config::ProviderSettings;
use crate::error::{EngineError, EngineResult, ProviderContractError, ProviderFetchError};
use crate::models::metrics;
use crate::models::snapshot::{HistoricalPoint, ProviderResult};
use crate::services::market_data::{check_request, collect_metric_outcomes, ProviderAdapter};

pub const PROVIDER_ID: &str = "defillama";

const PRICE_METRICS: &[&str] = &[metrics::PRICE, metrics::MARKET_CAP];

/// Canonical metric -> field of the protocol payload
const PROTOCOL_FIELDS: &[(&str, &str)] = &[
    (metrics::TVL, "tvl"),
    (metrics::VOLUME_24H, "volume24h"),
    (metrics::FEES_24H, "fees24h"),
    (metrics::REVENUE_24H, "revenue24h"),
];

#[derive(Debug, Clone, Deserialize)]
struct PriceQuote {
    price: f64,
    #[serde(default)]
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct HistoricalQuote {
    timestamp: i64,
    price: Option<f64>,
    #[serde(default)]
    market_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct PriceHistory {
    #[serde(default)]
    prices: Vec<HistoricalQuote>,
}

type GroupResult<T> = Option<Result<T, ProviderFetchError>>;

pub struct DefiLlamaAdapter {
    base_url: Url,
    timeout: Duration,
    min_request_interval: Option<Duration>,
    client: reqwest::Client,
    capabilities: BTreeSet<String>,
}

impl DefiLlamaAdapter {
    pub fn new(settings: ProviderSettings) -> EngineResult<Self> {
        let base_url = settings.validate()?;
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| EngineError::config(format!("defillama http client: {}", e)))?;

        let capabilities = PRICE_METRICS
            .iter()
            .copied()
            .chain(PROTOCOL_FIELDS.iter().map(|(m, _)| *m))
            .map(str::to_string)
            .collect();

        Ok(Self {
            base_url,
            timeout: settings.timeout,
            min_request_interval: settings.min_request_interval,
            client,
            capabilities,
        })
    }

    /// DefiLlama identifier for a canonical symbol
    pub fn asset_for(symbol: &str) -> Option<&'static str> {
        let id = match symbol {
            "BTC" | "BITCOIN" => "bitcoin",
            "ETH" | "ETHEREUM" => "ethereum",
            "USDC" => "usd-coin",
            "USDT" => "tether",
            "DAI" => "dai",
            "UNI" | "UNISWAP" => "uniswap",
            "AAVE" => "aave",
            "COMP" | "COMPOUND" => "compound",
            "MKR" | "MAKER" => "maker",
            "YFI" => "yearn-finance",
            "CRV" => "curve-dao-token",
            "SUSHI" | "SUSHISWAP" => "sushi",
            "1INCH" => "1inch",
            "BAL" | "BALANCER" => "balancer",
            _ => return None,
        };
        Some(id)
    }

    fn protocol_field(metric: &str) -> Option<&'static str> {
        PROTOCOL_FIELDS
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, field)| *field)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<T, ProviderFetchError> {
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        let response = self.client.get(&url).timeout(timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProviderFetchError::Status {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }
        Ok(response.json::<T>().await?)
    }

    async fn fetch_quote(&self, id: &str, timeout: Duration) -> Result<PriceQuote, ProviderFetchError> {
        let mut quotes: HashMap<String, PriceQuote> = self
            .get_json(&format!("prices/current/{}", id), timeout)
            .await?;
        quotes
            .remove(id)
            .ok_or_else(|| ProviderFetchError::MissingValue(metrics::PRICE.to_string()))
    }

    fn extract(
        metric: &str,
        quote: &GroupResult<PriceQuote>,
        protocol: &GroupResult<Value>,
    ) -> Result<f64, ProviderFetchError> {
        let missing = || ProviderFetchError::MissingValue(metric.to_string());

        if let Some(field) = Self::protocol_field(metric) {
            let body = protocol.as_ref().ok_or_else(missing)?.as_ref().map_err(Clone::clone)?;
            return body.get(field).and_then(Value::as_f64).ok_or_else(missing);
        }

        let quote = quote.as_ref().ok_or_else(missing)?.as_ref().map_err(Clone::clone)?;
        match metric {
            metrics::PRICE => Ok(quote.price),
            metrics::MARKET_CAP => quote.market_cap.ok_or_else(missing),
            _ => Err(missing()),
        }
    }
}

#[async_trait]
impl ProviderAdapter for DefiLlamaAdapter {
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

        let Some(id) = Self::asset_for(symbol) else {
            warn!(provider = PROVIDER_ID, symbol, "unsupported symbol");
            return Ok(ProviderResult::error(
                PROVIDER_ID,
                ProviderFetchError::UnsupportedSymbol(symbol.to_string()).to_string(),
            ));
        };

        let timeout = self.timeout.min(deadline);
        let needs_quote = metrics.iter().any(|m| PRICE_METRICS.contains(&m.as_str()));
        let needs_protocol = metrics.iter().any(|m| Self::protocol_field(m).is_some());

        let quote_request = async {
            if needs_quote {
                Some(self.fetch_quote(id, timeout).await)
            } else {
                None
            }
        };
        let protocol_request = async {
            if needs_protocol {
                Some(self.get_json::<Value>(&format!("protocols/{}", id), timeout).await)
            } else {
                None
            }
        };
        let (quote, protocol) = tokio::join!(quote_request, protocol_request);

        let outcomes = metrics
            .iter()
            .map(|metric| (metric.clone(), Self::extract(metric, &quote, &protocol)))
            .collect();

        let result = collect_metric_outcomes(PROVIDER_ID, outcomes, Utc::now());
        if let Some(reason) = result.status.reason() {
            warn!(provider = PROVIDER_ID, symbol, reason, "fetch incomplete");
        }
        Ok(result)
    }

    fn supports_history(&self, metric: &str) -> bool {
        PRICE_METRICS.contains(&metric)
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
        let id = Self::asset_for(symbol)
            .ok_or_else(|| ProviderFetchError::UnsupportedSymbol(symbol.to_string()))?;

        let (since, until) = (start.timestamp(), end.timestamp());
        let body: PriceHistory = self
            .get_json(
                &format!("prices/historical/{}?start={}&end={}", id, since, until),
                self.timeout.min(deadline),
            )
            .await?;

        let mut history: Vec<HistoricalPoint> = body
            .prices
            .into_iter()
            .filter(|q| (since..=until).contains(&q.timestamp))
            .filter_map(|q| {
                let value = match metric {
                    metrics::MARKET_CAP => q.market_cap,
                    _ => q.price,
                }
                .filter(|v| v.is_finite())?;
                let timestamp = Utc.timestamp_opt(q.timestamp, 0).single()?;
                Some(HistoricalPoint { timestamp, value })
            })
            .collect();
        history.sort_by_key(|p| p.timestamp);
        Ok(history)
    }
}
