//! Canonical metric names shared by adapters, indicators and callers.

pub const PRICE: &str = "price";
pub const MARKET_CAP: &str = "market_cap";
pub const VOLUME_24H: &str = "volume_24h";

// On-chain
pub const MVRV: &str = "mvrv";
pub const SOPR: &str = "sopr";
pub const NVT: &str = "nvt";
pub const ACTIVE_ADDRESSES: &str = "active_addresses";
pub const EXCHANGE_NETFLOW: &str = "exchange_netflow";

// DeFi
pub const TVL: &str = "tvl";
pub const FEES_24H: &str = "fees_24h";
pub const REVENUE_24H: &str = "revenue_24h";

/// Every metric the bundled adapters know how to produce
pub const ALL: &[&str] = &[
    PRICE,
    MARKET_CAP,
    VOLUME_24H,
    MVRV,
    SOPR,
    NVT,
    ACTIVE_ADDRESSES,
    EXCHANGE_NETFLOW,
    TVL,
    FEES_24H,
    REVENUE_24H,
];

/// Owned metric list, handy for building requests
pub fn owned(metrics: &[&str]) -> Vec<String> {
    metrics.iter().map(|m| m.to_string()).collect()
}
