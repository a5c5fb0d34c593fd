//! Error types for the aggregation and signal pipeline

use thiserror::Error;

/// Whole-pipeline failures surfaced to the caller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("insufficient data for {symbol}: no provider supplied any requested metric")]
    InsufficientData { symbol: String },

    #[error("insufficient indicators for {symbol}: 0 of {computed} indicators valid")]
    InsufficientIndicators { symbol: String, computed: usize },
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::Configuration(msg.into())
    }

    pub fn insufficient_data(symbol: impl Into<String>) -> Self {
        EngineError::InsufficientData {
            symbol: symbol.into(),
        }
    }
}

/// Result type alias for pipeline operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a single provider request. Never leaves an adapter: it is
/// folded into the `ProviderResult` status as a reason string.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderFetchError {
    #[error("request timed out")]
    Timeout,

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected status {status} from {endpoint}")]
    Status { status: u16, endpoint: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("unsupported symbol {0}")]
    UnsupportedSymbol(String),

    #[error("no value returned for {0}")]
    MissingValue(String),

    #[error("history not available for {0}")]
    HistoryUnsupported(String),
}

impl ProviderFetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ProviderFetchError::Timeout)
    }
}

impl From<reqwest::Error> for ProviderFetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderFetchError::Timeout
        } else if err.is_decode() {
            ProviderFetchError::Decode(err.to_string())
        } else {
            ProviderFetchError::Http(err.to_string())
        }
    }
}

/// Violations of the adapter calling contract. These propagate to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderContractError {
    #[error("invalid symbol '{0}'")]
    InvalidSymbol(String),

    #[error("provider {provider} does not supply metric '{metric}'")]
    UnsupportedMetric { provider: String, metric: String },
}

impl From<ProviderContractError> for EngineError {
    fn from(err: ProviderContractError) -> Self {
        EngineError::Configuration(err.to_string())
    }
}
