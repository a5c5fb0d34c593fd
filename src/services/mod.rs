//! External provider plumbing: the adapter contract, the registry and the
//! bundled reference adapters.

pub mod defillama;
pub mod glassnode;
pub mod market_data;
pub mod rate_limiter;
pub mod registry;

pub use market_data::ProviderAdapter;
pub use registry::{FetchOutcome, HealthState, ProviderHealthReport, ProviderRegistry, Selection};
