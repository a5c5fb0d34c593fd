//! DefiLlama DeFi analytics adapter

pub mod provider;

pub use provider::{DefiLlamaAdapter, PROVIDER_ID};
