//! Glassnode on-chain analytics adapter

pub mod provider;

pub use provider::{GlassnodeAdapter, PROVIDER_ID};
