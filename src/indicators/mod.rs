//! Indicator calculators and the engine that runs them over snapshot windows

pub mod defi;
pub mod engine;
pub mod momentum;
pub mod onchain;
pub mod registry;
pub mod trend;

pub use engine::IndicatorEngine;
pub use registry::IndicatorCalculator;
