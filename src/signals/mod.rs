//! Signal derivation from indicator votes.

pub mod aggregation;
pub mod scoring;
pub mod signal_generator;

pub use aggregation::*;
pub use scoring::*;
pub use signal_generator::SignalGenerator;
