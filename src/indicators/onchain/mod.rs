pub mod activity;
pub mod ratios;

pub use activity::{ActiveAddressesDelta, ExchangeNetflow};
pub use ratios::ValuationBand;
