pub mod ema;
pub mod sma;

pub use ema::{calculate_ema, EmaTrend};
pub use sma::{check_sma_cross, SmaCross};
