pub mod rsi;

pub use rsi::{calculate_rsi, Rsi};
