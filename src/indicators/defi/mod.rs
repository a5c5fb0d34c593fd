pub mod tvl;

pub use tvl::{calculate_tvl_delta, TvlDelta};
