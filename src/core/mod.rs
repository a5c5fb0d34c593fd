//! Core orchestration: provider fan-out, merging, history and the pipeline

pub mod aggregator;
pub mod history;
pub mod merge;
pub mod pipeline;

pub use aggregator::Aggregator;
pub use history::SnapshotHistory;
pub use pipeline::SignalPipeline;
