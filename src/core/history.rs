//! Bounded per-symbol snapshot history feeding the indicator engine

use std::collections::{HashMap, VecDeque};

use tokio::sync::RwLock;
use tracing::debug;

use crate::models::snapshot::MarketSnapshot;

pub struct SnapshotHistory {
    capacity: usize,
    windows: RwLock<HashMap<String, VecDeque<MarketSnapshot>>>,
}

impl SnapshotHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert `snapshot` in timestamp order and return the window ending at it,
    /// oldest to newest.
    ///
    /// Concurrent aggregations for one symbol may finish out of order; the
    /// returned window only ever contains snapshots at or before the inserted
    /// one. A snapshot older than a full window is not stored.
    pub async fn append(&self, snapshot: MarketSnapshot) -> Vec<MarketSnapshot> {
        let mut windows = self.windows.write().await;
        let window = windows
            .entry(snapshot.symbol().to_string())
            .or_insert_with(VecDeque::new);

        match insert_ordered(window, snapshot.clone(), self.capacity) {
            Some(end) => window.iter().take(end).cloned().collect(),
            None => {
                debug!(
                    symbol = snapshot.symbol(),
                    timestamp = %snapshot.timestamp(),
                    "snapshot older than the full window, not stored"
                );
                vec![snapshot]
            }
        }
    }

    /// Insert backfilled snapshots, skipping any whose symbol already has a
    /// snapshot at the same timestamp. Returns how many were stored; the
    /// window still never exceeds capacity.
    pub async fn seed(&self, mut snapshots: Vec<MarketSnapshot>) -> usize {
        snapshots.sort_by_key(MarketSnapshot::timestamp);

        let mut windows = self.windows.write().await;
        let mut stored = 0;
        for snapshot in snapshots {
            let window = windows
                .entry(snapshot.symbol().to_string())
                .or_insert_with(VecDeque::new);
            if window.iter().any(|s| s.timestamp() == snapshot.timestamp()) {
                continue;
            }
            if insert_ordered(window, snapshot, self.capacity).is_some() {
                stored += 1;
            }
        }
        stored
    }

    /// Current window for `symbol`, oldest to newest
    pub async fn window(&self, symbol: &str) -> Vec<MarketSnapshot> {
        self.windows
            .read()
            .await
            .get(symbol)
            .map(|w| w.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn len(&self, symbol: &str) -> usize {
        self.windows.read().await.get(symbol).map_or(0, VecDeque::len)
    }

    pub async fn clear(&self, symbol: &str) {
        self.windows.write().await.remove(symbol);
    }
}

/// Ordered insert bounded by `capacity`. Returns the length of the window
/// prefix ending at the inserted snapshot, or `None` when it was too old to
/// keep.
fn insert_ordered(
    window: &mut VecDeque<MarketSnapshot>,
    snapshot: MarketSnapshot,
    capacity: usize,
) -> Option<usize> {
    let timestamp = snapshot.timestamp();
    let position = window.partition_point(|s| s.timestamp() <= timestamp);
    if position == 0 && window.len() >= capacity {
        return None;
    }

    window.insert(position, snapshot);
    let mut end = position + 1;
    while window.len() > capacity {
        window.pop_front();
        end -= 1;
    }
    Some(end)
}
