//! Request metrics — a lock-free request counter.
//!
//! Wrapped in `Arc<Metrics>` and shared with the request-counting middleware
//! and the `/metrics` handler. The live todo count is not stored here; the
//! caller supplies it at read time.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared request counter.
pub struct Metrics {
    requests: AtomicU64,
}

/// Body of `GET /metrics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub total_todos: u64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    /// Create a new Metrics instance with a zeroed counter.
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
        }
    }

    /// Count one inbound request and return the previous value.
    #[inline]
    pub fn inc(&self) -> u64 {
        self.requests.fetch_add(1, Ordering::Relaxed)
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    /// Combine the current request count with a live todo count.
    pub fn snapshot(&self, total_todos: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests(),
            total_todos: total_todos as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_starts_at_zero() {
        let m = Metrics::new();
        assert_eq!(
            m.snapshot(0),
            MetricsSnapshot {
                requests: 0,
                total_todos: 0
            }
        );
    }

    #[test]
    fn test_inc_returns_previous() {
        let m = Metrics::new();
        assert_eq!(m.inc(), 0);
        assert_eq!(m.inc(), 1);
        assert_eq!(m.requests(), 2);
    }

    #[test]
    fn test_snapshot_uses_supplied_todo_count() {
        let m = Metrics::new();
        for _ in 0..5 {
            m.inc();
        }
        assert_eq!(
            m.snapshot(3),
            MetricsSnapshot {
                requests: 5,
                total_todos: 3
            }
        );
    }

    #[test]
    fn test_concurrent_increments() {
        let m = Arc::new(Metrics::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let m = Arc::clone(&m);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.inc();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(m.requests(), 16_000);
    }

    #[test]
    fn test_snapshot_serializes_field_names() {
        let json = serde_json::to_value(Metrics::new().snapshot(2)).unwrap();
        assert_eq!(json, serde_json::json!({"requests": 0, "total_todos": 2}));
    }
}
