// Copyright 2025 SQLRoute Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-address aggregation of the most recent probe errors.

use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Most recent probe failure observed for one address.
#[derive(Debug, Clone)]
pub struct NodeError {
    /// Address of the failing node.
    pub addr: String,
    /// The probe error itself.
    pub error: Arc<anyhow::Error>,
    /// When the failure was observed.
    pub occurred_at: DateTime<Utc>,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.addr, self.occurred_at, self.error)
    }
}

/// Combined error listing every address with a current probe failure,
/// ordered by address for stable output.
#[derive(Debug, Clone)]
pub struct CollectedErrors {
    pub errors: Vec<NodeError>,
}

impl fmt::Display for CollectedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CollectedErrors {}

/// Tracks the most recent probe error per address. A successful probe
/// clears the address's entry, so absence means "currently healthy".
#[derive(Debug, Default)]
pub(crate) struct ErrorsCollector {
    store: Mutex<HashMap<String, NodeError>>,
}

impl ErrorsCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records a probe failure for `addr`, replacing any earlier entry.
    pub(crate) fn add(&self, addr: &str, error: anyhow::Error, occurred_at: DateTime<Utc>) {
        let entry = NodeError {
            addr: addr.to_string(),
            error: Arc::new(error),
            occurred_at,
        };
        self.lock_store().insert(addr.to_string(), entry);
    }

    /// Clears the entry for `addr` after a successful probe.
    pub(crate) fn remove(&self, addr: &str) {
        self.lock_store().remove(addr);
    }

    /// Aggregated view keyed by address; empty when every node is healthy.
    pub(crate) fn errors(&self) -> HashMap<String, NodeError> {
        self.lock_store().clone()
    }

    /// Combined error across failing addresses; `None` when all healthy.
    pub(crate) fn err(&self) -> Option<CollectedErrors> {
        let store = self.lock_store();
        if store.is_empty() {
            return None;
        }

        let mut errors: Vec<NodeError> = store.values().cloned().collect();
        errors.sort_by(|a, b| a.addr.cmp(&b.addr));
        Some(CollectedErrors { errors })
    }

    fn lock_store(&self) -> std::sync::MutexGuard<'_, HashMap<String, NodeError>> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_collector_starts_clear() {
        let collector = ErrorsCollector::new();
        assert!(collector.err().is_none());
        assert!(collector.errors().is_empty());
    }

    #[test]
    fn test_add_and_remove_round_trip() {
        let collector = ErrorsCollector::new();
        collector.add("db-1", anyhow!("connection refused"), Utc::now());

        let errors = collector.errors();
        assert_eq!(errors.len(), 1);
        assert!(errors["db-1"].error.to_string().contains("connection refused"));

        collector.remove("db-1");
        assert!(collector.err().is_none());
    }

    #[test]
    fn test_latest_error_wins() {
        let collector = ErrorsCollector::new();
        collector.add("db-1", anyhow!("first"), Utc::now());
        collector.add("db-1", anyhow!("second"), Utc::now());

        let errors = collector.errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["db-1"].error.to_string(), "second");
    }

    #[test]
    fn test_combined_error_is_sorted_by_address() {
        let collector = ErrorsCollector::new();
        collector.add("db-b", anyhow!("down"), Utc::now());
        collector.add("db-a", anyhow!("down"), Utc::now());

        let combined = collector.err().unwrap();
        assert_eq!(combined.errors[0].addr, "db-a");
        assert_eq!(combined.errors[1].addr, "db-b");
        assert!(combined.to_string().contains("db-a"));
        assert!(combined.to_string().contains("; "));
    }
}
