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

//! Pending one-shot node notifications.

use crate::node::{Node, NodeStateCriteria};
use crate::picker::NodePicker;
use crate::ranking::AliveNodes;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;

struct NodeWaiter<T> {
    criteria: NodeStateCriteria,
    tx: oneshot::Sender<Arc<Node<T>>>,
}

/// Registry of callers blocked until a node matching their criteria
/// appears.
///
/// Delivery uses a one-shot channel with a single-value buffer: `notify`
/// runs under the registry mutex and must never block on a consumer that is
/// not parked on the receive side yet. The sent value is sticky: if the
/// consumer's deadline fires before the read, the node is dropped together
/// with the receiver and the stale waiter is pruned on a later cycle.
pub(crate) struct WaiterRegistry<T> {
    waiters: Mutex<Vec<NodeWaiter<T>>>,
}

impl<T> WaiterRegistry<T> {
    pub(crate) fn new() -> Self {
        Self {
            waiters: Mutex::new(Vec::new()),
        }
    }

    /// Installs a waiter and returns its receive endpoint.
    pub(crate) fn register(&self, criteria: NodeStateCriteria) -> oneshot::Receiver<Arc<Node<T>>> {
        let (tx, rx) = oneshot::channel();
        self.lock_waiters().push(NodeWaiter { criteria, tx });
        rx
    }

    /// Delivers nodes from `snapshot` to every waiter it can satisfy and
    /// removes them. Unsatisfiable waiters stay registered; waiters whose
    /// receiver is already gone are pruned.
    pub(crate) fn notify(&self, snapshot: &AliveNodes<T>, picker: &dyn NodePicker<T>) {
        let mut waiters = self.lock_waiters();
        if waiters.is_empty() {
            return;
        }

        let mut nodeless = Vec::new();
        for waiter in waiters.drain(..) {
            if waiter.tx.is_closed() {
                continue;
            }
            match snapshot.pick(waiter.criteria, picker) {
                Some(node) => {
                    // The receiver may have been dropped between the check
                    // above and here; the failed send just drops the node.
                    let _ = waiter.tx.send(node);
                }
                None => nodeless.push(waiter),
            }
        }
        *waiters = nodeless;
    }

    /// Drops every pending waiter so blocked callers observe cancellation.
    pub(crate) fn close(&self) {
        self.lock_waiters().clear();
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.lock_waiters().len()
    }

    fn lock_waiters(&self) -> MutexGuard<'_, Vec<NodeWaiter<T>>> {
        self.waiters.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picker::ClosestPicker;
    use crate::ranking::{CheckedNode, rank_nodes};
    use std::time::Duration;

    fn snapshot(primaries: &[&str], standbys: &[&str]) -> AliveNodes<()> {
        let mut checked = Vec::new();
        for (i, addr) in primaries.iter().enumerate() {
            checked.push(CheckedNode {
                node: Arc::new(Node::new(*addr, ())),
                is_primary: true,
                latency: Duration::from_millis(i as u64),
            });
        }
        for (i, addr) in standbys.iter().enumerate() {
            checked.push(CheckedNode {
                node: Arc::new(Node::new(*addr, ())),
                is_primary: false,
                latency: Duration::from_millis(i as u64),
            });
        }
        rank_nodes(checked)
    }

    #[tokio::test]
    async fn test_notify_delivers_matching_node() {
        let registry = WaiterRegistry::new();
        let rx = registry.register(NodeStateCriteria::Primary);

        registry.notify(&snapshot(&["p1"], &[]), &ClosestPicker);

        let node = rx.await.unwrap();
        assert_eq!(node.addr(), "p1");
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test]
    async fn test_unsatisfied_waiter_stays_registered() {
        let registry = WaiterRegistry::<()>::new();
        let mut rx = registry.register(NodeStateCriteria::Primary);

        registry.notify(&snapshot(&[], &["s1"]), &ClosestPicker);

        assert_eq!(registry.pending(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delivery_is_sticky_until_read() {
        let registry = WaiterRegistry::new();
        let rx = registry.register(NodeStateCriteria::Alive);

        registry.notify(&snapshot(&["p1"], &[]), &ClosestPicker);

        // The consumer was not parked on the receive side during notify;
        // the value is still there when it finally reads.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(rx.await.unwrap().addr(), "p1");
    }

    #[tokio::test]
    async fn test_dropped_receivers_are_pruned() {
        let registry = WaiterRegistry::<()>::new();
        let rx = registry.register(NodeStateCriteria::Standby);
        drop(rx);

        registry.notify(&snapshot(&[], &[]), &ClosestPicker);
        assert_eq!(registry.pending(), 0);
    }

    #[tokio::test]
    async fn test_close_wakes_pending_waiters() {
        let registry = WaiterRegistry::<()>::new();
        let rx = registry.register(NodeStateCriteria::Alive);

        registry.close();
        assert!(rx.await.is_err());
    }
}
