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

//! Cluster façade: role queries, waiting, shutdown.

use crate::checker::{ConnCloser, NodeChecker};
use crate::config::ClusterConfig;
use crate::error::ClusterError;
use crate::error_collector::{CollectedErrors, ErrorsCollector, NodeError};
use crate::health_monitor::ClusterState;
use crate::node::{Node, NodeStateCriteria};
use crate::picker::{NodePicker, RandomPicker};
use crate::ranking::AliveNodes;
use crate::trace::Tracer;
use crate::waiter::WaiterRegistry;
use arc_swap::ArcSwap;
use hashbrown::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Replicated SQL database cluster with background health tracking.
///
/// A background task periodically probes every node, classifies each one as
/// dead, primary, or standby, ranks the alive ones by probe latency, and
/// publishes the result as an immutable snapshot. Role queries read the
/// latest snapshot without blocking; [`Cluster::wait_for_node`] blocks
/// until a matching node appears or the wait times out.
///
/// The snapshot is a hint, not a lease: a node may die between being picked
/// and being used.
///
/// [`Cluster::close`] must be called when the cluster is no longer needed;
/// it stops the update task and releases every connection handle through
/// the injected closer.
pub struct Cluster<T> {
    state: Arc<ClusterState<T>>,
    closer: Box<dyn ConnCloser<T>>,
    update_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl<T> std::fmt::Debug for Cluster<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cluster")
            .field("closed", &self.closed.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<T> Cluster<T>
where
    T: Send + Sync + 'static,
{
    /// Starts building a cluster over `nodes`. The checker probes one
    /// connection handle and reports its role; the closer releases a handle
    /// at shutdown.
    pub fn builder(
        nodes: Vec<Node<T>>,
        checker: impl NodeChecker<T> + 'static,
        closer: impl ConnCloser<T> + 'static,
    ) -> ClusterBuilder<T> {
        ClusterBuilder {
            nodes,
            checker: Arc::new(checker),
            closer: Box::new(closer),
            picker: Arc::new(RandomPicker),
            tracer: Tracer::default(),
            config: ClusterConfig::default(),
        }
    }

    /// All configured nodes, unordered relative to health.
    pub fn nodes(&self) -> &[Arc<Node<T>>] {
        &self.state.nodes
    }

    fn snapshot(&self) -> Arc<AliveNodes<T>> {
        self.state.alive.load_full()
    }

    /// Node matching `criteria` in the current snapshot, if any. Never
    /// blocks; returns `None` when no alive node satisfies the criteria.
    pub fn node(&self, criteria: NodeStateCriteria) -> Option<Arc<Node<T>>> {
        self.snapshot().pick(criteria, self.state.picker.as_ref())
    }

    /// Any alive node.
    pub fn alive(&self) -> Option<Arc<Node<T>>> {
        self.node(NodeStateCriteria::Alive)
    }

    /// The alive primary, able to execute writes.
    pub fn primary(&self) -> Option<Arc<Node<T>>> {
        self.node(NodeStateCriteria::Primary)
    }

    /// An alive standby, read-only.
    pub fn standby(&self) -> Option<Arc<Node<T>>> {
        self.node(NodeStateCriteria::Standby)
    }

    /// The primary when alive, any standby otherwise.
    pub fn primary_preferred(&self) -> Option<Arc<Node<T>>> {
        self.node(NodeStateCriteria::PreferPrimary)
    }

    /// A standby when alive, the primary otherwise.
    pub fn standby_preferred(&self) -> Option<Arc<Node<T>>> {
        self.node(NodeStateCriteria::PreferStandby)
    }

    /// Waits until a node matching `criteria` appears, up to `wait_timeout`.
    ///
    /// Returns immediately when the current snapshot already satisfies the
    /// criteria. Otherwise the call blocks until a later snapshot does,
    /// the timeout fires ([`ClusterError::WaitTimeout`]), or the cluster is
    /// closed ([`ClusterError::WaitCancelled`]).
    pub async fn wait_for_node(
        &self,
        criteria: NodeStateCriteria,
        wait_timeout: Duration,
    ) -> Result<Arc<Node<T>>, ClusterError> {
        if let Some(node) = self.node(criteria) {
            return Ok(node);
        }

        let rx = self.state.waiters.register(criteria);

        // A snapshot may have been published while the waiter was being
        // registered; this second look closes that window. The waiter left
        // behind is a harmless dangler pruned on a later cycle.
        if let Some(node) = self.node(criteria) {
            return Ok(node);
        }

        match tokio::time::timeout(wait_timeout, rx).await {
            Ok(Ok(node)) => Ok(node),
            Ok(Err(_)) => Err(ClusterError::WaitCancelled { criteria }),
            Err(_) => Err(ClusterError::WaitTimeout { criteria }),
        }
    }

    /// Waits for any alive node.
    pub async fn wait_for_alive(&self, wait_timeout: Duration) -> Result<Arc<Node<T>>, ClusterError> {
        self.wait_for_node(NodeStateCriteria::Alive, wait_timeout).await
    }

    /// Waits for the primary.
    pub async fn wait_for_primary(&self, wait_timeout: Duration) -> Result<Arc<Node<T>>, ClusterError> {
        self.wait_for_node(NodeStateCriteria::Primary, wait_timeout).await
    }

    /// Waits for a standby.
    pub async fn wait_for_standby(&self, wait_timeout: Duration) -> Result<Arc<Node<T>>, ClusterError> {
        self.wait_for_node(NodeStateCriteria::Standby, wait_timeout).await
    }

    /// Waits for the primary, settling for any standby.
    pub async fn wait_for_primary_preferred(
        &self,
        wait_timeout: Duration,
    ) -> Result<Arc<Node<T>>, ClusterError> {
        self.wait_for_node(NodeStateCriteria::PreferPrimary, wait_timeout).await
    }

    /// Waits for a standby, settling for the primary.
    pub async fn wait_for_standby_preferred(
        &self,
        wait_timeout: Duration,
    ) -> Result<Arc<Node<T>>, ClusterError> {
        self.wait_for_node(NodeStateCriteria::PreferStandby, wait_timeout).await
    }

    /// Most recent probe error for every currently failing address. Empty
    /// when all nodes are healthy.
    pub fn errors(&self) -> HashMap<String, NodeError> {
        self.state.err_collector.errors()
    }

    /// Combined error across failing addresses; `None` when all nodes are
    /// healthy.
    pub fn err(&self) -> Option<CollectedErrors> {
        self.state.err_collector.err()
    }

    /// Stops the update task and closes every node's connection handle.
    ///
    /// Idempotent; only the first call runs the closers. Every closer is
    /// attempted even when an earlier one fails; the first failure is
    /// returned. Callers still blocked in [`Cluster::wait_for_node`]
    /// observe [`ClusterError::WaitCancelled`].
    pub async fn close(&self) -> Result<(), ClusterError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        info!(nodes = self.state.nodes.len(), "closing cluster");

        let task = self.lock_task().take();
        if let Some(task) = task {
            task.abort();
            let _ = task.await;
        }

        self.state.waiters.close();

        let mut first_failure = None;
        for node in &self.state.nodes {
            if let Err(err) = self.closer.close(node.conn()) {
                warn!(addr = %node, error = %err, "closing connection failed");
                if first_failure.is_none() {
                    first_failure = Some(ClusterError::Close {
                        addr: node.addr().to_string(),
                        source: err,
                    });
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.update_task.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T> Drop for Cluster<T> {
    fn drop(&mut self) {
        // Dropping without close() must not leave the update task running.
        // Connection handles are the caller's to release in that case.
        if let Some(task) = self
            .update_task
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
        {
            task.abort();
        }
    }
}

/// Builder collecting cluster configuration before the update task starts.
pub struct ClusterBuilder<T> {
    nodes: Vec<Node<T>>,
    checker: Arc<dyn NodeChecker<T>>,
    closer: Box<dyn ConnCloser<T>>,
    picker: Arc<dyn NodePicker<T>>,
    tracer: Tracer<T>,
    config: ClusterConfig,
}

impl<T> ClusterBuilder<T>
where
    T: Send + Sync + 'static,
{
    /// Replaces both timing knobs at once.
    pub fn config(mut self, config: ClusterConfig) -> Self {
        self.config = config;
        self
    }

    /// Interval between update cycles.
    pub fn update_interval(mut self, interval: Duration) -> Self {
        self.config.update_interval = interval;
        self
    }

    /// Deadline for probing all nodes within one cycle.
    pub fn update_timeout(mut self, timeout: Duration) -> Self {
        self.config.update_timeout = timeout;
        self
    }

    /// Node selection strategy; defaults to [`RandomPicker`].
    pub fn picker(mut self, picker: impl NodePicker<T> + 'static) -> Self {
        self.picker = Arc::new(picker);
        self
    }

    /// Hooks observing the update cycle; defaults to none.
    pub fn tracer(mut self, tracer: Tracer<T>) -> Self {
        self.tracer = tracer;
        self
    }

    /// Validates the node set, publishes an empty initial snapshot, and
    /// starts the background update task. Must be called within a tokio
    /// runtime.
    pub fn build(self) -> Result<Cluster<T>, ClusterError> {
        if self.nodes.is_empty() {
            return Err(ClusterError::NoNodes);
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.addr().is_empty() {
                return Err(ClusterError::EmptyNodeAddress { index });
            }
        }

        let state = Arc::new(ClusterState {
            nodes: self.nodes.into_iter().map(Arc::new).collect(),
            checker: self.checker,
            picker: self.picker,
            tracer: self.tracer,
            config: self.config,
            alive: ArcSwap::from_pointee(AliveNodes::default()),
            waiters: WaiterRegistry::new(),
            err_collector: ErrorsCollector::new(),
        });

        info!(
            nodes = state.nodes.len(),
            interval = ?state.config.update_interval,
            timeout = ?state.config.update_timeout,
            "starting cluster health updates"
        );
        let update_task = tokio::spawn(Arc::clone(&state).run_updates());

        Ok(Cluster {
            state,
            closer: self.closer,
            update_task: Mutex::new(Some(update_task)),
            closed: AtomicBool::new(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::NopChecker;

    fn noop_closer(_conn: &String) -> anyhow::Result<()> {
        Ok(())
    }

    #[tokio::test]
    async fn test_build_rejects_empty_node_list() {
        let err = Cluster::<String>::builder(Vec::new(), NopChecker, noop_closer)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClusterError::NoNodes));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_address() {
        let nodes = vec![
            Node::new("db-0", "c0".to_string()),
            Node::new("", "c1".to_string()),
        ];
        let err = Cluster::builder(nodes, NopChecker, noop_closer)
            .build()
            .unwrap_err();
        assert!(matches!(err, ClusterError::EmptyNodeAddress { index: 1 }));
    }

    #[tokio::test]
    async fn test_queries_on_fresh_cluster_return_none() {
        // The initial snapshot is empty until the first probe pass lands.
        let nodes = vec![Node::new("db-0", "c0".to_string())];
        let cluster = Cluster::builder(nodes, NopChecker, noop_closer)
            .update_interval(Duration::from_secs(60))
            .build()
            .unwrap();

        // There is no synchronization with the initial pass here, so only
        // nodes() has a guaranteed answer.
        assert_eq!(cluster.nodes().len(), 1);
        assert!(cluster.err().is_none());
        cluster.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let closed = Arc::new(std::sync::Mutex::new(0usize));
        let counter = closed.clone();
        let closer = move |_conn: &String| {
            *counter.lock().unwrap() += 1;
            anyhow::Ok(())
        };

        let nodes = vec![Node::new("db-0", "c0".to_string())];
        let cluster = Cluster::builder(nodes, NopChecker, closer).build().unwrap();

        cluster.close().await.unwrap();
        cluster.close().await.unwrap();
        assert_eq!(*closed.lock().unwrap(), 1);
    }
}
