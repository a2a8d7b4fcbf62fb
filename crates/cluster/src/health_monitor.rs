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

//! Background update cycle: fan out probes, rank, publish, notify.

use crate::checker::NodeChecker;
use crate::config::ClusterConfig;
use crate::error_collector::ErrorsCollector;
use crate::node::Node;
use crate::picker::NodePicker;
use crate::probe::run_check;
use crate::ranking::{AliveNodes, CheckedNode, rank_nodes};
use crate::trace::Tracer;
use crate::waiter::WaiterRegistry;
use anyhow::anyhow;
use arc_swap::ArcSwap;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// State shared between the cluster façade and its background update task.
pub(crate) struct ClusterState<T> {
    pub(crate) nodes: Vec<Arc<Node<T>>>,
    pub(crate) checker: Arc<dyn NodeChecker<T>>,
    pub(crate) picker: Arc<dyn NodePicker<T>>,
    pub(crate) tracer: Tracer<T>,
    pub(crate) config: ClusterConfig,
    pub(crate) alive: ArcSwap<AliveNodes<T>>,
    pub(crate) waiters: WaiterRegistry<T>,
    pub(crate) err_collector: ErrorsCollector,
}

impl<T> ClusterState<T>
where
    T: Send + Sync + 'static,
{
    /// Runs the update loop until the owning cluster aborts the task.
    /// The first pass runs immediately so an initial snapshot appears
    /// before the first interval elapses.
    pub(crate) async fn run_updates(self: Arc<Self>) {
        self.update_nodes().await;

        let mut ticker = tokio::time::interval(self.config.update_interval);
        // The first tick completes immediately and would double the
        // initial pass.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.update_nodes().await;
        }
    }

    /// One full probe/rank/publish/notify cycle.
    pub(crate) async fn update_nodes(self: &Arc<Self>) {
        if let Some(hook) = &self.tracer.update_nodes {
            hook();
        }

        let checked = self.check_nodes().await;
        let snapshot = Arc::new(rank_nodes(checked));
        debug!(
            alive = snapshot.alive.len(),
            primaries = snapshot.primaries.len(),
            standbys = snapshot.standbys.len(),
            "publishing cluster snapshot"
        );
        self.alive.store(Arc::clone(&snapshot));

        if let Some(hook) = &self.tracer.updated_nodes {
            hook(&snapshot);
        }

        self.waiters.notify(&snapshot, self.picker.as_ref());

        if let Some(hook) = &self.tracer.notified_waiters {
            hook();
        }
    }

    /// Probes every node in parallel under the shared cycle deadline and
    /// collects the successful results. The join barrier guarantees that no
    /// probe from this cycle can leak into a later one.
    async fn check_nodes(self: &Arc<Self>) -> Vec<CheckedNode<T>> {
        let mut probes = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let state = Arc::clone(self);
            let node = Arc::clone(node);
            probes.push((
                Arc::clone(&node),
                tokio::spawn(async move { state.probe_node(node).await }),
            ));
        }

        let mut checked = Vec::with_capacity(probes.len());
        for (node, probe) in probes {
            match probe.await {
                Ok(Some(result)) => checked.push(result),
                Ok(None) => {}
                Err(join_err) => {
                    // A panicking checker counts as a failed probe and must
                    // not take the update loop down with it.
                    self.record_dead(&node, anyhow!("node check task failed: {join_err}"));
                }
            }
        }
        checked
    }

    /// Runs one probe, fires the alive/dead hooks, and updates the error
    /// history for the node's address.
    async fn probe_node(self: Arc<Self>, node: Arc<Node<T>>) -> Option<CheckedNode<T>> {
        match run_check(self.checker.as_ref(), &node, self.config.update_timeout).await {
            Ok(checked) => {
                self.err_collector.remove(node.addr());
                if let Some(hook) = &self.tracer.node_alive {
                    hook(&node);
                }
                Some(checked)
            }
            Err(err) => {
                self.record_dead(&node, err);
                None
            }
        }
    }

    fn record_dead(&self, node: &Arc<Node<T>>, err: anyhow::Error) {
        warn!(addr = %node, error = %err, "node check failed");
        if let Some(hook) = &self.tracer.node_dead {
            hook(node, &err);
        }
        self.err_collector.add(node.addr(), err, Utc::now());
    }
}
