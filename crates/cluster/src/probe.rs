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

//! Single-probe execution and timing.

use crate::checker::NodeChecker;
use crate::node::Node;
use crate::ranking::CheckedNode;
use anyhow::anyhow;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Runs the checker against one node, measuring wall-clock latency around
/// the call. A probe that outlives `deadline` is cancelled and reported as
/// an error. The latency of a failed probe is never used for ranking.
pub(crate) async fn run_check<T>(
    checker: &dyn NodeChecker<T>,
    node: &Arc<Node<T>>,
    deadline: Duration,
) -> anyhow::Result<CheckedNode<T>>
where
    T: Send + Sync,
{
    let started = Instant::now();
    let outcome = tokio::time::timeout(deadline, checker.check(node.conn())).await;
    let latency = started.elapsed();

    match outcome {
        Ok(Ok(is_primary)) => Ok(CheckedNode {
            node: Arc::clone(node),
            is_primary,
            latency,
        }),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(anyhow!("check timed out after {latency:?}")),
    }
}
