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

//! Cluster error types.

use crate::node::NodeStateCriteria;
use thiserror::Error;

/// Errors surfaced by cluster construction, waiting, and shutdown.
///
/// Probe failures are deliberately absent: a cluster is expected to contain
/// failing nodes, so those are only recorded for inspection via
/// `Cluster::err`.
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Construction was attempted with an empty node list.
    #[error("no nodes provided")]
    NoNodes,

    /// A node was supplied without an address.
    #[error("node {index} has an empty address")]
    EmptyNodeAddress { index: usize },

    /// No node matching the criteria appeared before the wait deadline.
    #[error("timed out waiting for {criteria} node")]
    WaitTimeout { criteria: NodeStateCriteria },

    /// The cluster was closed while the caller was waiting for a node.
    #[error("wait for {criteria} node cancelled: cluster closed")]
    WaitCancelled { criteria: NodeStateCriteria },

    /// A connection closer failed during shutdown. Carries the first
    /// failure; the remaining closers were still attempted.
    #[error("close connection to {addr}: {source}")]
    Close {
        addr: String,
        #[source]
        source: anyhow::Error,
    },
}
