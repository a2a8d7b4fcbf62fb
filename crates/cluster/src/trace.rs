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

//! Hooks observing the probe/publish cycle.

use crate::node::Node;
use crate::ranking::AliveNodes;
use std::fmt;

/// Optional callbacks fired at defined points of the background update
/// cycle. Any hook may be absent. The per-probe hooks may run concurrently
/// across nodes and must be thread-safe; hooks are advisory and must not
/// block.
pub struct Tracer<T> {
    /// Fired before a cycle starts dispatching probes.
    pub update_nodes: Option<Box<dyn Fn() + Send + Sync>>,
    /// Fired after the new snapshot is published.
    pub updated_nodes: Option<Box<dyn Fn(&AliveNodes<T>) + Send + Sync>>,
    /// Fired after a probe determines a node is alive.
    pub node_alive: Option<Box<dyn Fn(&Node<T>) + Send + Sync>>,
    /// Fired after a probe determines a node is dead.
    pub node_dead: Option<Box<dyn Fn(&Node<T>, &anyhow::Error) + Send + Sync>>,
    /// Fired after pending waiters were evaluated against the new snapshot.
    pub notified_waiters: Option<Box<dyn Fn() + Send + Sync>>,
}

impl<T> Default for Tracer<T> {
    fn default() -> Self {
        Self {
            update_nodes: None,
            updated_nodes: None,
            node_alive: None,
            node_dead: None,
            notified_waiters: None,
        }
    }
}

impl<T> fmt::Debug for Tracer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("update_nodes", &self.update_nodes.is_some())
            .field("updated_nodes", &self.updated_nodes.is_some())
            .field("node_alive", &self.node_alive.is_some())
            .field("node_dead", &self.node_dead.is_some())
            .field("notified_waiters", &self.notified_waiters.is_some())
            .finish()
    }
}
