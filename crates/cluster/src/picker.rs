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

//! Node selection strategies over a ranked candidate list.

use crate::node::Node;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Strategy for picking one node from a ranked, non-empty candidate list.
///
/// The cluster guards the empty case before dispatching here; `nodes` is
/// never empty.
pub trait NodePicker<T>: Send + Sync {
    fn pick(&self, nodes: &[Arc<Node<T>>]) -> Arc<Node<T>>;
}

/// Picks uniformly at random.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl<T> NodePicker<T> for RandomPicker {
    fn pick(&self, nodes: &[Arc<Node<T>>]) -> Arc<Node<T>> {
        Arc::clone(&nodes[rand::rng().random_range(0..nodes.len())])
    }
}

/// Cycles through candidate positions with a per-instance counter.
///
/// The counter advances with sequential consistency, so k consecutive picks
/// over a stable list of length k visit each position exactly once. When
/// the list length changes between picks, indexes wrap modulo the current
/// length with no stickiness to previous positions.
#[derive(Debug, Default)]
pub struct RoundRobinPicker {
    next: AtomicUsize,
}

impl RoundRobinPicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> NodePicker<T> for RoundRobinPicker {
    fn pick(&self, nodes: &[Arc<Node<T>>]) -> Arc<Node<T>> {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        Arc::clone(&nodes[n % nodes.len()])
    }
}

/// Picks the lowest-latency node. Candidate lists are ranked by ascending
/// latency, so this is element zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosestPicker;

impl<T> NodePicker<T> for ClosestPicker {
    fn pick(&self, nodes: &[Arc<Node<T>>]) -> Arc<Node<T>> {
        Arc::clone(&nodes[0])
    }
}
