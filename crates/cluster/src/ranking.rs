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

//! Snapshot assembly: partition probe results by role, rank by latency.

use crate::node::{Node, NodeStateCriteria};
use crate::picker::NodePicker;
use std::sync::Arc;
use std::time::Duration;

/// One successful probe, held until the cycle's snapshot is assembled.
#[derive(Debug)]
pub(crate) struct CheckedNode<T> {
    pub(crate) node: Arc<Node<T>>,
    pub(crate) is_primary: bool,
    pub(crate) latency: Duration,
}

/// Published view of cluster health at one point in time.
///
/// All three lists are ordered by ascending last-probe latency. `alive`
/// holds every node from `primaries` and `standbys` merged into one ranked
/// list; when a primary and a standby tie on latency, the primary comes
/// first. A node whose last probe failed appears in none of the lists.
/// Snapshots are immutable once published; readers always observe either
/// the previous or the new snapshot, never a mix.
#[derive(Debug)]
pub struct AliveNodes<T> {
    /// Every alive node, ranked by latency.
    pub alive: Vec<Arc<Node<T>>>,
    /// Alive nodes whose last probe reported a writable primary.
    pub primaries: Vec<Arc<Node<T>>>,
    /// Alive nodes whose last probe reported a read-only standby.
    pub standbys: Vec<Arc<Node<T>>>,
}

impl<T> Default for AliveNodes<T> {
    fn default() -> Self {
        Self {
            alive: Vec::new(),
            primaries: Vec::new(),
            standbys: Vec::new(),
        }
    }
}

impl<T> AliveNodes<T> {
    /// Candidate list for `criteria` against this snapshot. The prefer
    /// variants fall back to the other role's list only when the preferred
    /// one is empty.
    fn candidates(&self, criteria: NodeStateCriteria) -> &[Arc<Node<T>>] {
        match criteria {
            NodeStateCriteria::Alive => &self.alive,
            NodeStateCriteria::Primary => &self.primaries,
            NodeStateCriteria::Standby => &self.standbys,
            NodeStateCriteria::PreferPrimary => {
                if self.primaries.is_empty() {
                    &self.standbys
                } else {
                    &self.primaries
                }
            }
            NodeStateCriteria::PreferStandby => {
                if self.standbys.is_empty() {
                    &self.primaries
                } else {
                    &self.standbys
                }
            }
        }
    }

    /// Applies the picker to the candidate list; `None` when it is empty.
    /// Pickers are never invoked on an empty list.
    pub(crate) fn pick(
        &self,
        criteria: NodeStateCriteria,
        picker: &dyn NodePicker<T>,
    ) -> Option<Arc<Node<T>>> {
        let candidates = self.candidates(criteria);
        if candidates.is_empty() {
            None
        } else {
            Some(picker.pick(candidates))
        }
    }
}

/// Builds the published snapshot from an unordered set of successful probes.
///
/// Sorting is stable, so nodes with equal latency keep their input order
/// within a role. The merge emits the primary first when a primary and a
/// standby tie on latency.
pub(crate) fn rank_nodes<T>(checked: Vec<CheckedNode<T>>) -> AliveNodes<T> {
    let (mut primaries, mut standbys): (Vec<_>, Vec<_>) =
        checked.into_iter().partition(|c| c.is_primary);

    primaries.sort_by_key(|c| c.latency);
    standbys.sort_by_key(|c| c.latency);

    let mut alive = Vec::with_capacity(primaries.len() + standbys.len());
    let (mut p, mut s) = (0, 0);
    while p < primaries.len() && s < standbys.len() {
        if primaries[p].latency <= standbys[s].latency {
            alive.push(Arc::clone(&primaries[p].node));
            p += 1;
        } else {
            alive.push(Arc::clone(&standbys[s].node));
            s += 1;
        }
    }
    alive.extend(primaries[p..].iter().map(|c| Arc::clone(&c.node)));
    alive.extend(standbys[s..].iter().map(|c| Arc::clone(&c.node)));

    AliveNodes {
        alive,
        primaries: primaries.into_iter().map(|c| c.node).collect(),
        standbys: standbys.into_iter().map(|c| c.node).collect(),
    }
}
