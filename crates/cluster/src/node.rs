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

//! Node descriptor and selection criteria.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single database endpoint known to the cluster.
///
/// A node pairs a stable address, used as its identity in logs and error
/// aggregation, with the caller-owned connection handle (typically a driver
/// pool). The cluster never inspects the handle; it passes a reference to
/// the injected checker during probes, to the injected closer during
/// shutdown, and back to callers that pick the node.
#[derive(Debug)]
pub struct Node<T> {
    addr: String,
    conn: T,
}

impl<T> Node<T> {
    /// Creates a node from its address and connection handle.
    pub fn new(addr: impl Into<String>, conn: T) -> Self {
        Self {
            addr: addr.into(),
            conn,
        }
    }

    /// Address identifying this node.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Caller-owned connection handle.
    pub fn conn(&self) -> &T {
        &self.conn
    }
}

impl<T> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.addr)
    }
}

/// Criteria for choosing a node by its last observed role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStateCriteria {
    /// Any alive node.
    Alive,
    /// The primary only.
    Primary,
    /// A standby only.
    Standby,
    /// The primary when one is alive, any standby otherwise.
    PreferPrimary,
    /// A standby when one is alive, the primary otherwise.
    PreferStandby,
}

impl fmt::Display for NodeStateCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeStateCriteria::Alive => "alive",
            NodeStateCriteria::Primary => "primary",
            NodeStateCriteria::Standby => "standby",
            NodeStateCriteria::PreferPrimary => "prefer primary",
            NodeStateCriteria::PreferStandby => "prefer standby",
        };
        f.write_str(name)
    }
}
