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

//! # SQLRoute Cluster
//!
//! Client-side routing for replicated SQL databases. A background task
//! probes every endpoint of a cluster, classifies each node as dead,
//! primary, or standby, ranks the alive ones by probe latency, and
//! atomically publishes the result. Callers ask for a connection by role
//! criteria and either get the best match immediately or wait, bounded by
//! a deadline, for one to appear.
//!
//! ## Features
//!
//! - **Background health tracking**: all nodes probed in parallel on a
//!   fixed interval, bounded by a per-cycle timeout
//! - **Lock-free reads**: role queries read an atomically published
//!   snapshot and never contend with the updater
//! - **Role criteria**: alive / primary / standby plus the prefer variants
//! - **Deadline-bounded waiting**: one-shot notification when a matching
//!   node appears, with no lost wakeups
//! - **Error aggregation**: the most recent probe error per address,
//!   available as a combined diagnostic
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlroute_cluster::{Cluster, Node, NopChecker};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // The connection handle is opaque to the cluster; any pool type
//!     // works. Strings stand in for pools here.
//!     let nodes = vec![
//!         Node::new("db-1.internal:5432", "pool-1".to_string()),
//!         Node::new("db-2.internal:5432", "pool-2".to_string()),
//!     ];
//!
//!     let cluster = Cluster::builder(nodes, NopChecker, |_conn: &String| anyhow::Ok(()))
//!         .update_interval(Duration::from_secs(5))
//!         .build()?;
//!
//!     let primary = cluster.wait_for_primary(Duration::from_secs(5)).await?;
//!     println!("writes go to {primary}");
//!
//!     cluster.close().await?;
//!     Ok(())
//! }
//! ```

pub mod checker;
pub mod cluster;
pub mod config;
pub mod error;
pub mod error_collector;
mod health_monitor;
pub mod metrics;
pub mod node;
pub mod picker;
mod probe;
pub mod ranking;
pub mod trace;
mod waiter;

pub use checker::{ConnCloser, NodeChecker, NopChecker};
pub use cluster::{Cluster, ClusterBuilder};
pub use config::{ClusterConfig, DEFAULT_UPDATE_INTERVAL, DEFAULT_UPDATE_TIMEOUT};
pub use error::ClusterError;
pub use error_collector::{CollectedErrors, NodeError};
pub use metrics::metrics_tracer;
pub use node::{Node, NodeStateCriteria};
pub use picker::{ClosestPicker, NodePicker, RandomPicker, RoundRobinPicker};
pub use ranking::AliveNodes;
pub use trace::Tracer;
