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

//! Cluster runtime configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default interval between update cycles.
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

/// Default bound on the probing portion of one update cycle.
pub const DEFAULT_UPDATE_TIMEOUT: Duration = Duration::from_secs(1);

/// Timing knobs for the background update cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Interval between update cycles.
    #[serde(with = "humantime_serde")]
    pub update_interval: Duration,

    /// Deadline for probing all nodes within a single cycle. A probe that
    /// exceeds it is treated as failed.
    #[serde(with = "humantime_serde")]
    pub update_timeout: Duration,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            update_timeout: DEFAULT_UPDATE_TIMEOUT,
        }
    }
}
