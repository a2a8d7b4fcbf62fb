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

//! Injected collaborator contracts: probing and handle teardown.

/// Probes one connection handle and reports the endpoint's current role.
///
/// Implementations must be safe to call concurrently across nodes. Each
/// probe runs under the cluster's per-cycle deadline; the probe future is
/// dropped once the deadline elapses, so implementations must not hold
/// resources that outlive cancellation.
#[async_trait::async_trait]
pub trait NodeChecker<T>: Send + Sync {
    /// Returns `true` when the endpoint currently accepts writes (primary),
    /// `false` when it is read-only (standby).
    async fn check(&self, conn: &T) -> anyhow::Result<bool>;
}

/// Checker that reports every endpoint as a writable primary.
///
/// Useful for single-node setups and tests where role detection does not
/// matter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopChecker;

#[async_trait::async_trait]
impl<T: Send + Sync> NodeChecker<T> for NopChecker {
    async fn check(&self, _conn: &T) -> anyhow::Result<bool> {
        Ok(true)
    }
}

/// Releases one connection handle during cluster shutdown.
///
/// Invoked exactly once per node. Any closure with the matching signature
/// implements this trait.
pub trait ConnCloser<T>: Send + Sync {
    fn close(&self, conn: &T) -> anyhow::Result<()>;
}

impl<T, F> ConnCloser<T> for F
where
    F: Fn(&T) -> anyhow::Result<()> + Send + Sync,
{
    fn close(&self, conn: &T) -> anyhow::Result<()> {
        self(conn)
    }
}
