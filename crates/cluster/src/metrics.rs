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

//! Cluster health metrics via the `metrics` facade.

use crate::trace::Tracer;
use metrics::{counter, gauge};

/// Builds a tracer that publishes cluster health through the `metrics`
/// facade: snapshot gauges after every publish, check counters per probe.
///
/// Install it with `ClusterBuilder::tracer`, or take the individual hooks
/// and merge them into a custom tracer. Whatever recorder the application
/// has installed (Prometheus, OTLP, ...) receives the series.
pub fn metrics_tracer<T>() -> Tracer<T> {
    let mut tracer = Tracer::default();

    tracer.updated_nodes = Some(Box::new(|snapshot| {
        gauge!("sqlroute_cluster_nodes_alive").set(snapshot.alive.len() as f64);
        gauge!("sqlroute_cluster_nodes_primary").set(snapshot.primaries.len() as f64);
        gauge!("sqlroute_cluster_nodes_standby").set(snapshot.standbys.len() as f64);
    }));

    tracer.node_alive = Some(Box::new(|_node| {
        counter!("sqlroute_cluster_checks_alive_total").increment(1);
    }));

    tracer.node_dead = Some(Box::new(|_node, _err| {
        counter!("sqlroute_cluster_checks_dead_total").increment(1);
    }));

    tracer
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_tracer_installs_probe_and_publish_hooks() {
        let tracer = metrics_tracer::<String>();
        assert!(tracer.updated_nodes.is_some());
        assert!(tracer.node_alive.is_some());
        assert!(tracer.node_dead.is_some());
        assert!(tracer.update_nodes.is_none());
        assert!(tracer.notified_waiters.is_none());
    }
}
