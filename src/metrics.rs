use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Receives lifecycle events. Implementations must not block or fail.
pub trait InstanceMetrics: Send + Sync {
    fn provisioned(&self, service_id: &str);
    fn deprovisioned(&self);
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub provisioned: BTreeMap<String, u64>,
    pub deprovisioned: u64,
}

/// Counts lifecycle events in process memory
#[derive(Debug, Default)]
pub struct CountingMetrics {
    counters: Mutex<MetricsSnapshot>,
}

impl CountingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.counters.lock().clone()
    }
}

impl InstanceMetrics for CountingMetrics {
    fn provisioned(&self, service_id: &str) {
        let mut counters = self.counters.lock();
        *counters.provisioned.entry(service_id.to_string()).or_insert(0) += 1;
    }

    fn deprovisioned(&self) {
        self.counters.lock().deprovisioned += 1;
    }
}
