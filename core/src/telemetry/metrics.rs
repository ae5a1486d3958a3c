use std::sync::Mutex;

/// Counters for the upload workflow, readable from the UI.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uploads: usize,
    pub detections: usize,
    pub detection_errors: usize,
    pub stats_errors: usize,
    pub stale_responses: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
        }
    }

    pub fn record_upload(&self) {
        self.update(|m| m.uploads += 1);
    }

    pub fn record_detection(&self) {
        self.update(|m| m.detections += 1);
    }

    pub fn record_detection_error(&self) {
        self.update(|m| m.detection_errors += 1);
    }

    pub fn record_stats_error(&self) {
        self.update(|m| m.stats_errors += 1);
    }

    pub fn record_stale(&self) {
        self.update(|m| m.stale_responses += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("snapshot", &self.snapshot())
            .finish()
    }
}
