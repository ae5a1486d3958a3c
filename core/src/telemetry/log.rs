use log::{debug, error, info};

use crate::prelude::ApiError;

/// Diagnostic channel for the upload workflow.
///
/// Failures never reach the user as values; they are written here and the
/// page simply shows nothing for the failed part.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn report_failure(&self, stage: &str, err: &ApiError) {
        error!("{} failed: {}", stage, err);
    }

    pub fn report_stale(&self, stage: &str, ticket: u64, current: u64) {
        debug!(
            "dropping {} response for upload #{} (current upload #{})",
            stage, ticket, current
        );
    }
}
