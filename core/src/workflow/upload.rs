use std::fmt;

use crate::model::{DetectionResult, SelectedImage, StatsSeries};
use crate::prelude::{ApiResult, DEFAULT_STATS_WINDOW_DAYS};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use crate::workflow::state::PageState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Generation number of one upload cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Detection call the caller must dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub ticket: Ticket,
    pub image: SelectedImage,
}

/// Statistics call the caller must dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRequest {
    pub ticket: Ticket,
    pub window_days: u32,
}

/// Transition function for the page's upload cycle.
///
/// The workflow never performs I/O itself: each transition returns the request
/// to dispatch next, and the caller feeds the outcome back in with the ticket
/// it was issued under. Outcomes for any ticket other than the current one are
/// dropped, so a slow earlier upload can never overwrite a newer one.
#[derive(Debug)]
pub struct UploadWorkflow {
    phase: UploadPhase,
    generation: u64,
    stats_window_days: u32,
    log: LogManager,
    metrics: MetricsRecorder,
}

impl UploadWorkflow {
    pub fn new(stats_window_days: u32) -> Self {
        Self {
            phase: UploadPhase::Idle,
            generation: 0,
            stats_window_days: stats_window_days.max(1),
            log: LogManager::new(),
            metrics: MetricsRecorder::new(),
        }
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn stats_window_days(&self) -> u32 {
        self.stats_window_days
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Ticket of the most recent selection.
    pub fn current_ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    fn is_current(&self, ticket: Ticket, stage: &str) -> bool {
        if ticket == self.current_ticket() {
            return true;
        }
        self.log.report_stale(stage, ticket.0, self.generation);
        self.metrics.record_stale();
        false
    }

    /// Starts a new cycle for `image`. A cancelled dialog (`None`) changes
    /// nothing and dispatches nothing.
    pub fn select(
        &mut self,
        state: &mut PageState,
        image: Option<SelectedImage>,
    ) -> Option<SubmitRequest> {
        let image = image?;

        self.generation += 1;
        self.phase = UploadPhase::Submitting;
        self.metrics.record_upload();
        self.log.record(&format!(
            "upload {} started: {} ({} bytes)",
            self.current_ticket(),
            image.file_name(),
            image.len()
        ));

        state.loading = true;
        state.selected = Some(image.clone());
        state.result = None;

        Some(SubmitRequest {
            ticket: self.current_ticket(),
            image,
        })
    }

    /// Applies the outcome of the detection call. On success the stats
    /// refresh is requested unconditionally.
    pub fn detection_settled(
        &mut self,
        state: &mut PageState,
        ticket: Ticket,
        outcome: ApiResult<DetectionResult>,
    ) -> Option<StatsRequest> {
        if !self.is_current(ticket, "detection") || self.phase != UploadPhase::Submitting {
            return None;
        }

        state.loading = false;
        match outcome {
            Ok(result) => {
                self.log.record(&format!(
                    "upload {} detected {} books",
                    ticket,
                    result.count()
                ));
                self.metrics.record_detection();
                state.result = Some(result);
                self.phase = UploadPhase::Succeeded;
                Some(StatsRequest {
                    ticket,
                    window_days: self.stats_window_days,
                })
            }
            Err(err) => {
                self.log.report_failure("detection", &err);
                self.metrics.record_detection_error();
                state.result = None;
                self.phase = UploadPhase::Failed;
                None
            }
        }
    }

    /// Applies the outcome of the stats call. A failure clears the chart but
    /// leaves the detection result alone.
    pub fn stats_settled(
        &mut self,
        state: &mut PageState,
        ticket: Ticket,
        outcome: ApiResult<StatsSeries>,
    ) {
        if !self.is_current(ticket, "stats") {
            return;
        }

        match outcome {
            Ok(series) => {
                self.log.record(&format!(
                    "stats for upload {}: {} points",
                    ticket,
                    series.len()
                ));
                state.stats = Some(series);
            }
            Err(err) => {
                self.log.report_failure("stats refresh", &err);
                self.metrics.record_stats_error();
                state.stats = None;
            }
        }
    }
}

impl Default for UploadWorkflow {
    fn default() -> Self {
        Self::new(DEFAULT_STATS_WINDOW_DAYS)
    }
}
