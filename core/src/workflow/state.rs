use crate::model::{DetectionResult, SelectedImage, StatsSeries};

/// Everything the page renders from.
///
/// Views only read it; writes go through [`UploadWorkflow`](super::UploadWorkflow).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub(crate) selected: Option<SelectedImage>,
    pub(crate) result: Option<DetectionResult>,
    pub(crate) stats: Option<StatsSeries>,
    pub(crate) loading: bool,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&SelectedImage> {
        self.selected.as_ref()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn stats(&self) -> Option<&StatsSeries> {
        self.stats.as_ref()
    }

    /// True only while a detection request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
