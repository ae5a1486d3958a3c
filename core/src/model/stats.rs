use serde::{Deserialize, Serialize};

use crate::prelude::{ApiError, ApiResult};

/// Body returned by `GET /stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub timestamps: Vec<String>,
    pub counts: Vec<u32>,
}

/// Historical detection counts, index-aligned with their date labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSeries {
    timestamps: Vec<String>,
    counts: Vec<u32>,
}

impl StatsSeries {
    /// Builds a series; `counts[i]` belongs to `timestamps[i]`, so the two
    /// sequences must have the same length.
    pub fn new(timestamps: Vec<String>, counts: Vec<u32>) -> ApiResult<Self> {
        if timestamps.len() != counts.len() {
            return Err(ApiError::InvalidResponse(format!(
                "stats arrays differ in length: {} timestamps, {} counts",
                timestamps.len(),
                counts.len()
            )));
        }
        Ok(Self { timestamps, counts })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.timestamps
            .iter()
            .map(String::as_str)
            .zip(self.counts.iter().copied())
    }

    pub fn max_count(&self) -> Option<u32> {
        self.counts.iter().copied().max()
    }
}

impl TryFrom<StatsResponse> for StatsSeries {
    type Error = ApiError;

    fn try_from(response: StatsResponse) -> Result<Self, Self::Error> {
        if let Some(status) = response.status.as_deref() {
            if status != "success" {
                return Err(ApiError::InvalidResponse(format!(
                    "stats status '{status}'"
                )));
            }
        }
        StatsSeries::new(response.timestamps, response.counts)
    }
}
