use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use shelfcore::api::ApiClient;
use shelfcore::prelude::DEFAULT_STATS_WINDOW_DAYS;
use std::fs;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub base_url: String,
    pub stats_window_days: u32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            stats_window_days: DEFAULT_STATS_WINDOW_DAYS,
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading viewer config {}", path_ref.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing viewer config {}", path_ref.display()))?;
        config.validate()
    }

    pub fn from_args(base_url: String, stats_window_days: u32) -> anyhow::Result<Self> {
        Self {
            base_url,
            stats_window_days,
        }
        .validate()
    }

    fn validate(self) -> anyhow::Result<Self> {
        ensure!(
            self.stats_window_days > 0,
            "stats window must be at least one day"
        );
        ensure!(
            self.base_url.starts_with("http://") || self.base_url.starts_with("https://"),
            "base url '{}' must start with http:// or https://",
            self.base_url
        );
        Ok(self)
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }
}
