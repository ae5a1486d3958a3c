use log::debug;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::model::image::mime_for_file_name;
use crate::model::{DetectResponse, DetectionResult, StatsResponse, StatsSeries};
use crate::prelude::{ApiError, ApiResult};

const ERROR_BODY_PREVIEW: usize = 200;

/// Body returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

/// Typed client for the detection and statistics endpoints.
///
/// One attempt per call: no retries, no caching, and the transport's default
/// timeouts. Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Uploads one image as multipart field `file` to `POST /detect`.
    pub async fn submit_image(&self, bytes: Vec<u8>, file_name: &str) -> ApiResult<DetectionResult> {
        debug!("submitting {} ({} bytes)", file_name, bytes.len());
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime_for_file_name(file_name))
            .map_err(|err| ApiError::InvalidRequest(err.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint("detect"))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::network)?;
        let body: DetectResponse = read_json(response).await?;
        DetectionResult::try_from(body)
    }

    /// Reads detection counts for the trailing `window_days` days.
    pub async fn fetch_stats(&self, window_days: u32) -> ApiResult<StatsSeries> {
        if window_days == 0 {
            return Err(ApiError::InvalidRequest(
                "stats window must be at least one day".into(),
            ));
        }
        let url = format!("{}?days={}", self.endpoint("stats"), window_days);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ApiError::network)?;
        let body: StatsResponse = read_json(response).await?;
        StatsSeries::try_from(body)
    }

    pub async fn health(&self) -> ApiResult<HealthStatus> {
        let response = self
            .http
            .get(self.endpoint("health"))
            .send()
            .await
            .map_err(ApiError::network)?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> ApiResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(ApiError::network)?;
    if !status.is_success() {
        let preview: String = String::from_utf8_lossy(&body)
            .chars()
            .take(ERROR_BODY_PREVIEW)
            .collect();
        return Err(ApiError::InvalidResponse(format!(
            "HTTP {}: {}",
            status,
            preview.trim()
        )));
    }
    serde_json::from_slice(&body).map_err(ApiError::invalid_response)
}
