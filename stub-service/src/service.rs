use bytes::BufMut;
use chrono::Local;
use futures_util::TryStreamExt;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use shelfcore::api::HealthStatus;
use shelfcore::model::{DetectResponse, StatsResponse};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::multipart::{FormData, Part};
use warp::{Filter, Rejection, Reply};

use crate::detector::SyntheticDetector;
use crate::store::RecordStore;

const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;
const DEFAULT_STATS_DAYS: u32 = 7;

pub struct StubState {
    pub detector: SyntheticDetector,
    pub store: RecordStore,
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    days: Option<u32>,
}

/// `/detect`, `/stats` and `/health`, shaped like the real service.
pub fn routes(
    state: Arc<StubState>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_state = warp::any().map(move || state.clone());

    let detect = warp::path("detect")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_state.clone())
        .and_then(detect_books);

    let stats = warp::path("stats")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<StatsQuery>())
        .and(with_state)
        .map(|query: StatsQuery, state: Arc<StubState>| {
            let days = query.days.unwrap_or(DEFAULT_STATS_DAYS);
            let (timestamps, counts) = state.store.window(days, Local::now().naive_local());
            warp::reply::json(&StatsResponse {
                status: Some("success".into()),
                timestamps,
                counts,
            })
        });

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&HealthStatus {
                status: "ok".into(),
                message: "Service is running".into(),
            })
        });

    detect.or(stats).or(health).with(warp::log("shelf_stub"))
}

async fn detect_books(form: FormData, state: Arc<StubState>) -> Result<impl Reply, Rejection> {
    let upload = match read_file_part(form).await {
        Ok(Some(upload)) => upload,
        Ok(None) => {
            return Ok(error_reply(
                StatusCode::UNPROCESSABLE_ENTITY,
                "multipart field 'file' is required",
            ))
        }
        Err(err) => {
            error!("reading upload failed: {}", err);
            return Ok(error_reply(StatusCode::BAD_REQUEST, &err.to_string()));
        }
    };
    let (file_name, bytes) = upload;

    match state.detector.detect(&bytes) {
        Ok(detection) => {
            state.store.record_now(detection.count);
            info!(
                "{} -> {} books ({} records stored)",
                file_name,
                detection.count,
                state.store.len()
            );
            let body = DetectResponse {
                status: Some("success".into()),
                count: detection.count,
                boxes: detection.boxes,
                image_with_boxes: detection.image_base64,
            };
            Ok(warp::reply::with_status(
                warp::reply::json(&body),
                StatusCode::OK,
            ))
        }
        Err(err) => {
            error!("detection failed for {}: {}", file_name, err);
            Ok(error_reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &err.to_string(),
            ))
        }
    }
}

fn error_reply(status: StatusCode, message: &str) -> warp::reply::WithStatus<warp::reply::Json> {
    warp::reply::with_status(
        warp::reply::json(&json!({
            "detail": {"status": "error", "message": message}
        })),
        status,
    )
}

async fn read_file_part(form: FormData) -> Result<Option<(String, Vec<u8>)>, warp::Error> {
    let parts: Vec<Part> = form.try_collect().await?;
    let Some(part) = parts.into_iter().find(|part| part.name() == "file") else {
        return Ok(None);
    };
    let file_name = part.filename().unwrap_or("upload").to_string();
    let bytes = part
        .stream()
        .try_fold(Vec::new(), |mut buffer, chunk| async move {
            buffer.put(chunk);
            Ok(buffer)
        })
        .await?;
    Ok(Some((file_name, bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use warp::test::request;

    const BOUNDARY: &str = "shelfstubboundary";

    fn state() -> Arc<StubState> {
        Arc::new(StubState {
            detector: SyntheticDetector::new(11, 20),
            store: RecordStore::new(),
        })
    }

    fn multipart_body(field: &str, payload: &str) -> String {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"shelf.jpg\"\r\n\
             Content-Type: image/jpeg\r\n\r\n{payload}\r\n--{b}--\r\n",
            b = BOUNDARY
        )
    }

    async fn post_detect(
        state: Arc<StubState>,
        field: &str,
        payload: &str,
    ) -> warp::http::Response<bytes::Bytes> {
        request()
            .method("POST")
            .path("/detect")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(multipart_body(field, payload))
            .reply(&routes(state))
            .await
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = request()
            .method("GET")
            .path("/health")
            .reply(&routes(state()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let health: HealthStatus = serde_json::from_slice(response.body()).unwrap();
        assert!(health.is_ok());
    }

    #[tokio::test]
    async fn detect_records_the_upload_for_stats() {
        let state = state();
        let response = post_detect(state.clone(), "file", "JPEGDATA").await;
        assert_eq!(response.status(), StatusCode::OK);

        let detection: DetectResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(detection.image_with_boxes, "SlBFR0RBVEE=");
        assert_eq!(detection.boxes.len(), detection.count as usize);

        let response = request()
            .method("GET")
            .path("/stats?days=30")
            .reply(&routes(state))
            .await;
        let stats: StatsResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(stats.counts, vec![detection.count]);
        assert_eq!(stats.timestamps.len(), 1);
    }

    #[tokio::test]
    async fn stats_default_to_an_empty_week() {
        let response = request()
            .method("GET")
            .path("/stats")
            .reply(&routes(state()))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats: StatsResponse = serde_json::from_slice(response.body()).unwrap();
        assert!(stats.timestamps.is_empty());
        assert!(stats.counts.is_empty());
    }

    #[tokio::test]
    async fn huge_day_window_still_replies() {
        let state = state();
        state.store.record_now(4);
        let response = request()
            .method("GET")
            .path("/stats?days=4000000000")
            .reply(&routes(state))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats: StatsResponse = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(stats.counts, vec![4]);
    }

    #[tokio::test]
    async fn missing_file_field_is_unprocessable() {
        let response = post_detect(state(), "photo", "JPEGDATA").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn empty_upload_is_a_server_error() {
        let state = state();
        let response = post_detect(state.clone(), "file", "").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.store.len(), 0);
    }
}
