use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::prelude::ApiError;

/// Rectangle around one detected book, in source-image pixels.
///
/// Travels on the wire as `[x1, y1, x2, y2]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).max(0)
    }
}

impl From<[i32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::new(x1, y1, x2, y2)
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

/// Body returned by `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub count: u32,
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
    pub image_with_boxes: String,
}

/// The service's answer to one image submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    count: u32,
    annotated_image: String,
    boxes: Vec<BoundingBox>,
}

impl DetectionResult {
    pub fn new(count: u32, annotated_image: impl Into<String>, boxes: Vec<BoundingBox>) -> Self {
        Self {
            count,
            annotated_image: annotated_image.into(),
            boxes,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Annotated JPEG exactly as received, base64 text.
    pub fn annotated_image(&self) -> &str {
        &self.annotated_image
    }

    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    /// Decodes the annotated image. `None` when the payload is not base64;
    /// whether the bytes are a displayable JPEG is left to the renderer.
    pub fn decode_annotated_image(&self) -> Option<Vec<u8>> {
        STANDARD.decode(self.annotated_image.trim()).ok()
    }
}

impl TryFrom<DetectResponse> for DetectionResult {
    type Error = ApiError;

    fn try_from(response: DetectResponse) -> Result<Self, Self::Error> {
        if let Some(status) = response.status.as_deref() {
            if status != "success" {
                return Err(ApiError::InvalidResponse(format!(
                    "detection status '{status}'"
                )));
            }
        }
        Ok(Self::new(
            response.count,
            response.image_with_boxes,
            response.boxes,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_response_parses_full_body() {
        let body = r#"{
            "status": "success",
            "count": 2,
            "boxes": [[1, 2, 30, 40], [50, 2, 80, 40]],
            "image_with_boxes": "aGVsbG8="
        }"#;
        let response: DetectResponse = serde_json::from_str(body).unwrap();
        let result = DetectionResult::try_from(response).unwrap();
        assert_eq!(result.count(), 2);
        assert_eq!(result.boxes()[1], BoundingBox::new(50, 2, 80, 40));
        assert_eq!(result.boxes()[0].width(), 29);
        assert_eq!(result.decode_annotated_image().unwrap(), b"hello");
    }

    #[test]
    fn detect_response_tolerates_missing_optional_fields() {
        let body = r#"{"count": 3, "image_with_boxes": "<b64>"}"#;
        let response: DetectResponse = serde_json::from_str(body).unwrap();
        let result = DetectionResult::try_from(response).unwrap();
        assert_eq!(result.count(), 3);
        assert!(result.boxes().is_empty());
        assert_eq!(result.annotated_image(), "<b64>");
    }

    #[test]
    fn negative_count_is_rejected_by_the_wire_type() {
        let body = r#"{"count": -1, "image_with_boxes": ""}"#;
        assert!(serde_json::from_str::<DetectResponse>(body).is_err());
    }

    #[test]
    fn error_status_is_an_invalid_response() {
        let response = DetectResponse {
            status: Some("error".into()),
            count: 0,
            boxes: Vec::new(),
            image_with_boxes: String::new(),
        };
        assert!(matches!(
            DetectionResult::try_from(response),
            Err(ApiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn malformed_image_payload_decodes_to_none() {
        let result = DetectionResult::new(1, "not base64 !!", Vec::new());
        assert_eq!(result.decode_annotated_image(), None);
    }
}
