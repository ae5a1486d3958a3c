use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shelfcore::model::BoundingBox;
use std::sync::{Mutex, PoisonError};

/// Nominal frame the synthetic boxes are laid out in.
const FRAME_WIDTH: i32 = 640;
const FRAME_HEIGHT: i32 = 480;

/// Largest synthetic book count; keeps the box list small and its
/// coordinates within `i32`.
pub const MAX_BOOKS: u32 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub count: u32,
    pub boxes: Vec<BoundingBox>,
    pub image_base64: String,
}

/// Produces plausible-looking detection answers without looking at pixels.
///
/// The count comes from a seeded RNG, the boxes are side-by-side spines across
/// a 640x480 frame, and the "annotated" image is the upload echoed back.
pub struct SyntheticDetector {
    rng: Mutex<StdRng>,
    max_books: u32,
}

impl SyntheticDetector {
    pub fn new(seed: u64, max_books: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max_books: max_books.min(MAX_BOOKS),
        }
    }

    pub fn detect(&self, image: &[u8]) -> anyhow::Result<Detection> {
        anyhow::ensure!(!image.is_empty(), "uploaded file is empty");

        let count = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            rng.gen_range(0..=self.max_books)
        };

        Ok(Detection {
            count,
            boxes: spine_boxes(count),
            image_base64: STANDARD.encode(image),
        })
    }
}

fn spine_boxes(count: u32) -> Vec<BoundingBox> {
    if count == 0 {
        return Vec::new();
    }
    let Ok(count) = i32::try_from(count.min(MAX_BOOKS)) else {
        return Vec::new();
    };
    let width = (FRAME_WIDTH / count).max(1);
    (0..count)
        .map(|i| {
            let x1 = (i * width).min(FRAME_WIDTH - 1);
            let x2 = (x1 + width).min(FRAME_WIDTH);
            BoundingBox::new(x1, FRAME_HEIGHT / 8, x2, FRAME_HEIGHT * 7 / 8)
        })
        .collect()
}
