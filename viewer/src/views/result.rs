use iced::{
    widget::{column, image, text, Column},
    Element, Length,
};
use log::warn;
use shelfcore::model::DetectionResult;

use crate::app::Message;

/// Render-ready form of a [`DetectionResult`], built once per result so the
/// annotated image is decoded outside the draw path.
#[derive(Debug, Clone)]
pub struct ResultPanel {
    count: u32,
    annotated: Option<image::Handle>,
}

impl ResultPanel {
    pub fn new(result: &DetectionResult) -> Self {
        let annotated = match result.decode_annotated_image() {
            Some(bytes) => Some(image::Handle::from_bytes(bytes)),
            None => {
                warn!("annotated image is not valid base64; showing the count only");
                None
            }
        };
        Self {
            count: result.count(),
            annotated,
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn has_image(&self) -> bool {
        self.annotated.is_some()
    }
}

pub fn count_caption(count: u32) -> String {
    format!("Обнаружено книг: {count}")
}

pub fn view(panel: Option<&ResultPanel>) -> Element<'_, Message> {
    let Some(panel) = panel else {
        return Column::new().into();
    };

    let mut section = column![
        text("Результаты анализа").size(24),
        text(count_caption(panel.count)).size(18),
        text("Обнаруженные книги:").size(18),
    ]
    .spacing(10);

    if let Some(handle) = &panel.annotated {
        section = section.push(image(handle.clone()).width(Length::Fill));
    }

    section.into()
}
