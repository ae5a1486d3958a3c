use iced::{
    widget::{button, column, image, row, scrollable, text, Column, Container},
    Alignment, Element, Length, Task,
};
use log::warn;
use shelfcore::api::{ApiClient, HealthStatus};
use shelfcore::math::plot::LinePlot;
use shelfcore::model::{DetectionResult, SelectedImage, StatsSeries};
use shelfcore::workflow::{PageState, StatsRequest, SubmitRequest, Ticket, UploadWorkflow};
use shelfcore::ApiResult;

use crate::config::ViewerConfig;
use crate::views::result::{self, ResultPanel};
use crate::views::stats::{self, ChartStyle};

const HISTORY_LIMIT: usize = 20;
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp", "tif", "tiff"];

/// Root of the window: owns the page state and routes every event through
/// the upload workflow.
pub struct Viewer {
    client: ApiClient,
    workflow: UploadWorkflow,
    page: PageState,
    preview: Option<image::Handle>,
    result_panel: Option<ResultPanel>,
    chart: Option<LinePlot>,
    chart_style: ChartStyle,
    service_status: String,
    history: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    HealthChecked(ApiResult<HealthStatus>),
    PickImage,
    ImagePicked(Option<SelectedImage>),
    DetectionSettled(Ticket, ApiResult<DetectionResult>),
    StatsSettled(Ticket, ApiResult<StatsSeries>),
}

impl Viewer {
    pub fn boot(config: ViewerConfig) -> (Self, Task<Message>) {
        let client = config.client();
        let viewer = Viewer {
            client: client.clone(),
            workflow: UploadWorkflow::new(config.stats_window_days),
            page: PageState::new(),
            preview: None,
            result_panel: None,
            chart: None,
            chart_style: ChartStyle::default(),
            service_status: format!("Проверка сервиса {}...", client.base_url()),
            history: Vec::new(),
        };
        let health = Task::perform(
            async move { client.health().await },
            Message::HealthChecked,
        );
        (viewer, health)
    }

    pub fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::HealthChecked(Ok(health)) => {
                state.service_status = if health.is_ok() {
                    format!("Сервис доступен: {}", state.client.base_url())
                } else {
                    format!("Сервис ответил статусом '{}'", health.status)
                };
                Task::none()
            }
            Message::HealthChecked(Err(err)) => {
                warn!("health check failed: {}", err);
                state.service_status = format!("Сервис недоступен: {err}");
                Task::none()
            }
            Message::PickImage => Task::perform(pick_image(), Message::ImagePicked),
            Message::ImagePicked(selection) => {
                let Some(request) = state.workflow.select(&mut state.page, selection) else {
                    return Task::none();
                };
                state.preview = Some(image::Handle::from_bytes(request.image.bytes().to_vec()));
                state.result_panel = None;
                state.push_history(format!(
                    "Загрузка {}: {}",
                    request.ticket,
                    request.image.file_name()
                ));
                state.submit(request)
            }
            Message::DetectionSettled(ticket, outcome) => {
                let summary = match &outcome {
                    Ok(detection) => result::count_caption(detection.count()),
                    Err(err) => format!("ошибка ({err})"),
                };
                let phase = state.workflow.phase();
                let next = state
                    .workflow
                    .detection_settled(&mut state.page, ticket, outcome);
                if state.workflow.phase() == phase {
                    state.push_history(format!("Загрузка {ticket}: ответ пропущен"));
                    return Task::none();
                }
                state.push_history(format!("Загрузка {ticket}: {summary}"));
                state.result_panel = state.page.result().map(ResultPanel::new);
                match next {
                    Some(request) => state.refresh_stats(request),
                    None => Task::none(),
                }
            }
            Message::StatsSettled(ticket, outcome) => {
                if let Err(err) = &outcome {
                    if ticket == state.workflow.current_ticket() {
                        state.push_history(format!("Статистика: ошибка ({err})"));
                    }
                }
                state.workflow.stats_settled(&mut state.page, ticket, outcome);
                state.chart = state.page.stats().map(LinePlot::from_series);
                Task::none()
            }
        }
    }

    pub fn view(state: &Self) -> Element<'_, Message> {
        let selected_name = state
            .page
            .selected()
            .map(|image| image.file_name().to_string())
            .unwrap_or_else(|| "Файл не выбран".into());

        let upload_section = column![
            text("Загрузите фото книжного шкафа").size(20),
            row![
                button("Выбрать файл")
                    .on_press(Message::PickImage)
                    .padding(10),
                text(selected_name).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
        ]
        .spacing(8);

        let mut content = column![text("Анализатор книжного шкафа").size(30), upload_section]
            .spacing(20)
            .padding(24)
            .width(Length::Fill);

        if state.page.is_loading() {
            content = content.push(text("Обработка изображения...").size(16));
        }

        if let Some(preview) = &state.preview {
            content = content.push(
                column![
                    text("Выбранное фото:").size(16),
                    image(preview.clone()).height(Length::Fixed(180.0)),
                ]
                .spacing(6),
            );
        }

        content = content
            .push(result::view(state.result_panel.as_ref()))
            .push(stats::view(
                state.chart.as_ref(),
                &state.chart_style,
                state.workflow.stats_window_days(),
            ))
            .push(state.footer());

        Container::new(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn footer(&self) -> Element<'_, Message> {
        let metrics = self.workflow.metrics();
        let history_list = if self.history.is_empty() {
            Column::new().push(text("Нет событий").size(12))
        } else {
            self.history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        column![
            text(&self.service_status).size(14),
            text(format!(
                "Загрузок: {} · распознано: {} · ошибок детекции: {} · ошибок статистики: {}",
                metrics.uploads, metrics.detections, metrics.detection_errors, metrics.stats_errors
            ))
            .size(12),
            text("Журнал").size(16),
            Container::new(history_list).padding(6),
        ]
        .spacing(6)
        .into()
    }

    fn submit(&self, request: SubmitRequest) -> Task<Message> {
        let client = self.client.clone();
        let SubmitRequest { ticket, image } = request;
        Task::perform(
            async move {
                client
                    .submit_image(image.bytes().to_vec(), image.file_name())
                    .await
            },
            move |outcome| Message::DetectionSettled(ticket, outcome),
        )
    }

    fn refresh_stats(&self, request: StatsRequest) -> Task<Message> {
        let client = self.client.clone();
        let StatsRequest {
            ticket,
            window_days,
        } = request;
        Task::perform(
            async move { client.fetch_stats(window_days).await },
            move |outcome| Message::StatsSettled(ticket, outcome),
        )
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > HISTORY_LIMIT {
            self.history.remove(0);
        }
    }
}

async fn pick_image() -> Option<SelectedImage> {
    let handle = rfd::AsyncFileDialog::new()
        .set_title("Загрузите фото книжного шкафа")
        .add_filter("Изображения", IMAGE_EXTENSIONS)
        .pick_file()
        .await?;
    let bytes = handle.read().await;
    Some(SelectedImage::new(handle.file_name(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelfcore::ApiError;

    fn viewer() -> Viewer {
        let config = ViewerConfig::from_args("http://127.0.0.1:9".into(), 30).unwrap();
        Viewer::boot(config).0
    }

    fn photo() -> SelectedImage {
        SelectedImage::new("shelf.jpg", vec![0xffu8, 0xd8, 0xff])
    }

    #[test]
    fn cancelled_dialog_leaves_the_page_untouched() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(None));
        assert!(viewer.page.selected().is_none());
        assert!(viewer.preview.is_none());
        assert!(viewer.history.is_empty());
    }

    #[test]
    fn selection_shows_preview_and_loading() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        assert!(viewer.page.is_loading());
        assert!(viewer.preview.is_some());
        assert_eq!(viewer.history.len(), 1);
    }

    #[test]
    fn detection_builds_the_result_panel() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        let ticket = viewer.workflow.current_ticket();
        let result = DetectionResult::new(3, "aGVsbG8=", Vec::new());
        let _ = Viewer::update(&mut viewer, Message::DetectionSettled(ticket, Ok(result)));

        assert!(!viewer.page.is_loading());
        assert_eq!(viewer.result_panel.as_ref().map(ResultPanel::count), Some(3));
    }

    #[test]
    fn failed_detection_shows_no_result() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        let ticket = viewer.workflow.current_ticket();
        let _ = Viewer::update(
            &mut viewer,
            Message::DetectionSettled(ticket, Err(ApiError::Network("refused".into()))),
        );

        assert!(!viewer.page.is_loading());
        assert!(viewer.result_panel.is_none());
        assert!(viewer.page.stats().is_none());
    }

    #[test]
    fn stats_failure_keeps_the_result_panel() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        let ticket = viewer.workflow.current_ticket();
        let result = DetectionResult::new(3, "aGVsbG8=", Vec::new());
        let _ = Viewer::update(&mut viewer, Message::DetectionSettled(ticket, Ok(result)));
        let _ = Viewer::update(
            &mut viewer,
            Message::StatsSettled(ticket, Err(ApiError::InvalidResponse("bad".into()))),
        );

        assert!(viewer.result_panel.is_some());
        assert!(viewer.page.stats().is_none());
        assert!(viewer.chart.is_none());
    }

    #[test]
    fn repeated_detection_is_logged_once() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        let ticket = viewer.workflow.current_ticket();
        for _ in 0..2 {
            let result = DetectionResult::new(3, "aGVsbG8=", Vec::new());
            let _ = Viewer::update(&mut viewer, Message::DetectionSettled(ticket, Ok(result)));
        }

        let caption = result::count_caption(3);
        let logged = viewer
            .history
            .iter()
            .filter(|entry| entry.contains(&caption))
            .count();
        assert_eq!(logged, 1);
        assert!(viewer.history.last().unwrap().ends_with("ответ пропущен"));
    }

    #[test]
    fn stats_build_the_chart_once() {
        let mut viewer = viewer();
        let _ = Viewer::update(&mut viewer, Message::ImagePicked(Some(photo())));
        let ticket = viewer.workflow.current_ticket();
        let result = DetectionResult::new(3, "aGVsbG8=", Vec::new());
        let _ = Viewer::update(&mut viewer, Message::DetectionSettled(ticket, Ok(result)));
        let series = StatsSeries::new(vec!["2024-01-01".into(), "2024-01-02".into()], vec![3, 5])
            .unwrap();
        let _ = Viewer::update(&mut viewer, Message::StatsSettled(ticket, Ok(series)));

        assert_eq!(viewer.chart.as_ref().map(|plot| plot.points().len()), Some(2));
    }
}
