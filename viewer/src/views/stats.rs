use iced::{
    mouse,
    widget::{
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke},
        column, text, Column,
    },
    Color, Element, Length, Pixels, Point, Rectangle, Renderer, Size, Theme,
};
use shelfcore::math::plot::{short_label, LinePlot, PlotPoint};

use crate::app::Message;

const CHART_HEIGHT: f32 = 400.0;
const LABEL_SIZE: f32 = 12.0;

/// Colours and captions of the statistics chart, created once at start-up.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub line: Color,
    pub grid: Color,
    pub axis: Color,
    pub label: Color,
    pub background: Color,
    pub line_width: f32,
    pub point_radius: f32,
    pub max_labels: usize,
    pub y_divisions: u32,
    pub series_label: String,
    pub x_title: String,
    pub y_title: String,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            line: Color::from_rgb8(75, 192, 192),
            grid: Color::from_rgb8(225, 225, 225),
            axis: Color::from_rgb8(120, 120, 120),
            label: Color::from_rgb8(60, 60, 60),
            background: Color::WHITE,
            line_width: 2.5,
            point_radius: 3.5,
            max_labels: 8,
            y_divisions: 5,
            series_label: "Количество книг".into(),
            x_title: "Дата".into(),
            y_title: "Количество книг".into(),
        }
    }
}

pub fn title(window_days: u32) -> String {
    format!("Статистика за последние {window_days} дней")
}

/// Renders the chart for an already laid-out plot; nothing when absent.
pub fn view<'a>(
    plot: Option<&'a LinePlot>,
    style: &'a ChartStyle,
    window_days: u32,
) -> Element<'a, Message> {
    let Some(plot) = plot else {
        return Column::new().into();
    };

    let chart = Canvas::new(LineChart { plot, style })
    .width(Length::Fill)
    .height(Length::Fixed(CHART_HEIGHT));

    column![text(title(window_days)).size(24), chart]
        .spacing(10)
        .into()
}

/// Pixel rectangle the series is drawn into, leaving room for axis labels.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PlotArea {
    const MARGIN_LEFT: f32 = 56.0;
    const MARGIN_RIGHT: f32 = 20.0;
    const MARGIN_TOP: f32 = 32.0;
    const MARGIN_BOTTOM: f32 = 48.0;

    fn inside(size: Size) -> Self {
        Self {
            left: Self::MARGIN_LEFT,
            top: Self::MARGIN_TOP,
            width: (size.width - Self::MARGIN_LEFT - Self::MARGIN_RIGHT).max(1.0),
            height: (size.height - Self::MARGIN_TOP - Self::MARGIN_BOTTOM).max(1.0),
        }
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn to_screen(&self, point: &PlotPoint) -> Point {
        Point::new(
            self.left + point.x * self.width,
            self.bottom() - point.y * self.height,
        )
    }
}

#[derive(Clone, Copy)]
struct LineChart<'a> {
    plot: &'a LinePlot,
    style: &'a ChartStyle,
}

impl LineChart<'_> {
    fn label(&self, frame: &mut Frame, content: String, position: Point) {
        frame.fill_text(canvas::Text {
            content,
            position,
            color: self.style.label,
            size: Pixels(LABEL_SIZE),
            ..canvas::Text::default()
        });
    }

    fn draw_grid(&self, frame: &mut Frame, area: &PlotArea) {
        let y_max = self.plot.y_max() as f32;
        for tick in self.plot.y_ticks(self.style.y_divisions) {
            let y = area.bottom() - (tick as f32 / y_max) * area.height;
            let line = Path::line(Point::new(area.left, y), Point::new(area.right(), y));
            frame.stroke(&line, Stroke::default().with_color(self.style.grid));
            let label = tick.to_string();
            let offset = label.chars().count() as f32 * LABEL_SIZE * 0.6 + 8.0;
            self.label(
                frame,
                label,
                Point::new(area.left - offset, y - LABEL_SIZE / 2.0),
            );
        }

        let axes = Path::new(|builder| {
            builder.move_to(Point::new(area.left, area.top));
            builder.line_to(Point::new(area.left, area.bottom()));
            builder.line_to(Point::new(area.right(), area.bottom()));
        });
        frame.stroke(
            &axes,
            Stroke::default()
                .with_color(self.style.axis)
                .with_width(1.0),
        );
    }

    fn draw_series(&self, frame: &mut Frame, area: &PlotArea) {
        let points: Vec<Point> = self
            .plot
            .points()
            .iter()
            .map(|point| area.to_screen(point))
            .collect();

        if points.len() > 1 {
            let path = Path::new(|builder| {
                for (i, point) in points.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(*point);
                    } else {
                        builder.line_to(*point);
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(self.style.line_width)
                    .with_color(self.style.line),
            );
        }

        for point in &points {
            let marker = Path::circle(*point, self.style.point_radius);
            frame.fill(&marker, self.style.line);
        }

        for index in self.plot.labelled_indices(self.style.max_labels) {
            let plot_point = &self.plot.points()[index];
            let label = short_label(&plot_point.label).to_string();
            let half_width = label.chars().count() as f32 * LABEL_SIZE * 0.3;
            self.label(
                frame,
                label,
                Point::new(points[index].x - half_width, area.bottom() + 8.0),
            );
        }
    }

    fn draw_captions(&self, frame: &mut Frame, area: &PlotArea, bounds: Size) {
        let legend = Path::line(
            Point::new(area.left, LABEL_SIZE),
            Point::new(area.left + 24.0, LABEL_SIZE),
        );
        frame.stroke(
            &legend,
            Stroke::default()
                .with_width(self.style.line_width)
                .with_color(self.style.line),
        );
        self.label(
            frame,
            self.style.series_label.clone(),
            Point::new(area.left + 30.0, LABEL_SIZE / 2.0),
        );
        self.label(
            frame,
            self.style.y_title.clone(),
            Point::new(4.0, LABEL_SIZE / 2.0 + LABEL_SIZE * 1.5),
        );
        self.label(
            frame,
            self.style.x_title.clone(),
            Point::new(area.left + area.width / 2.0, bounds.height - LABEL_SIZE * 1.5),
        );
    }
}

impl canvas::Program<Message> for LineChart<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), self.style.background);

        let area = PlotArea::inside(bounds.size());
        self.draw_grid(&mut frame, &area);

        if self.plot.is_empty() {
            self.label(
                &mut frame,
                "Нет данных за выбранный период".into(),
                Point::new(area.left + 12.0, area.top + area.height / 2.0),
            );
        } else {
            self.draw_series(&mut frame, &area);
        }
        self.draw_captions(&mut frame, &area, bounds.size());

        vec![frame.into_geometry()]
    }
}
