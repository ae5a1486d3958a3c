use crate::model::StatsSeries;

/// One chart point in unit coordinates: `x` runs left to right across the
/// category axis, `y` runs bottom (0.0) to top (1.0) of the value axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotPoint {
    pub label: String,
    pub value: u32,
    pub x: f32,
    pub y: f32,
}

/// Geometry of a category line chart, independent of any renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlot {
    points: Vec<PlotPoint>,
    y_max: u32,
}

impl LinePlot {
    pub fn from_series(series: &StatsSeries) -> Self {
        let y_max = nice_ceiling(series.max_count().unwrap_or(0));
        let n = series.len();
        let points = series
            .points()
            .enumerate()
            .map(|(i, (label, value))| PlotPoint {
                label: label.to_string(),
                value,
                x: category_position(i, n),
                y: value as f32 / y_max as f32,
            })
            .collect();
        Self { points, y_max }
    }

    pub fn points(&self) -> &[PlotPoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Top of the value axis.
    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    /// Evenly spaced value-axis ticks from zero to [`y_max`](Self::y_max).
    pub fn y_ticks(&self, divisions: u32) -> Vec<u32> {
        let divisions = divisions.clamp(1, self.y_max);
        let step = self.y_max.div_ceil(divisions);
        let mut ticks: Vec<u32> = (0..=self.y_max).step_by(step as usize).collect();
        if ticks.last() != Some(&self.y_max) {
            ticks.push(self.y_max);
        }
        ticks
    }

    /// Indices of the points whose labels fit on the category axis when at
    /// most `max_labels` can be drawn. The last point is always labelled.
    pub fn labelled_indices(&self, max_labels: usize) -> Vec<usize> {
        let n = self.points.len();
        if n == 0 || max_labels == 0 {
            return Vec::new();
        }
        let stride = n.div_ceil(max_labels).max(1);
        let mut indices: Vec<usize> = (0..n).step_by(stride).collect();
        if indices.last() != Some(&(n - 1)) {
            if indices.len() >= max_labels {
                indices.pop();
            }
            indices.push(n - 1);
        }
        indices
    }
}

fn category_position(index: usize, count: usize) -> f32 {
    if count <= 1 {
        0.5
    } else {
        index as f32 / (count - 1) as f32
    }
}

/// Rounds `value` up to 1, 2 or 5 times a power of ten; never below 1.
pub fn nice_ceiling(value: u32) -> u32 {
    if value <= 1 {
        return 1;
    }
    let mut magnitude: u32 = 1;
    while magnitude.saturating_mul(10) < value {
        magnitude *= 10;
    }
    for factor in [1, 2, 5, 10] {
        let candidate = magnitude.saturating_mul(factor);
        if candidate >= value {
            return candidate;
        }
    }
    u32::MAX
}

/// Shortens service timestamps such as `2024-01-02 13:45:10.123` to the date.
pub fn short_label(timestamp: &str) -> &str {
    timestamp
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(counts: &[u32]) -> StatsSeries {
        let labels = (0..counts.len())
            .map(|i| format!("2024-01-{:02}", i + 1))
            .collect();
        StatsSeries::new(labels, counts.to_vec()).unwrap()
    }

    #[test]
    fn two_points_keep_order_and_values() {
        let plot = LinePlot::from_series(&series(&[3, 5]));
        let points = plot.points();
        assert_eq!(points.len(), 2);
        assert_eq!((points[0].value, points[1].value), (3, 5));
        assert_eq!((points[0].x, points[1].x), (0.0, 1.0));
        assert_eq!(plot.y_max(), 5);
        assert!((points[0].y - 0.6).abs() < 1e-6);
        assert_eq!(points[1].y, 1.0);
        assert_eq!(points[0].label, "2024-01-01");
    }

    #[test]
    fn empty_series_yields_empty_plot() {
        let plot = LinePlot::from_series(&StatsSeries::empty());
        assert!(plot.is_empty());
        assert_eq!(plot.y_max(), 1);
        assert_eq!(plot.y_ticks(4), vec![0, 1]);
        assert!(plot.labelled_indices(6).is_empty());
    }

    #[test]
    fn single_point_is_centred() {
        let plot = LinePlot::from_series(&series(&[0]));
        assert_eq!(plot.points()[0].x, 0.5);
        assert_eq!(plot.points()[0].y, 0.0);
    }

    #[test]
    fn nice_ceiling_rounds_up() {
        assert_eq!(nice_ceiling(0), 1);
        assert_eq!(nice_ceiling(3), 5);
        assert_eq!(nice_ceiling(7), 10);
        assert_eq!(nice_ceiling(11), 20);
        assert_eq!(nice_ceiling(42), 50);
        assert_eq!(nice_ceiling(100), 100);
    }

    #[test]
    fn ticks_end_at_the_axis_top() {
        let plot = LinePlot::from_series(&series(&[12, 18]));
        assert_eq!(plot.y_max(), 20);
        assert_eq!(plot.y_ticks(4), vec![0, 5, 10, 15, 20]);
    }

    #[test]
    fn labels_are_thinned_but_keep_the_last() {
        let plot = LinePlot::from_series(&series(&[1; 30]));
        let indices = plot.labelled_indices(6);
        assert!(indices.len() <= 6);
        assert_eq!(indices.first(), Some(&0));
        assert_eq!(indices.last(), Some(&29));
    }

    #[test]
    fn short_label_keeps_the_date() {
        assert_eq!(short_label("2024-01-02 13:45:10.123456"), "2024-01-02");
        assert_eq!(short_label("2024-01-02T13:45:10"), "2024-01-02");
        assert_eq!(short_label("2024-01-02"), "2024-01-02");
    }
}
