//! Chart geometry for the hourly temperature and precipitation charts
//!
//! Both charts share a 560-unit wide canvas with 18 units of padding. The
//! geometry feeds two renderers: the dashboard's block sparklines (through
//! [`LineChart::levels`] / [`BarChart::levels`]) and standalone SVG files
//! written by `skyglance snapshot`.

use std::fmt::Write as _;

/// Canvas width shared by both charts
pub const CHART_WIDTH: f64 = 560.0;
/// Padding on every side of the plot area
pub const CHART_PADDING: f64 = 18.0;
pub const LINE_CHART_HEIGHT: f64 = 180.0;
pub const BAR_CHART_HEIGHT: f64 = 140.0;

/// Gap between neighbouring bars
const BAR_GAP: f64 = 6.0;
const GRID_LINES: usize = 5;

/// Colours used when rendering SVG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub surface: &'static str,
    pub border: &'static str,
    pub grid: &'static str,
    pub line: &'static str,
    pub dot: &'static str,
    pub bar: &'static str,
    pub muted: &'static str,
}

impl ChartStyle {
    pub const LIGHT: Self = Self {
        surface: "#ffffff",
        border: "#d0d7de",
        grid: "#e4e8ee",
        line: "#1f6feb",
        dot: "#0b3d91",
        bar: "#3fa7d6",
        muted: "#57606a",
    };

    pub const DARK: Self = Self {
        surface: "#161b22",
        border: "#30363d",
        grid: "#21262d",
        line: "#58a6ff",
        dot: "#a5d6ff",
        bar: "#39c5bb",
        muted: "#8b949e",
    };

    pub const HIGH_CONTRAST: Self = Self {
        surface: "#000000",
        border: "#ffffff",
        grid: "#7f7f7f",
        line: "#ffff00",
        dot: "#ffffff",
        bar: "#00ffff",
        muted: "#ffffff",
    };
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self::LIGHT
    }
}

/// Line chart over a series that may contain unknown values
///
/// Unknown values leave a gap in the line; the y axis spans the known
/// minimum to maximum.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    values: Vec<Option<f64>>,
    min: f64,
    max: f64,
    height: f64,
}

impl LineChart {
    /// Returns `None` when there is no known value to plot
    pub fn new(values: &[Option<f64>], height: f64) -> Option<Self> {
        let values: Vec<Option<f64>> = values
            .iter()
            .map(|v| v.filter(|f| f.is_finite()))
            .collect();
        let known = values.iter().flatten().copied();
        let min = known.clone().reduce(f64::min)?;
        let max = known.reduce(f64::max)?;

        Some(Self {
            values,
            min,
            max,
            height,
        })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Vertical range, 1 for a flat series so it sits on the baseline
    fn span(&self) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            1.0
        } else {
            span
        }
    }

    fn x(&self, index: usize) -> f64 {
        let n = self.values.len();
        if n < 2 {
            return CHART_WIDTH / 2.0;
        }
        CHART_PADDING + (index as f64 / (n - 1) as f64) * (CHART_WIDTH - 2.0 * CHART_PADDING)
    }

    fn y(&self, value: f64) -> f64 {
        CHART_PADDING + (1.0 - (value - self.min) / self.span()) * (self.height - 2.0 * CHART_PADDING)
    }

    /// Position of each value in 0..=1 between min and max
    pub fn levels(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| v.map(|v| (v - self.min) / self.span()))
            .collect()
    }

    /// Canvas coordinates of every known value
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (self.x(i), self.y(v))))
            .collect()
    }

    /// SVG path data, restarting the line after each gap
    pub fn path(&self) -> String {
        let mut path = String::new();
        let mut pen_down = false;
        for (i, value) in self.values.iter().enumerate() {
            match value {
                Some(v) => {
                    if !path.is_empty() {
                        path.push(' ');
                    }
                    let command = if pen_down { 'L' } else { 'M' };
                    let _ = write!(path, "{command}{:.1},{:.1}", self.x(i), self.y(*v));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        path
    }

    /// Renders the chart as a standalone SVG document
    pub fn to_svg(&self, title: &str, unit: &str, style: &ChartStyle) -> String {
        let (w, h, p) = (CHART_WIDTH, self.height, CHART_PADDING);
        let mut svg = svg_open(title, h, style);

        for i in 0..GRID_LINES {
            let y = p + i as f64 * (h - 2.0 * p) / (GRID_LINES - 1) as f64;
            let _ = write!(
                svg,
                r#"<line x1="{p}" y1="{y:.1}" x2="{x2}" y2="{y:.1}" stroke="{grid}" stroke-dasharray="6 8"/>"#,
                x2 = w - p,
                grid = style.grid
            );
        }
        let _ = write!(
            svg,
            r#"<path d="{}" fill="none" stroke="{}" stroke-width="3"/>"#,
            self.path(),
            style.line
        );
        for (x, y) in self.points() {
            let _ = write!(
                svg,
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="4" fill="{}"/>"#,
                style.dot
            );
        }
        push_label(&mut svg, p - 6.0, &format!("max {:.1}{unit}", self.max), style);
        push_label(&mut svg, h - 6.0, &format!("min {:.1}{unit}", self.min), style);
        svg.push_str("</svg>");
        svg
    }
}

/// One bar in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Bar chart where unknown values count as zero
///
/// The scale tops out at the largest value, but never below 1 so that a
/// drizzle does not fill the whole chart.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    values: Vec<f64>,
    ymax: f64,
    height: f64,
}

impl BarChart {
    /// Returns `None` for an empty series
    pub fn new(values: &[Option<f64>], height: f64) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let values: Vec<f64> = values
            .iter()
            .map(|v| v.filter(|f| f.is_finite()).unwrap_or(0.0))
            .collect();
        let ymax = values.iter().copied().fold(1.0, f64::max);

        Some(Self {
            values,
            ymax,
            height,
        })
    }

    pub fn ymax(&self) -> f64 {
        self.ymax
    }

    /// Bar heights as a fraction of the scale, clamped to 0..=1
    pub fn levels(&self) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|v| Some((v / self.ymax).clamp(0.0, 1.0)))
            .collect()
    }

    pub fn bars(&self) -> Vec<Bar> {
        let plot_width = CHART_WIDTH - 2.0 * CHART_PADDING;
        let plot_height = self.height - 2.0 * CHART_PADDING;
        let slot = plot_width / self.values.len() as f64;
        let width = (slot - BAR_GAP).max(1.0);

        self.values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let height = (v / self.ymax).clamp(0.0, 1.0) * plot_height;
                Bar {
                    x: CHART_PADDING + i as f64 * slot,
                    y: self.height - CHART_PADDING - height,
                    width,
                    height,
                }
            })
            .collect()
    }

    /// Renders the chart as a standalone SVG document
    pub fn to_svg(&self, title: &str, unit: &str, style: &ChartStyle) -> String {
        let mut svg = svg_open(title, self.height, style);
        push_label(
            &mut svg,
            CHART_PADDING - 6.0,
            &format!("max {:.1} {unit}", self.ymax),
            style,
        );
        for bar in self.bars() {
            let _ = write!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="8" fill="{}"/>"#,
                bar.x, bar.y, bar.width, bar.height, style.bar
            );
        }
        svg.push_str("</svg>");
        svg
    }
}

/// Placeholder SVG for a series with nothing to plot
pub fn empty_svg(title: &str, height: f64, style: &ChartStyle) -> String {
    let mut svg = svg_open(title, height, style);
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="14" fill="{}">No data</text></svg>"#,
        CHART_WIDTH / 2.0,
        height / 2.0,
        style.muted
    );
    svg
}

fn svg_open(title: &str, height: f64, style: &ChartStyle) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" role="img" viewBox="0 0 {w} {height}" width="100%" height="{height}"><title>{title}</title><rect x="0" y="0" width="{w}" height="{height}" rx="18" fill="{surface}" stroke="{border}"/>"#,
        w = CHART_WIDTH,
        title = escape_xml(title),
        surface = style.surface,
        border = style.border
    )
}

fn push_label(svg: &mut String, y: f64, text: &str, style: &ChartStyle) {
    let _ = write!(
        svg,
        r#"<text x="{}" y="{y}" text-anchor="end" font-size="12" fill="{}">{}</text>"#,
        CHART_WIDTH - CHART_PADDING,
        style.muted,
        escape_xml(text)
    );
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_line_chart_empty_or_unknown_only_is_none() {
        assert!(LineChart::new(&[], LINE_CHART_HEIGHT).is_none());
        assert!(LineChart::new(&[None, None], LINE_CHART_HEIGHT).is_none());
    }

    #[test]
    fn test_line_chart_min_max_ignore_unknowns() {
        let chart = LineChart::new(&[Some(24.0), None, Some(31.5), Some(27.0)], 180.0).unwrap();
        assert_eq!(chart.min(), 24.0);
        assert_eq!(chart.max(), 31.5);
    }

    #[test]
    fn test_line_chart_points_span_the_plot_area() {
        let chart = LineChart::new(&[Some(10.0), Some(20.0), Some(15.0)], 180.0).unwrap();
        let points = chart.points();

        assert_eq!(points.len(), 3);
        // First point: left edge, maximum y (lowest value)
        assert!(approx(points[0].0, CHART_PADDING));
        assert!(approx(points[0].1, 180.0 - CHART_PADDING));
        // Middle point: top of the plot
        assert!(approx(points[1].0, CHART_WIDTH / 2.0));
        assert!(approx(points[1].1, CHART_PADDING));
        // Last point: right edge, halfway up
        assert!(approx(points[2].0, CHART_WIDTH - CHART_PADDING));
        assert!(approx(points[2].1, 90.0));
    }

    #[test]
    fn test_flat_line_sits_on_the_baseline() {
        let chart = LineChart::new(&[Some(5.0), Some(5.0)], 100.0).unwrap();
        assert!(chart.points().iter().all(|(_, y)| approx(*y, 100.0 - CHART_PADDING)));
        assert_eq!(chart.levels(), vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_single_point_is_centred() {
        let chart = LineChart::new(&[Some(5.0)], 100.0).unwrap();
        assert!(approx(chart.points()[0].0, CHART_WIDTH / 2.0));
    }

    #[test]
    fn test_line_path_breaks_at_gaps() {
        let chart = LineChart::new(&[Some(1.0), Some(2.0), None, Some(3.0)], 180.0).unwrap();
        let path = chart.path();
        assert!(path.starts_with('M'));
        assert_eq!(path.matches('M').count(), 2);
        assert_eq!(path.matches('L').count(), 1);
    }

    #[test]
    fn test_line_levels() {
        let chart = LineChart::new(&[Some(0.0), None, Some(10.0), Some(5.0)], 180.0).unwrap();
        assert_eq!(chart.levels(), vec![Some(0.0), None, Some(1.0), Some(0.5)]);
    }

    #[test]
    fn test_line_svg_labels() {
        let chart = LineChart::new(&[Some(24.0), Some(31.56)], 180.0).unwrap();
        let svg = chart.to_svg("Temperature next hours", "°C", &ChartStyle::LIGHT);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("<title>Temperature next hours</title>"));
        assert!(svg.contains("max 31.6°C"));
        assert!(svg.contains("min 24.0°C"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), GRID_LINES);
    }

    #[test]
    fn test_bar_chart_scale_never_below_one() {
        let chart = BarChart::new(&[Some(0.2), Some(0.4)], 140.0).unwrap();
        assert_eq!(chart.ymax(), 1.0);

        let chart = BarChart::new(&[Some(0.2), Some(4.0)], 140.0).unwrap();
        assert_eq!(chart.ymax(), 4.0);
    }

    #[test]
    fn test_bar_chart_unknown_is_zero() {
        let chart = BarChart::new(&[None, Some(2.0)], 140.0).unwrap();
        assert_eq!(chart.levels(), vec![Some(0.0), Some(1.0)]);
        assert_eq!(chart.bars()[0].height, 0.0);
    }

    #[test]
    fn test_bar_geometry() {
        let chart = BarChart::new(&[Some(1.0), Some(2.0)], 140.0).unwrap();
        let bars = chart.bars();
        let slot = (CHART_WIDTH - 2.0 * CHART_PADDING) / 2.0;

        assert!(approx(bars[0].x, CHART_PADDING));
        assert!(approx(bars[1].x, CHART_PADDING + slot));
        assert!(approx(bars[0].width, slot - BAR_GAP));
        assert!(approx(bars[1].height, 140.0 - 2.0 * CHART_PADDING));
        assert!(approx(bars[1].y, CHART_PADDING));
        assert!(approx(bars[0].y + bars[0].height, 140.0 - CHART_PADDING));
    }

    #[test]
    fn test_bar_chart_empty_is_none() {
        assert!(BarChart::new(&[], 140.0).is_none());
    }

    #[test]
    fn test_bar_svg() {
        let chart = BarChart::new(&[Some(0.0), Some(2.5), None], 140.0).unwrap();
        let svg = chart.to_svg("Precipitation next hours", "mm", &ChartStyle::DARK);
        assert!(svg.contains("max 2.5 mm"));
        // Background plus one rect per bar
        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains(ChartStyle::DARK.bar));
    }

    #[test]
    fn test_empty_svg_placeholder() {
        let svg = empty_svg("Temperature & more", 180.0, &ChartStyle::default());
        assert!(svg.contains("No data"));
        assert!(svg.contains("Temperature &amp; more"));
    }
}
