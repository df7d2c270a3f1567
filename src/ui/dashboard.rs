//! Dashboard screen rendering
//!
//! One screen: the city picker on the left; current conditions, the upcoming
//! hours, the temperature/precipitation sparklines and the map link on the
//! right. A status line at the top shows load state, the footer shows keys or
//! the manual location editor.

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::controller::LoadState;
use crate::data::chart::{BarChart, LineChart, BAR_CHART_HEIGHT, LINE_CHART_HEIGHT};
use crate::data::present::{
    format_with_unit, hour_label, map_embed_url, weather_emoji, wind_direction_text,
    WeatherCondition, PLACEHOLDER,
};
use crate::data::{all_presets, CurrentConditions, HourlyReading, Location};

use super::theme::Palette;
use super::widgets::LevelSparkline;

/// Renders the dashboard for the current time
pub fn render(frame: &mut Frame, app: &App) {
    render_at(frame, app, Utc::now());
}

/// Renders the dashboard as of `now`
pub fn render_at(frame: &mut Frame, app: &App, now: DateTime<Utc>) {
    let palette = Palette::for_settings(&app.settings);
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.text)),
        area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Status header
            Constraint::Min(10),   // Picker + forecast
            Constraint::Length(1), // Keys / editor
        ])
        .split(area);

    render_header(frame, app, &palette, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(30)])
        .split(chunks[1]);

    render_picker(frame, app, &palette, body[0]);
    render_forecast(frame, app, &palette, body[1], now);
    render_footer(frame, app, &palette, chunks[2]);
}

fn bordered<'a>(title: &'a str, palette: &Palette) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
}

fn render_header(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let controller = &app.controller;
    let location = controller.location();

    let status = match controller.state() {
        LoadState::Idle => Span::styled("Idle", Style::default().fg(palette.muted)),
        LoadState::Loading => Span::styled("Loading…", Style::default().fg(palette.accent)),
        LoadState::Loaded => {
            let updated = controller
                .snapshot()
                .map(|s| s.fetched_at.with_timezone(&Local).format("%H:%M").to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string());
            Span::styled(
                format!("Updated {updated}"),
                Style::default().fg(palette.muted),
            )
        }
        LoadState::Failed => Span::styled(
            format!("Error: {}", controller.error().unwrap_or("unknown")),
            Style::default().fg(palette.error),
        ),
    };

    let mut spans = vec![
        Span::styled(
            location.display_name(),
            Style::default()
                .fg(palette.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}  ", location.time_zone()),
            Style::default().fg(palette.muted),
        ),
        status,
    ];

    // Stale data from another location stays on screen while the new one loads
    if let Some(snapshot) = controller.snapshot() {
        if &snapshot.location != location {
            spans.push(Span::styled(
                format!("  (showing {})", snapshot.location.display_name()),
                Style::default().fg(palette.muted),
            ));
        }
    }

    let header = Paragraph::new(Line::from(spans)).block(bordered(" Skyglance ", palette));
    frame.render_widget(header, area);
}

fn render_picker(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let lines: Vec<Line> = all_presets()
        .iter()
        .enumerate()
        .map(|(i, preset)| {
            let marker = if app.active_preset == Some(i) { "●" } else { " " };
            let text = format!("{marker} {} {} {}", i + 1, preset.flag(), preset.name);
            let style = if i == app.selected_index {
                Style::default()
                    .bg(palette.highlight)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();

    let picker = Paragraph::new(lines).block(bordered(" Cities ", palette));
    frame.render_widget(picker, area);
}

fn render_forecast(frame: &mut Frame, app: &App, palette: &Palette, area: Rect, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Current conditions
            Constraint::Min(4),    // Hourly table
            Constraint::Length(4), // Sparklines
            Constraint::Length(3), // Map link
        ])
        .split(area);

    let current = app
        .controller
        .snapshot()
        .and_then(|s| s.payload.current.as_ref());
    render_current(frame, current, palette, chunks[0]);

    let window = app.hourly_window(now);
    render_hourly(frame, &window, palette, chunks[1]);
    render_sparklines(frame, &window, palette, chunks[2]);

    let location = map_location(app);
    let map = Paragraph::new(map_embed_url(location.latitude(), location.longitude()))
        .style(Style::default().fg(palette.muted))
        .wrap(Wrap { trim: true })
        .block(bordered(" Map ", palette));
    frame.render_widget(map, chunks[3]);
}

/// Text lines for the current conditions panel
/// Location the map should show: the one the displayed forecast belongs to
fn map_location(app: &App) -> &Location {
    app.controller
        .snapshot()
        .map_or_else(|| app.controller.location(), |snapshot| &snapshot.location)
}

fn current_lines(current: Option<&CurrentConditions>) -> Vec<Line<'static>> {
    let Some(current) = current else {
        return vec![Line::from("No current conditions")];
    };

    let condition = current
        .weather_code
        .map(|c| WeatherCondition::from_wmo_code(c).description())
        .unwrap_or(PLACEHOLDER);
    let wind = format!(
        "{} {}",
        format_with_unit(current.wind_speed_10m, "km/h"),
        wind_direction_text(current.wind_direction_10m)
    );

    vec![
        Line::from(format!("{} {condition}", weather_emoji(current.weather_code))),
        Line::from(format!(
            "Temperature   {:<12} Feels like  {}",
            format_with_unit(current.temperature_2m, "°C"),
            format_with_unit(current.apparent_temperature, "°C")
        )),
        Line::from(format!(
            "Humidity      {:<12} Rain        {}",
            format_with_unit(current.relative_humidity_2m, "%"),
            format_with_unit(current.precipitation, "mm")
        )),
        Line::from(format!("Wind          {wind}")),
        Line::from(format!(
            "Observed      {}",
            current.time.as_deref().unwrap_or(PLACEHOLDER)
        )),
    ]
}

fn render_current(frame: &mut Frame, current: Option<&CurrentConditions>, palette: &Palette, area: Rect) {
    let panel = Paragraph::new(current_lines(current)).block(bordered(" Now ", palette));
    frame.render_widget(panel, area);
}

fn render_hourly(frame: &mut Frame, window: &[HourlyReading], palette: &Palette, area: Rect) {
    let block = bordered(" Next hours ", palette);
    if window.is_empty() {
        frame.render_widget(
            Paragraph::new("No upcoming hours")
                .style(Style::default().fg(palette.muted))
                .block(block),
            area,
        );
        return;
    }

    let rows = window.iter().map(|reading| {
        Row::new(vec![
            hour_label(&reading.time).to_string(),
            format_with_unit(reading.temperature_c, "°C"),
            format_with_unit(Some(reading.precipitation_mm), "mm"),
            format_with_unit(reading.wind_speed_kmh, "km/h"),
        ])
    });
    let header = Row::new(vec!["Hour", "Temp", "Rain", "Wind"])
        .style(Style::default().add_modifier(Modifier::BOLD));

    let table = Table::new(
        rows,
        [
            Constraint::Length(8),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(header)
    .block(block);
    frame.render_widget(table, area);
}

fn render_sparklines(frame: &mut Frame, window: &[HourlyReading], palette: &Palette, area: Rect) {
    let block = bordered(" Trend ", palette);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    let temps: Vec<Option<f64>> = window.iter().map(|r| r.temperature_c).collect();
    let rain: Vec<Option<f64>> = window.iter().map(|r| Some(r.precipitation_mm)).collect();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let temp_chart = LineChart::new(&temps, LINE_CHART_HEIGHT);
    let temp_label = match &temp_chart {
        Some(chart) => format!("{:.1}–{:.1}°C", chart.min(), chart.max()),
        None => PLACEHOLDER.to_string(),
    };
    let temp_levels = temp_chart.map(|c| c.levels()).unwrap_or_default();
    render_sparkline_row(
        frame,
        "Temp",
        &temp_levels,
        &temp_label,
        Style::default().fg(palette.temperature),
        rows[0],
    );

    let rain_chart = BarChart::new(&rain, BAR_CHART_HEIGHT);
    let rain_label = match &rain_chart {
        Some(chart) => format!("max {:.1} mm", chart.ymax()),
        None => PLACEHOLDER.to_string(),
    };
    let rain_levels = rain_chart.map(|c| c.levels()).unwrap_or_default();
    render_sparkline_row(
        frame,
        "Rain",
        &rain_levels,
        &rain_label,
        Style::default().fg(palette.precipitation),
        rows[1],
    );
}

fn render_sparkline_row(
    frame: &mut Frame,
    name: &str,
    levels: &[Option<f64>],
    label: &str,
    style: Style,
    area: Rect,
) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(6),
            Constraint::Min(4),
            Constraint::Length(16),
        ])
        .split(area);

    frame.render_widget(Paragraph::new(name.to_string()), cols[0]);
    let cell_width = if levels.is_empty() {
        1
    } else {
        (cols[1].width as usize / levels.len()).clamp(1, 4)
    };
    frame.render_widget(
        LevelSparkline::new(levels).cell_width(cell_width).style(style),
        cols[1],
    );
    frame.render_widget(Paragraph::new(label.to_string()), cols[2]);
}

fn render_footer(frame: &mut Frame, app: &App, palette: &Palette, area: Rect) {
    let line = match &app.input_mode {
        InputMode::EditingLocation { buffer, error } => {
            let mut spans = vec![
                Span::styled("lat,lon,tz: ", Style::default().fg(palette.accent)),
                Span::raw(format!("{buffer}_")),
            ];
            if let Some(error) = error {
                spans.push(Span::styled(
                    format!("  {error}"),
                    Style::default().fg(palette.error),
                ));
            }
            Line::from(spans)
        }
        InputMode::Normal => {
            let mut spans = vec![Span::styled(
                "↑↓ select  Enter load  1-4 city  e edit  r refresh  t theme  c contrast  ? help  q quit",
                Style::default().fg(palette.muted),
            )];
            if let Some(error) = &app.settings_error {
                spans.push(Span::styled(
                    format!("  {error}"),
                    Style::default().fg(palette.error),
                ));
            }
            Line::from(spans)
        }
    };
    frame.render_widget(Paragraph::new(line), area);
}
