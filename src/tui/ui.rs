use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Line as CanvasLine},
        Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState,
        Wrap,
    },
    Frame,
};

use crate::app::{App, View};
use crate::pipeline::{Marker, MarkerColor};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title + filter bar
            Constraint::Min(0),    // View content
            Constraint::Length(1), // Status line
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.view {
        View::PeakMap | View::AscentLog => render_map_view(frame, app, chunks[1]),
        View::AreaStats => render_stats_view(frame, app, chunks[1]),
    }

    render_status(frame, app, chunks[2]);

    if app.show_help {
        render_help(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" Gipfelbuch [{}] ", app.view.label());

    let height = app
        .effective_max_height()
        .map(|h| format!("{}m", h as i64))
        .unwrap_or_else(|| "-".to_string());
    let filters = format!(
        " Gebiet: {} | Schwierigkeit: {} | Stern: {} | Höhe ≤ {} | Nur bestiegene: {}",
        app.options.area.label(),
        app.options.difficulty.label(),
        app.options.star.label(),
        height,
        if app.options.climbed_only { "ja" } else { "nein" },
    );

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let paragraph = Paragraph::new(filters).style(Style::default().fg(Color::White));
    frame.render_widget(paragraph, inner);
}

fn render_map_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 2), // Map
            Constraint::Ratio(1, 2), // Table + detail
        ])
        .split(area);

    render_map(frame, app, chunks[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Table
            Constraint::Length(6), // Detail panel
        ])
        .split(chunks[1]);

    render_table(frame, app, right[0]);
    render_detail(frame, app, right[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Karte ").borders(Borders::ALL);

    // Nothing survived filtering: skip the map gracefully
    let Some(bounds) = marker_bounds(&app.output.markers) else {
        let empty = Paragraph::new("Keine Daten")
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    };
    let ((lat_min, lat_max), (lon_min, lon_max)) = bounds;

    let markers = &app.output.markers;
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([lon_min, lon_max])
        .y_bounds([lat_min, lat_max])
        .paint(|ctx| {
            for marker in markers {
                let color = terminal_color(marker.color);
                let [apex, left, right] = marker.polygon;
                for (from, to) in [(apex, left), (left, right), (right, apex)] {
                    ctx.draw(&CanvasLine {
                        x1: from.1,
                        y1: from.0,
                        x2: to.1,
                        y2: to.0,
                        color,
                    });
                }
            }
            ctx.layer();
            for marker in markers {
                let name = marker.tooltip.split(" | ").next().unwrap_or_default();
                let (lat, lon) = marker.polygon[0];
                ctx.print(lon, lat, Line::from(name.to_string()));
            }
        });
    frame.render_widget(canvas, area);
}

/// Map extent with a small margin so edge markers stay visible.
fn marker_bounds(markers: &[Marker]) -> Option<((f64, f64), (f64, f64))> {
    let mut lat = (f64::INFINITY, f64::NEG_INFINITY);
    let mut lon = (f64::INFINITY, f64::NEG_INFINITY);
    for marker in markers {
        for (la, lo) in marker.polygon {
            lat = (lat.0.min(la), lat.1.max(la));
            lon = (lon.0.min(lo), lon.1.max(lo));
        }
    }
    if markers.is_empty() {
        return None;
    }
    let lat_margin = ((lat.1 - lat.0) * 0.05).max(0.001);
    let lon_margin = ((lon.1 - lon.0) * 0.05).max(0.001);
    Some((
        (lat.0 - lat_margin, lat.1 + lat_margin),
        (lon.0 - lon_margin, lon.1 + lon_margin),
    ))
}

fn terminal_color(color: MarkerColor) -> Color {
    match color {
        MarkerColor::Red => Color::Red,
        MarkerColor::Blue => Color::Blue,
        MarkerColor::Purple => Color::Magenta,
        // "black" markers need to stay visible on dark terminals
        MarkerColor::Black => Color::DarkGray,
    }
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let table_view = &app.output.table;

    let header = Row::new(
        table_view
            .header
            .iter()
            .map(|h| Cell::from(*h).style(Style::default().add_modifier(Modifier::BOLD))),
    );

    let rows: Vec<Row> = table_view
        .rows
        .iter()
        .map(|cells| Row::new(cells.iter().map(|c| Cell::from(c.as_str()))))
        .collect();

    let count = table_view.header.len().max(1) as u32;
    let widths = vec![Constraint::Ratio(1, count); count as usize];

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} Zeilen ",
            table_view.rows.len()
        )))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if !table_view.rows.is_empty() {
        state.select(Some(app.selected_index));
    }
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().title(" Details ").borders(Borders::ALL);

    let text = match app.output.tooltips.get(app.selected_index) {
        Some(tooltip) => {
            let width = block.inner(area).width.max(20) as usize;
            textwrap::wrap(tooltip, width)
                .into_iter()
                .map(|line| Line::from(line.into_owned()))
                .collect::<Vec<_>>()
        }
        None => vec![Line::from(Span::styled(
            "Keine Auswahl",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_stats_view(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Ratio(1, 2), // Bar chart
            Constraint::Ratio(1, 2), // Stats table
        ])
        .split(area);

    render_stats_chart(frame, app, chunks[0]);
    render_stats_table(frame, app, chunks[1]);
}

fn render_stats_chart(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Bestiegen / Fehlend pro Gebiet ")
        .borders(Borders::ALL);

    if app.stats.is_empty() {
        let empty = Paragraph::new("Keine Daten")
            .block(block)
            .alignment(Alignment::Center);
        frame.render_widget(empty, area);
        return;
    }

    let groups: Vec<BarGroup> = app
        .stats
        .iter()
        .map(|s| {
            BarGroup::default()
                .label(Line::from(s.gebiet.clone()))
                .bars(&[
                    Bar::default()
                        .value(s.climbed_peaks as u64)
                        .style(Style::default().fg(Color::Green)),
                    Bar::default()
                        .value(s.missing_peaks() as u64)
                        .style(Style::default().fg(Color::Red)),
                ])
        })
        .collect();

    let mut chart = BarChart::default()
        .block(block)
        .bar_width(5)
        .group_gap(3);
    for group in groups {
        chart = chart.data(group);
    }
    frame.render_widget(chart, area);
}

fn render_stats_table(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(
        ["Gebiet", "Gipfel", "Bestiegen", "Fehlend", "Gekletterte Routen"]
            .into_iter()
            .map(|h| Cell::from(h).style(Style::default().add_modifier(Modifier::BOLD))),
    );

    let rows: Vec<Row> = app
        .stats
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.gebiet.clone()),
                Cell::from(s.total_peaks.to_string()),
                Cell::from(s.climbed_peaks.to_string()),
                Cell::from(s.missing_peaks().to_string()),
                Cell::from(s.climbed_routes.to_string()),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Ratio(1, 5); 5])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Gebiete "));
    frame.render_widget(table, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.output.join_stats;
    let mut parts = vec![format!(
        "{} Gipfel | {} Routen | {} Begehungen",
        app.snapshot.peaks.len(),
        app.snapshot.routes.len(),
        app.snapshot.ascents.len()
    )];
    if let Some((lat, lon)) = app.output.center {
        parts.push(format!("Zentrum {:.3}, {:.3}", lat, lon));
    }
    if stats.orphan_routes > 0 || stats.orphan_ascents > 0 {
        parts.push(format!(
            "{} verwaiste Routen, {} verwaiste Begehungen",
            stats.orphan_routes, stats.orphan_ascents
        ));
    }
    if app.output.sanitized_out > 0 {
        parts.push(format!("{} unvollständige Zeilen", app.output.sanitized_out));
    }
    if app.is_refreshing {
        parts.push("lädt...".to_string());
    }
    parts.push("? Hilfe".to_string());

    let line = Paragraph::new(parts.join("  |  ")).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(line, area);
}

fn render_help(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from("Tastenkürzel"),
        Line::from(""),
        Line::from("  j/k, ↓/↑    Auswahl bewegen"),
        Line::from("  </>         Anfang / Ende"),
        Line::from("  Tab, v      Ansicht wechseln"),
        Line::from("  a           Gebiet durchschalten"),
        Line::from("  d           Schwierigkeit durchschalten"),
        Line::from("  s           Stern-Filter durchschalten"),
        Line::from("  b           nur bestiegene an/aus"),
        Line::from("  -/+         maximale Höhe"),
        Line::from("  x           Filter zurücksetzen"),
        Line::from("  r           Daten neu laden"),
        Line::from("  q           Beenden"),
        Line::from(""),
        Line::from("Beliebige Taste schließt diese Hilfe"),
    ];

    let help = Paragraph::new(lines)
        .block(Block::default().title(" Hilfe ").borders(Borders::ALL))
        .alignment(Alignment::Left);
    frame.render_widget(help, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
