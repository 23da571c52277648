use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table as RatatuiTable, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::style::Style;
use crate::view::{CellView, HeaderView, Panel, Summary, View};

/// Widest a column may grow, in terminal cells
const MAX_COL_WIDTH: usize = 30;

pub fn render(frame: &mut Frame, app: &mut App) {
    let view = app.view();

    if let Some(bg) = app.style.background() {
        let fill = Block::default().style(ratatui::style::Style::default().bg(bg));
        frame.render_widget(fill, frame.size());
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_summary(frame, &app.style, &view.summary, &app.source_name(), chunks[0]);

    match &view.panel {
        Panel::Table(rows) => render_table(frame, app, &view.headers, rows, chunks[1]),
        Panel::Loading => render_panel(frame, "Loading data...", app.style.panel_info(), chunks[1]),
        Panel::NoData => render_panel(frame, "No data to display.", app.style.panel_info(), chunks[1]),
        Panel::Error(message) => render_panel(
            frame,
            &format!("Failed to load data.\n{}\nPress r to try again.", message),
            app.style.panel_error(),
            chunks[1],
        ),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_summary(frame: &mut Frame, style: &Style, summary: &Summary, source: &str, area: Rect) {
    let field = |label: &'static str, value: &str| {
        vec![
            Span::styled(label, style.summary_label()),
            Span::styled(value.to_string(), style.summary_value()),
            Span::raw("   "),
        ]
    };

    let spans: Vec<Span> = [
        field("Stocks ", &summary.total),
        field("Avg RSI(7) ", &summary.avg_rsi7),
        field("Updated ", &summary.last_update),
        field("Data ", &summary.date_range),
    ]
    .into_iter()
    .flatten()
    .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" RSI screener: {} ", source));
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_table(frame: &mut Frame, app: &mut App, headers: &[HeaderView], rows: &[Vec<CellView>], area: Rect) {
    let widths: Vec<Constraint> = column_widths(headers, rows)
        .into_iter()
        .map(Constraint::Length)
        .collect();

    let header_row = Row::new(
        headers
            .iter()
            .map(|h| Cell::from(h.title()).style(app.style.header(h.selected))),
    );

    let body: Vec<Row> = rows
        .iter()
        .map(|cells| {
            Row::new(
                cells
                    .iter()
                    .map(|c| Cell::from(c.text.clone()).style(app.style.tone(c.tone))),
            )
        })
        .collect();

    let table = RatatuiTable::new(body, widths)
        .header(header_row)
        .column_spacing(2)
        .highlight_style(app.style.row_cursor())
        .block(Block::default().borders(Borders::ALL).title(" Results "));

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

fn render_panel(frame: &mut Frame, text: &str, style: ratatui::style::Style, area: Rect) {
    let panel = Paragraph::new(text.to_string())
        .style(style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(panel, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let content = match &app.message {
        Some(msg) => msg.clone(),
        None if app.is_loading() => "Loading...".to_string(),
        None => "r refresh  h/l select  s sort  1-9 sort by column  j/k scroll  q quit".to_string(),
    };

    let status = Paragraph::new(format!(" {}", content)).style(app.style.status_bar());
    frame.render_widget(status, area);
}

/// Width of each column: its widest cell or header title, capped
pub fn column_widths(headers: &[HeaderView], rows: &[Vec<CellView>]) -> Vec<u16> {
    headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let content = rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|c| c.text.width())
                .max()
                .unwrap_or(0);
            content.max(header.title().width()).min(MAX_COL_WIDTH) as u16
        })
        .collect()
}
