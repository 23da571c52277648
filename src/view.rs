//! Pure projection of application state into something drawable.
//!
//! Nothing here touches the terminal: [`build`] takes the records, the
//! current [`ViewState`], sort configuration and stats and returns a
//! [`View`] holding every string the screen will show. The ratatui layer in
//! `ui` only lays that out.

use crate::record::{format_fixed2, Column, Record};
use crate::sort::{SortConfig, SortDirection};
use crate::stats::Stats;

/// Which of the mutually exclusive screens is showing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Loading,
    Error(String),
    NoData,
    Ready,
}

impl ViewState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready)
    }
}

/// Visual tag for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    pub text: String,
    pub tone: Tone,
}

impl CellView {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Plain }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub label: &'static str,
    pub sort: Option<SortDirection>,
    pub selected: bool,
}

impl HeaderView {
    /// Label with the sort arrow appended when this column is sorted
    pub fn title(&self) -> String {
        match self.sort {
            Some(direction) => format!("{} {}", self.label, direction.arrow()),
            None => self.label.to_string(),
        }
    }
}

/// The body of the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Loading,
    Error(String),
    NoData,
    Table(Vec<Vec<CellView>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: String,
    pub avg_rsi7: String,
    pub last_update: String,
    pub date_range: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub panel: Panel,
    pub headers: Vec<HeaderView>,
    pub summary: Summary,
}

/// Everything [`build`] reads
pub struct ViewInput<'a> {
    pub records: &'a [Record],
    pub state: &'a ViewState,
    pub sort: &'a SortConfig,
    pub stats: &'a Stats,
    pub last_update: Option<&'a str>,
    pub selected: Column,
    pub no_data_label: &'a str,
}

pub fn build(input: &ViewInput) -> View {
    let headers = Column::ALL
        .iter()
        .map(|&col| HeaderView {
            label: col.label(),
            sort: input.sort.direction_for(col),
            selected: col == input.selected,
        })
        .collect();

    let panel = match input.state {
        ViewState::Loading => Panel::Loading,
        ViewState::Error(message) => Panel::Error(message.clone()),
        ViewState::NoData => Panel::NoData,
        ViewState::Ready => Panel::Table(
            input
                .records
                .iter()
                .map(|r| render_row(r, input.no_data_label))
                .collect(),
        ),
    };

    let summary = Summary {
        total: input.stats.total.to_string(),
        avg_rsi7: input.stats.avg_rsi7_display(),
        last_update: input.last_update.unwrap_or("-").to_string(),
        date_range: input.stats.date_range_display(input.no_data_label),
    };

    View { panel, headers, summary }
}

/// Cells for one record, in column order
pub fn render_row(record: &Record, no_data_label: &str) -> Vec<CellView> {
    Column::ALL
        .iter()
        .map(|&col| match col {
            Column::Name => CellView::plain(first_non_empty(&[
                record.column(Column::Name),
                record.column(Column::Ticker),
            ])),
            Column::Ticker => CellView::plain(first_non_empty(&[record.column(Column::Ticker)])),
            Column::Industry => {
                let industry = record.column(Column::Industry);
                CellView::plain(if industry.is_empty() { no_data_label } else { industry })
            }
            col if col.is_change() => change_cell(record.number(col)),
            col => CellView::plain(value_text(record.number(col))),
        })
        .collect()
}

fn first_non_empty<'a>(candidates: &[&'a str]) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.is_empty())
        .unwrap_or("-")
}

/// RSI value to two decimals, `-` when missing
pub fn value_text(value: Option<f64>) -> String {
    match value {
        Some(v) => format_fixed2(v),
        None => "-".to_string(),
    }
}

/// Signed change with its tone; unreadable changes show as a neutral zero
pub fn change_cell(change: Option<f64>) -> CellView {
    match change {
        Some(v) if v > 0.0 => CellView { text: format!("+{}", format_fixed2(v)), tone: Tone::Positive },
        Some(v) if v < 0.0 => CellView { text: format_fixed2(v), tone: Tone::Negative },
        Some(v) => CellView { text: format_fixed2(v), tone: Tone::Neutral },
        None => CellView { text: "0.00".to_string(), tone: Tone::Neutral },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_csv, ParseOptions};

    const LABEL: &str = "No data";

    fn input<'a>(
        records: &'a [Record],
        state: &'a ViewState,
        sort: &'a SortConfig,
        stats: &'a Stats,
    ) -> ViewInput<'a> {
        ViewInput {
            records,
            state,
            sort,
            stats,
            last_update: None,
            selected: Column::Name,
            no_data_label: LABEL,
        }
    }

    fn texts(cells: &[CellView]) -> Vec<&str> {
        cells.iter().map(|c| c.text.as_str()).collect()
    }

    #[test]
    fn test_full_row() {
        let records = parse_csv(
            "Name,Ticker,Industry,RSI7,RSI14,Yesterday_RSI7,Yesterday_RSI14\n\
             Samsung,005930,Semis,60,45.5,55,47",
            &ParseOptions::default(),
        )
        .unwrap();
        let cells = render_row(&records[0], LABEL);
        assert_eq!(
            texts(&cells),
            vec!["Samsung", "005930", "Semis", "60.00", "45.50", "55.00", "47.00", "+5.00", "-1.50"]
        );
        assert_eq!(cells[7].tone, Tone::Positive);
        assert_eq!(cells[8].tone, Tone::Negative);
        assert_eq!(cells[0].tone, Tone::Plain);
    }

    #[test]
    fn test_row_fallbacks() {
        let record = Record::from_pairs([("Ticker", "000660"), ("RSI7", "abc")]);
        let cells = render_row(&record, LABEL);
        assert_eq!(cells[0].text, "000660");
        assert_eq!(cells[2].text, LABEL);
        assert_eq!(cells[3].text, "-");
        assert_eq!(cells[4].text, "-");
        assert_eq!(cells[7].text, "0.00");
        assert_eq!(cells[7].tone, Tone::Neutral);

        let cells = render_row(&Record::default(), LABEL);
        assert_eq!(cells[0].text, "-");
        assert_eq!(cells[1].text, "-");
    }

    #[test]
    fn test_change_cells() {
        assert_eq!(change_cell(Some(5.0)).text, "+5.00");
        assert_eq!(change_cell(Some(-1.5)).text, "-1.50");
        assert_eq!(change_cell(Some(0.0)).text, "0.00");
        assert_eq!(change_cell(Some(0.0)).tone, Tone::Neutral);
        assert_eq!(change_cell(Some(-1.5)).tone, Tone::Negative);
    }

    #[test]
    fn test_cells_round_halfway_up() {
        assert_eq!(value_text(Some(45.125)), "45.13");
        assert_eq!(change_cell(Some(1.125)).text, "+1.13");
        assert_eq!(change_cell(Some(-0.375)).text, "-0.38");
    }

    #[test]
    fn test_negative_zero_change_is_neutral_zero() {
        let records = parse_csv(
            "Ticker,RSI7,Yesterday_RSI7\nA,-0,0",
            &ParseOptions::default(),
        )
        .unwrap();
        assert_eq!(records[0].column(Column::Rsi7Change), "0");

        let cell = change_cell(Some(-0.0));
        assert_eq!(cell.text, "0.00");
        assert_eq!(cell.tone, Tone::Neutral);
    }

    #[test]
    fn test_panels_follow_state() {
        let records = vec![Record::from_pairs([("Ticker", "A")])];
        let sort = SortConfig::default();
        let stats = Stats::default();

        let state = ViewState::Loading;
        assert_eq!(build(&input(&records, &state, &sort, &stats)).panel, Panel::Loading);

        let state = ViewState::NoData;
        assert_eq!(build(&input(&records, &state, &sort, &stats)).panel, Panel::NoData);

        let state = ViewState::Error("HTTP error! status: 404".to_string());
        assert_eq!(
            build(&input(&records, &state, &sort, &stats)).panel,
            Panel::Error("HTTP error! status: 404".to_string())
        );

        let state = ViewState::Ready;
        match build(&input(&records, &state, &sort, &stats)).panel {
            Panel::Table(rows) => assert_eq!(rows.len(), 1),
            other => panic!("expected table, got {:?}", other),
        }
    }

    #[test]
    fn test_headers_show_sort_and_selection() {
        let records = Vec::new();
        let state = ViewState::Ready;
        let mut sort = SortConfig::default();
        sort.select(Column::Rsi7);
        sort.select(Column::Rsi7);
        let stats = Stats::default();

        let mut view_input = input(&records, &state, &sort, &stats);
        view_input.selected = Column::Ticker;
        let view = build(&view_input);

        assert_eq!(view.headers.len(), 9);
        assert_eq!(view.headers[3].sort, Some(SortDirection::Descending));
        assert_eq!(view.headers[3].title(), "RSI(7) ▼");
        assert_eq!(view.headers[0].sort, None);
        assert!(view.headers[1].selected);
        assert!(!view.headers[3].selected);
    }

    #[test]
    fn test_summary() {
        let records = vec![
            Record::from_pairs([("RSI7", "50"), ("Date", "2024-03-04")]),
            Record::from_pairs([("RSI7", ""), ("Date", "2024-03-05")]),
            Record::from_pairs([("RSI7", "70")]),
        ];
        let state = ViewState::Ready;
        let sort = SortConfig::default();
        let stats = Stats::compute(&records);

        let mut view_input = input(&records, &state, &sort, &stats);
        view_input.last_update = Some("2024-03-05 09:00:00");
        let summary = build(&view_input).summary;

        assert_eq!(summary.total, "3");
        assert_eq!(summary.avg_rsi7, "60.00");
        assert_eq!(summary.last_update, "2024-03-05 09:00:00");
        assert_eq!(summary.date_range, "2024-03-04 ~ 2024-03-05");

        let summary = build(&input(&records, &state, &sort, &stats)).summary;
        assert_eq!(summary.last_update, "-");
    }
}
