use std::io;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, widgets::TableState, Terminal};
use tracing::{error, info};

use crate::config::{Action, AppConfig, KeyMap};
use crate::error::{LoadError, LoadResult};
use crate::parser::{parse_csv, ParseOptions};
use crate::record::{Column, Record};
use crate::sort::{sort_records, SortConfig};
use crate::source::Fetch;
use crate::stats::Stats;
use crate::style::Style;
use crate::ui;
use crate::view::{self, View, ViewInput, ViewState};

/// Format of the "last update" timestamp
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Owns the record sequence and every bit of UI state
pub struct App {
    pub records: Vec<Record>,
    pub sort: SortConfig,
    pub stats: Stats,
    pub state: ViewState,
    pub last_update: Option<String>,
    pub selected_col: Column,
    pub table_state: TableState,
    pub style: Style,
    pub message: Option<String>,
    pub should_quit: bool,
    keys: KeyMap,
    parse_options: ParseOptions,
    fetcher: Arc<dyn Fetch>,
    // Outstanding load, if any
    load_receiver: Option<Receiver<LoadResult<String>>>,
}

impl App {
    pub fn new(config: &AppConfig, fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            records: Vec::new(),
            sort: SortConfig::default(),
            stats: Stats::default(),
            state: ViewState::Loading,
            last_update: None,
            selected_col: Column::Name,
            table_state: TableState::default(),
            style: Style::with_theme(config.resolve_theme()),
            message: None,
            should_quit: false,
            keys: config.key_map(),
            parse_options: config.parse_options(),
            fetcher,
            load_receiver: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.load_receiver.is_some()
    }

    pub fn source_name(&self) -> String {
        self.fetcher.describe()
    }

    /// Project the current state into a drawable view
    pub fn view(&self) -> View {
        view::build(&ViewInput {
            records: &self.records,
            state: &self.state,
            sort: &self.sort,
            stats: &self.stats,
            last_update: self.last_update.as_deref(),
            selected: self.selected_col,
            no_data_label: &self.parse_options.no_data_label,
        })
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        self.start_load();

        while !self.should_quit {
            self.poll_load();

            terminal.draw(|f| ui::render(f, self))?;

            if poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.message = None;
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }

    // === Loading ===

    /// Clear the records, enter `Loading` and fetch on a background thread
    pub fn start_load(&mut self) {
        // Only one fetch runs at a time; a refresh while loading is dropped
        // and the in-flight result is the one applied
        if self.is_loading() {
            self.message = Some("Load already in progress".to_string());
            return;
        }

        info!(source = %self.fetcher.describe(), "load started");
        self.records.clear();
        self.state = ViewState::Loading;

        let (tx, rx) = mpsc::channel();
        self.load_receiver = Some(rx);

        let fetcher = Arc::clone(&self.fetcher);
        thread::spawn(move || {
            let _ = tx.send(fetcher.fetch());
        });
    }

    /// Check for a finished load and apply it
    pub fn poll_load(&mut self) {
        let Some(receiver) = &self.load_receiver else {
            return;
        };

        match receiver.try_recv() {
            Ok(outcome) => {
                self.load_receiver = None;
                self.finish_load(outcome);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                // Loader thread died unexpectedly
                self.load_receiver = None;
                self.finish_load(Err(LoadError::Interrupted));
            }
        }
    }

    /// Parse fetched text and move to `Error`, `NoData` or `Ready`
    pub fn finish_load(&mut self, outcome: LoadResult<String>) {
        let parsed = outcome.and_then(|text| parse_csv(&text, &self.parse_options));

        match parsed {
            Err(e) => {
                error!(source = %self.fetcher.describe(), error = %e, "load failed");
                self.records.clear();
                self.state = ViewState::Error(e.to_string());
            }
            Ok(records) if records.is_empty() => {
                info!("load finished without records");
                self.records.clear();
                self.state = ViewState::NoData;
            }
            Ok(records) => {
                info!(records = records.len(), "load finished");
                self.records = records;
                self.stats = Stats::compute(&self.records);
                self.last_update = Some(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string());
                self.table_state.select(Some(0));
                self.state = ViewState::Ready;
            }
        }
    }

    // === Sorting ===

    /// Sort by `column`, toggling direction per the sort configuration.
    /// Only acts while the table is showing.
    pub fn sort_by(&mut self, column: Column) {
        if !self.state.is_ready() {
            return;
        }

        let direction = self.sort.select(column);
        sort_records(&mut self.records, column, direction);
        self.stats = Stats::compute(&self.records);
        self.selected_col = column;
        self.message = Some(format!("Sorted by {} ({})", column.label(), direction.display_name()));
    }

    // === Input ===

    pub fn handle_key(&mut self, key: KeyEvent) {
        let action = match key.code {
            KeyCode::Char(c) => self.keys.get(c),
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Enter => Some(Action::SortSelected),
            KeyCode::Left => Some(Action::SelectLeft),
            KeyCode::Right => Some(Action::SelectRight),
            KeyCode::Up => Some(Action::RowUp),
            KeyCode::Down => Some(Action::RowDown),
            KeyCode::Home => Some(Action::Top),
            KeyCode::End => Some(Action::Bottom),
            _ => None,
        };

        if let Some(action) = action {
            self.execute(action);
        }
    }

    pub fn execute(&mut self, action: Action) {
        match action {
            Action::Refresh => self.start_load(),
            Action::Quit => self.should_quit = true,
            Action::SortSelected => self.sort_by(self.selected_col),
            Action::SortColumn(column) => self.sort_by(column),
            Action::SelectLeft => self.selected_col = self.selected_col.prev(),
            Action::SelectRight => self.selected_col = self.selected_col.next(),
            Action::RowUp => self.move_row(-1),
            Action::RowDown => self.move_row(1),
            Action::Top => self.select_row(0),
            Action::Bottom => self.select_row(self.records.len().saturating_sub(1)),
        }
    }

    fn move_row(&mut self, delta: isize) {
        let current = self.table_state.selected().unwrap_or(0);
        self.select_row(current.saturating_add_signed(delta));
    }

    fn select_row(&mut self, row: usize) {
        if self.records.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(row.min(self.records.len() - 1)));
        }
    }
}
