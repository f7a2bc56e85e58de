pub mod chart;
pub mod dashboard;

use std::path::{Path, PathBuf};

use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::Frame;

use crate::analysis::{DashboardReport, RandomPlaceholder};
use crate::data::{Dataset, Preview, PriceTable};
use crate::error::DataError;
use crate::event::AppEvent;

use chart::{PriceChart, VolumeChart};
use dashboard::{
    ErrorPanel, FilePrompt, InsightPanel, KeybindBar, LogPanel, PreviewPanel, StatusBar,
    UploadPanel,
};

const MAX_LOG_MESSAGES: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Disabled,
    Pending,
    Done { ticker: String, rows: usize },
    Failed,
}

impl FetchStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Disabled => "fetch: off".to_string(),
            Self::Pending => "fetch: ...".to_string(),
            Self::Done { ticker, rows } => format!("fetch: {} ({} rows)", ticker, rows),
            Self::Failed => "fetch: failed".to_string(),
        }
    }
}

pub struct AppState {
    pub source: Option<PathBuf>,
    pub preview: Option<Preview>,
    pub dataset: Option<Dataset>,
    pub report: Option<DashboardReport>,
    pub error: Option<String>,
    pub show_levels: bool,
    pub prompt: Option<String>,
    pub run_count: u64,
    pub fetch_status: FetchStatus,
    pub log_messages: Vec<String>,
    preview_rows: usize,
    signal_source: RandomPlaceholder,
    outlook_source: RandomPlaceholder,
    // Cached chart inputs, rebuilt on every run.
    closes: Vec<f64>,
    volumes: Vec<f64>,
    dates: Vec<String>,
    buy_indices: Vec<usize>,
    sell_indices: Vec<usize>,
}

impl AppState {
    pub fn new(preview_rows: usize, seed: Option<u64>) -> Self {
        Self {
            source: None,
            preview: None,
            dataset: None,
            report: None,
            error: None,
            show_levels: true,
            prompt: None,
            run_count: 0,
            fetch_status: FetchStatus::Disabled,
            log_messages: Vec::new(),
            preview_rows,
            signal_source: RandomPlaceholder::new(seed),
            outlook_source: RandomPlaceholder::new(seed.map(|s| s.wrapping_add(1))),
            closes: Vec::new(),
            volumes: Vec::new(),
            dates: Vec::new(),
            buy_indices: Vec::new(),
            sell_indices: Vec::new(),
        }
    }

    pub fn push_log(&mut self, msg: String) {
        self.log_messages.push(msg);
        if self.log_messages.len() > MAX_LOG_MESSAGES {
            self.log_messages.remove(0);
        }
    }

    /// Select a file and run the pipeline on it.
    pub fn open(&mut self, path: &Path) {
        self.source = Some(path.to_path_buf());
        self.push_log(format!("Opened {}", path.display()));
        self.rerun();
    }

    /// Run the whole pipeline again from the file on disk. No file selected means nothing to do.
    pub fn rerun(&mut self) {
        self.clear_run();
        let Some(path) = self.source.clone() else {
            return;
        };
        self.run_count += 1;

        if let Err(e) = self.run_pipeline(&path) {
            tracing::warn!(path = %path.display(), error = %e, "Run stopped");
            let msg = e.to_string();
            self.push_log(format!("[ERR] {}", msg));
            self.error = Some(msg);
        }
    }

    fn clear_run(&mut self) {
        self.preview = None;
        self.dataset = None;
        self.report = None;
        self.error = None;
        self.closes.clear();
        self.volumes.clear();
        self.dates.clear();
        self.buy_indices.clear();
        self.sell_indices.clear();
    }

    fn run_pipeline(&mut self, path: &Path) -> Result<(), DataError> {
        let table = PriceTable::from_path(path)?;
        table.ensure_date_column()?;
        // Bad dates stop the run before anything is previewed.
        table.parse_dates()?;
        self.preview = Some(table.preview(self.preview_rows));

        let dataset = table.into_dataset()?;
        let report =
            DashboardReport::build(&dataset, &mut self.signal_source, &mut self.outlook_source);

        self.closes = dataset.closes();
        self.volumes = dataset.volumes();
        self.dates = dataset.date_labels();
        self.buy_indices = report.buy_markers(&dataset).iter().map(|m| m.index).collect();
        self.sell_indices = report.sell_markers(&dataset).iter().map(|m| m.index).collect();

        tracing::info!(
            path = %path.display(),
            rows = dataset.len(),
            trend = %report.trend,
            sentiment = %report.sentiment,
            support = ?report.levels.map(|l| l.support),
            resistance = ?report.levels.map(|l| l.resistance),
            "Run complete"
        );
        self.push_log(format!(
            "Run #{}: {} rows | {} | {}",
            self.run_count,
            dataset.len(),
            report.trend,
            report.sentiment
        ));
        self.dataset = Some(dataset);
        self.report = Some(report);
        Ok(())
    }

    pub fn toggle_levels(&mut self) {
        self.show_levels = !self.show_levels;
    }

    pub fn open_prompt(&mut self) {
        let initial = self
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.prompt = Some(initial);
    }

    pub fn prompt_insert(&mut self, c: char) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.push(c);
        }
    }

    pub fn prompt_backspace(&mut self) {
        if let Some(buf) = self.prompt.as_mut() {
            buf.pop();
        }
    }

    pub fn prompt_cancel(&mut self) {
        self.prompt = None;
    }

    /// Close the prompt and open the typed path. Blank input only closes it.
    pub fn prompt_submit(&mut self) {
        let Some(input) = self.prompt.take() else {
            return;
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return;
        }
        let path = PathBuf::from(trimmed);
        self.open(&path);
    }

    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::FetchCompleted(summary) => {
                self.push_log(format!(
                    "Fetched {} rows of {} into {}",
                    summary.rows,
                    summary.ticker,
                    summary.path.display()
                ));
                self.fetch_status = FetchStatus::Done {
                    ticker: summary.ticker,
                    rows: summary.rows,
                };
            }
            AppEvent::FetchFailed(msg) => {
                self.fetch_status = FetchStatus::Failed;
                self.push_log(format!("[WARN] History fetch failed: {}", msg));
            }
            AppEvent::ExportCompleted(paths) => {
                let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
                self.push_log(format!("Exported {}", names.join(", ")));
            }
            AppEvent::LogMessage(msg) => {
                self.push_log(msg);
            }
            AppEvent::Error(msg) => {
                self.push_log(format!("[ERR] {}", msg));
            }
        }
    }
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let source = state.source.as_ref().map(|p| p.to_string_lossy());
    let fetch_label = state.fetch_status.label();

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // body
            Constraint::Length(5), // log
            Constraint::Length(1), // keybinds
        ])
        .split(frame.area());

    frame.render_widget(
        StatusBar {
            source: source.as_deref(),
            rows: state.dataset.as_ref().map(Dataset::len),
            run_count: state.run_count,
            fetch_status: &fetch_label,
        },
        outer[0],
    );

    render_body(frame, state, outer[1]);

    frame.render_widget(LogPanel::new(&state.log_messages), outer[2]);
    frame.render_widget(KeybindBar, outer[3]);

    if let Some(input) = &state.prompt {
        frame.render_widget(FilePrompt::new(input), frame.area());
    }
}

fn render_body(frame: &mut Frame, state: &AppState, area: ratatui::layout::Rect) {
    if state.source.is_none() {
        frame.render_widget(UploadPanel, area);
        return;
    }

    let preview_height = state
        .preview
        .as_ref()
        .map(|p| u16::try_from(p.rows.len()).unwrap_or(u16::MAX).saturating_add(3))
        .unwrap_or(0);
    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(preview_height), Constraint::Min(6)])
        .split(area);

    if let Some(preview) = &state.preview {
        frame.render_widget(PreviewPanel::new(preview), body[0]);
    }

    if let Some(msg) = &state.error {
        frame.render_widget(ErrorPanel::new(msg), body[1]);
        return;
    }
    let Some(report) = &state.report else {
        return;
    };

    let charts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(body[1]);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(40), Constraint::Length(34)])
        .split(charts[0]);

    let levels = if state.show_levels { report.levels } else { None };
    frame.render_widget(
        PriceChart::new(&state.closes, &state.dates)
            .signals(&state.buy_indices, &state.sell_indices)
            .levels(levels),
        top[0],
    );
    frame.render_widget(InsightPanel::new(report, state.show_levels), top[1]);
    frame.render_widget(VolumeChart::new(&state.volumes, &state.dates), charts[1]);
}
