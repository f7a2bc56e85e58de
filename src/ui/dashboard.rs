use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::analysis::DashboardReport;
use crate::data::Preview;
use crate::model::signal::{Sentiment, Trend};

use super::chart::{RESISTANCE_COLOR, SUPPORT_COLOR};

pub const DASHBOARD_TITLE: &str = "Interactive Trading Dashboard";
pub const UPLOAD_LABEL: &str = "Upload Stock Data (CSV)";

fn panel(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

pub struct StatusBar<'a> {
    pub source: Option<&'a str>,
    pub rows: Option<usize>,
    pub run_count: u64,
    pub fetch_status: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let sep = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![Span::styled(
            format!(" {} ", DASHBOARD_TITLE),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )];
        spans.push(sep());
        match self.source {
            Some(path) => spans.push(Span::styled(path, Style::default().fg(Color::Cyan))),
            None => spans.push(Span::styled("no file", Style::default().fg(Color::DarkGray))),
        }
        if let Some(rows) = self.rows {
            spans.push(sep());
            spans.push(Span::styled(
                format!("rows: {}", rows),
                Style::default().fg(Color::DarkGray),
            ));
        }
        spans.push(sep());
        spans.push(Span::styled(
            format!("run #{}", self.run_count),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(sep());
        spans.push(Span::styled(
            self.fetch_status,
            Style::default().fg(Color::DarkGray),
        ));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

/// Shown until a file has been opened.
pub struct UploadPanel;

impl Widget for UploadPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled(
                UPLOAD_LABEL,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::DarkGray)),
                Span::styled("[O]", Style::default().fg(Color::Yellow)),
                Span::styled(
                    " and enter the path of a CSV with Date, Open, High, Low, Close, Volume.",
                    Style::default().fg(Color::DarkGray),
                ),
            ]),
        ];
        Paragraph::new(lines)
            .block(panel("Upload"))
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}

pub struct PreviewPanel<'a> {
    preview: &'a Preview,
}

impl<'a> PreviewPanel<'a> {
    pub fn new(preview: &'a Preview) -> Self {
        Self { preview }
    }

    fn column_widths(&self) -> Vec<usize> {
        self.preview
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                self.preview
                    .rows
                    .iter()
                    .filter_map(|r| r.get(i))
                    .map(|c| c.chars().count())
                    .chain(std::iter::once(h.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }
}

fn pad(cell: &str, width: usize) -> String {
    format!("{:<width$}  ", cell, width = width)
}

impl Widget for PreviewPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let widths = self.column_widths();
        let index_width = self.preview.rows.len().saturating_sub(1).to_string().len();

        let mut header = pad("", index_width);
        for (h, w) in self.preview.headers.iter().zip(&widths) {
            header.push_str(&pad(h, *w));
        }
        let mut lines = vec![Line::from(Span::styled(
            header,
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ))];
        for (i, row) in self.preview.rows.iter().enumerate() {
            let mut text = pad(&i.to_string(), index_width);
            for (cell, w) in row.iter().zip(&widths) {
                text.push_str(&pad(cell, *w));
            }
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::Gray),
            )));
        }

        let title = format!(
            "Stock Data Preview ({} of {} rows)",
            self.preview.rows.len(),
            self.preview.total_rows
        );
        Paragraph::new(lines).block(panel(&title)).render(area, buf);
    }
}

/// Trend, sentiment, and the two levels, listed beside the price chart.
pub struct InsightPanel<'a> {
    report: &'a DashboardReport,
    show_levels: bool,
}

impl<'a> InsightPanel<'a> {
    pub fn new(report: &'a DashboardReport, show_levels: bool) -> Self {
        Self {
            report,
            show_levels,
        }
    }
}

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Uptrend => Color::Green,
        Trend::Downtrend => Color::Red,
        Trend::Neutral => Color::White,
    }
}

fn sentiment_color(sentiment: Sentiment) -> Color {
    match sentiment {
        Sentiment::Positive => Color::Green,
        Sentiment::Negative => Color::Red,
        Sentiment::Neutral => Color::White,
    }
}

impl Widget for InsightPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label = |s: &'static str| Span::styled(s, Style::default().fg(Color::DarkGray));
        let bold = |s: String, c: Color| {
            Span::styled(s, Style::default().fg(c).add_modifier(Modifier::BOLD))
        };
        let buys = self.report.signals.iter().filter(|s| s.buy).count();
        let sells = self.report.signals.iter().filter(|s| s.sell).count();

        let lines = vec![
            Line::from(label("Predicted Trend")),
            Line::from(vec![
                label("Predicted Trend: "),
                bold(self.report.trend.to_string(), trend_color(self.report.trend)),
            ]),
            Line::from(""),
            Line::from(label("Sentiment Analysis")),
            Line::from(vec![
                label("Sentiment Score: "),
                bold(
                    self.report.sentiment.to_string(),
                    sentiment_color(self.report.sentiment),
                ),
            ]),
            Line::from(""),
            Line::from(label("Support and Resistance Levels")),
            Line::from(vec![
                label("Support Level: "),
                bold(self.report.support_label(), SUPPORT_COLOR),
            ]),
            Line::from(vec![
                label("Resistance Level: "),
                bold(self.report.resistance_label(), RESISTANCE_COLOR),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("▲ ", Style::default().fg(Color::Green)),
                label("buy "),
                Span::styled(buys.to_string(), Style::default().fg(Color::White)),
                Span::styled("  ▼ ", Style::default().fg(Color::Red)),
                label("sell "),
                Span::styled(sells.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(label(if self.show_levels {
                "levels overlay: on"
            } else {
                "levels overlay: off"
            })),
        ];

        Paragraph::new(lines)
            .block(panel("Insights"))
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}

/// Replaces the rest of the dashboard when a run stops on bad input.
pub struct ErrorPanel<'a> {
    message: &'a str,
}

impl<'a> ErrorPanel<'a> {
    pub fn new(message: &'a str) -> Self {
        Self { message }
    }
}

impl Widget for ErrorPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(" Error ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        Paragraph::new(Line::from(Span::styled(
            self.message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )))
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
    }
}

pub struct LogPanel<'a> {
    messages: &'a [String],
}

impl<'a> LogPanel<'a> {
    pub fn new(messages: &'a [String]) -> Self {
        Self { messages }
    }
}

impl Widget for LogPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let visible = area.height.saturating_sub(2) as usize;
        let start = self.messages.len().saturating_sub(visible);
        let lines: Vec<Line> = self.messages[start..]
            .iter()
            .map(|msg| {
                let color = if msg.starts_with("[ERR]") {
                    Color::Red
                } else if msg.starts_with("[WARN]") {
                    Color::Yellow
                } else {
                    Color::Gray
                };
                Line::from(Span::styled(msg.as_str(), Style::default().fg(color)))
            })
            .collect();
        Paragraph::new(lines).block(panel("Log")).render(area, buf);
    }
}

/// Path entry popup standing in for a file upload widget.
pub struct FilePrompt<'a> {
    input: &'a str,
}

impl<'a> FilePrompt<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }
}

impl Widget for FilePrompt<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = area.width.saturating_sub(4).min(80).max(20).min(area.width);
        let height = 5u16.min(area.height);
        let popup = Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        };
        Clear.render(popup, buf);
        let lines = vec![
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Yellow)),
                Span::styled(self.input, Style::default().fg(Color::White)),
                Span::styled("_", Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(
                "[Enter] open  [Esc] cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let block = Block::default()
            .title(format!(" {} ", UPLOAD_LABEL))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

pub struct KeybindBar;

impl Widget for KeybindBar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));
        let text = |t: &'static str| Span::styled(t, Style::default().fg(Color::DarkGray));
        let line = Line::from(vec![
            key(" [Q]"),
            text("uit  "),
            key("[O]"),
            text("pen CSV  "),
            key("[R]"),
            text("erun  "),
            key("[L]"),
            text("evels  "),
            key("[E]"),
            text("xport SVG  "),
        ]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
