//! Start-up history download for the configured ticker.
//!
//! The file it writes is a side product; the dashboard never reads it back.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::FetchConfig;
use crate::yahoo::rest::{HistoryRow, YahooClient};

pub const HISTORY_HEADERS: [&str; 8] = [
    "Date",
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Dividends",
    "Stock Splits",
];

#[derive(Debug, Clone, PartialEq)]
pub struct FetchSummary {
    pub ticker: String,
    pub rows: usize,
    pub path: PathBuf,
    pub last_close: Option<f64>,
}

pub fn write_history_csv(rows: &[HistoryRow], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    writer.write_record(HISTORY_HEADERS)?;
    for row in rows {
        writer.write_record([
            row.date.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            row.open.to_string(),
            row.high.to_string(),
            row.low.to_string(),
            row.close.to_string(),
            row.volume.to_string(),
            row.dividends.to_string(),
            row.stock_splits.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub async fn run_incidental_fetch(config: &FetchConfig) -> Result<FetchSummary> {
    let client = YahooClient::new(&config.base_url)?;
    let rows = client
        .daily_history(&config.ticker, &config.range)
        .await
        .with_context(|| format!("history fetch for {} failed", config.ticker))?;
    write_history_csv(&rows, &config.output_path)?;

    let summary = FetchSummary {
        ticker: config.ticker.clone(),
        rows: rows.len(),
        path: config.output_path.clone(),
        last_close: rows.last().map(|r| r.close),
    };
    tracing::info!(
        ticker = %summary.ticker,
        rows = summary.rows,
        first = ?rows.first().map(|r| r.date.to_rfc3339()),
        last = ?rows.last().map(|r| r.date.to_rfc3339()),
        path = %summary.path.display(),
        "Wrote history CSV"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::load_dataset;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn written_history_loads_as_dataset() {
        let ist = FixedOffset::east_opt(19_800).unwrap();
        let rows = vec![
            HistoryRow {
                date: ist.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                open: 136.0,
                high: 138.2,
                low: 135.1,
                close: 137.9,
                volume: 41_234_567.0,
                dividends: 0.0,
                stock_splits: 0.0,
            },
            HistoryRow {
                date: ist.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
                open: 137.5,
                high: 139.0,
                low: 136.4,
                close: 138.6,
                volume: 38_765_432.0,
                dividends: 3.6,
                stock_splits: 0.0,
            },
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tata.csv");
        write_history_csv(&rows, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Date,Open,High,Low,Close,Volume,Dividends,Stock Splits\n"));
        assert!(text.contains("2024-01-02 00:00:00+05:30,136,138.2,135.1,137.9,41234567,0,0"));

        let dataset = load_dataset(&path).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.bars[1].date_label(), "2024-01-03");
    }
}
