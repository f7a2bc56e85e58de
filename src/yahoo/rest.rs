use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use std::collections::HashMap;

use super::types::{ChartResponse, ChartResult};
use crate::error::AppError;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stock-dashboard/0.1";

/// One daily row in the layout yfinance's `history()` produces.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub date: DateTime<FixedOffset>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub dividends: f64,
    pub stock_splits: f64,
}

pub struct YahooClient {
    http: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(20))
            .build()
            .context("failed to build Yahoo HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Daily bars for `ticker` over a chart range such as `1y`, oldest first.
    pub async fn daily_history(&self, ticker: &str, range: &str) -> Result<Vec<HistoryRow>> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);
        tracing::info!(ticker, range, "Fetching daily history");

        let response = self
            .http
            .get(&url)
            .query(&[("range", range), ("interval", "1d"), ("events", "div,splits")])
            .send()
            .await
            .context("yahoo daily_history HTTP failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let msg = match serde_json::from_str::<ChartResponse>(&body) {
                Ok(parsed) => parsed
                    .chart
                    .error
                    .map(|e| format!("{}: {}", e.code, e.description))
                    .unwrap_or_else(|| status.to_string()),
                Err(_) => status.to_string(),
            };
            return Err(AppError::MarketData {
                ticker: ticker.to_string(),
                msg,
            }
            .into());
        }

        let parsed: ChartResponse = response
            .json()
            .await
            .context("yahoo daily_history JSON parse failed")?;
        let rows = parse_chart(parsed, ticker)?;
        tracing::info!(ticker, rows = rows.len(), "Fetched daily history");
        Ok(rows)
    }
}

/// Turn a chart response into rows, skipping sessions without a close.
pub fn parse_chart(response: ChartResponse, ticker: &str) -> Result<Vec<HistoryRow>, AppError> {
    if let Some(err) = response.chart.error {
        return Err(AppError::MarketData {
            ticker: ticker.to_string(),
            msg: format!("{}: {}", err.code, err.description),
        });
    }
    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| AppError::MarketData {
            ticker: ticker.to_string(),
            msg: "empty chart result".to_string(),
        })?;
    rows_from_result(&result, ticker)
}

fn rows_from_result(result: &ChartResult, ticker: &str) -> Result<Vec<HistoryRow>, AppError> {
    let offset = FixedOffset::east_opt(result.meta.gmtoffset).ok_or_else(|| AppError::MarketData {
        ticker: ticker.to_string(),
        msg: format!("invalid gmtoffset {}", result.meta.gmtoffset),
    })?;
    let Some(quote) = result.indicators.quote.first() else {
        return Ok(Vec::new());
    };

    let local_day = |ts: i64| offset.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive());

    let mut dividends: HashMap<NaiveDate, f64> = HashMap::new();
    let mut splits: HashMap<NaiveDate, f64> = HashMap::new();
    if let Some(events) = &result.events {
        for div in events.dividends.values() {
            if let Some(day) = local_day(div.date) {
                *dividends.entry(day).or_default() += div.amount;
            }
        }
        for split in events.splits.values() {
            if let Some(day) = local_day(split.date) {
                splits.insert(day, split.ratio());
            }
        }
    }

    let at = |col: &[Option<f64>], i: usize| col.get(i).copied().flatten();
    let mut rows = Vec::with_capacity(result.timestamp.len());
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let Some(close) = at(&quote.close, i) else {
            continue;
        };
        let Some(day) = local_day(ts) else {
            continue;
        };
        // Daily bars are stamped at the session open; rows are keyed by local midnight.
        let Some(date) = day
            .and_hms_opt(0, 0, 0)
            .and_then(|midnight| offset.from_local_datetime(&midnight).single())
        else {
            continue;
        };
        rows.push(HistoryRow {
            date,
            open: at(&quote.open, i).unwrap_or(close),
            high: at(&quote.high, i).unwrap_or(close),
            low: at(&quote.low, i).unwrap_or(close),
            close,
            volume: at(&quote.volume, i).unwrap_or(0.0),
            dividends: dividends.get(&day).copied().unwrap_or(0.0),
            stock_splits: splits.get(&day).copied().unwrap_or(0.0),
        });
    }
    rows.sort_by_key(|r| r.date);
    Ok(rows)
}
