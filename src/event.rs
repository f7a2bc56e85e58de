use std::path::PathBuf;

use crate::fetch::FetchSummary;

#[derive(Debug, Clone)]
pub enum AppEvent {
    FetchCompleted(FetchSummary),
    FetchFailed(String),
    ExportCompleted(Vec<PathBuf>),
    LogMessage(String),
    Error(String),
}
