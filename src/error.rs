use thiserror::Error;

pub const REQUIRED_COLUMNS: [&str; 5] = ["Open", "High", "Low", "Close", "Volume"];

#[derive(Error, Debug)]
pub enum AppError {
    #[error("market data API error for {ticker}: {msg}")]
    MarketData { ticker: String, msg: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures while turning an uploaded CSV into a dataset.
///
/// The two column checks render the messages shown to the user verbatim.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read CSV: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("The file must contain a 'Date' column.")]
    MissingDate,

    #[error("The file must contain the following columns: {}", REQUIRED_COLUMNS.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("row {row}: cannot parse date '{value}'")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: column '{column}' is not numeric: '{value}'")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

impl DataError {
    /// True for the two column-presence checks that halt a run with a user message.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::MissingDate | Self::MissingColumns { .. })
    }
}
