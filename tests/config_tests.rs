use std::io::Write;
use std::path::PathBuf;

use stock_dashboard::config::{Config, FetchConfig};

#[test]
fn from_path_reads_partial_file_and_fills_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[fetch]
ticker = "RELIANCE.NS"
output_path = "data/reliance.csv"

[signals]
seed = 2024
"#
    )
    .unwrap();
    file.flush().unwrap();

    let config = Config::from_path(file.path()).unwrap();
    assert_eq!(config.fetch.ticker, "RELIANCE.NS");
    assert_eq!(config.fetch.range, "1y");
    assert!(config.fetch.enabled);
    assert_eq!(config.fetch.output_path, PathBuf::from("data/reliance.csv"));
    assert_eq!(config.signals.seed, Some(2024));
    assert_eq!(config.ui.preview_rows, 5);
    assert_eq!(config.export.dir, PathBuf::from("charts"));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn from_path_reports_missing_file() {
    let err = Config::from_path(std::path::Path::new("/no/such/config.toml")).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to read"));
}

#[test]
fn from_path_reports_malformed_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "[fetch\nticker = 1").unwrap();
    file.flush().unwrap();
    let err = Config::from_path(file.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("failed to parse"));
}

#[test]
fn fetch_defaults_match_bundled_ticker() {
    let fetch = FetchConfig::default();
    assert_eq!(fetch.ticker, "TATASTEEL.NS");
    assert_eq!(fetch.output_path, PathBuf::from("tata.csv"));
    assert!(fetch.validate().is_ok());
}

#[test]
fn bundled_default_toml_parses() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/default.toml");
    let config = Config::from_path(&path).unwrap();
    assert_eq!(config.fetch.ticker, "TATASTEEL.NS");
    assert_eq!(config.signals.seed, None);
}

#[test]
fn rejects_oversized_preview_rows() {
    let err = Config::from_toml("[ui]\npreview_rows = 100000\n").unwrap_err();
    assert!(format!("{:#}", err).contains("ui.preview_rows must be at most"));
    let config = Config::from_toml("[ui]\npreview_rows = 500\n").unwrap();
    assert_eq!(config.ui.preview_rows, 500);
}
