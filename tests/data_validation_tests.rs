use std::io::Write;

use stock_dashboard::analysis::support_resistance;
use stock_dashboard::data::{load_dataset, PriceTable};
use stock_dashboard::error::DataError;

fn table(csv: &str) -> PriceTable {
    PriceTable::from_reader(csv.as_bytes()).expect("csv should read")
}

#[test]
fn missing_date_column_is_rejected_with_user_message() {
    let err = table("Day,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,10\n")
        .into_dataset()
        .unwrap_err();
    assert!(matches!(err, DataError::MissingDate));
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "The file must contain a 'Date' column.");
}

#[test]
fn date_header_is_case_sensitive() {
    let err = table("date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,10\n")
        .into_dataset()
        .unwrap_err();
    assert!(matches!(err, DataError::MissingDate));
}

#[test]
fn each_missing_ohlcv_column_is_rejected() {
    let all = ["Open", "High", "Low", "Close", "Volume"];
    for skip in all {
        let headers: Vec<&str> = std::iter::once("Date")
            .chain(all.iter().copied().filter(|c| *c != skip))
            .collect();
        let values: Vec<&str> = std::iter::once("2024-01-02")
            .chain(std::iter::repeat("1").take(4))
            .collect();
        let csv = format!("{}\n{}\n", headers.join(","), values.join(","));

        let err = table(&csv).into_dataset().unwrap_err();
        match &err {
            DataError::MissingColumns { missing } => assert_eq!(missing, &vec![skip.to_string()]),
            other => panic!("expected MissingColumns for {}, got {:?}", skip, other),
        }
        assert_eq!(
            err.to_string(),
            "The file must contain the following columns: Open, High, Low, Close, Volume"
        );
    }
}

#[test]
fn date_check_runs_before_column_check() {
    let err = table("Close\n1.0\n").into_dataset().unwrap_err();
    assert!(matches!(err, DataError::MissingDate));
}

#[test]
fn unparseable_date_reports_row() {
    let err = table("Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,0.5,1.5,10\nsoon,1,2,0.5,1.5,10\n")
        .into_dataset()
        .unwrap_err();
    match err {
        DataError::InvalidDate { row, value } => {
            assert_eq!(row, 2);
            assert_eq!(value, "soon");
        }
        other => panic!("expected InvalidDate, got {:?}", other),
    }
}

#[test]
fn non_numeric_cell_reports_column() {
    let err = table("Date,Open,High,Low,Close,Volume\n2024-01-02,1,2,n/a,1.5,10\n")
        .into_dataset()
        .unwrap_err();
    match err {
        DataError::InvalidNumber { row, column, value } => {
            assert_eq!(row, 1);
            assert_eq!(column, "Low");
            assert_eq!(value, "n/a");
        }
        other => panic!("expected InvalidNumber, got {:?}", other),
    }
}

#[test]
fn support_and_resistance_are_column_extremes() {
    let csv = "\
Date,Open,High,Low,Close,Volume,Adj Close
2024-01-02,100,105.5,98.25,104,1000,103.9
2024-01-03,104,111.75,103,110,1500,109.8
2024-01-04,110,110,97.5,99,900,98.9
2024-01-05,99,101,98,100,1100,99.9
";
    let dataset = table(csv).into_dataset().unwrap();
    let levels = support_resistance(&dataset.bars).unwrap();

    let min_low = dataset.bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    let max_high = dataset
        .bars
        .iter()
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    assert_eq!(levels.support, min_low);
    assert_eq!(levels.resistance, max_high);
    assert!((levels.support - 97.5).abs() < f64::EPSILON);
    assert!((levels.resistance - 111.75).abs() < f64::EPSILON);
}

#[test]
fn extra_columns_survive_in_preview_with_normalized_dates() {
    let csv = "\
Date,Open,High,Low,Close,Volume,Dividends
2024-01-02 00:00:00+05:30,1,2,0.5,1.5,10,0
2024-01-03 00:00:00+05:30,1,2,0.5,1.5,10,0
2024-01-04 00:00:00+05:30,1,2,0.5,1.5,10,0
";
    let preview = table(csv).preview(2);
    assert_eq!(preview.headers.last().map(String::as_str), Some("Dividends"));
    assert_eq!(preview.rows.len(), 2);
    assert_eq!(preview.total_rows, 3);
    assert_eq!(preview.rows[0][0], "2024-01-02");
}

#[test]
fn headers_only_file_is_an_empty_dataset() {
    let dataset = table("Date,Open,High,Low,Close,Volume\n").into_dataset().unwrap();
    assert!(dataset.is_empty());
    assert!(support_resistance(&dataset.bars).is_none());
}

#[test]
fn load_dataset_reads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "Date,Open,High,Low,Close,Volume").unwrap();
    writeln!(file, "2024-02-01,10,12,9,11,100").unwrap();
    writeln!(file, "2024-02-02,11,13,10,12,200").unwrap();
    file.flush().unwrap();

    let dataset = load_dataset(file.path()).unwrap();
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.closes(), vec![11.0, 12.0]);
    assert_eq!(dataset.date_labels(), vec!["2024-02-01", "2024-02-02"]);
}

#[test]
fn missing_file_is_an_io_error() {
    let err = load_dataset(std::path::Path::new("/definitely/not/here.csv")).unwrap_err();
    assert!(matches!(err, DataError::Io(_)));
    assert!(!err.is_validation());
}
