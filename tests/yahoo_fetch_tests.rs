use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stock_dashboard::config::FetchConfig;
use stock_dashboard::data::load_dataset;
use stock_dashboard::fetch::run_incidental_fetch;
use stock_dashboard::yahoo::rest::YahooClient;

const CHART_BODY: &str = r#"{
  "chart": {
    "result": [{
      "meta": {"symbol": "TATASTEEL.NS", "currency": "INR", "gmtoffset": 19800},
      "timestamp": [1704167100, 1704253500, 1704339900, 1704426300],
      "indicators": {"quote": [{
        "open":   [136.0, 137.5, 139.1, 140.0],
        "high":   [138.2, 139.0, 141.3, 142.8],
        "low":    [135.1, 136.4, 138.0, 139.2],
        "close":  [137.9, 138.6, 140.7, 141.5],
        "volume": [41234567, 38765432, 40111222, 35555111]
      }]}
    }],
    "error": null
  }
}"#;

async fn mount_chart(server: &MockServer, ticker: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/v8/finance/chart/{}", ticker)))
        .and(query_param("range", "1y"))
        .and(query_param("interval", "1d"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn daily_history_parses_mocked_chart() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "TATASTEEL.NS",
        ResponseTemplate::new(200).set_body_raw(CHART_BODY, "application/json"),
    )
    .await;

    let client = YahooClient::new(&server.uri()).unwrap();
    let rows = client.daily_history("TATASTEEL.NS", "1y").await.unwrap();
    assert_eq!(rows.len(), 4);
    assert!((rows[3].close - 141.5).abs() < f64::EPSILON);
    assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn incidental_fetch_writes_loadable_csv() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "TATASTEEL.NS",
        ResponseTemplate::new(200).set_body_raw(CHART_BODY, "application/json"),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = FetchConfig {
        enabled: true,
        ticker: "TATASTEEL.NS".to_string(),
        range: "1y".to_string(),
        base_url: server.uri(),
        output_path: dir.path().join("tata.csv"),
    };
    let summary = run_incidental_fetch(&config).await.unwrap();
    assert_eq!(summary.rows, 4);
    assert_eq!(summary.last_close, Some(141.5));
    assert!(summary.path.exists());

    let dataset = load_dataset(&summary.path).unwrap();
    assert_eq!(dataset.len(), 4);
    assert!(dataset.columns.iter().any(|c| c == "Stock Splits"));
    assert_eq!(dataset.bars[0].date_label(), "2024-01-02");
}

#[tokio::test]
async fn not_found_surfaces_chart_error_description() {
    let server = MockServer::start().await;
    mount_chart(
        &server,
        "NOPE.NS",
        ResponseTemplate::new(404).set_body_raw(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
            "application/json",
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config = FetchConfig {
        ticker: "NOPE.NS".to_string(),
        base_url: server.uri(),
        output_path: dir.path().join("nope.csv"),
        ..FetchConfig::default()
    };
    let err = run_incidental_fetch(&config).await.unwrap_err();
    let msg = format!("{:#}", err);
    assert!(msg.contains("NOPE.NS"), "{}", msg);
    assert!(msg.contains("delisted"), "{}", msg);
    assert!(!config.output_path.exists());
}
