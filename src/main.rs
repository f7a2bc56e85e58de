use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyEventKind};
use tokio::sync::{mpsc, watch};

use stock_dashboard::config::Config;
use stock_dashboard::event::AppEvent;
use stock_dashboard::fetch::run_incidental_fetch;
use stock_dashboard::input::{
    is_interrupt, parse_main_command, parse_prompt_command, PromptCommand, UiCommand,
};
use stock_dashboard::ui::{self, AppState, FetchStatus};

const LOG_FILE: &str = "stock-dashboard.log";

fn handle_prompt_command(cmd: PromptCommand, app_state: &mut AppState) {
    match cmd {
        PromptCommand::Insert(c) => app_state.prompt_insert(c),
        PromptCommand::Backspace => app_state.prompt_backspace(),
        PromptCommand::Cancel => app_state.prompt_cancel(),
        PromptCommand::Submit => app_state.prompt_submit(),
    }
}

#[cfg(feature = "export")]
fn export_charts(app_state: &AppState, config: &Config) -> AppEvent {
    let (Some(dataset), Some(report)) = (&app_state.dataset, &app_state.report) else {
        return AppEvent::LogMessage("[WARN] Nothing to export: open a valid CSV first".to_string());
    };
    match stock_dashboard::export::export_all(dataset, report, &config.export.dir) {
        Ok(paths) => AppEvent::ExportCompleted(paths),
        Err(e) => {
            tracing::error!(error = %e, "Chart export failed");
            AppEvent::Error(format!("export failed: {:#}", e))
        }
    }
}

#[cfg(not(feature = "export"))]
fn export_charts(_app_state: &AppState, _config: &Config) -> AppEvent {
    AppEvent::LogMessage("[WARN] Built without the `export` feature".to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    // Log to file so it doesn't interfere with the TUI
    let log_file = std::fs::File::create(LOG_FILE)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(&config.logging.level)
            }),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .json()
        .init();

    let initial_file = std::env::args().nth(1).map(PathBuf::from);
    tracing::info!(
        fetch_enabled = config.fetch.enabled,
        ticker = %config.fetch.ticker,
        initial_file = ?initial_file,
        "Starting stock-dashboard"
    );

    let (app_tx, mut app_rx) = mpsc::channel::<AppEvent>(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut app_state = AppState::new(config.ui.preview_rows, config.signals.seed);

    if config.fetch.enabled {
        app_state.fetch_status = FetchStatus::Pending;
        let fetch_config = config.fetch.clone();
        let fetch_tx = app_tx.clone();
        tokio::spawn(async move {
            let evt = match run_incidental_fetch(&fetch_config).await {
                Ok(summary) => AppEvent::FetchCompleted(summary),
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "History fetch failed");
                    AppEvent::FetchFailed(format!("{:#}", e))
                }
            };
            let _ = fetch_tx.send(evt).await;
        });
    }

    // Covers SIGINT before the terminal enters raw mode
    let ctrl_c_shutdown = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Ctrl+C received");
        let _ = ctrl_c_shutdown.send(true);
    });

    let mut terminal = ratatui::init();
    app_state.push_log("stock-dashboard started".to_string());
    if let Some(path) = &initial_file {
        app_state.open(path);
    }

    let result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::render(frame, &app_state)) {
            break Err(e.into());
        }

        match crossterm::event::poll(Duration::from_millis(config.ui.refresh_rate_ms)) {
            Ok(true) => match crossterm::event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if is_interrupt(&key) {
                        tracing::info!("Ctrl+C received");
                        let _ = shutdown_tx.send(true);
                        break Ok(());
                    }
                    if app_state.prompt.is_some() {
                        if let Some(cmd) = parse_prompt_command(&key.code) {
                            handle_prompt_command(cmd, &mut app_state);
                        }
                        continue;
                    }
                    match parse_main_command(&key.code) {
                        Some(UiCommand::Quit) => {
                            tracing::info!("User quit");
                            let _ = shutdown_tx.send(true);
                            break Ok(());
                        }
                        Some(UiCommand::OpenFilePrompt) => app_state.open_prompt(),
                        Some(UiCommand::Rerun) => app_state.rerun(),
                        Some(UiCommand::ToggleLevels) => app_state.toggle_levels(),
                        Some(UiCommand::Export) => {
                            let evt = export_charts(&app_state, &config);
                            app_state.apply(evt);
                        }
                        None => {}
                    }
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            },
            Ok(false) => {}
            Err(e) => break Err(e.into()),
        }

        // Drain events from channel
        while let Ok(evt) = app_rx.try_recv() {
            app_state.apply(evt);
        }

        if *shutdown_rx.borrow() {
            break Ok(());
        }
    };

    ratatui::restore();
    tracing::info!(runs = app_state.run_count, "Shutdown complete");
    println!("Goodbye! Check {} for details.", LOG_FILE);
    result
}
