//! SVG rendering of the dashboard charts.

use anyhow::{anyhow, bail, Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

use crate::analysis::{DashboardReport, RandomPlaceholder};
use crate::config::Config;
use crate::data::{load_dataset, Dataset};
use crate::model::bar::finite_bounds;

const CHART_SIZE: (u32, u32) = (1200, 600);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const PRICE_LINE: RGBColor = RGBColor(31, 119, 180);
const FONT: &str = "sans-serif";

pub const PRICE_FILE: &str = "price.svg";
pub const PRICE_LEVELS_FILE: &str = "price_levels.svg";
pub const VOLUME_FILE: &str = "volume.svg";

fn padded(bounds: Option<(f64, f64)>) -> (f64, f64) {
    match bounds {
        Some((lo, hi)) => {
            let span = hi - lo;
            let pad = if span < f64::EPSILON { lo.abs().max(1.0) * 0.05 } else { span * 0.05 };
            (lo - pad, hi + pad)
        }
        None => (0.0, 1.0),
    }
}

fn x_range(dataset: &Dataset) -> std::ops::Range<f64> {
    0.0..(dataset.len().max(2) - 1) as f64
}

fn date_formatter(labels: &[String]) -> impl Fn(&f64) -> String + '_ {
    move |x: &f64| {
        let idx = x.round();
        if idx < 0.0 {
            return String::new();
        }
        labels.get(idx as usize).cloned().unwrap_or_default()
    }
}

pub fn render_price_svg(
    dataset: &Dataset,
    report: &DashboardReport,
    with_levels: bool,
    path: &Path,
) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut values: Vec<f64> = dataset.closes();
    if with_levels {
        if let Some(levels) = report.levels {
            values.push(levels.support);
            values.push(levels.resistance);
        }
    }
    let (lo, hi) = padded(finite_bounds(values));
    let labels = dataset.date_labels();
    let fmt = date_formatter(&labels);
    let x = x_range(dataset);
    let x_end = x.end;

    let mut chart = ChartBuilder::on(&root)
        .caption("Price Chart with Buy/Sell Signals", (FONT, 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(x, lo..hi)?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&fmt)
        .x_desc("Date")
        .y_desc("Close")
        .draw()?;

    let closes = dataset
        .bars
        .iter()
        .enumerate()
        .filter(|(_, b)| b.close.is_finite())
        .map(|(i, b)| (i as f64, b.close));
    chart
        .draw_series(LineSeries::new(closes, &PRICE_LINE))?
        .label("Stock Price")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], PRICE_LINE));

    let buys = report.buy_markers(dataset);
    chart
        .draw_series(
            buys.iter()
                .map(|m| Circle::new((m.index as f64, m.price), 5, GREEN.filled())),
        )?
        .label("Buy Signal")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, GREEN.filled()));

    let sells = report.sell_markers(dataset);
    chart
        .draw_series(
            sells
                .iter()
                .map(|m| Circle::new((m.index as f64, m.price), 5, RED.filled())),
        )?
        .label("Sell Signal")
        .legend(|(x, y)| Circle::new((x + 10, y), 5, RED.filled()));

    if with_levels {
        if let Some(levels) = report.levels {
            for (level, color, name) in [
                (levels.support, BLUE, "Support"),
                (levels.resistance, ORANGE, "Resistance"),
            ] {
                chart.draw_series(LineSeries::new(
                    vec![(0.0, level), (x_end, level)],
                    color.stroke_width(2),
                ))?;
                chart.draw_series(std::iter::once(Text::new(
                    name.to_string(),
                    (x_end * 0.9, level),
                    (FONT, 14).into_font().color(&color),
                )))?;
            }
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn render_volume_svg(dataset: &Dataset, path: &Path) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let max_volume = finite_bounds(dataset.volumes()).map(|(_, hi)| hi).unwrap_or(1.0);
    let labels = dataset.date_labels();
    let fmt = date_formatter(&labels);

    let mut chart = ChartBuilder::on(&root)
        .caption("Volume Analysis", (FONT, 24))
        .margin(16)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d(x_range(dataset), 0.0..max_volume.max(1.0) * 1.05)?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&fmt)
        .x_desc("Date")
        .y_desc("Volume")
        .draw()?;

    let volumes = dataset
        .bars
        .iter()
        .enumerate()
        .filter(|(_, b)| b.volume.is_finite())
        .map(|(i, b)| (i as f64, b.volume));
    chart.draw_series(LineSeries::new(volumes, &PRICE_LINE))?;

    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write the plain price chart, the chart with level lines, and the volume chart.
pub fn export_all(dataset: &Dataset, report: &DashboardReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let price = dir.join(PRICE_FILE);
    let price_levels = dir.join(PRICE_LEVELS_FILE);
    let volume = dir.join(VOLUME_FILE);

    render_price_svg(dataset, report, false, &price)?;
    render_price_svg(dataset, report, true, &price_levels)?;
    render_volume_svg(dataset, &volume)?;

    tracing::info!(dir = %dir.display(), rows = dataset.len(), "Exported charts");
    Ok(vec![price, price_levels, volume])
}

pub const USAGE: &str = "usage: dashboard-export <CSV_PATH> [OUT_DIR] [--seed N]";

#[derive(Debug, Clone, PartialEq)]
pub struct ExportArgs {
    pub csv_path: PathBuf,
    pub out_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

pub fn parse_args(args: &[String]) -> Result<Option<ExportArgs>> {
    let mut positional = Vec::new();
    let mut seed = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "help" | "--help" | "-h" => return Ok(None),
            "--seed" => {
                let raw = iter.next().ok_or_else(|| anyhow!("`--seed` requires a value"))?;
                seed = Some(
                    raw.parse::<u64>()
                        .with_context(|| format!("invalid seed '{}'", raw))?,
                );
            }
            other if other.starts_with("--") => bail!("unknown option `{}`. {}", other, USAGE),
            other => positional.push(PathBuf::from(other)),
        }
    }
    if positional.is_empty() || positional.len() > 2 {
        bail!("{}", USAGE);
    }
    let mut positional = positional.into_iter();
    Ok(Some(ExportArgs {
        csv_path: positional.next().unwrap_or_default(),
        out_dir: positional.next(),
        seed,
    }))
}

/// Load, analyse, and export one CSV. Returns the lines to print.
pub fn run_cli(args: &[String], config: &Config) -> Result<Vec<String>> {
    let Some(args) = parse_args(args)? else {
        return Ok(vec![USAGE.to_string()]);
    };
    let dataset = load_dataset(&args.csv_path)?;
    let seed = args.seed.or(config.signals.seed);
    let mut signals = RandomPlaceholder::new(seed);
    let mut outlook = RandomPlaceholder::new(seed.map(|s| s.wrapping_add(1)));
    let report = DashboardReport::build(&dataset, &mut signals, &mut outlook);

    let out_dir = args.out_dir.unwrap_or_else(|| config.export.dir.clone());
    let written = export_all(&dataset, &report, &out_dir)?;

    let mut lines = report.summary_lines();
    lines.extend(written.iter().map(|p| format!("wrote {}", p.display())));
    Ok(lines)
}
