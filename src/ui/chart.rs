use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Widget},
};

use crate::analysis::Levels;
use crate::model::bar::finite_bounds;

pub const SUPPORT_COLOR: Color = Color::Blue;
pub const RESISTANCE_COLOR: Color = Color::Rgb(255, 165, 0);

/// Column of `index` when `len` samples are squeezed into `width` cells.
fn column_for(index: usize, len: usize, width: usize) -> usize {
    if len <= width || len <= 1 {
        index
    } else {
        index * (width - 1) / (len - 1)
    }
}

/// Sample index drawn in `col` when `len` samples are squeezed into `width` cells.
fn sample_for(col: usize, len: usize, width: usize) -> usize {
    if len <= width || width <= 1 {
        col
    } else {
        col * (len - 1) / (width - 1)
    }
}

/// Decimal places needed to tell `min` and `max` apart on an axis.
fn label_precision(min: f64, max: f64) -> usize {
    let span = max - min;
    if span.is_nan() || span <= 0.0 || span >= 0.1 {
        return 2;
    }
    ((-span.log10()).ceil() as usize + 1).clamp(2, 8)
}

struct Plot {
    inner: Rect,
    height: usize,
    width: usize,
    min: f64,
    range: f64,
    precision: usize,
}

impl Plot {
    /// Leaves the bottom row of `inner` for axis labels.
    fn new(inner: Rect, min: f64, max: f64) -> Self {
        let span = max - min;
        let floor = max.abs().max(min.abs()).max(1.0) * f64::EPSILON;
        // A flat series sits mid-height instead of on the bottom row.
        let (min, range) = if span <= floor {
            let pad = min.abs().max(1.0) * 0.05;
            (min - pad, pad * 2.0)
        } else {
            (min, span)
        };
        Self {
            inner,
            height: inner.height.saturating_sub(1) as usize,
            width: inner.width as usize,
            min,
            range,
            precision: label_precision(min, min + range),
        }
    }

    fn price_label(&self, value: f64) -> String {
        format!("{:.*}", self.precision, value)
    }

    fn y(&self, value: f64) -> u16 {
        let normalized = ((value - self.min) / self.range).clamp(0.0, 1.0);
        let rows = self.height.saturating_sub(1);
        let y_pos = rows - ((normalized * rows as f64).round() as usize).min(rows);
        self.inner.y + y_pos as u16
    }

    fn x(&self, col: usize) -> u16 {
        self.inner.x + col.min(self.width.saturating_sub(1)) as u16
    }

    fn draw_series(&self, buf: &mut Buffer, values: &[f64], symbol: &str, color: Color) {
        let cols = values.len().min(self.width);
        for col in 0..cols {
            let value = values[sample_for(col, values.len(), self.width)];
            if value.is_finite() {
                buf.set_string(self.x(col), self.y(value), symbol, Style::default().fg(color));
            }
        }
    }

    fn draw_hline(&self, buf: &mut Buffer, value: f64, label: &str, color: Color) {
        let y = self.y(value);
        let style = Style::default().fg(color);
        for col in 0..self.width {
            buf.set_string(self.x(col), y, "─", style);
        }
        let text = format!(" {} {} ", label, self.price_label(value));
        let start = self.width.saturating_sub(text.chars().count());
        buf.set_string(self.x(start), y, &text, style);
    }

    fn axis_labels(&self, buf: &mut Buffer, top: &str, bottom: &str, right: &str) {
        let style = Style::default().fg(Color::DarkGray);
        let label_y = self.inner.y + self.inner.height - 1;
        buf.set_string(self.inner.x, self.inner.y, top, style);
        buf.set_string(self.inner.x, label_y, bottom, style);
        let start = self.width.saturating_sub(right.chars().count());
        if start > bottom.chars().count() {
            buf.set_string(self.x(start), label_y, right, style);
        }
    }
}

fn framed(title: &str, area: Rect, buf: &mut Buffer) -> Rect {
    let block = Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

fn date_span(dates: &[String]) -> String {
    match (dates.first(), dates.last()) {
        (Some(first), Some(last)) if first != last => format!("{} → {}", first, last),
        (Some(first), _) => first.clone(),
        _ => String::new(),
    }
}

/// Close line with buy/sell markers and optional support/resistance rows.
pub struct PriceChart<'a> {
    closes: &'a [f64],
    dates: &'a [String],
    buys: &'a [usize],
    sells: &'a [usize],
    levels: Option<Levels>,
}

impl<'a> PriceChart<'a> {
    pub fn new(closes: &'a [f64], dates: &'a [String]) -> Self {
        Self {
            closes,
            dates,
            buys: &[],
            sells: &[],
            levels: None,
        }
    }

    pub fn signals(mut self, buys: &'a [usize], sells: &'a [usize]) -> Self {
        self.buys = buys;
        self.sells = sells;
        self
    }

    pub fn levels(mut self, levels: Option<Levels>) -> Self {
        self.levels = levels;
        self
    }

    fn draw_markers(
        &self,
        plot: &Plot,
        buf: &mut Buffer,
        indices: &[usize],
        symbol: &str,
        color: Color,
        offset: i32,
    ) {
        let len = self.closes.len();
        for &index in indices {
            let Some(&price) = self.closes.get(index) else {
                continue;
            };
            if !price.is_finite() {
                continue;
            }
            let x = plot.x(column_for(index, len, plot.width));
            let top = plot.inner.y as i32;
            let bottom = top + plot.height as i32 - 1;
            let y = (plot.y(price) as i32 + offset).clamp(top, bottom.max(top));
            buf.set_string(x, y as u16, symbol, Style::default().fg(color));
        }
    }
}

impl Widget for PriceChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = framed("Price Chart with Buy/Sell Signals", area, buf);
        if self.closes.is_empty() || inner.height < 3 || inner.width < 8 {
            return;
        }

        let mut values: Vec<f64> = self.closes.to_vec();
        if let Some(levels) = self.levels {
            values.push(levels.support);
            values.push(levels.resistance);
        }
        let Some((min_price, max_price)) = finite_bounds(values) else {
            return;
        };
        let plot = Plot::new(inner, min_price, max_price);

        if let Some(levels) = self.levels {
            plot.draw_hline(buf, levels.resistance, "Resistance", RESISTANCE_COLOR);
            plot.draw_hline(buf, levels.support, "Support", SUPPORT_COLOR);
        }
        plot.draw_series(buf, self.closes, "•", Color::Cyan);
        self.draw_markers(&plot, buf, self.buys, "▲", Color::Green, 1);
        self.draw_markers(&plot, buf, self.sells, "▼", Color::Red, -1);

        plot.axis_labels(
            buf,
            &plot.price_label(max_price),
            &plot.price_label(min_price),
            &date_span(self.dates),
        );
    }
}

pub fn compact_volume(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e9 {
        format!("{:.2}B", v / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{:.0}", v)
    }
}

pub struct VolumeChart<'a> {
    volumes: &'a [f64],
    dates: &'a [String],
}

impl<'a> VolumeChart<'a> {
    pub fn new(volumes: &'a [f64], dates: &'a [String]) -> Self {
        Self { volumes, dates }
    }
}

impl Widget for VolumeChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = framed("Volume Analysis", area, buf);
        if self.volumes.is_empty() || inner.height < 3 || inner.width < 8 {
            return;
        }
        let Some((min_vol, max_vol)) = finite_bounds(self.volumes.iter().copied()) else {
            return;
        };
        let plot = Plot::new(inner, min_vol.min(0.0), max_vol);
        plot.draw_series(buf, self.volumes, "•", Color::Magenta);
        plot.axis_labels(
            buf,
            &compact_volume(max_vol),
            &compact_volume(min_vol.min(0.0)),
            &date_span(self.dates),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn squeezing_maps_ends_to_ends() {
        assert_eq!(column_for(0, 250, 100), 0);
        assert_eq!(column_for(249, 250, 100), 99);
        assert_eq!(sample_for(0, 250, 100), 0);
        assert_eq!(sample_for(99, 250, 100), 249);
        assert_eq!(column_for(7, 10, 100), 7);
    }

    #[test]
    fn label_precision_grows_for_narrow_ranges() {
        assert_eq!(label_precision(100.0, 130.0), 2);
        assert_eq!(label_precision(0.100, 0.106), 4);
        assert_eq!(label_precision(1.08, 1.0805), 5);
        assert_eq!(label_precision(5.0, 5.0), 2);
    }

    #[test]
    fn flat_series_is_padded_around_its_value() {
        let plot = Plot::new(Rect::new(0, 0, 20, 12), 0.1, 0.1);
        assert!(plot.min < 0.1 && plot.min + plot.range > 0.1);
        assert_eq!(plot.y(0.1), 5);
    }

    #[test]
    fn compact_volume_units() {
        assert_eq!(compact_volume(950.0), "950");
        assert_eq!(compact_volume(12_500.0), "12.5K");
        assert_eq!(compact_volume(41_234_567.0), "41.23M");
        assert_eq!(compact_volume(2_000_000_000.0), "2.00B");
    }
}
