use chrono::NaiveDateTime;

use super::levels::{support_resistance, Levels};
use super::placeholder::{OutlookSource, SignalSource};
use crate::data::Dataset;
use crate::model::signal::{BarSignal, Sentiment, Trend};

/// A marker drawn on the close line where a signal flag is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalMarker {
    pub index: usize,
    pub date: NaiveDateTime,
    pub price: f64,
}

/// Everything derived from a dataset for one run of the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub signals: Vec<BarSignal>,
    pub trend: Trend,
    pub sentiment: Sentiment,
    pub levels: Option<Levels>,
}

impl DashboardReport {
    pub fn build<S, O>(dataset: &Dataset, signal_source: &mut S, outlook: &mut O) -> Self
    where
        S: SignalSource + ?Sized,
        O: OutlookSource + ?Sized,
    {
        let signals = signal_source.signals(&dataset.bars);
        let trend = outlook.trend(&dataset.bars);
        let sentiment = outlook.sentiment(&dataset.bars);
        let levels = support_resistance(&dataset.bars);
        tracing::debug!(
            rows = dataset.len(),
            buys = signals.iter().filter(|s| s.buy).count(),
            sells = signals.iter().filter(|s| s.sell).count(),
            trend = %trend,
            sentiment = %sentiment,
            "Built dashboard report"
        );
        Self {
            signals,
            trend,
            sentiment,
            levels,
        }
    }

    fn markers(&self, dataset: &Dataset, pick: impl Fn(&BarSignal) -> bool) -> Vec<SignalMarker> {
        self.signals
            .iter()
            .zip(&dataset.bars)
            .enumerate()
            .filter(|(_, (sig, bar))| pick(*sig) && bar.close.is_finite())
            .map(|(index, (_, bar))| SignalMarker {
                index,
                date: bar.date,
                price: bar.close,
            })
            .collect()
    }

    pub fn buy_markers(&self, dataset: &Dataset) -> Vec<SignalMarker> {
        self.markers(dataset, |s| s.buy)
    }

    pub fn sell_markers(&self, dataset: &Dataset) -> Vec<SignalMarker> {
        self.markers(dataset, |s| s.sell)
    }

    pub fn support_label(&self) -> String {
        self.levels
            .map(|l| format!("{}", l.support))
            .unwrap_or_else(|| "---".to_string())
    }

    pub fn resistance_label(&self) -> String {
        self.levels
            .map(|l| format!("{}", l.resistance))
            .unwrap_or_else(|| "---".to_string())
    }

    /// The text lines shown under the charts.
    pub fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("Predicted Trend: {}", self.trend),
            format!("Sentiment Score: {}", self.sentiment),
            format!("Support Level: {}", self.support_label()),
            format!("Resistance Level: {}", self.resistance_label()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::bar::Bar;
    use chrono::NaiveDate;

    struct Fixed;

    impl SignalSource for Fixed {
        fn signals(&mut self, bars: &[Bar]) -> Vec<BarSignal> {
            (0..bars.len())
                .map(|i| BarSignal {
                    buy: i % 2 == 0,
                    sell: i == 1,
                })
                .collect()
        }
    }

    impl OutlookSource for Fixed {
        fn trend(&mut self, _bars: &[Bar]) -> Trend {
            Trend::Uptrend
        }

        fn sentiment(&mut self, _bars: &[Bar]) -> Sentiment {
            Sentiment::Negative
        }
    }

    fn dataset() -> Dataset {
        let day = |d| {
            NaiveDate::from_ymd_opt(2024, 2, d)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let bar = |d, open, high, low, close, volume| Bar {
            date: day(d),
            open,
            high,
            low,
            close,
            volume,
        };
        Dataset {
            columns: ["Date", "Open", "High", "Low", "Close", "Volume"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            bars: vec![
                bar(1, 10.0, 12.0, 9.0, 11.0, 100.0),
                bar(2, 11.0, 13.5, 10.0, 13.0, 150.0),
                bar(5, 13.0, 13.0, 8.25, 9.0, 90.0),
            ],
        }
    }

    #[test]
    fn markers_follow_flags() {
        let ds = dataset();
        let mut src = Fixed;
        let mut outlook = Fixed;
        let report = DashboardReport::build(&ds, &mut src, &mut outlook);

        let buys = report.buy_markers(&ds);
        assert_eq!(buys.iter().map(|m| m.index).collect::<Vec<_>>(), vec![0, 2]);
        assert!((buys[1].price - 9.0).abs() < f64::EPSILON);

        let sells = report.sell_markers(&ds);
        assert_eq!(sells.len(), 1);
        assert_eq!(sells[0].date, ds.bars[1].date);
    }

    #[test]
    fn summary_lines_carry_labels_and_levels() {
        let ds = dataset();
        let report = DashboardReport::build(&ds, &mut Fixed, &mut Fixed);
        assert_eq!(
            report.summary_lines(),
            vec![
                "Predicted Trend: Uptrend".to_string(),
                "Sentiment Score: Negative".to_string(),
                "Support Level: 8.25".to_string(),
                "Resistance Level: 13.5".to_string(),
            ]
        );
    }

    #[test]
    fn empty_dataset_has_placeholder_levels() {
        let ds = Dataset {
            columns: Vec::new(),
            bars: Vec::new(),
        };
        let report = DashboardReport::build(&ds, &mut Fixed, &mut Fixed);
        assert!(report.levels.is_none());
        assert_eq!(report.support_label(), "---");
        assert!(report.buy_markers(&ds).is_empty());
    }
}
