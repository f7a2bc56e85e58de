use chrono::NaiveDateTime;

/// One daily OHLCV row. Missing numeric cells are carried as `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    /// Date label used on chart axes and in the preview table.
    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Min and max over the finite values of `values`, or `None` if there are none.
pub fn finite_bounds<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(open: f64, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            open,
            high: open.max(close),
            low: open.min(close),
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn date_label_is_iso_day() {
        assert_eq!(bar(1.0, 2.0).date_label(), "2024-03-01");
    }

    #[test]
    fn finite_bounds_skips_nan() {
        assert_eq!(
            finite_bounds([3.0, f64::NAN, 1.0, 7.5]),
            Some((1.0, 7.5))
        );
        assert_eq!(finite_bounds([f64::NAN]), None);
        assert_eq!(finite_bounds(Vec::<f64>::new()), None);
    }
}
