use chrono::NaiveDate;

use crate::record::{format_fixed2, Column, Record};

/// Column written by the collector with the snapshot date
pub const DATE_COLUMN: &str = "Date";

/// Summary figures over the current record sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    pub total: usize,
    pub avg_rsi7: f64,
    /// Earliest and latest `Date` values, when the file carries them
    pub date_range: Option<(NaiveDate, NaiveDate)>,
}

impl Stats {
    pub fn compute(records: &[Record]) -> Self {
        let rsi7: Vec<f64> = records
            .iter()
            .filter_map(|r| r.number(Column::Rsi7))
            .filter(|v| v.is_finite())
            .collect();

        let avg_rsi7 = if rsi7.is_empty() {
            0.0
        } else {
            rsi7.iter().sum::<f64>() / rsi7.len() as f64
        };

        let date_range = records
            .iter()
            .filter_map(|r| NaiveDate::parse_from_str(r.value(DATE_COLUMN), "%Y-%m-%d").ok())
            .fold(None, |range: Option<(NaiveDate, NaiveDate)>, d| match range {
                None => Some((d, d)),
                Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
            });

        Self {
            total: records.len(),
            avg_rsi7,
            date_range,
        }
    }

    pub fn avg_rsi7_display(&self) -> String {
        format_fixed2(self.avg_rsi7)
    }

    pub fn date_range_display(&self, no_data_label: &str) -> String {
        match self.date_range {
            Some((first, last)) if first == last => first.format("%Y-%m-%d").to_string(),
            Some((first, last)) => format!(
                "{} ~ {}",
                first.format("%Y-%m-%d"),
                last.format("%Y-%m-%d")
            ),
            None => no_data_label.to_string(),
        }
    }
}
