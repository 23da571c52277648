//! Sorting of the record sequence by one of the known columns

use std::cmp::Ordering;

use rayon::prelude::*;
use tracing::debug;

use crate::record::{Column, Record};

/// Threshold for using parallel processing
const PARALLEL_THRESHOLD: usize = 10_000;

/// Sorting direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn display_name(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Active sort column and direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub column: Option<Column>,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            column: None,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    /// Select `column` for sorting and return the direction to use.
    ///
    /// Re-selecting the current column flips ascending to descending, but a
    /// column that is already descending goes back to ascending, as does any
    /// newly selected column.
    pub fn select(&mut self, column: Column) -> SortDirection {
        let direction = if self.column == Some(column)
            && self.direction == SortDirection::Ascending
        {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };

        self.column = Some(column);
        self.direction = direction;
        direction
    }

    pub fn direction_for(&self, column: Column) -> Option<SortDirection> {
        (self.column == Some(column)).then_some(self.direction)
    }
}

/// Sort key extracted once per record
#[derive(Clone, PartialEq)]
enum SortKey {
    Numeric(f64),
    Text(String),
}

impl SortKey {
    fn of(record: &Record, column: Column) -> Self {
        if column.is_numeric() {
            SortKey::Numeric(record.number(column).unwrap_or(0.0))
        } else {
            SortKey::Text(record.column(column).to_lowercase())
        }
    }
}

impl Eq for SortKey {}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            // Keys never hold NaN: unreadable values are already 0.0
            (SortKey::Numeric(a), SortKey::Numeric(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Reorder `records` in place by `column`.
///
/// Records with equal keys have no defined relative order afterwards: there
/// is no secondary key and the sort is unstable.
pub fn sort_records(records: &mut Vec<Record>, column: Column, direction: SortDirection) {
    let use_parallel = records.len() >= PARALLEL_THRESHOLD;

    let mut keyed: Vec<(SortKey, Record)> = if use_parallel {
        records
            .par_drain(..)
            .map(|r| (SortKey::of(&r, column), r))
            .collect()
    } else {
        records
            .drain(..)
            .map(|r| (SortKey::of(&r, column), r))
            .collect()
    };

    let cmp_fn = |(a, _): &(SortKey, Record), (b, _): &(SortKey, Record)| -> Ordering {
        match direction {
            SortDirection::Ascending => a.cmp(b),
            SortDirection::Descending => a.cmp(b).reverse(),
        }
    };

    if use_parallel {
        keyed.par_sort_unstable_by(cmp_fn);
    } else {
        keyed.sort_unstable_by(cmp_fn);
    }

    records.extend(keyed.into_iter().map(|(_, r)| r));

    debug!(
        column = column.key(),
        direction = direction.display_name(),
        rows = records.len(),
        parallel = use_parallel,
        "sorted records"
    );
}
