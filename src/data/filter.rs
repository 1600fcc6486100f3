use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::model::IndicatorRecord;

// ---------------------------------------------------------------------------
// Year interval
// ---------------------------------------------------------------------------

/// Closed year interval `[low, high]`. The default is the `[0, 0]`
/// sentinel used for empty datasets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearInterval {
    pub low: i64,
    pub high: i64,
}

impl YearInterval {
    /// A reversed pair is normalized so `low <= high` always holds.
    pub fn new(low: i64, high: i64) -> Self {
        if low <= high {
            YearInterval { low, high }
        } else {
            YearInterval { low: high, high: low }
        }
    }

    pub fn contains(&self, year: i64) -> bool {
        self.low <= year && year <= self.high
    }
}

/// Observed `[min, max]` year span of a dataset, the default interval for a
/// fresh selection. An empty dataset has no span to observe; `[0, 0]` is
/// the sentinel for that case.
pub fn year_span(records: &[IndicatorRecord]) -> YearInterval {
    let mut years = records.iter().map(|r| r.year);
    match years.next() {
        None => YearInterval::new(0, 0),
        Some(first) => years.fold(YearInterval::new(first, first), |span, year| {
            YearInterval::new(span.low.min(year), span.high.max(year))
        }),
    }
}

// ---------------------------------------------------------------------------
// Territory / year predicates
// ---------------------------------------------------------------------------

/// Unique territory names, sorted lexicographically ascending.
///
/// A pure function of the data: recomputed when the dataset changes, never
/// when the selection does.
pub fn distinct_territories(records: &[IndicatorRecord]) -> Vec<String> {
    let unique: BTreeSet<&str> = records.iter().map(|r| r.territory.as_str()).collect();
    unique.into_iter().map(str::to_string).collect()
}

/// Apply the territory and year predicates in one pass, preserving order.
///
/// An empty selection means "no territory filter", not "exclude
/// everything": with nothing selected every territory passes, subject only
/// to the year interval.
pub fn filter_records(
    records: &[IndicatorRecord],
    selected: &BTreeSet<String>,
    years: YearInterval,
) -> Vec<IndicatorRecord> {
    records
        .iter()
        .filter(|r| selected.is_empty() || selected.contains(&r.territory))
        .filter(|r| years.contains(r.year))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
