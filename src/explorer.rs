use std::collections::BTreeSet;

use crate::data::filter::{distinct_territories, filter_records, year_span, YearInterval};
use crate::data::model::IndicatorRecord;

// ---------------------------------------------------------------------------
// Explorer state
// ---------------------------------------------------------------------------

/// Change sink invoked with the freshly filtered rows on every
/// recomputation.
pub type FilterSink = Box<dyn FnMut(&[IndicatorRecord])>;

/// Composing state for the territory/year explorer, independent of any
/// rendering layer.
///
/// Owns the dataset, the selection criteria, and the cached filtered rows.
/// Selection state only changes through wholesale replacement via the
/// setters; every change refilters and notifies the sink. Filtering itself
/// is a pure function of `(records, selection, interval)`.
#[derive(Default)]
pub struct IndicatorExplorer {
    records: Vec<IndicatorRecord>,
    territories: Vec<String>,
    selected: BTreeSet<String>,
    years: YearInterval,
    filtered: Vec<IndicatorRecord>,
    on_filtered_change: Option<FilterSink>,
}

impl IndicatorExplorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the caller's change sink. It is invoked once immediately
    /// with the current filtered rows, then on every recomputation.
    pub fn on_filtered_change(&mut self, sink: impl FnMut(&[IndicatorRecord]) + 'static) {
        self.on_filtered_change = Some(Box::new(sink));
        self.notify();
    }

    /// Replace the dataset wholesale: recompute the distinct territories,
    /// reset the selection to empty and the interval to the observed span,
    /// then refilter.
    pub fn set_records(&mut self, records: Vec<IndicatorRecord>) {
        self.territories = distinct_territories(&records);
        self.years = year_span(&records);
        self.selected = BTreeSet::new();
        self.records = records;
        self.refilter();
    }

    /// Replace the territory selection and refilter. An empty set means
    /// "no territory filter".
    pub fn set_selection(&mut self, selected: BTreeSet<String>) {
        self.selected = selected;
        self.refilter();
    }

    /// Replace the year interval and refilter.
    pub fn set_year_interval(&mut self, years: YearInterval) {
        self.years = years;
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter_records(&self.records, &self.selected, self.years);
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(sink) = &mut self.on_filtered_change {
            sink(&self.filtered);
        }
    }

    /// The unfiltered dataset.
    pub fn records(&self) -> &[IndicatorRecord] {
        &self.records
    }

    /// Distinct territory names in the dataset, sorted ascending.
    pub fn territories(&self) -> &[String] {
        &self.territories
    }

    pub fn selection(&self) -> &BTreeSet<String> {
        &self.selected
    }

    pub fn year_interval(&self) -> YearInterval {
        self.years
    }

    /// Rows passing the current selection.
    pub fn filtered(&self) -> &[IndicatorRecord] {
        &self.filtered
    }
}

// ---------------------------------------------------------------------------
