//! Date-range and cascading categorical filters.
//!
//! The categorical filters combine with logical AND, so the order they run in
//! never changes which rows survive. The cascade only matters for the choices
//! offered to the user: states are drawn from the rows left after the region
//! filter, and cities from the rows left after the state filter.

use std::collections::HashSet;

use time::Date;

use crate::sales::record::{Dataset, Dimension, SalesRecord};

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The last date in the range.
    pub end: Date,
}

impl DateRange {
    /// Create the range from `start` to `end`, inclusive.
    pub fn new(start: Date, end: Date) -> Self {
        Self { start, end }
    }

    /// Whether `date` falls within the range, including both ends.
    ///
    /// Always `false` when `start` is after `end`.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The user's selections for narrowing the dataset.
///
/// An empty set places no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// The order dates to keep, or `None` to keep every row.
    pub date_range: Option<DateRange>,
    /// The regions to keep.
    pub regions: HashSet<String>,
    /// The states to keep.
    pub states: HashSet<String>,
    /// The cities to keep.
    pub cities: HashSet<String>,
}

impl FilterCriteria {
    /// The categorical selections in the order they are applied.
    fn cascade(&self) -> [(Dimension, &HashSet<String>); 3] {
        [
            (Dimension::Region, &self.regions),
            (Dimension::State, &self.states),
            (Dimension::City, &self.cities),
        ]
    }
}

/// The choices offered for each cascading filter.
///
/// Values are distinct and appear in the order they are first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// The regions of the rows in the date range.
    pub regions: Vec<String>,
    /// The states within the selected regions.
    pub states: Vec<String>,
    /// The cities within the selected states.
    pub cities: Vec<String>,
}

/// Keep the rows with an order date between `start` and `end`, inclusive.
///
/// Rows without a parseable order date never match. If `start` is after
/// `end` the result is empty.
pub fn filter_by_date_range(dataset: &Dataset, start: Date, end: Date) -> Dataset {
    let range = DateRange::new(start, end);

    dataset.filtered(|record| record.order_date.is_some_and(|date| range.contains(date)))
}

/// Apply the region, state and city selections of `criteria`, in that order.
///
/// The date range of `criteria` is not applied, see [apply_filters].
pub fn filter_by_categorical_cascade(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    let mut filtered = dataset.clone();

    for (dimension, selection) in criteria.cascade() {
        filtered = filter_by_selection(&filtered, dimension, selection);
    }

    filtered
}

/// Apply the date range of `criteria`, if any, followed by the categorical cascade.
pub fn apply_filters(dataset: &Dataset, criteria: &FilterCriteria) -> Dataset {
    let dated = filter_by_optional_date_range(dataset, criteria.date_range);

    filter_by_categorical_cascade(&dated, criteria)
}

/// The choices to offer for each filter given the current selections.
///
/// Regions come from the date-filtered rows, states from the rows matching the
/// selected regions, and cities from the rows matching the selected states.
pub fn filter_options(dataset: &Dataset, criteria: &FilterCriteria) -> FilterOptions {
    let mut filtered = filter_by_optional_date_range(dataset, criteria.date_range);
    let mut options = [Vec::new(), Vec::new(), Vec::new()];

    for ((dimension, selection), values) in criteria.cascade().into_iter().zip(options.iter_mut()) {
        *values = distinct_values(&filtered, dimension);
        filtered = filter_by_selection(&filtered, dimension, selection);
    }

    let [regions, states, cities] = options;

    FilterOptions {
        regions,
        states,
        cities,
    }
}

fn filter_by_optional_date_range(dataset: &Dataset, date_range: Option<DateRange>) -> Dataset {
    match date_range {
        Some(range) => filter_by_date_range(dataset, range.start, range.end),
        None => dataset.clone(),
    }
}

fn filter_by_selection(
    dataset: &Dataset,
    dimension: Dimension,
    selection: &HashSet<String>,
) -> Dataset {
    if selection.is_empty() {
        return dataset.clone();
    }

    dataset.filtered(|record: &SalesRecord| selection.contains(dimension.value_of(record)))
}

fn distinct_values(dataset: &Dataset, dimension: Dimension) -> Vec<String> {
    let mut seen = HashSet::new();

    dataset
        .records()
        .iter()
        .map(|record| dimension.value_of(record))
        .filter(|value| seen.insert(*value))
        .map(str::to_owned)
        .collect()
}
