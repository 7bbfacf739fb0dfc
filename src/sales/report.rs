//! Everything the dashboard shows for one set of filter criteria.

use crate::sales::{
    aggregation::{
        AggregateTable, MonthPeriod, PivotTable, ScatterPoint, TreemapNode, aggregate_by_category,
        aggregate_by_month, aggregate_by_region, aggregate_by_sub_category_and_month,
        aggregate_hierarchy, sales_profit_points,
    },
    filter::{DateRange, FilterCriteria, FilterOptions, apply_filters, filter_options},
    record::{Column, Columns, Dataset},
};

/// A dashboard panel that may be disabled by a missing optional column.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    /// Every column the panel needs was uploaded.
    Available(T),
    /// The panel cannot be drawn without the `missing` column.
    Unavailable {
        /// The first needed column the file lacked.
        missing: Column,
    },
}

impl<T> Panel<T> {
    /// Build the panel with `build` if every column in `needed` is present.
    fn build(columns: Columns, needed: &[Column], build: impl FnOnce() -> T) -> Self {
        match columns.first_missing(needed) {
            Some(missing) => Panel::Unavailable { missing },
            None => Panel::Available(build()),
        }
    }

    /// The panel's data, if it is available.
    pub fn as_available(&self) -> Option<&T> {
        match self {
            Panel::Available(value) => Some(value),
            Panel::Unavailable { .. } => None,
        }
    }
}

/// The filtered aggregates and filter state for a single render of the
/// dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardReport {
    /// The earliest and latest order dates in the unfiltered dataset.
    pub date_bounds: Option<DateRange>,
    /// The criteria that were applied, with the date range filled in from
    /// `date_bounds` when none was given.
    pub criteria: FilterCriteria,
    /// The cascading choices for the filter form.
    pub options: FilterOptions,
    /// The number of rows that passed the filters.
    pub row_count: usize,
    /// The summed sales of the filtered rows.
    pub total_sales: f64,
    /// Needs the category column.
    pub by_category: Panel<AggregateTable<String>>,
    /// Sales per region.
    pub by_region: AggregateTable<String>,
    /// Sales per month in chronological order.
    pub by_month: AggregateTable<MonthPeriod>,
    /// Needs the category and sub-category columns.
    pub hierarchy: Panel<Vec<TreemapNode>>,
    /// Needs the sub-category column.
    pub sub_category_by_month: Panel<PivotTable>,
    /// Needs the profit and quantity columns.
    pub sales_vs_profit: Panel<Vec<ScatterPoint>>,
}

impl DashboardReport {
    /// Filter `dataset` with `criteria` and compute every panel.
    ///
    /// A missing date range defaults to the full span of order dates in the
    /// dataset.
    pub fn build(dataset: &Dataset, criteria: FilterCriteria) -> Self {
        let date_bounds = dataset.date_bounds();
        let criteria = FilterCriteria {
            date_range: criteria.date_range.or(date_bounds),
            ..criteria
        };

        let options = filter_options(dataset, &criteria);
        let filtered = apply_filters(dataset, &criteria);
        let columns = filtered.columns();

        tracing::debug!(
            "filtered {} of {} rows with {criteria:?}",
            filtered.len(),
            dataset.len()
        );

        Self {
            date_bounds,
            options,
            row_count: filtered.len(),
            total_sales: filtered.total_sales(),
            by_category: Panel::build(columns, &[Column::Category], || {
                aggregate_by_category(&filtered)
            }),
            by_region: aggregate_by_region(&filtered),
            by_month: aggregate_by_month(&filtered),
            hierarchy: Panel::build(columns, &[Column::Category, Column::SubCategory], || {
                aggregate_hierarchy(&filtered)
            }),
            sub_category_by_month: Panel::build(columns, &[Column::SubCategory], || {
                aggregate_by_sub_category_and_month(&filtered)
            }),
            sales_vs_profit: Panel::build(columns, &[Column::Profit, Column::Quantity], || {
                sales_profit_points(&filtered)
            }),
            criteria,
        }
    }

    /// Whether the filters excluded every row.
    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::macros::date;

    use crate::sales::{
        Column, Columns, DashboardReport, Dataset, DateRange, FilterCriteria, Panel,
        test_utils::superstore_sample,
    };

    #[test]
    fn defaults_date_range_to_dataset_bounds() {
        let data = superstore_sample();

        let report = DashboardReport::build(&data, FilterCriteria::default());

        let bounds = DateRange::new(date!(2022 - 06 - 12), date!(2023 - 02 - 21));
        assert_eq!(report.date_bounds, Some(bounds));
        assert_eq!(report.criteria.date_range, Some(bounds));
        assert_eq!(report.row_count, data.len());
        assert_eq!(report.total_sales, data.total_sales());
        assert!(!report.is_empty());
    }

    #[test]
    fn every_panel_is_available_with_all_columns() {
        let report = DashboardReport::build(&superstore_sample(), FilterCriteria::default());

        assert!(report.by_category.as_available().is_some());
        assert!(report.hierarchy.as_available().is_some());
        assert!(report.sub_category_by_month.as_available().is_some());
        assert_eq!(
            report.sales_vs_profit.as_available().map(|points| points.len()),
            Some(6)
        );
    }

    #[test]
    fn missing_optional_columns_disable_their_panels() {
        let sample = superstore_sample();
        let columns = Columns::all()
            .without(Column::Category)
            .without(Column::Profit);
        let data = Dataset::new(sample.records().to_vec(), columns);

        let report = DashboardReport::build(&data, FilterCriteria::default());

        assert_eq!(
            report.by_category,
            Panel::Unavailable {
                missing: Column::Category
            }
        );
        assert_eq!(
            report.hierarchy,
            Panel::Unavailable {
                missing: Column::Category
            }
        );
        assert_eq!(
            report.sales_vs_profit,
            Panel::Unavailable {
                missing: Column::Profit
            }
        );
        assert!(report.sub_category_by_month.as_available().is_some());
        assert_eq!(report.by_region.len(), 4);
    }

    #[test]
    fn filters_that_exclude_everything_give_an_empty_report() {
        let criteria = FilterCriteria {
            regions: HashSet::from(["Atlantis".to_owned()]),
            ..Default::default()
        };

        let report = DashboardReport::build(&superstore_sample(), criteria);

        assert!(report.is_empty());
        assert_eq!(report.total_sales, 0.0);
        assert!(report.by_region.is_empty());
        assert!(report.by_month.is_empty());
        assert_eq!(report.options.regions.len(), 4);
        assert!(report.options.states.is_empty());
    }

    #[test]
    fn explicit_end_date_is_respected() {
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(date!(2023 - 01 - 01), date!(2023 - 02 - 15))),
            ..Default::default()
        };

        let report = DashboardReport::build(&superstore_sample(), criteria);

        assert_eq!(report.row_count, 2);
        assert_eq!(report.total_sales, 150.0);
    }
}
