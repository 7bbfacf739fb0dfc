//! Sales data pipeline
//!
//! Loads an uploaded sales table into a typed [Dataset], narrows it with
//! [FilterCriteria], and derives the aggregate tables that feed each
//! dashboard panel. Everything in this module is a pure transformation of
//! in-memory data; the web layer owns the event loop and calls
//! [DashboardReport::build] on every filter change.

mod aggregation;
mod export;
mod filter;
mod loader;
mod record;
mod report;

#[cfg(test)]
pub(crate) mod test_utils;

pub use aggregation::{
    AggregateRow, AggregateTable, Measure, MonthPeriod, PivotTable, ScatterPoint, TreemapNode,
    aggregate_by, aggregate_by_category, aggregate_by_month, aggregate_by_region,
    aggregate_by_sub_category_and_month, aggregate_hierarchy, month_abbreviation,
    sales_profit_points,
};
pub use export::{export_pivot_to_csv, export_to_csv};
pub use filter::{
    DateRange, FilterCriteria, FilterOptions, apply_filters, filter_by_categorical_cascade,
    filter_by_date_range, filter_options,
};
pub use loader::{FileFormat, load_dataset};
pub use record::{Column, Columns, Dataset, Dimension, SalesRecord};
pub use report::{DashboardReport, Panel};
