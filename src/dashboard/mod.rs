//! Dashboard module
//!
//! Provides the page of charts and tables for the uploaded sales data,
//! the filter controls that narrow it down, and CSV downloads of each table.

mod cards;
mod charts;
mod export;
mod filter_form;
mod handlers;
mod tables;

pub use export::{
    get_category_csv, get_region_csv, get_sub_category_month_csv, get_time_series_csv,
};
pub use handlers::{get_dashboard_page, get_dashboard_partial};
