//! Route handlers that download the dashboard's aggregate tables as CSV.

use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;

use crate::{
    AppState, Error,
    dashboard::filter_form::FilterQuery,
    sales::{Column, DashboardReport, Panel, export_pivot_to_csv, export_to_csv},
};

const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Download the sales per category for the current filters.
pub async fn get_category_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let report = build_report(&state, query)?;
    let table = available(&report.by_category)?;

    csv_attachment("category.csv", export_to_csv(table)?)
}

/// Download the sales per region for the current filters.
pub async fn get_region_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let report = build_report(&state, query)?;

    csv_attachment("region.csv", export_to_csv(&report.by_region)?)
}

/// Download the monthly sales for the current filters.
pub async fn get_time_series_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let report = build_report(&state, query)?;

    csv_attachment("time_series.csv", export_to_csv(&report.by_month)?)
}

/// Download the sub-category by month pivot for the current filters.
pub async fn get_sub_category_month_csv(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let report = build_report(&state, query)?;
    let pivot = available(&report.sub_category_by_month)?;

    csv_attachment("sub_category_month.csv", export_pivot_to_csv(pivot)?)
}

fn build_report(state: &AppState, query: FilterQuery) -> Result<DashboardReport, Error> {
    let loaded = state.current_dataset()?;
    let criteria = query.into_criteria(loaded.dataset.date_bounds());

    Ok(DashboardReport::build(&loaded.dataset, criteria))
}

fn available<T>(panel: &Panel<T>) -> Result<&T, Error> {
    match panel {
        Panel::Available(value) => Ok(value),
        Panel::Unavailable { missing } => Err(missing_column(*missing)),
    }
}

fn missing_column(column: Column) -> Error {
    tracing::debug!("export requested without the {column} column");
    Error::MissingColumn(column.header().to_owned())
}

fn csv_attachment(file_name: &str, body: String) -> Result<Response, Error> {
    Ok((
        [
            (CONTENT_TYPE, CSV_CONTENT_TYPE.to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
