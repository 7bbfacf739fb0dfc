//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for the full dashboard page and the htmx partial
//! - HTML view functions for rendering the dashboard UI

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};

use crate::{
    AppState, Error,
    app_state::LoadedDataset,
    dashboard::{
        cards::summary_cards_view,
        charts::{
            DashboardChart, category_chart, chart_view, charts_script, region_chart,
            scatter_options, time_series_chart, treemap_options,
        },
        filter_form::{FilterQuery, filter_form_view},
        tables::{aggregate_table_view, pivot_table_view, time_series_table_view},
    },
    endpoints,
    html::{HeadElement, base, link},
    navigation::NavBar,
    sales::{Column, DashboardReport, Panel},
};

/// Display the dashboard for the uploaded dataset, filtered by the query.
///
/// Shows a prompt to upload a file when no dataset has been loaded.
pub async fn get_dashboard_page(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Result<Response, Error> {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let loaded = match state.current_dataset() {
        Ok(loaded) => loaded,
        Err(Error::NoDataset) => return Ok(dashboard_no_data_view(nav_bar).into_response()),
        Err(error) => return Err(error),
    };

    let report = build_report(&loaded, query);

    Ok(dashboard_view(nav_bar, &loaded.file_name, &report).into_response())
}

/// Render the dashboard content for new filter selections.
///
/// Errors are returned as alerts so that htmx can show them without
/// replacing the page.
pub async fn get_dashboard_partial(
    State(state): State<AppState>,
    Query(query): Query<FilterQuery>,
) -> Response {
    let loaded = match state.current_dataset() {
        Ok(loaded) => loaded,
        Err(error) => return error.into_alert_response(),
    };

    let report = build_report(&loaded, query);

    dashboard_content_partial(&loaded.file_name, &report).into_response()
}

fn build_report(loaded: &LoadedDataset, query: FilterQuery) -> DashboardReport {
    let criteria = query.into_criteria(loaded.dataset.date_bounds());

    DashboardReport::build(&loaded.dataset, criteria)
}

/// Renders the dashboard page when no file has been uploaded.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let upload_link = link(endpoints::UPLOAD_VIEW, "upload a CSV or Excel file");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Charts will show up here once you " (upload_link) " of sales records."
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the full dashboard page around the content partial.
fn dashboard_view(nav_bar: NavBar, file_name: &str, report: &DashboardReport) -> Markup {
    let nav_bar = nav_bar.into_html();

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (dashboard_content_partial(file_name, report))
        }
    );

    let scripts = [HeadElement::ScriptLink(
        "/static/echarts.6.0.0.min.js".to_owned(),
    )];

    base("Dashboard", &scripts, &content)
}

/// Renders the filter form, summary cards, charts and tables.
///
/// This is swapped into `#dashboard-content` whenever a filter changes.
fn dashboard_content_partial(file_name: &str, report: &DashboardReport) -> Markup {
    let charts = build_dashboard_charts(report);
    let query = FilterQuery::query_string(&report.criteria);
    let download_url = |endpoint: &str| format!("{endpoint}?{query}");

    html!(
        (filter_form_view(report))

        (summary_cards_view(file_name, report))

        @if report.is_empty() {
            (no_matching_data_view())
        } @else {
            section
                id="charts"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (panel_view(&report.by_category, |_| {
                        chart_view(&charts.category)
                    }))

                    (chart_view(&charts.region))

                    div class="xl:col-span-2"
                    {
                        (chart_view(&charts.time_series))
                    }

                    (panel_view(&report.hierarchy, |_| {
                        chart_view(&charts.treemap)
                    }))

                    (panel_view(&report.sales_vs_profit, |_| {
                        chart_view(&charts.scatter)
                    }))
                }
            }

            section
                id="tables"
                class="w-full mx-auto mb-4"
            {
                div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
                {
                    (panel_view(&report.by_category, |table| {
                        aggregate_table_view(
                            "Sales by Category",
                            table,
                            &download_url(endpoints::EXPORT_CATEGORY),
                        )
                    }))

                    (aggregate_table_view(
                        "Sales by Region",
                        &report.by_region,
                        &download_url(endpoints::EXPORT_REGION),
                    ))

                    (time_series_table_view(
                        &report.by_month,
                        &download_url(endpoints::EXPORT_TIME_SERIES),
                    ))

                    (panel_view(&report.sub_category_by_month, |pivot| {
                        pivot_table_view(
                            pivot,
                            &download_url(endpoints::EXPORT_SUB_CATEGORY_MONTH),
                        )
                    }))
                }
            }

            (charts_script(&charts.available()))
        }
    )
}

/// The ECharts options for every chart on the dashboard.
struct DashboardCharts {
    category: DashboardChart,
    region: DashboardChart,
    time_series: DashboardChart,
    treemap: DashboardChart,
    scatter: DashboardChart,
    /// The IDs of charts whose panel is unavailable and so are not rendered.
    hidden: Vec<&'static str>,
}

impl DashboardCharts {
    /// The charts that have a container on the page.
    fn available(self) -> Vec<DashboardChart> {
        let hidden = self.hidden;

        [
            self.category,
            self.region,
            self.time_series,
            self.treemap,
            self.scatter,
        ]
        .into_iter()
        .filter(|chart| !hidden.contains(&chart.id))
        .collect()
    }
}

/// Creates the dashboard charts from the report.
///
/// The chart options are serialized to JSON for ECharts consumption.
fn build_dashboard_charts(report: &DashboardReport) -> DashboardCharts {
    let mut hidden = Vec::new();

    let mut options_or_hide = |id: &'static str, options: Option<String>| {
        let options = options.unwrap_or_else(|| {
            hidden.push(id);
            "{}".to_owned()
        });

        DashboardChart { id, options }
    };

    let category = options_or_hide(
        "category-chart",
        report
            .by_category
            .as_available()
            .map(|table| category_chart(table).to_string()),
    );
    let treemap = options_or_hide(
        "treemap-chart",
        report
            .hierarchy
            .as_available()
            .map(|hierarchy| treemap_options(hierarchy).to_string()),
    );
    let scatter = options_or_hide(
        "scatter-chart",
        report
            .sales_vs_profit
            .as_available()
            .map(|points| scatter_options(points).to_string()),
    );

    DashboardCharts {
        category,
        region: DashboardChart {
            id: "region-chart",
            options: region_chart(&report.by_region).to_string(),
        },
        time_series: DashboardChart {
            id: "time-series-chart",
            options: time_series_chart(&report.by_month).to_string(),
        },
        treemap,
        scatter,
        hidden,
    }
}

/// Renders `view` for an available panel, or a note naming the missing column.
fn panel_view<T>(panel: &Panel<T>, view: impl FnOnce(&T) -> Markup) -> Markup {
    match panel {
        Panel::Available(value) => view(value),
        Panel::Unavailable { missing } => missing_column_view(*missing),
    }
}

fn missing_column_view(missing: Column) -> Markup {
    html!(
        div
            class="min-h-[120px] flex items-center justify-center rounded-lg
                border border-dashed border-gray-300 dark:border-gray-600
                text-sm text-gray-600 dark:text-gray-400 p-4"
        {
            "Add a \"" (missing.header()) "\" column to your file to see this panel."
        }
    )
}

fn no_matching_data_view() -> Markup {
    html!(
        section
            id="no-data"
            class="w-full mx-auto mb-4 p-8 text-center rounded-lg
                bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            h3 class="text-xl font-semibold mb-2" { "No data" }

            p class="text-gray-600 dark:text-gray-400"
            {
                "No sales match the selected filters. Try widening the date range
                or clearing some of the selections."
            }
        }
    )
}
