//! Table views for dashboard data display.
//!
//! Each aggregate table is shown with a link that downloads the same table
//! as CSV for the current filters.

use maud::{Markup, html};

use crate::{
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_ROW_STYLE, format_currency},
    sales::{AggregateTable, MonthPeriod, PivotTable, month_abbreviation},
};

const TABLE_STYLE: &str = "w-full text-sm text-left text-gray-500 dark:text-gray-400";
const TABLE_HEAD_STYLE: &str =
    "text-xs text-gray-900 uppercase bg-gray-100 dark:bg-gray-700 dark:text-gray-400";
const TABLE_HEADER_CELL_STYLE: &str = "px-3 py-3 text-center min-w-[100px]";
const TABLE_HEADER_FIRST_CELL_STYLE: &str =
    "px-3 py-3 sticky left-0 bg-gray-100 dark:bg-gray-700 z-10 font-semibold";
const TABLE_STICKY_CELL_STYLE: &str = "px-3 py-4 font-medium text-gray-900 dark:text-white sticky left-0 bg-white dark:bg-gray-800 z-10";
const TABLE_DATA_CELL_STYLE: &str = "px-3 py-4 text-center whitespace-nowrap";

/// The RGB components of the pivot table's background gradient.
const GRADIENT_RGB: (u8, u8, u8) = (37, 99, 235);

/// Renders a two column table of `table`'s groups and totals.
pub(super) fn aggregate_table_view(
    title: &str,
    table: &AggregateTable<String>,
    download_url: &str,
) -> Markup {
    html! {
        div {
            (table_heading(title, download_url))

            div class="overflow-x-auto rounded-lg shadow" {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEAD_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_CELL_STYLE) { (table.key_column()) }
                            th scope="col" class=(TABLE_CELL_STYLE) { (table.measure_column()) }
                        }
                    }
                    tbody {
                        @for row in table.rows() {
                            tr class=(TABLE_ROW_STYLE) {
                                td class=(TABLE_CELL_STYLE) { (row.key) }
                                td class=(TABLE_CELL_STYLE) { (format_currency(row.value)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the monthly totals transposed so each month is a column.
pub(super) fn time_series_table_view(
    table: &AggregateTable<MonthPeriod>,
    download_url: &str,
) -> Markup {
    html! {
        div class="xl:col-span-2" {
            (table_heading("Monthly Sales", download_url))

            div class="overflow-x-auto rounded-lg shadow" {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEAD_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_HEADER_FIRST_CELL_STYLE) {
                                (table.key_column())
                            }
                            @for row in table.rows() {
                                th scope="col" class=(TABLE_HEADER_CELL_STYLE) { (row.key) }
                            }
                        }
                    }
                    tbody {
                        tr class=(TABLE_ROW_STYLE) {
                            th scope="row" class=(TABLE_STICKY_CELL_STYLE) {
                                (table.measure_column())
                            }
                            @for row in table.rows() {
                                td class=(TABLE_DATA_CELL_STYLE) { (format_currency(row.value)) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the sub-category by month pivot with a blue background that
/// deepens with the cell's share of the largest value.
pub(super) fn pivot_table_view(pivot: &PivotTable, download_url: &str) -> Markup {
    let max_value = pivot.max_value().unwrap_or_default();

    html! {
        div class="xl:col-span-2" {
            (table_heading("Sub-Category Sales by Month", download_url))

            div class="overflow-x-auto rounded-lg shadow" {
                table class=(TABLE_STYLE) {
                    thead class=(TABLE_HEAD_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_HEADER_FIRST_CELL_STYLE) {
                                (PivotTable::ROW_COLUMN)
                            }
                            @for month in pivot.columns() {
                                th scope="col" class=(TABLE_HEADER_CELL_STYLE) {
                                    (month_abbreviation(*month))
                                }
                            }
                        }
                    }
                    tbody {
                        @for (row_key, cells) in pivot.row_keys().iter().zip(pivot.cells()) {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class=(TABLE_STICKY_CELL_STYLE) { (row_key) }
                                @for value in cells {
                                    td
                                        class=(TABLE_DATA_CELL_STYLE)
                                        style=(gradient_style(*value, max_value))
                                    {
                                        (format_currency(*value))
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn table_heading(title: &str, download_url: &str) -> Markup {
    html! {
        div class="flex justify-between items-baseline mb-4" {
            h3 class="text-xl font-semibold" { (title) }
            a href=(download_url) download class=(LINK_STYLE) { "Download CSV" }
        }
    }
}

/// The inline background style for a pivot cell.
///
/// Values at or below zero get no background.
fn gradient_style(value: f64, max_value: f64) -> String {
    let alpha = if max_value > 0.0 {
        (value / max_value).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (red, green, blue) = GRADIENT_RGB;

    format!("background-color: rgba({red}, {green}, {blue}, {alpha:.2});")
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::{
        dashboard::tables::{
            aggregate_table_view, gradient_style, pivot_table_view, time_series_table_view,
        },
        sales::{
            aggregate_by_month, aggregate_by_region, aggregate_by_sub_category_and_month,
            test_utils::superstore_sample,
        },
    };

    fn texts(html: &Html, selector: &str) -> Vec<String> {
        html.select(&Selector::parse(selector).unwrap())
            .map(|element| element.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[test]
    fn region_table_lists_totals_and_download_link() {
        let table = aggregate_by_region(&superstore_sample());

        let html = Html::parse_fragment(
            &aggregate_table_view("Sales by Region", &table, "/api/export/region.csv?")
                .into_string(),
        );

        assert_eq!(texts(&html, "thead th"), ["Region", "Sales"]);
        assert_eq!(
            texts(&html, "tbody td"),
            [
                "South", "$993.90", "West", "$64.62", "East", "$100.00", "Central", "$22.50"
            ]
        );
        let link = html
            .select(&Selector::parse("a[download]").unwrap())
            .next()
            .expect("No download link found");
        assert_eq!(link.value().attr("href"), Some("/api/export/region.csv?"));
    }

    #[test]
    fn time_series_table_has_one_column_per_month() {
        let table = aggregate_by_month(&superstore_sample());

        let html =
            Html::parse_fragment(&time_series_table_view(&table, "/download").into_string());

        assert_eq!(
            texts(&html, "thead th"),
            ["month_year", "2022 : Jun", "2022 : Nov", "2023 : Jan", "2023 : Feb"]
        );
        assert_eq!(
            texts(&html, "tbody td"),
            ["$14.62", "$993.90", "$100.00", "$72.50"]
        );
    }

    #[test]
    fn pivot_cells_are_shaded_by_value() {
        let pivot = aggregate_by_sub_category_and_month(&superstore_sample());

        let html = Html::parse_fragment(&pivot_table_view(&pivot, "/download").into_string());

        let styles: Vec<&str> = html
            .select(&Selector::parse("tbody td").unwrap())
            .filter_map(|cell| cell.value().attr("style"))
            .collect();
        assert_eq!(styles.len(), pivot.row_keys().len() * pivot.columns().len());
        assert!(styles.contains(&"background-color: rgba(37, 99, 235, 1.00);"));
        assert!(styles.contains(&"background-color: rgba(37, 99, 235, 0.00);"));
    }

    #[test]
    fn gradient_is_transparent_without_positive_values() {
        assert_eq!(
            gradient_style(5.0, 0.0),
            "background-color: rgba(37, 99, 235, 0.00);"
        );
        assert_eq!(
            gradient_style(-5.0, 10.0),
            "background-color: rgba(37, 99, 235, 0.00);"
        );
        assert_eq!(
            gradient_style(5.0, 10.0),
            "background-color: rgba(37, 99, 235, 0.50);"
        );
    }
}
