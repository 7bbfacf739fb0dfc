//! Summary cards shown above the dashboard charts.

use maud::{Markup, html};

use crate::{html::format_currency, sales::DashboardReport};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";

/// Renders the file name, filtered row count and total sales.
pub(super) fn summary_cards_view(file_name: &str, report: &DashboardReport) -> Markup {
    html! {
        section id="summary" class="w-full mx-auto mb-4" {
            div class="grid grid-cols-1 md:grid-cols-3 gap-4" {
                (card("File", file_name))
                (card("Rows", &report.row_count.to_string()))
                (card("Total Sales", &format_currency(report.total_sales)))
            }
        }
    }
}

fn card(label: &str, value: &str) -> Markup {
    html! {
        div class=(CARD_STYLE) {
            div class="text-sm text-gray-600 dark:text-gray-400 mb-1" { (label) }
            div class="text-2xl font-bold truncate" title=(value) { (value) }
        }
    }
}
