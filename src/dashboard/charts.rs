//! Chart generation and rendering for the dashboard.
//!
//! Charts are built as ECharts options and initialised by an inline script
//! that runs whenever the dashboard content is rendered or swapped in.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Label, LabelPosition,
        Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};
use serde_json::{Value, json};

use crate::sales::{AggregateTable, MonthPeriod, ScatterPoint, TreemapNode};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders a chart container and the script that draws into it.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="min-h-[380px] rounded dark:bg-gray-100"
        {}
    )
}

/// Generates the JavaScript that initialises `charts`.
///
/// The script is placed in the page body rather than the head so that htmx
/// runs it again after swapping in new dashboard content.
pub(super) fn charts_script(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    if (!chartDom) {{
                        return;
                    }}
                    const existing = echarts.getInstanceByDom(chartDom);
                    if (existing) {{
                        existing.dispose();
                    }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        script { (PreEscaped(script_content)) }
    )
}

/// Bar chart of sales per category with the total printed above each bar.
pub(super) fn category_chart(table: &AggregateTable<String>) -> Chart {
    let (labels, values) = labels_and_values(table);

    Chart::new()
        .title(Title::new().text("Sales by Category"))
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(
            Bar::new()
                .name(table.measure_column())
                .label(
                    Label::new()
                        .show(true)
                        .position(LabelPosition::Top)
                        .formatter(currency_label_formatter()),
                )
                .data(values),
        )
}

/// Donut chart of each region's share of sales.
pub(super) fn region_chart(table: &AggregateTable<String>) -> Chart {
    let data: Vec<(f64, &str)> = table
        .rows()
        .iter()
        .map(|row| (row.value, row.key.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text("Sales by Region"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .series(
            Pie::new()
                .name(table.measure_column())
                .radius(vec!["50%", "70%"])
                .data(data),
        )
}

/// Line chart of total sales per month in chronological order.
pub(super) fn time_series_chart(table: &AggregateTable<MonthPeriod>) -> Chart {
    let (labels, values) = labels_and_values(table);

    Chart::new()
        .title(Title::new().text("Sales over Time"))
        .tooltip(currency_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name(table.measure_column()).data(values))
}

/// Treemap of sales nested by region, category and sub-category.
pub(super) fn treemap_options(hierarchy: &[TreemapNode]) -> Value {
    json!({
        "title": { "text": "Sales by Region, Category and Sub-Category" },
        "tooltip": {},
        "series": [{
            "type": "treemap",
            "name": "Sales",
            "leafDepth": 2,
            "roam": false,
            "label": { "show": true, "formatter": "{b}" },
            "upperLabel": { "show": true, "height": 24 },
            "levels": [
                { "itemStyle": { "borderWidth": 2, "gapWidth": 2 } },
                { "itemStyle": { "borderWidth": 1, "gapWidth": 1 } },
                { "itemStyle": { "gapWidth": 1 } }
            ],
            "data": hierarchy.iter().map(treemap_node).collect::<Vec<_>>(),
        }],
    })
}

fn treemap_node(node: &TreemapNode) -> Value {
    if node.children.is_empty() {
        json!({ "name": node.name, "value": node.value })
    } else {
        json!({
            "name": node.name,
            "value": node.value,
            "children": node.children.iter().map(treemap_node).collect::<Vec<_>>(),
        })
    }
}

/// Scatter plot of sales against profit, with each point sized by the
/// quantity ordered.
pub(super) fn scatter_options(points: &[ScatterPoint]) -> Value {
    let (min_quantity, max_quantity) = points
        .iter()
        .map(|point| point.quantity)
        .fold(None, |bounds: Option<(i64, i64)>, quantity| match bounds {
            Some((min, max)) => Some((min.min(quantity), max.max(quantity))),
            None => Some((quantity, quantity)),
        })
        .unwrap_or((0, 1));

    let data: Vec<[Value; 3]> = points
        .iter()
        .map(|point| [json!(point.sales), json!(point.profit), json!(point.quantity)])
        .collect();

    json!({
        "title": { "text": "Sales vs Profit" },
        "tooltip": { "trigger": "item" },
        "grid": { "left": "3%", "right": "4%", "bottom": "3%", "containLabel": true },
        "xAxis": { "type": "value", "name": "Sales", "scale": true },
        "yAxis": { "type": "value", "name": "Profit", "scale": true },
        "visualMap": {
            "show": false,
            "dimension": 2,
            "min": min_quantity,
            "max": max_quantity.max(min_quantity.saturating_add(1)),
            "inRange": { "symbolSize": [6, 30] },
        },
        "series": [{
            "type": "scatter",
            "name": "Orders",
            "data": data,
        }],
    })
}

fn labels_and_values<K: ToString>(table: &AggregateTable<K>) -> (Vec<String>, Vec<f64>) {
    table
        .rows()
        .iter()
        .map(|row| (row.key.to_string(), row.value))
        .unzip()
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn currency_label_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "params",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return currencyFormatter.format(params.value);",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
