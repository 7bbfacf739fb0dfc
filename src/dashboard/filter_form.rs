//! The dashboard filter controls and the query string they submit.

use std::collections::HashSet;

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{
    endpoints,
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    sales::{DashboardReport, DateRange, FilterCriteria},
};

const ISO_DATE: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// The filter selections submitted by the dashboard form.
///
/// Region, state and city may each be repeated, e.g.
/// `?region=West&region=East&start=2023-01-01`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct FilterQuery {
    /// The first order date to include, as `YYYY-MM-DD`.
    #[serde(default)]
    pub start: Option<String>,
    /// The last order date to include, as `YYYY-MM-DD`.
    #[serde(default)]
    pub end: Option<String>,
    /// The selected regions, empty for all.
    #[serde(default)]
    pub region: Vec<String>,
    /// The selected states, empty for all.
    #[serde(default)]
    pub state: Vec<String>,
    /// The selected cities, empty for all.
    #[serde(default)]
    pub city: Vec<String>,
}

impl FilterQuery {
    /// Convert the query into filter criteria.
    ///
    /// A missing or invalid start or end date falls back to the matching end
    /// of `bounds`.
    pub fn into_criteria(self, bounds: Option<DateRange>) -> FilterCriteria {
        let start = parse_iso_date(self.start.as_deref()).or(bounds.map(|range| range.start));
        let end = parse_iso_date(self.end.as_deref()).or(bounds.map(|range| range.end));

        let date_range = match (start, end) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)),
            _ => None,
        };

        FilterCriteria {
            date_range,
            regions: non_empty(self.region),
            states: non_empty(self.state),
            cities: non_empty(self.city),
        }
    }

    /// The query string that reproduces `criteria`, without the leading `?`.
    pub fn query_string(criteria: &FilterCriteria) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if let Some(range) = criteria.date_range {
            pairs.push(("start", format_iso_date(range.start)));
            pairs.push(("end", format_iso_date(range.end)));
        }

        for (key, values) in [
            ("region", &criteria.regions),
            ("state", &criteria.states),
            ("city", &criteria.cities),
        ] {
            let mut values: Vec<&String> = values.iter().collect();
            values.sort();
            pairs.extend(values.into_iter().map(|value| (key, value.clone())));
        }

        serde_urlencoded::to_string(&pairs)
            .inspect_err(|error| tracing::error!("could not encode filter query: {error}"))
            .unwrap_or_default()
    }
}

fn non_empty(values: Vec<String>) -> HashSet<String> {
    values
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .collect()
}

fn parse_iso_date(text: Option<&str>) -> Option<Date> {
    let text = text?.trim();

    if text.is_empty() {
        return None;
    }

    Date::parse(text, ISO_DATE)
        .inspect_err(|error| tracing::debug!("ignoring invalid date {text:?}: {error}"))
        .ok()
}

fn format_iso_date(date: Date) -> String {
    date.format(ISO_DATE).unwrap_or_else(|_| date.to_string())
}

/// Render the date inputs and the cascading region, state and city
/// checkboxes.
///
/// Any change re-submits the form and replaces the dashboard content.
pub(super) fn filter_form_view(report: &DashboardReport) -> Markup {
    let range = report.criteria.date_range;
    let bounds = report.date_bounds;

    html! {
        form
            id="filters"
            hx-get=(endpoints::DASHBOARD_API)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            hx-trigger="change"
            class="w-full bg-gray-50 dark:bg-gray-800 p-4 rounded-lg mb-4"
        {
            h3 class="text-xl font-semibold mb-4" { "Filters" }

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 mb-4"
            {
                div
                {
                    label for="start" class=(FORM_LABEL_STYLE) { "Start date" }
                    input
                        type="date"
                        id="start"
                        name="start"
                        value=[range.map(|range| format_iso_date(range.start))]
                        min=[bounds.map(|bounds| format_iso_date(bounds.start))]
                        max=[bounds.map(|bounds| format_iso_date(bounds.end))]
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end" class=(FORM_LABEL_STYLE) { "End date" }
                    input
                        type="date"
                        id="end"
                        name="end"
                        value=[range.map(|range| format_iso_date(range.end))]
                        min=[bounds.map(|bounds| format_iso_date(bounds.start))]
                        max=[bounds.map(|bounds| format_iso_date(bounds.end))]
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4"
            {
                (checkbox_group("Region", "region", &report.options.regions, &report.criteria.regions))
                (checkbox_group("State", "state", &report.options.states, &report.criteria.states))
                (checkbox_group("City", "city", &report.options.cities, &report.criteria.cities))
            }
        }
    }
}

/// A fieldset of checkboxes, one per option.
///
/// Selected values that are no longer offered are still shown, checked, so
/// they can be cleared.
fn checkbox_group(
    legend: &str,
    name: &str,
    options: &[String],
    selected: &HashSet<String>,
) -> Markup {
    let mut stale: Vec<&String> = selected
        .iter()
        .filter(|value| !options.contains(value))
        .collect();
    stale.sort();

    let values = options.iter().chain(stale);

    html! {
        fieldset
        {
            legend class=(FORM_LABEL_STYLE) { (legend) }

            div class="max-h-48 overflow-y-auto space-y-1"
            {
                @for value in values {
                    label class="flex items-center space-x-2 text-sm"
                    {
                        input
                            type="checkbox"
                            name=(name)
                            value=(value)
                            checked[selected.contains(value)]
                            class="rounded-sm border-gray-300 text-blue-600 shadow-xs
                                focus:border-blue-300 focus:ring-3 focus:ring-blue-200/50";

                        span { (value) }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use time::macros::date;

    use crate::{
        dashboard::filter_form::FilterQuery,
        sales::{DateRange, FilterCriteria},
    };

    fn bounds() -> Option<DateRange> {
        Some(DateRange::new(date!(2022 - 01 - 01), date!(2023 - 12 - 31)))
    }

    #[test]
    fn query_handles_repeated_keys() {
        let query: FilterQuery =
            serde_html_form::from_str("region=West&region=East&state=California&start=2023-01-01")
                .unwrap();

        assert_eq!(query.region, vec!["West", "East"]);
        assert_eq!(query.state, vec!["California"]);
        assert!(query.city.is_empty());
        assert_eq!(query.start.as_deref(), Some("2023-01-01"));
        assert_eq!(query.end, None);
    }

    #[test]
    fn empty_query_defaults_to_bounds_and_no_selections() {
        let query: FilterQuery = serde_html_form::from_str("").unwrap();

        let criteria = query.into_criteria(bounds());

        assert_eq!(
            criteria,
            FilterCriteria {
                date_range: bounds(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn missing_end_date_falls_back_to_dataset_end() {
        let query = FilterQuery {
            start: Some("2023-03-01".to_owned()),
            end: Some("not a date".to_owned()),
            ..Default::default()
        };

        let criteria = query.into_criteria(bounds());

        assert_eq!(
            criteria.date_range,
            Some(DateRange::new(date!(2023 - 03 - 01), date!(2023 - 12 - 31)))
        );
    }

    #[test]
    fn no_dates_without_bounds() {
        let query = FilterQuery {
            start: Some("2023-03-01".to_owned()),
            ..Default::default()
        };

        assert_eq!(query.into_criteria(None).date_range, None);
    }

    #[test]
    fn query_string_round_trips_criteria() {
        let criteria = FilterCriteria {
            date_range: Some(DateRange::new(date!(2023 - 01 - 01), date!(2023 - 01 - 31))),
            regions: HashSet::from(["West".to_owned(), "East".to_owned()]),
            states: HashSet::new(),
            cities: HashSet::from(["San Francisco".to_owned()]),
        };

        let query_string = FilterQuery::query_string(&criteria);

        assert_eq!(
            query_string,
            "start=2023-01-01&end=2023-01-31&region=East&region=West&city=San+Francisco"
        );
        let parsed: FilterQuery = serde_html_form::from_str(&query_string).unwrap();
        assert_eq!(parsed.into_criteria(None), criteria);
    }
}
