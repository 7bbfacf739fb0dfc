//! Sales aggregation for the dashboard charts and tables.
//!
//! Grouped tables keep their groups in the order they are first seen in the
//! dataset, except for the monthly table which is sorted by its typed
//! [MonthPeriod] key.

use std::{cmp::Ordering, collections::HashMap, fmt, hash::Hash};

use time::{Date, Month};

use crate::sales::record::{Dataset, Dimension, SalesRecord};

/// The months of the year in calendar order.
pub(crate) const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// The three-letter abbreviation of `month`, e.g. "Jan".
pub fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The numeric column summed by an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// [SalesRecord::sales].
    Sales,
    /// [SalesRecord::profit].
    Profit,
}

impl Measure {
    /// The header used for the measure in tables and CSV exports.
    pub fn column_name(self) -> &'static str {
        match self {
            Measure::Sales => "Sales",
            Measure::Profit => "Profit",
        }
    }

    /// The measure's value in `record`.
    pub fn value_of(self, record: &SalesRecord) -> f64 {
        match self {
            Measure::Sales => record.sales,
            Measure::Profit => record.profit,
        }
    }
}

/// A calendar month of a specific year.
///
/// Ordered chronologically, so sorting never depends on the label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthPeriod {
    /// The calendar year.
    pub year: i32,
    /// The month within `year`.
    pub month: Month,
}

impl MonthPeriod {
    /// Create the period for `month` of `year`.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month that `date` falls in.
    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    fn sort_key(&self) -> (i32, u8) {
        (self.year, u8::from(self.month))
    }
}

impl Ord for MonthPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for MonthPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Formats as "2023 : Jan".
impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.year, month_abbreviation(self.month))
    }
}

/// One group of an [AggregateTable].
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow<K> {
    /// The group key, e.g. a region name.
    pub key: K,
    /// The summed measure for the group.
    pub value: f64,
}

/// A two-column table of group keys and the summed measure for each group.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateTable<K> {
    key_column: &'static str,
    measure: Measure,
    rows: Vec<AggregateRow<K>>,
}

impl<K> AggregateTable<K> {
    /// The header of the key column, e.g. "Region" or "month_year".
    pub fn key_column(&self) -> &'static str {
        self.key_column
    }

    /// The column that was summed.
    pub fn measure(&self) -> Measure {
        self.measure
    }

    /// The header of the value column, e.g. "Sales".
    pub fn measure_column(&self) -> &'static str {
        self.measure.column_name()
    }

    /// The groups in table order.
    pub fn rows(&self) -> &[AggregateRow<K>] {
        &self.rows
    }

    /// The number of groups.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no groups.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The sum of every row's value.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }
}

/// Sum `value` over the records, grouped by `key`.
///
/// Records for which `key` returns `None` are skipped. Groups are returned in
/// the order they are first seen.
fn group_by_sum<'a, K, I>(
    records: I,
    key: impl Fn(&SalesRecord) -> Option<K>,
    value: impl Fn(&SalesRecord) -> f64,
) -> Vec<AggregateRow<K>>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a SalesRecord>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut rows: Vec<AggregateRow<K>> = Vec::new();

    for record in records {
        let Some(group) = key(record) else {
            continue;
        };

        match positions.get(&group) {
            Some(&position) => rows[position].value += value(record),
            None => {
                positions.insert(group.clone(), rows.len());
                rows.push(AggregateRow {
                    key: group,
                    value: value(record),
                });
            }
        }
    }

    rows
}

/// Sum `measure` for each distinct value of `dimension`.
pub fn aggregate_by(
    dataset: &Dataset,
    dimension: Dimension,
    measure: Measure,
) -> AggregateTable<String> {
    let rows = group_by_sum(
        dataset.records(),
        |record| Some(dimension.value_of(record).to_owned()),
        |record| measure.value_of(record),
    );

    AggregateTable {
        key_column: dimension.column().header(),
        measure,
        rows,
    }
}

/// Total sales per category, as a `Category,Sales` table.
pub fn aggregate_by_category(dataset: &Dataset) -> AggregateTable<String> {
    aggregate_by(dataset, Dimension::Category, Measure::Sales)
}

/// Total sales per region, as a `Region,Sales` table.
pub fn aggregate_by_region(dataset: &Dataset) -> AggregateTable<String> {
    aggregate_by(dataset, Dimension::Region, Measure::Sales)
}

/// Total sales per calendar month, as a `month_year,Sales` table in
/// chronological order.
///
/// Rows without an order date are not counted.
pub fn aggregate_by_month(dataset: &Dataset) -> AggregateTable<MonthPeriod> {
    let mut rows = group_by_sum(
        dataset.records(),
        |record| record.order_date.map(MonthPeriod::from_date),
        |record| record.sales,
    );
    rows.sort_by_key(|row| row.key);

    AggregateTable {
        key_column: "month_year",
        measure: Measure::Sales,
        rows,
    }
}

/// Sales per sub-category and month of the year.
///
/// Months from different years are combined, so a column only says "January".
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    row_keys: Vec<String>,
    columns: Vec<Month>,
    cells: Vec<Vec<f64>>,
}

impl PivotTable {
    /// The header of the row key column.
    pub const ROW_COLUMN: &'static str = "Sub-Category";

    /// The sub-categories, one per row.
    pub fn row_keys(&self) -> &[String] {
        &self.row_keys
    }

    /// The months present in the data, in calendar order.
    pub fn columns(&self) -> &[Month] {
        &self.columns
    }

    /// One row of values per entry in [PivotTable::row_keys], one value per
    /// entry in [PivotTable::columns].
    pub fn cells(&self) -> &[Vec<f64>] {
        &self.cells
    }

    /// The value for `row_key` in `month`, zero when there were no sales.
    ///
    /// Returns `None` if the sub-category or month is not in the table.
    pub fn get(&self, row_key: &str, month: Month) -> Option<f64> {
        let row = self.row_keys.iter().position(|key| key == row_key)?;
        let column = self.columns.iter().position(|column| *column == month)?;

        Some(self.cells[row][column])
    }

    /// The largest cell value, or `None` for an empty table.
    pub fn max_value(&self) -> Option<f64> {
        self.cells.iter().flatten().copied().reduce(f64::max)
    }

    /// Whether the pivot has no rows.
    pub fn is_empty(&self) -> bool {
        self.row_keys.is_empty()
    }
}

/// Build the sub-category by month pivot of summed sales.
///
/// Every combination of sub-category and month is present; combinations with
/// no sales are `0.0`. Rows without an order date are not counted.
pub fn aggregate_by_sub_category_and_month(dataset: &Dataset) -> PivotTable {
    let totals = group_by_sum(
        dataset.records(),
        |record| {
            record
                .order_date
                .map(|date| (record.sub_category.clone(), date.month()))
        },
        |record| record.sales,
    );

    let mut row_keys: Vec<String> = Vec::new();
    let mut months_present = [false; 12];

    for row in &totals {
        let (sub_category, month) = &row.key;

        if !row_keys.contains(sub_category) {
            row_keys.push(sub_category.clone());
        }

        months_present[usize::from(u8::from(*month)) - 1] = true;
    }

    let columns: Vec<Month> = MONTHS
        .into_iter()
        .zip(months_present)
        .filter_map(|(month, present)| present.then_some(month))
        .collect();

    let mut cells = vec![vec![0.0; columns.len()]; row_keys.len()];

    for row in totals {
        let (sub_category, month) = row.key;
        let row_index = row_keys.iter().position(|key| *key == sub_category);
        let column_index = columns.iter().position(|column| *column == month);

        if let (Some(row_index), Some(column_index)) = (row_index, column_index) {
            cells[row_index][column_index] = row.value;
        }
    }

    PivotTable {
        row_keys,
        columns,
        cells,
    }
}

/// A node of the Region, Category, Sub-Category sales hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct TreemapNode {
    /// The region, category or sub-category name.
    pub name: String,
    /// The summed sales of this node, equal to the sum over its children.
    pub value: f64,
    /// Empty for sub-categories.
    pub children: Vec<TreemapNode>,
}

const HIERARCHY: [Dimension; 3] = [Dimension::Region, Dimension::Category, Dimension::SubCategory];

/// Group sales into a region, category and sub-category hierarchy.
pub fn aggregate_hierarchy(dataset: &Dataset) -> Vec<TreemapNode> {
    let records: Vec<&SalesRecord> = dataset.records().iter().collect();

    build_level(&records, &HIERARCHY)
}

fn build_level(records: &[&SalesRecord], levels: &[Dimension]) -> Vec<TreemapNode> {
    let Some((&dimension, rest)) = levels.split_first() else {
        return Vec::new();
    };

    let totals = group_by_sum(
        records.iter().copied(),
        |record| Some(dimension.value_of(record).to_owned()),
        |record| record.sales,
    );

    totals
        .into_iter()
        .map(|row| {
            let members: Vec<&SalesRecord> = records
                .iter()
                .copied()
                .filter(|record| dimension.value_of(record) == row.key)
                .collect();

            TreemapNode {
                children: build_level(&members, rest),
                name: row.key,
                value: row.value,
            }
        })
        .collect()
}

/// A single transaction plotted on the sales against profit chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    /// The x coordinate.
    pub sales: f64,
    /// The y coordinate.
    pub profit: f64,
    /// Sets the size of the point.
    pub quantity: i64,
}

/// One point per record, in dataset order.
pub fn sales_profit_points(dataset: &Dataset) -> Vec<ScatterPoint> {
    dataset
        .records()
        .iter()
        .map(|record| ScatterPoint {
            sales: record.sales,
            profit: record.profit,
            quantity: record.quantity,
        })
        .collect()
}
