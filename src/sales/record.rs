//! The typed schema for uploaded sales data.

use std::fmt;

use time::Date;

use crate::sales::filter::DateRange;

/// A column of the sales table that the dashboard reads.
///
/// Uploaded files may carry other columns, those are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// "Order Date", used by the date filter and the monthly views.
    OrderDate,
    /// "Region", the first level of the location cascade.
    Region,
    /// "State", filtered within the selected regions.
    State,
    /// "City", filtered within the selected states.
    City,
    /// "Category", optional.
    Category,
    /// "Sub-Category", optional.
    SubCategory,
    /// "Sales", the measure summed by every chart.
    Sales,
    /// "Profit", optional.
    Profit,
    /// "Quantity", optional.
    Quantity,
}

impl Column {
    /// The number of known columns.
    pub const COUNT: usize = 9;

    /// Every known column, in the order they are checked at load time.
    pub const ALL: [Column; Column::COUNT] = [
        Column::OrderDate,
        Column::Region,
        Column::State,
        Column::City,
        Column::Category,
        Column::SubCategory,
        Column::Sales,
        Column::Profit,
        Column::Quantity,
    ];

    /// The header text used for this column in uploaded files.
    pub fn header(self) -> &'static str {
        match self {
            Column::OrderDate => "Order Date",
            Column::Region => "Region",
            Column::State => "State",
            Column::City => "City",
            Column::Category => "Category",
            Column::SubCategory => "Sub-Category",
            Column::Sales => "Sales",
            Column::Profit => "Profit",
            Column::Quantity => "Quantity",
        }
    }

    /// Whether a file without this column is rejected.
    ///
    /// The remaining columns only feed specific charts, and their absence
    /// disables those charts instead.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            Column::OrderDate | Column::Region | Column::State | Column::City | Column::Sales
        )
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// The set of known columns that were present in an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Columns {
    present: [bool; Column::COUNT],
}

impl Columns {
    /// A set containing every known column.
    pub fn all() -> Self {
        Self {
            present: [true; Column::COUNT],
        }
    }

    /// Add `column` to the set.
    pub fn with(mut self, column: Column) -> Self {
        self.present[column.index()] = true;
        self
    }

    /// Remove `column` from the set.
    pub fn without(mut self, column: Column) -> Self {
        self.present[column.index()] = false;
        self
    }

    /// Whether `column` is in the set.
    pub fn contains(&self, column: Column) -> bool {
        self.present[column.index()]
    }

    /// The first of `needed` that is not in the set, if any.
    pub fn first_missing(&self, needed: &[Column]) -> Option<Column> {
        needed
            .iter()
            .copied()
            .find(|column| !self.contains(*column))
    }
}

/// A text column that rows can be filtered or grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    /// The region of the order.
    Region,
    /// The state of the order.
    State,
    /// The city of the order.
    City,
    /// The product category.
    Category,
    /// The product sub-category.
    SubCategory,
}

impl Dimension {
    /// The column this dimension is read from.
    pub fn column(self) -> Column {
        match self {
            Dimension::Region => Column::Region,
            Dimension::State => Column::State,
            Dimension::City => Column::City,
            Dimension::Category => Column::Category,
            Dimension::SubCategory => Column::SubCategory,
        }
    }

    /// The value of this dimension in `record`.
    pub fn value_of(self, record: &SalesRecord) -> &str {
        match self {
            Dimension::Region => &record.region,
            Dimension::State => &record.state,
            Dimension::City => &record.city,
            Dimension::Category => &record.category,
            Dimension::SubCategory => &record.sub_category,
        }
    }
}

/// One transaction from the uploaded table.
///
/// Optional columns that were absent from the file hold empty strings and
/// zeros; check [Dataset::columns] before relying on them.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    /// `None` when the cell could not be parsed as a date.
    pub order_date: Option<Date>,
    /// Never empty.
    pub region: String,
    /// Never empty.
    pub state: String,
    /// Never empty.
    pub city: String,
    /// The product category.
    pub category: String,
    /// The product sub-category.
    pub sub_category: String,
    /// The sale amount in dollars.
    pub sales: f64,
    /// The profit in dollars, negative for a loss.
    pub profit: f64,
    /// The number of units sold.
    pub quantity: i64,
}

/// The rows of an uploaded sales table and the columns it provided.
///
/// A dataset is never mutated after loading. Filters return a new dataset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<SalesRecord>,
    columns: Columns,
}

impl Dataset {
    /// Create a dataset from loaded rows and the columns their file provided.
    pub fn new(records: Vec<SalesRecord>, columns: Columns) -> Self {
        Self { records, columns }
    }

    /// The rows, in file order.
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// The known columns the uploaded file provided.
    pub fn columns(&self) -> Columns {
        self.columns
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The sum of the sales column over every row.
    pub fn total_sales(&self) -> f64 {
        self.records.iter().map(|record| record.sales).sum()
    }

    /// The earliest and latest order dates, ignoring rows without a date.
    ///
    /// Returns `None` if no row has a date.
    pub fn date_bounds(&self) -> Option<DateRange> {
        let mut dates = self.records.iter().filter_map(|record| record.order_date);
        let first = dates.next()?;

        let (start, end) = dates.fold((first, first), |(start, end), date| {
            (start.min(date), end.max(date))
        });

        Some(DateRange::new(start, end))
    }

    /// A new dataset with the rows for which `predicate` returns `true`.
    pub(crate) fn filtered(&self, predicate: impl Fn(&SalesRecord) -> bool) -> Dataset {
        Dataset {
            records: self
                .records
                .iter()
                .filter(|record| predicate(record))
                .cloned()
                .collect(),
            columns: self.columns,
        }
    }
}
