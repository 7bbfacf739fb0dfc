//! CSV export of the aggregate tables.
//!
//! Values are written with Rust's shortest round-trip `f64` formatting, so a
//! downloaded file parses back to exactly the numbers shown on the dashboard.

use std::fmt::Display;

use csv::Writer;
use time::Month;

use crate::{
    Error,
    sales::aggregation::{AggregateTable, PivotTable},
};

/// Write `table` as CSV with a header row of its key and measure columns,
/// e.g. `Region,Sales`.
///
/// # Errors
/// Returns [Error::CsvExport] if the CSV writer fails.
pub fn export_to_csv<K: Display>(table: &AggregateTable<K>) -> Result<String, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    writer
        .write_record([table.key_column(), table.measure_column()])
        .map_err(csv_error)?;

    for row in table.rows() {
        writer
            .write_record([row.key.to_string(), row.value.to_string()])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Write `pivot` as CSV with one column per month, e.g.
/// `Sub-Category,January,March`.
///
/// # Errors
/// Returns [Error::CsvExport] if the CSV writer fails.
pub fn export_pivot_to_csv(pivot: &PivotTable) -> Result<String, Error> {
    let mut writer = Writer::from_writer(Vec::new());

    let header = std::iter::once(PivotTable::ROW_COLUMN.to_owned())
        .chain(pivot.columns().iter().map(|month| month_name(*month)));
    writer.write_record(header).map_err(csv_error)?;

    for (row_key, values) in pivot.row_keys().iter().zip(pivot.cells()) {
        let record = std::iter::once(row_key.clone())
            .chain(values.iter().map(|value| value.to_string()));
        writer.write_record(record).map_err(csv_error)?;
    }

    finish(writer)
}

/// The full English name of `month`, e.g. "January".
fn month_name(month: Month) -> String {
    month.to_string()
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, Error> {
    let bytes = writer
        .into_inner()
        .map_err(|error| Error::CsvExport(error.to_string()))?;

    String::from_utf8(bytes).map_err(|error| Error::CsvExport(error.to_string()))
}

fn csv_error(error: csv::Error) -> Error {
    tracing::error!("could not write CSV record: {error}");
    Error::CsvExport(error.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::sales::{
        SalesRecord, aggregate_by_category, aggregate_by_month, aggregate_by_region,
        aggregate_by_sub_category_and_month, export_pivot_to_csv, export_to_csv,
        test_utils::{dataset, superstore_sample},
    };

    #[test]
    fn region_export_has_verbatim_header() {
        let table = aggregate_by_region(&superstore_sample());

        let csv = export_to_csv(&table).unwrap();

        assert_eq!(csv.lines().next(), Some("Region,Sales"));
    }

    #[test]
    fn export_parses_back_to_the_same_rows() {
        let table = aggregate_by_category(&superstore_sample());

        let csv = export_to_csv(&table).unwrap();

        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Category", "Sales"]);

        let parsed: Vec<(String, f64)> = reader
            .records()
            .map(|record| {
                let record = record.unwrap();
                (record[0].to_owned(), record[1].parse().unwrap())
            })
            .collect();
        let expected: Vec<(String, f64)> = table
            .rows()
            .iter()
            .map(|row| (row.key.clone(), row.value))
            .collect();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn export_keeps_full_precision() {
        let data = dataset(vec![
            SalesRecord::build(date!(2023 - 01 - 05), "East", 0.1),
            SalesRecord::build(date!(2023 - 01 - 06), "East", 0.2),
            SalesRecord::build(date!(2023 - 01 - 07), "West", 1234567.891),
        ]);

        let csv = export_to_csv(&aggregate_by_region(&data)).unwrap();

        assert_eq!(
            csv,
            "Region,Sales\nEast,0.30000000000000004\nWest,1234567.891\n"
        );
    }

    #[test]
    fn time_series_export_uses_month_year_labels() {
        let data = dataset(vec![
            SalesRecord::build(date!(2023 - 02 - 05), "East", 3.0),
            SalesRecord::build(date!(2022 - 12 - 06), "East", 1.5),
        ]);

        let csv = export_to_csv(&aggregate_by_month(&data)).unwrap();

        assert_eq!(csv, "month_year,Sales\n2022 : Dec,1.5\n2023 : Feb,3\n");
    }

    #[test]
    fn empty_table_exports_header_only() {
        let csv = export_to_csv(&aggregate_by_region(&dataset(Vec::new()))).unwrap();

        assert_eq!(csv, "Region,Sales\n");
    }

    #[test]
    fn pivot_export_has_one_column_per_month() {
        let data = dataset(vec![
            SalesRecord::build(date!(2023 - 03 - 02), "East", 5.0).sub_category("Chairs"),
            SalesRecord::build(date!(2023 - 01 - 09), "East", 7.25).sub_category("Paper"),
        ]);

        let csv = export_pivot_to_csv(&aggregate_by_sub_category_and_month(&data)).unwrap();

        assert_eq!(
            csv,
            "Sub-Category,January,March\nChairs,0,5\nPaper,7.25,0\n"
        );
    }
}
