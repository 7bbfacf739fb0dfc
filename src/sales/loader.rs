//! Reading uploaded CSV and Excel files into a [Dataset].
//!
//! Both formats are first read into a [RawTable] of loosely typed cells, then
//! every row is converted into a [SalesRecord] against the header [Schema].
//! Rows are numbered the way a spreadsheet shows them: the header is row 1.

use std::{collections::HashMap, io::Cursor, path::Path};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use time::{
    Date, Duration, format_description::BorrowedFormatItem,
    macros::{date, format_description},
};

use crate::{
    Error,
    sales::record::{Column, Columns, Dataset, SalesRecord},
};

/// The file formats that can be uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma separated `.csv` files.
    Csv,
    /// Both `.xlsx` and legacy `.xls` workbooks.
    Excel,
}

impl FileFormat {
    /// Pick the format from the extension of `file_name`, ignoring case.
    ///
    /// # Errors
    /// Returns [Error::UnsupportedFormat] for any extension other than `csv`,
    /// `xlsx` or `xls`.
    pub fn from_file_name(file_name: &str) -> Result<Self, Error> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|extension| extension.to_str())
            .map(|extension| extension.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(FileFormat::Csv),
            Some("xlsx") | Some("xls") => Ok(FileFormat::Excel),
            _ => Err(Error::UnsupportedFormat(file_name.to_owned())),
        }
    }
}

/// Parse the contents of an uploaded file into a dataset.
///
/// The format is chosen from the extension of `file_name`. Columns the
/// dashboard does not use are ignored; optional columns that are absent are
/// recorded in [Dataset::columns].
///
/// # Errors
/// - [Error::UnsupportedFormat] if the extension is not supported.
/// - [Error::ParseFailure] if the file is empty, malformed, or a numeric cell
///   does not hold a number.
/// - [Error::MissingColumn] if a required column is absent.
pub fn load_dataset(file_name: &str, bytes: &[u8]) -> Result<Dataset, Error> {
    let format = FileFormat::from_file_name(file_name)?;

    let table = match format {
        FileFormat::Csv => read_csv_table(bytes)?,
        FileFormat::Excel => read_workbook_table(bytes)?,
    };

    let schema = Schema::from_headers(&table.headers)?;
    let records = table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(Cell::is_empty))
        // The header is row 1, so the first data row is row 2.
        .map(|(index, row)| schema.parse_record(row, index + 2))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(
        "loaded {} rows from {file_name} ({format:?}), columns present: {:?}",
        records.len(),
        Column::ALL
            .iter()
            .filter(|column| schema.columns().contains(**column))
            .map(|column| column.header())
            .collect::<Vec<_>>()
    );

    Ok(Dataset::new(records, schema.columns()))
}

/// A single cell before it is interpreted against the schema.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(Date),
}

impl Cell {
    fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    fn from_text(text: &str) -> Self {
        let text = text.trim();

        if text.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(text.to_owned())
        }
    }

    fn from_workbook(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
                Cell::from_text(text)
            }
            Data::Float(number) => Cell::Number(*number),
            Data::Int(number) => Cell::Number(*number as f64),
            Data::Bool(value) => Cell::Text(value.to_string()),
            Data::DateTime(date_time) => match excel_serial_to_date(date_time.as_f64()) {
                Some(date) => Cell::Date(date),
                None => Cell::Number(date_time.as_f64()),
            },
            Data::Error(error) => Cell::Text(error.to_string()),
        }
    }

    /// The cell as text, with whole numbers written without a decimal point.
    fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Number(number) if number.fract() == 0.0 => format!("{number:.0}"),
            Cell::Number(number) => number.to_string(),
            Cell::Date(date) => date.to_string(),
        }
    }
}

/// A header row and the data rows below it.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

fn read_csv_table(bytes: &[u8]) -> Result<RawTable, Error> {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim_start_matches('\u{feff}');

    if text.trim().is_empty() {
        return Err(Error::ParseFailure("the file is empty".to_owned()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::ParseFailure(error.to_string()))?
        .iter()
        .map(|header| header.trim().to_owned())
        .collect();

    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|record| record.iter().map(Cell::from_text).collect())
                .map_err(|error| Error::ParseFailure(error.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RawTable { headers, rows })
}

/// Read the first worksheet of a workbook.
///
/// The first column holds the row index written by spreadsheet exports and is
/// dropped.
fn read_workbook_table(bytes: &[u8]) -> Result<RawTable, Error> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|error| Error::ParseFailure(format!("could not open the workbook: {error}")))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::ParseFailure("the workbook has no worksheets".to_owned()))?
        .map_err(|error| Error::ParseFailure(format!("could not read the worksheet: {error}")))?;

    let mut rows = range.rows();

    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .skip(1)
            .map(|cell| Cell::from_workbook(cell).to_text())
            .collect(),
        None => return Err(Error::ParseFailure("the file is empty".to_owned())),
    };

    let rows = rows
        .map(|row| row.iter().skip(1).map(Cell::from_workbook).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

/// Where each known column sits in the uploaded table.
#[derive(Debug)]
struct Schema {
    positions: HashMap<Column, usize>,
}

impl Schema {
    /// Locate the known columns in `headers`.
    ///
    /// If a header appears more than once, the first occurrence is used.
    fn from_headers(headers: &[String]) -> Result<Self, Error> {
        let mut positions = HashMap::new();

        for column in Column::ALL {
            if let Some(position) = headers.iter().position(|header| header == column.header()) {
                positions.insert(column, position);
            } else if column.is_required() {
                tracing::debug!("uploaded headers {headers:?} are missing {column}");
                return Err(Error::MissingColumn(column.header().to_owned()));
            }
        }

        Ok(Self { positions })
    }

    fn columns(&self) -> Columns {
        self.positions
            .keys()
            .fold(Columns::default(), |columns, column| columns.with(*column))
    }

    fn cell<'a>(&self, row: &'a [Cell], column: Column) -> Option<&'a Cell> {
        let position = self.positions.get(&column)?;

        Some(row.get(*position).unwrap_or(&Cell::Empty))
    }

    fn parse_record(&self, row: &[Cell], row_number: usize) -> Result<SalesRecord, Error> {
        let text = |column| self.cell(row, column).map(Cell::to_text).unwrap_or_default();
        // Blank locations could not be told apart from "no filter" in the cascade.
        let location = |column| match self.cell(row, column) {
            Some(cell) if !cell.is_empty() => Ok(cell.to_text()),
            _ => Err(Error::ParseFailure(format!(
                "row {row_number}, column \"{column}\": the cell is empty"
            ))),
        };
        let number = |column| match self.cell(row, column) {
            Some(cell) => parse_number(cell, row_number, column),
            None => Ok(0.0),
        };

        let quantity = match self.cell(row, Column::Quantity) {
            Some(cell) => parse_integer(cell, row_number)?,
            None => 0,
        };

        Ok(SalesRecord {
            order_date: self.cell(row, Column::OrderDate).and_then(parse_date),
            region: location(Column::Region)?,
            state: location(Column::State)?,
            city: location(Column::City)?,
            category: text(Column::Category),
            sub_category: text(Column::SubCategory),
            sales: number(Column::Sales)?,
            profit: number(Column::Profit)?,
            quantity,
        })
    }
}

fn parse_number(cell: &Cell, row_number: usize, column: Column) -> Result<f64, Error> {
    match cell {
        Cell::Number(number) => Ok(*number),
        Cell::Text(text) => text.parse::<f64>().map_err(|_| {
            Error::ParseFailure(format!(
                "row {row_number}, column \"{column}\": \"{text}\" is not a number"
            ))
        }),
        Cell::Empty => Err(Error::ParseFailure(format!(
            "row {row_number}, column \"{column}\": the cell is empty"
        ))),
        Cell::Date(date) => Err(Error::ParseFailure(format!(
            "row {row_number}, column \"{column}\": {date} is a date, not a number"
        ))),
    }
}

/// Parse a quantity, accepting floats with no fractional part such as `3.0`.
fn parse_integer(cell: &Cell, row_number: usize) -> Result<i64, Error> {
    let exact = match cell {
        Cell::Text(text) => text.parse::<i64>().ok(),
        _ => None,
    };

    if let Some(integer) = exact {
        return Ok(integer);
    }

    let number = parse_number(cell, row_number, Column::Quantity)?;

    if number.fract() != 0.0 || !number.is_finite() {
        return Err(Error::ParseFailure(format!(
            "row {row_number}, column \"{}\": {number} is not a whole number",
            Column::Quantity
        )));
    }

    // `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
    if number < i64::MIN as f64 || number >= i64::MAX as f64 {
        return Err(Error::ParseFailure(format!(
            "row {row_number}, column \"{}\": {number} is out of range",
            Column::Quantity
        )));
    }

    Ok(number as i64)
}

const DATE_FORMATS: [&[BorrowedFormatItem<'static>]; 4] = [
    format_description!("[year]-[month]-[day]"),
    format_description!("[year]/[month]/[day]"),
    format_description!("[month padding:none]/[day padding:none]/[year]"),
    format_description!("[month padding:none]-[day padding:none]-[year]"),
];

/// Interpret a cell as an order date, or `None` if it is not one.
fn parse_date(cell: &Cell) -> Option<Date> {
    match cell {
        Cell::Date(date) => Some(*date),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(text) => parse_date_text(text),
        Cell::Empty => None,
    }
}

/// Parse one of the accepted date layouts, ignoring any time of day after the
/// date.
fn parse_date_text(text: &str) -> Option<Date> {
    let date_part = text
        .split(|c: char| c == 'T' || c.is_whitespace())
        .next()
        .unwrap_or_default();

    DATE_FORMATS
        .iter()
        .find_map(|format| Date::parse(date_part, format).ok())
}

/// Convert an Excel serial day number to a date.
///
/// Excel treats 1900 as a leap year, so serial 60 is the nonexistent
/// 1900-02-29. Serials from 61 on count days from 1899-12-30. Earlier serials
/// are shifted forward a day so that serial 1 is 1900-01-01, and serial 60
/// becomes 1900-02-28. Any time of day in the fractional part is dropped.
fn excel_serial_to_date(serial: f64) -> Option<Date> {
    const EXCEL_EPOCH: Date = date!(1899 - 12 - 30);
    const FAKE_LEAP_DAY_SERIAL: f64 = 60.0;
    // 9999-12-31, the last date Excel can show.
    const LAST_SERIAL: f64 = 2_958_465.0;

    if !serial.is_finite() || serial < 0.0 || serial > LAST_SERIAL {
        return None;
    }

    let days = serial.floor();
    let days = if days < FAKE_LEAP_DAY_SERIAL {
        days + 1.0
    } else {
        days
    };

    EXCEL_EPOCH.checked_add(Duration::days(days as i64))
}
