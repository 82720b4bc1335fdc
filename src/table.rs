//! The table model: named columns and rows of text cells, each row
//! having one cell per column.

use std::{fmt::Display, io::Read, path::Path};

use anyhow::{anyhow, Context, Result};
use chj_util::def_boxed_thiserror;
use csv::ReaderBuilder;
use itertools::Itertools;
use kstring::KString;

use crate::io_util::my_read_to_string;

/// Cells longer than this disable the column alignment in the
/// `Display` output.
const MAX_ALIGN_WIDTH: usize = 40;

/// All records in `input`, which may differ in length; a header line
/// is returned as the first record. Blank lines are skipped.
pub fn read_csv_records(input: impl Read) -> Result<Vec<Vec<String>>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    reader.records()
        .map(|record| record.map(|r| r.iter().map(String::from).collect()))
        .collect()
}

def_boxed_thiserror!(TableError, pub enum TableErrorKind {
    #[error("row {row} has {got} values but the table has {expected} columns")]
    RowLengthMismatch { row: usize, got: usize, expected: usize },
    #[error("duplicate column name {0:?}")]
    DuplicateHeader(KString),
    #[error("no column named {0:?}")]
    UnknownColumn(KString),
    #[error("missing value for column {0:?}")]
    MissingValue(KString),
    #[error("row index {index} out of range for a table with {len} rows")]
    IndexOutOfRange { index: usize, len: usize },
});


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: KString,
}

impl TableColumn {
    pub fn named(name: &str) -> Self {
        TableColumn { name: KString::from_ref(name) }
    }
}

impl Display for TableColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column[{}]", self.name)
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<String>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        TableRow { cells }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell in the column called `name` of `table`.
    pub fn get<'t>(&'t self, table: &Table, name: &str) -> Result<&'t str, TableError> {
        let i = table.column_index(name)?;
        Ok(&self.cells[i])
    }
}


/// Quote `s` if it contains a comma.
fn quote_wrap(s: &str) -> String {
    if s.contains(',') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<TableColumn>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(headers: Vec<TableColumn>) -> Result<Self, TableError> {
        for (i, col) in headers.iter().enumerate() {
            if headers[..i].iter().any(|c| c.name == col.name) {
                return Err(TableErrorKind::DuplicateHeader(col.name.clone()).into())
            }
        }
        Ok(Table { headers, rows: Vec::new() })
    }

    /// A table from CSV style records. With `with_headers`, the
    /// first record gives the column names, otherwise the columns are
    /// named `0`, `1`, ... after the width of the first record. Rows
    /// shorter than that are padded with `missing_value` if given,
    /// rows that are longer are always an error.
    pub fn from_records(
        records: Vec<Vec<String>>,
        with_headers: bool,
        missing_value: Option<&str>,
    ) -> Result<Self, TableError> {
        let mut records = records.into_iter();
        let mut first_row = None;
        let headers: Vec<TableColumn> =
            if with_headers {
                records.next().unwrap_or_default().iter()
                    .map(|name| TableColumn::named(name)).collect()
            } else {
                first_row = records.next();
                let width = first_row.as_ref().map_or(0, |r| r.len());
                (0..width).map(|i| TableColumn::named(&i.to_string())).collect()
            };
        let mut table = Table::new(headers)?;
        let width = table.headers.len();
        for (i, mut cells) in first_row.into_iter().chain(records).enumerate() {
            if cells.len() < width {
                if let Some(missing_value) = missing_value {
                    cells.resize(width, missing_value.to_string());
                }
            }
            if cells.len() != width {
                return Err(TableErrorKind::RowLengthMismatch {
                    row: i, got: cells.len(), expected: width
                }.into())
            }
            table.rows.push(TableRow::new(cells));
        }
        Ok(table)
    }

    pub fn from_csv_str(
        s: &str,
        with_headers: bool,
        missing_value: Option<&str>,
    ) -> Result<Self> {
        let records = read_csv_records(s.as_bytes())?;
        Ok(Self::from_records(records, with_headers, missing_value)?)
    }

    pub fn from_csv_file<P: AsRef<Path>>(
        path: P,
        with_headers: bool,
        missing_value: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let s = my_read_to_string(path)?;
        Self::from_csv_str(&s, with_headers, missing_value).with_context(
            || anyhow!("reading table from {path:?}"))
    }

    /// The number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn headers(&self) -> &[TableColumn] {
        &self.headers
    }

    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(|c| c.name.as_str())
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Result<&TableRow, TableError> {
        self.rows.get(index).ok_or_else(
            || TableErrorKind::IndexOutOfRange { index, len: self.rows.len() }.into())
    }

    fn column_index(&self, name: &str) -> Result<usize, TableError> {
        self.headers.iter().position(|c| c.name.as_str() == name).ok_or_else(
            || TableErrorKind::UnknownColumn(KString::from_ref(name)).into())
    }

    /// All cells of the column `name`, top to bottom.
    pub fn column(&self, name: &str) -> Result<Vec<&str>, TableError> {
        let i = self.column_index(name)?;
        Ok(self.rows.iter().map(|r| r.cells[i].as_str()).collect())
    }

    fn check_width(&self, row: usize, got: usize) -> Result<(), TableError> {
        let expected = self.headers.len();
        if got == expected {
            Ok(())
        } else {
            Err(TableErrorKind::RowLengthMismatch { row, got, expected }.into())
        }
    }

    /// Append a row given the values in column order.
    pub fn add_row_ordered<S: AsRef<str>>(&mut self, values: &[S]) -> Result<(), TableError> {
        self.check_width(self.rows.len(), values.len())?;
        self.rows.push(TableRow::new(
            values.iter().map(|v| v.as_ref().to_string()).collect()));
        Ok(())
    }

    /// Append a row given `(column name, value)` pairs in any order;
    /// every column has to be given exactly once.
    pub fn add_row<S: AsRef<str>>(&mut self, values: &[(&str, S)]) -> Result<(), TableError> {
        let mut cells: Vec<Option<String>> = vec![None; self.headers.len()];
        for (name, value) in values {
            let i = self.column_index(name)?;
            if cells[i].is_some() {
                return Err(TableErrorKind::DuplicateHeader(KString::from_ref(name)).into())
            }
            cells[i] = Some(value.as_ref().to_string());
        }
        let mut row = Vec::with_capacity(cells.len());
        for (cell, col) in cells.into_iter().zip(&self.headers) {
            row.push(cell.ok_or_else(
                || TableErrorKind::MissingValue(col.name.clone()))?);
        }
        self.rows.push(TableRow::new(row));
        Ok(())
    }

    /// Insert `row` before the row at `index` (`index == len()`
    /// appends).
    pub fn insert_row(&mut self, index: usize, row: TableRow) -> Result<(), TableError> {
        if index > self.rows.len() {
            return Err(TableErrorKind::IndexOutOfRange { index, len: self.rows.len() }.into())
        }
        self.check_width(index, row.len())?;
        self.rows.insert(index, row);
        Ok(())
    }

    pub fn remove_row_at(&mut self, index: usize) -> Result<TableRow, TableError> {
        if index >= self.rows.len() {
            return Err(TableErrorKind::IndexOutOfRange { index, len: self.rows.len() }.into())
        }
        Ok(self.rows.remove(index))
    }

    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_string()).with_context(
            || anyhow!("writing table to {path:?}"))
    }
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, width: usize) -> String {
    cells.map(|c| format!("{:>width$}", quote_wrap(c))).join(",")
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let longest = self.rows.iter()
            .flat_map(|r| r.cells.iter())
            .map(|c| c.chars().count())
            .max()
            .unwrap_or(0);
        let width = if longest > MAX_ALIGN_WIDTH { 0 } else { longest };
        f.write_str(&format_line(self.header_names(), width))?;
        for row in &self.rows {
            write!(f, "\n{}", format_line(row.cells.iter().map(|c| c.as_str()), width))?;
        }
        Ok(())
    }
}
