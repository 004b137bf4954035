//! # Table Processing Module
//!
//! Turns the raw string grid of a Q-Table item into typed, formatted cells.
//! Column types are inferred from the data rows, explicit formatting options
//! take precedence, and the result is exposed both row-wise and column-wise so
//! minibars and color columns can read a column without re-scanning rows.
use crate::options::TableOptions;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

pub mod cell;
pub mod column;
pub mod formatting;

pub use cell::{Cell, CellType, CellValue};
pub use column::ColumnType;

/// Raw table: row 0 is the header, every row has the same length.
pub type RawTable = Vec<Vec<Option<String>>>;

/// Structural errors in the input. These point at a bug in the caller and are never degraded.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Table contains no rows")]
    EmptyTable,

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },

    #[error("Column {column} selected by '{option}' is out of range, table has {columns} columns")]
    ColumnOutOfRange { option: String, column: usize, columns: usize },

    #[error("Row {row} selected by '{option}' is out of range, table has {rows} data rows")]
    RowOutOfRange { option: String, row: usize, rows: usize },
}

/// Formatted table cells, row-wise and column-wise.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedTableData {
    /// Formatted header row
    pub header: Vec<Cell>,
    /// Formatted data rows
    pub rows: Vec<Vec<Cell>>,
    /// Data rows transposed
    pub columns: Vec<Vec<Cell>>,
    /// Inferred type of every column
    pub column_types: Vec<ColumnType>,
}

impl ProcessedTableData {
    /// Builds the table from header and rows, deriving the column view.
    pub(crate) fn from_rows(header: Vec<Cell>, rows: Vec<Vec<Cell>>, column_types: Vec<ColumnType>) -> Self {
        let columns = (0..header.len())
            .map(|col| rows.iter().map(|row| row[col].clone()).collect())
            .collect();
        ProcessedTableData { header, rows, columns, column_types }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cells of one column, header excluded.
    pub fn column(&self, col: usize) -> Option<&[Cell]> {
        self.columns.get(col).map(Vec::as_slice)
    }

    /// Returns true if the column was inferred or formatted as numeric.
    pub fn is_numeric_column(&self, col: usize) -> bool {
        self.column_types.get(col).map(ColumnType::is_numeric).unwrap_or(false)
    }
}

/// Checks the caller contract: at least one row, rectangular rows and
/// column/row references inside the table.
pub fn validate(data: &[Vec<Option<String>>], options: &TableOptions) -> Result<(), TableError> {
    let expected = data.first().ok_or(TableError::EmptyTable)?.len();
    for (row, cells) in data.iter().enumerate() {
        if cells.len() != expected {
            return Err(TableError::RaggedRow { row, expected, actual: cells.len() });
        }
    }

    let check_column = |option: &str, column: usize| {
        if column < expected {
            Ok(())
        } else {
            Err(TableError::ColumnOutOfRange { option: option.to_owned(), column, columns: expected })
        }
    };
    for formatting in &options.formatting {
        check_column("formatting", formatting.column)?;
    }
    for sorting in &options.sorting {
        check_column("sorting", sorting.column)?;
    }
    if let Some(column) = options.minibar_column() {
        check_column("minibar", column)?;
    }
    if let Some(column) = options.color_column_index() {
        check_column("colorColumn", column)?;
    }
    if let Some(row) = options.frozen_row_key {
        let rows = data.len() - 1;
        if row >= rows {
            return Err(TableError::RowOutOfRange { option: "frozenRowKey".to_owned(), row, rows });
        }
    }
    Ok(())
}

/// Classifies every column and formats all cells.
/// Formatting overrides decide the type of their column; other columns use the inferred type.
pub fn process_table(data: &[Vec<Option<String>>], options: &TableOptions) -> Result<ProcessedTableData, TableError> {
    validate(data, options)?;
    let inferred = ColumnType::detect(data);
    let formattings: Vec<_> = (0..inferred.len()).map(|col| options.formatting_for(col)).collect();
    let column_types: Vec<ColumnType> = inferred
        .iter()
        .zip(&formattings)
        .map(|(inferred, formatting)| match formatting {
            Some(formatting) if formatting.is_numeric() => ColumnType::Numeric,
            Some(_) => ColumnType::Text,
            None => *inferred,
        })
        .collect();
    debug!(
        columns = ?column_types.iter().map(ColumnType::as_str).collect::<Vec<_>>(),
        formatting = ?formattings.iter().map(|formatting| formatting.as_ref().map(formatting::FormattingType::as_str)).collect::<Vec<_>>(),
        rows = data.len() - 1,
        "classified table columns"
    );

    let header = data[0]
        .iter()
        .enumerate()
        .map(|(col, raw)| formatting::format_header_cell(raw.as_deref(), inferred[col], formattings[col]))
        .collect();
    let rows = data[1..]
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(col, raw)| formatting::format_cell(raw.as_deref(), inferred[col], formattings[col]))
                .collect()
        })
        .collect();
    Ok(ProcessedTableData::from_rows(header, rows, column_types))
}
