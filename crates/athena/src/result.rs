use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::error::AthenaError;

/// Tabular result set decoded from a staged Athena CSV.
///
/// Rows are stored as `Vec<Option<String>>` where `None` represents SQL NULL
/// (an empty CSV cell). Column ordering in each row matches `columns`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column names from the CSV header, in result-set order.
    pub columns: Vec<String>,
    /// Row data. Each inner vector has the same length as `columns`.
    pub rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    /// Decode a CSV result object: first record is the header, every other
    /// record is one row. All values are kept as strings.
    pub fn from_csv(data: &[u8]) -> Result<Self, AthenaError> {
        let format = Format::default().with_header(true);
        let (inferred, _) = format
            .infer_schema(Cursor::new(data), Some(0))
            .map_err(|e| AthenaError::Parse(e.to_string()))?;

        let columns: Vec<String> = inferred.fields().iter().map(|f| f.name().clone()).collect();
        if columns.is_empty() {
            return Ok(Self::default());
        }

        let schema = Schema::new(
            columns
                .iter()
                .map(|name| Field::new(name, DataType::Utf8, true))
                .collect::<Vec<_>>(),
        );
        let reader = ReaderBuilder::new(Arc::new(schema))
            .with_header(true)
            .build(Cursor::new(data))
            .map_err(|e| AthenaError::Parse(e.to_string()))?;

        let mut rows = Vec::new();
        for batch in reader {
            let batch = batch.map_err(|e| AthenaError::Parse(e.to_string()))?;
            let arrays = batch
                .columns()
                .iter()
                .map(|col| {
                    col.as_string_opt::<i32>()
                        .ok_or_else(|| AthenaError::Parse("non-string CSV column".into()))
                })
                .collect::<Result<Vec<_>, _>>()?;

            for row in 0..batch.num_rows() {
                rows.push(
                    arrays
                        .iter()
                        .map(|arr| (!arr.is_null(row)).then(|| arr.value(row).to_string()))
                        .collect(),
                );
            }
        }

        Ok(Self { columns, rows })
    }

    /// Returns the number of data rows in the result set.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns in the result set.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the result set contains no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Retrieves the value at the given row index and column name.
    ///
    /// Returns `None` if the row index is out of bounds, the column name
    /// does not exist, or the cell value is SQL NULL.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let col_idx = self.column_index(col)?;
        let row_data = self.rows.get(row)?;
        row_data.get(col_idx)?.as_deref()
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        // Compute column widths (minimum = header length).
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    let cell_len = cell.as_deref().unwrap_or("NULL").len();
                    widths[i] = widths[i].max(cell_len);
                }
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", col, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    write!(f, " | ")?;
                }
                let value = cell.as_deref().unwrap_or("NULL");
                write!(f, "{:<width$}", value, width = widths.get(i).copied().unwrap_or(0))?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(f, "{} rows", self.rows.len())
    }
}
