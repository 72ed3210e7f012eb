/// In-memory tabular data for GLOBE Observer records.
///
/// GLOBE API responses and the CSV files derived from them have a schema
/// that differs per protocol and changes as columns are renamed, flagged and
/// unpacked during cleanup. `Table` is a small column-major frame: an ordered
/// list of named columns that all hold the same number of `Value` cells.

use chrono::NaiveDateTime;
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Format used when date-times are written to CSV.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cell text that is read as a missing value.
const CSV_NULL_MARKERS: &[&str] = &["", "null", "NaN", "nan", "NA", "N/A", "None"];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column `{column}` has {found} values, table has {expected} rows")]
    LengthMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    #[error("row {row} out of range for table with {len} rows")]
    RowOutOfRange { row: usize, len: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Cell values
// ---------------------------------------------------------------------------

/// A single cell.
///
/// `Float` never holds NaN: missing numbers are `Null`, so equality between
/// cells behaves the way the filters and the homogeneous-column check expect.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    List(Vec<Value>),
}

impl Value {
    /// Builds a float cell, mapping NaN and infinities to `Null`.
    pub fn float(value: f64) -> Value {
        if value.is_finite() {
            Value::Float(value)
        } else {
            Value::Null
        }
    }

    pub fn text(value: impl Into<String>) -> Value {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) => Some(f.trunc() as i64),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    /// Converts a JSON value from an API response into a cell.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => {
                Value::List(items.iter().map(Value::from_json).collect())
            }
            // Nested objects are kept as their JSON text.
            serde_json::Value::Object(_) => Value::Text(json.to_string()),
        }
    }

    /// Infers a cell from CSV text.
    pub fn parse_csv_field(field: &str) -> Value {
        let trimmed = field.trim();
        if CSV_NULL_MARKERS.contains(&trimmed) {
            return Value::Null;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return Value::Float(f);
            }
        }
        Value::Text(field.to_string())
    }

    /// Text written to CSV for this cell.
    pub fn to_csv_field(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(";"))
            }
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

// ---------------------------------------------------------------------------
// Columns and tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(name, values)` pairs. All columns must have the
    /// same length.
    pub fn from_columns<N, I>(columns: I) -> Result<Self, TableError>
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, Vec<Value>)>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    /// Builds a table from JSON objects. Columns appear in the order their
    /// keys are first seen; records lacking a key get `Null` in that column.
    pub fn from_json_records(records: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !names.iter().any(|n| n == key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.get(&name).map(Value::from_json).unwrap_or(Value::Null))
                    .collect();
                Column { name, values }
            })
            .collect();

        Table {
            columns,
            rows: records.len(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cells of a column, or `MissingColumn`.
    pub fn values(&self, name: &str) -> Result<&[Value], TableError> {
        self.column(name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Replaces the column if it exists, otherwise appends it.
    pub fn set_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.rows,
                found: values.len(),
            });
        }

        match self.position(&name) {
            Some(idx) => self.columns[idx].values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.position(name)?;
        let column = self.columns.remove(idx);
        if self.columns.is_empty() {
            self.rows = 0;
        }
        Some(column)
    }

    /// Renames a column in place. Returns `false` if `old` does not exist.
    pub fn rename_column(&mut self, old: &str, new: &str) -> bool {
        match self.position(old) {
            Some(idx) => {
                self.columns[idx].name = new.to_string();
                true
            }
            None => false,
        }
    }

    /// Renames every column through `f`, keeping order.
    pub fn rename_columns_with<F: FnMut(&str) -> String>(&mut self, mut f: F) {
        for column in &mut self.columns {
            column.name = f(&column.name);
        }
    }

    /// Reorders columns to `order`. Every name in `order` must exist and the
    /// list must name each column once; unnamed columns are not dropped but
    /// moved to the end in their current order.
    pub fn reorder(&mut self, order: &[String]) -> Result<(), TableError> {
        let mut remaining = std::mem::take(&mut self.columns);
        let mut reordered = Vec::with_capacity(remaining.len());
        for name in order {
            let idx = remaining
                .iter()
                .position(|c| &c.name == name)
                .ok_or_else(|| TableError::MissingColumn(name.clone()))?;
            reordered.push(remaining.remove(idx));
        }
        reordered.extend(remaining);
        self.columns = reordered;
        Ok(())
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Value) -> Result<(), TableError> {
        let rows = self.rows;
        let col = self
            .columns
            .iter_mut()
            .find(|c| c.name == column)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))?;
        let cell = col
            .values
            .get_mut(row)
            .ok_or(TableError::RowOutOfRange { row, len: rows })?;
        *cell = value;
        Ok(())
    }

    /// Visits every cell, column by column.
    pub fn for_each_cell_mut<F: FnMut(&str, &mut Value)>(&mut self, mut f: F) {
        for column in &mut self.columns {
            for value in &mut column.values {
                f(&column.name, value);
            }
        }
    }

    /// Mutable access to a single column's cells.
    pub fn values_mut(&mut self, name: &str) -> Result<&mut Vec<Value>, TableError> {
        self.columns
            .iter_mut()
            .find(|c| c.name == name)
            .map(|c| &mut c.values)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    /// Number of non-null cells in a row.
    pub fn non_null_count(&self, row: usize) -> usize {
        self.columns
            .iter()
            .filter(|c| c.values.get(row).is_some_and(|v| !v.is_null()))
            .count()
    }

    /// Keeps the rows where `mask` is `true`.
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                values: c
                    .values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect(),
            })
            .collect();
        let rows = mask.iter().take(self.rows).filter(|k| **k).count();
        Table { columns, rows }
    }

    // -----------------------------------------------------------------------
    // CSV
    // -----------------------------------------------------------------------

    pub fn from_csv_reader<R: Read>(rdr: R) -> Result<Table, TableError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(rdr);
        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
        let mut rows = 0;

        for record in reader.records() {
            let record = record?;
            for (i, values) in columns.iter_mut().enumerate() {
                values.push(record.get(i).map(Value::parse_csv_field).unwrap_or(Value::Null));
            }
            rows += 1;
        }

        let columns = headers
            .into_iter()
            .zip(columns)
            .map(|(name, values)| Column { name, values })
            .collect();
        Ok(Table { columns, rows })
    }

    pub fn read_csv(path: impl AsRef<Path>) -> Result<Table, TableError> {
        let file = File::open(path)?;
        Table::from_csv_reader(file)
    }

    pub fn to_csv_writer<W: Write>(&self, wtr: W) -> Result<(), TableError> {
        let mut writer = csv::Writer::from_writer(wtr);
        writer.write_record(self.columns.iter().map(|c| c.name.as_str()))?;
        for row in 0..self.rows {
            writer.write_record(self.columns.iter().map(|c| c.values[row].to_csv_field()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let file = File::create(path)?;
        self.to_csv_writer(file)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
